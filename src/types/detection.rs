//! Detection and gesture feed input types
//!
//! These mirror what the external person/gesture detectors emit: pixel-space
//! bounding boxes per evaluation tick and normalized hand landmarks with a
//! gesture classification per hand.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in frame-pixel space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionBox {
    pub origin_x: f64,
    pub origin_y: f64,
    pub width: f64,
    pub height: f64,
}

impl DetectionBox {
    pub fn new(origin_x: f64, origin_y: f64, width: f64, height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            width,
            height,
        }
    }

    /// Box center in frame-pixel space
    pub fn center(&self) -> (f64, f64) {
        (
            self.origin_x + self.width / 2.0,
            self.origin_y + self.height / 2.0,
        )
    }

    /// Euclidean distance between this box's center and another's
    pub fn center_distance(&self, other: &DetectionBox) -> f64 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
    }
}

/// Video frame dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: f64,
    pub height: f64,
}

impl FrameSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Horizontal distance from a pixel x to the frame center
    pub fn center_offset_x(&self, x: f64) -> f64 {
        (x - self.width / 2.0).abs()
    }
}

impl Default for FrameSize {
    fn default() -> Self {
        Self {
            width: 640.0,
            height: 480.0,
        }
    }
}

/// A single hand landmark, normalized to [0, 1] frame coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
}

/// One hand from the gesture feed: landmarks plus the top gesture class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandFrame {
    /// Handedness label ("Left" / "Right"), used as the hand id
    pub handedness: String,
    pub landmarks: Vec<Landmark>,
    /// Top gesture category name from the classifier
    pub gesture_label: String,
    /// Classifier confidence for that category
    pub gesture_score: f32,
}
