//! Wave-gesture detection from hand-landmark oscillation
//!
//! Per hand, a sliding window of horizontal landmark positions is checked
//! for oscillation: enough amplitude and enough crossings of the window
//! mean. A positive window stamps the hand as waving, and the waving state
//! persists for a grace period after evidence stops so brief classifier
//! flicker does not chop the signal.

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use crate::types::{HandFrame, Landmark};
use crate::{
    OPEN_PALM_SCORE_THRESHOLD, WAVE_HISTORY_LEN, WAVE_LANDMARK_INDEX, WAVE_MIN_AMPLITUDE,
    WAVE_MIN_CROSSINGS, WAVE_PERSISTENCE_MS,
};

/// Gesture category treated as a wave candidate
pub const OPEN_PALM_LABEL: &str = "Open_Palm";

#[derive(Debug, Clone, Copy)]
struct Sample {
    x: f64,
    #[allow(dead_code)]
    timestamp: Instant,
}

/// Per-hand oscillation analysis over a fixed-capacity history
#[derive(Debug, Default)]
pub struct WaveDetector {
    history: HashMap<String, VecDeque<Sample>>,
    wave_timestamps: HashMap<String, Instant>,
}

impl WaveDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one landmark frame for a hand; reports the hand's waving state.
    ///
    /// An empty landmark set clears the hand's history. Oscillation runs
    /// once the window holds at least half its capacity.
    pub fn update(&mut self, hand_id: &str, landmarks: &[Landmark], now: Instant) -> bool {
        let Some(landmark) = landmarks.get(WAVE_LANDMARK_INDEX) else {
            self.clear_hand(hand_id);
            return false;
        };

        let history = self.history.entry(hand_id.to_string()).or_default();
        history.push_back(Sample {
            x: landmark.x,
            timestamp: now,
        });
        while history.len() > WAVE_HISTORY_LEN {
            history.pop_front();
        }

        if history.len() >= WAVE_HISTORY_LEN / 2 && detect_oscillation(history) {
            self.wave_timestamps.insert(hand_id.to_string(), now);
        }
        self.is_waving(hand_id, now)
    }

    /// True while the persistence window since the last positive detection
    /// is still open
    pub fn is_waving(&self, hand_id: &str, now: Instant) -> bool {
        self.wave_timestamps
            .get(hand_id)
            .map(|last| now.duration_since(*last).as_millis() < WAVE_PERSISTENCE_MS as u128)
            .unwrap_or(false)
    }

    /// Drop a hand's oscillation history (disappeared or failed the gesture
    /// gate). A recent positive detection keeps flagging until its
    /// persistence window lapses, so classifier flicker does not chop the
    /// signal.
    pub fn clear_hand(&mut self, hand_id: &str) {
        self.history.remove(hand_id);
    }

    /// True while any hand's persistence window is open
    pub fn any_waving(&self, now: Instant) -> bool {
        self.wave_timestamps
            .values()
            .any(|last| now.duration_since(*last).as_millis() < WAVE_PERSISTENCE_MS as u128)
    }

    /// Hand ids with live history
    pub fn tracked_hands(&self) -> Vec<String> {
        self.history.keys().cloned().collect()
    }

    /// Drop all history and persistence state
    pub fn reset(&mut self) {
        self.history.clear();
        self.wave_timestamps.clear();
    }
}

/// Amplitude of at least WAVE_MIN_AMPLITUDE and WAVE_MIN_CROSSINGS crossings
/// of the window mean
fn detect_oscillation(history: &VecDeque<Sample>) -> bool {
    let xs: Vec<f64> = history.iter().map(|s| s.x).collect();
    let min = xs.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if max - min < WAVE_MIN_AMPLITUDE {
        return false;
    }

    let mean = xs.iter().sum::<f64>() / xs.len() as f64;
    let mut crossings = 0;
    for pair in xs.windows(2) {
        if (pair[0] - mean) * (pair[1] - mean) < 0.0 {
            crossings += 1;
        }
    }
    crossings >= WAVE_MIN_CROSSINGS
}

/// Aggregates per-hand waving into a single signal with one-shot wave events.
///
/// Applies the open-palm confidence gate, clears hands that vanish from the
/// feed, and reports the not-waving → waving edge exactly once.
#[derive(Debug, Default)]
pub struct GestureTracker {
    detector: WaveDetector,
    waving: bool,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one gesture-feed tick. Returns true exactly when the overall
    /// signal transitions from not-waving to waving.
    ///
    /// Clearing a hand drops its sample history but keeps its last positive
    /// wave timestamp, so the aggregate signal holds through the persistence
    /// window across classifier dropouts instead of ending the moment a hand
    /// misses a frame or fails the confidence gate. The edge therefore falls
    /// up to the full window later than a strict per-frame reading would.
    pub fn process(&mut self, hands: &[HandFrame], now: Instant) -> bool {
        let mut seen: Vec<&str> = Vec::with_capacity(hands.len());

        for hand in hands {
            seen.push(&hand.handedness);
            if hand.gesture_label == OPEN_PALM_LABEL
                && hand.gesture_score > OPEN_PALM_SCORE_THRESHOLD
            {
                self.detector.update(&hand.handedness, &hand.landmarks, now);
            } else {
                self.detector.clear_hand(&hand.handedness);
            }
        }

        // Hands gone from the feed lose their history
        for hand_id in self.detector.tracked_hands() {
            if !seen.iter().any(|s| *s == hand_id) {
                self.detector.clear_hand(&hand_id);
            }
        }

        let overall = self.detector.any_waving(now);
        let started = overall && !self.waving;
        self.waving = overall;
        started
    }

    pub fn is_waving(&self) -> bool {
        self.waving
    }

    pub fn reset(&mut self) {
        self.detector.reset();
        self.waving = false;
    }
}

// =============================================================================
// TESTS
// =============================================================================
