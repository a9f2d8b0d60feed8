//! Gaze-target arbitration and look-at smoothing
//!
//! The selector decides whom to look at (greeted people first, then the
//! nearest-to-center face). The smoother turns the chosen face's screen
//! position into a 3D look-at point, steered by bounded yaw/pitch angles
//! and eased with per-frame exponential interpolation.

use std::sync::Arc;

use crate::types::{FrameSize, LookAtSink, PersonId, PersonState};
use crate::{
    DEFAULT_HEAD_POSITION, GAZE_SMOOTHING_FACTOR, LOOK_AT_DISTANCE, MAX_HORIZONTAL_ANGLE_DEG,
    MAX_VERTICAL_ANGLE_DEG,
};

/// Chooses which tracked person the avatar should look at
#[derive(Debug, Default, Clone, Copy)]
pub struct GazeTargetSelector;

impl GazeTargetSelector {
    /// Priority: greeted people first, nearest box-center to the horizontal
    /// frame center; then everyone by the same rule. Ties go to the lowest
    /// id (people are stored in ascending-id order). None when nobody is
    /// tracked.
    pub fn select(&self, people: &[PersonState], frame: FrameSize) -> Option<PersonId> {
        if people.is_empty() {
            return None;
        }
        if people.iter().any(|p| p.is_greeted) {
            nearest_to_center(people.iter().filter(|p| p.is_greeted), frame)
        } else {
            nearest_to_center(people.iter(), frame)
        }
    }
}

/// Smallest horizontal box-center offset from frame center wins; on exact
/// ties the first candidate (lowest id) is kept
fn nearest_to_center<'a>(
    candidates: impl Iterator<Item = &'a PersonState>,
    frame: FrameSize,
) -> Option<PersonId> {
    let mut best: Option<(PersonId, f64)> = None;
    for person in candidates {
        let (center_x, _) = person.detection.center();
        let distance = frame.center_offset_x(center_x);
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((person.id, distance));
        }
    }
    best.map(|(id, _)| id)
}

/// Smoothly steers the look-at point toward the selected target.
///
/// Owns the single mutable smoothed point; `update` must run every rendered
/// frame so the exponential easing keeps its fixed per-frame factor.
pub struct GazeSmoother {
    head_position: [f64; 3],
    smoothed: [f64; 3],
    sink: Arc<dyn LookAtSink>,
}

impl GazeSmoother {
    pub fn new(sink: Arc<dyn LookAtSink>) -> Self {
        Self::with_head_position(sink, DEFAULT_HEAD_POSITION)
    }

    pub fn with_head_position(sink: Arc<dyn LookAtSink>, head_position: [f64; 3]) -> Self {
        // Start looking straight ahead
        let smoothed = [
            head_position[0],
            head_position[1],
            head_position[2] + LOOK_AT_DISTANCE,
        ];
        Self {
            head_position,
            smoothed,
            sink,
        }
    }

    /// Advance one frame toward the target's normalized screen offset from
    /// center (both components in [-0.5, 0.5]); None means straight ahead.
    /// Writes the smoothed point to the look-at sink and returns it.
    pub fn update(&mut self, offset: Option<(f64, f64)>) -> [f64; 3] {
        let raw = match offset {
            None => [
                self.head_position[0],
                self.head_position[1],
                self.head_position[2] + LOOK_AT_DISTANCE,
            ],
            Some((dx, dy)) => {
                let yaw = dx * MAX_HORIZONTAL_ANGLE_DEG.to_radians();
                let pitch = dy * MAX_VERTICAL_ANGLE_DEG.to_radians();
                let direction = rotate_forward(pitch, yaw);
                [
                    self.head_position[0] + direction[0] * LOOK_AT_DISTANCE,
                    self.head_position[1] + direction[1] * LOOK_AT_DISTANCE,
                    self.head_position[2] + direction[2] * LOOK_AT_DISTANCE,
                ]
            }
        };

        // Never snapped: always eased toward the raw target
        for axis in 0..3 {
            self.smoothed[axis] += (raw[axis] - self.smoothed[axis]) * GAZE_SMOOTHING_FACTOR;
        }
        self.sink.look_at(Some(self.smoothed));
        self.smoothed
    }

    pub fn smoothed(&self) -> [f64; 3] {
        self.smoothed
    }
}

/// Rotate the forward unit vector (0, 0, 1) by pitch around X then yaw
/// around Y (yaw-pitch euler order), radians.
fn rotate_forward(pitch: f64, yaw: f64) -> [f64; 3] {
    [
        yaw.sin() * pitch.cos(),
        -pitch.sin(),
        yaw.cos() * pitch.cos(),
    ]
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DetectionBox, NullLookAtSink};
    use std::time::Instant;

    const FRAME: FrameSize = FrameSize {
        width: 640.0,
        height: 480.0,
    };

    fn person(id: u64, x: f64, greeted: bool) -> PersonState {
        let mut p = PersonState::new(
            PersonId(id),
            DetectionBox::new(x, 200.0, 40.0, 40.0),
            Instant::now(),
        );
        p.is_greeted = greeted;
        p
    }

    #[test]
    fn test_select_none_when_empty() {
        let selector = GazeTargetSelector;
        assert_eq!(selector.select(&[], FRAME), None);
    }

    #[test]
    fn test_select_nearest_to_center() {
        let selector = GazeTargetSelector;
        // Centers at 120 and 320 (frame center)
        let people = vec![person(0, 100.0, false), person(1, 300.0, false)];
        assert_eq!(selector.select(&people, FRAME), Some(PersonId(1)));
    }

    #[test]
    fn test_greeted_person_outranks_centered() {
        let selector = GazeTargetSelector;
        let people = vec![person(0, 300.0, false), person(1, 100.0, true)];
        assert_eq!(selector.select(&people, FRAME), Some(PersonId(1)));
    }

    #[test]
    fn test_tie_goes_to_lowest_id() {
        let selector = GazeTargetSelector;
        // Centers at 220 and 420, both 100px from center
        let people = vec![person(0, 200.0, false), person(1, 400.0, false)];
        assert_eq!(selector.select(&people, FRAME), Some(PersonId(0)));
    }

    #[test]
    fn test_smoother_eases_toward_target() {
        let mut smoother = GazeSmoother::new(Arc::new(NullLookAtSink));
        let start = smoother.smoothed();

        // Target far right of center
        let after_one = smoother.update(Some((0.5, 0.0)));
        assert_ne!(after_one, start);

        // Many frames converge near the raw target
        let mut point = after_one;
        for _ in 0..200 {
            point = smoother.update(Some((0.5, 0.0)));
        }
        let yaw = 0.5 * MAX_HORIZONTAL_ANGLE_DEG.to_radians();
        let expected_x = DEFAULT_HEAD_POSITION[0] + yaw.sin() * LOOK_AT_DISTANCE;
        assert!((point[0] - expected_x).abs() < 1e-3);
    }

    #[test]
    fn test_smoother_returns_forward_on_none() {
        let mut smoother = GazeSmoother::new(Arc::new(NullLookAtSink));
        for _ in 0..50 {
            smoother.update(Some((0.4, 0.3)));
        }
        let mut point = smoother.smoothed();
        for _ in 0..300 {
            point = smoother.update(None);
        }
        assert!((point[0] - DEFAULT_HEAD_POSITION[0]).abs() < 1e-3);
        assert!((point[2] - (DEFAULT_HEAD_POSITION[2] + LOOK_AT_DISTANCE)).abs() < 1e-3);
    }

    #[test]
    fn test_pitch_moves_target_down() {
        let mut smoother = GazeSmoother::new(Arc::new(NullLookAtSink));
        // Face below frame center (positive dy) pulls the gaze down
        let mut point = smoother.smoothed();
        for _ in 0..300 {
            point = smoother.update(Some((0.0, 0.5)));
        }
        assert!(point[1] < DEFAULT_HEAD_POSITION[1]);
    }
}
