//! Maneki: perceptual behavior engine for interactive avatars
//!
//! Maneki turns a live stream of person/gesture detections into avatar
//! behavior: whom to look at, when to greet, beckon, or wave back, and the
//! low-level facial motion (blinking, lip articulation) that runs
//! continuously underneath. Rendering, camera capture, and the detection
//! models themselves are external collaborators reached through sink traits.

pub mod core;
pub mod types;

// =============================================================================
// TRACKING
// =============================================================================

/// Maximum box-center distance (pixels) for a detection to match a tracked person
pub const TRACKING_DISTANCE_THRESHOLD: f64 = 50.0;

/// A tracked person unmatched for longer than this is evicted (milliseconds)
pub const EVICTION_TIMEOUT_MS: u64 = 500;

// =============================================================================
// STRATEGY
// =============================================================================

/// Selective strategy: dwell time before greeting (milliseconds)
pub const DWELL_TIME_THRESHOLD_MS: u64 = 2000;

/// Aggressive strategy: global cooldown between triggers (milliseconds)
pub const REACTION_COOLDOWN_MS: u64 = 8000;

/// Aggressive strategy: fraction of the frame width forming each edge ROI band
pub const ROI_WIDTH: f64 = 0.2;

/// Duration of the greet reaction (milliseconds)
pub const GREET_DURATION_MS: u64 = 3000;

/// Duration of the beckon reaction (milliseconds)
pub const BECKON_DURATION_MS: u64 = 2000;

/// Duration of the wave-back reaction (milliseconds)
pub const WAVE_DURATION_MS: u64 = 3000;

/// Extra cooldown after a wave-back before another can fire (milliseconds)
pub const WAVE_REACTION_COOLDOWN_MS: u64 = 5000;

/// Messages disappear this long before their action ends (milliseconds)
pub const MESSAGE_LEAD_OUT_MS: u64 = 500;

// =============================================================================
// GAZE
// =============================================================================

/// Distance from the head to the look-at point (world units)
pub const LOOK_AT_DISTANCE: f64 = 2.0;

/// Maximum horizontal gaze angle (degrees)
pub const MAX_HORIZONTAL_ANGLE_DEG: f64 = 80.0;

/// Maximum vertical gaze angle (degrees)
pub const MAX_VERTICAL_ANGLE_DEG: f64 = 15.0;

/// Per-frame exponential smoothing factor for the look-at point
pub const GAZE_SMOOTHING_FACTOR: f64 = 0.1;

/// Default head position when the embedder does not supply one (world units)
pub const DEFAULT_HEAD_POSITION: [f64; 3] = [0.0, 1.4, 0.0];

// =============================================================================
// BLINK
// =============================================================================

/// Inter-blink wait range, Gaussian-sampled (seconds)
pub const BLINK_INTERVAL_RANGE_S: (f64, f64) = (1.5, 4.0);

/// Blink duration range, Gaussian-sampled (seconds)
pub const BLINK_DURATION_RANGE_S: (f64, f64) = (0.2, 0.3);

/// Fraction of a blink spent closing; the rest reopens
pub const BLINK_CLOSING_RATE: f64 = 0.2;

/// Exponential steepness of the eyelid-closing curve
pub const BLINK_BETA: f64 = 10.0;

/// Quadratic coefficient of the eyelid-opening curve
pub const BLINK_OPEN_A: f64 = 1.0;

/// The blink frame loop steps at this fixed rate, not wall-clock
pub const BLINK_FPS: u32 = 60;

// =============================================================================
// LIP SYNC
// =============================================================================

/// Viseme switch interval (milliseconds)
pub const LIPSYNC_INTERVAL_MS: u64 = 150;

/// Number of interpolation steps per crossfade
pub const LIPSYNC_FADE_STEPS: u32 = 10;

/// Target weight of the active viseme
pub const LIPSYNC_WEIGHT: f32 = 0.6;

// =============================================================================
// WAVE DETECTION
// =============================================================================

/// Per-hand oscillation history capacity (samples)
pub const WAVE_HISTORY_LEN: usize = 60;

/// Minimum x amplitude across the window for a wave
pub const WAVE_MIN_AMPLITUDE: f64 = 0.05;

/// Minimum mean-crossings across the window for a wave
pub const WAVE_MIN_CROSSINGS: usize = 3;

/// A detected wave stays "waving" this long after evidence stops (milliseconds)
pub const WAVE_PERSISTENCE_MS: u64 = 1500;

/// Minimum gesture-classifier score for the open-palm gate
pub const OPEN_PALM_SCORE_THRESHOLD: f32 = 0.3;

/// Landmark sampled for oscillation (middle-finger MCP)
pub const WAVE_LANDMARK_INDEX: usize = 9;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
