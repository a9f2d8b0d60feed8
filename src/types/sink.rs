//! Output sink traits
//!
//! The engine never touches meshes, expressions, or the screen directly; it
//! talks to whatever implements these traits. Implementations must be cheap
//! and non-blocking: they are called from the per-frame path and from the
//! facial synthesizer loops.

use std::time::Duration;

use crate::types::ActionId;

/// Advances/stops named animation clips
pub trait AnimationSink: Send + Sync {
    fn play_action(&self, action: ActionId);
    fn stop_action(&self, action: ActionId);
}

/// Writes per-channel expression weights (blink, visemes)
pub trait ExpressionSink: Send + Sync {
    fn set_value(&self, channel: &str, weight: f32);

    /// Whether the sink can currently accept weights
    fn available(&self) -> bool {
        true
    }
}

/// Steers head/eye orientation toward a 3D point; None means "look forward"
pub trait LookAtSink: Send + Sync {
    fn look_at(&self, target: Option<[f64; 3]>);
}

/// Shows/hides the on-screen message paired with a reaction
pub trait MessageSink: Send + Sync {
    fn show(&self, text: &str, duration: Duration);
    fn hide(&self);
}

// =============================================================================
// NULL SINKS
// =============================================================================

/// Discards all animation commands
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAnimationSink;

impl AnimationSink for NullAnimationSink {
    fn play_action(&self, _action: ActionId) {}
    fn stop_action(&self, _action: ActionId) {}
}

/// Discards all expression weights
#[derive(Debug, Default, Clone, Copy)]
pub struct NullExpressionSink;

impl ExpressionSink for NullExpressionSink {
    fn set_value(&self, _channel: &str, _weight: f32) {}
}

/// Discards all look-at targets
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLookAtSink;

impl LookAtSink for NullLookAtSink {
    fn look_at(&self, _target: Option<[f64; 3]>) {}
}

/// Discards all messages
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMessageSink;

impl MessageSink for NullMessageSink {
    fn show(&self, _text: &str, _duration: Duration) {}
    fn hide(&self) {}
}
