//! Reactive action definitions

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The named animation clips the avatar can play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionId {
    /// Resting loop; never subject to the action lock
    Idle,
    /// Greeting toward a person who has dwelled long enough
    Greet,
    /// Wave-back reaction to a detected wave gesture
    Wave,
    /// Beckoning toward a person entering the frame-edge ROI
    Beckon,
}

impl ActionId {
    /// Key used to look up the paired on-screen message
    pub fn message_key(&self) -> &'static str {
        match self {
            ActionId::Idle => "IDLE",
            ActionId::Greet => "GREET",
            ActionId::Wave => "WAVE",
            ActionId::Beckon => "BECKON",
        }
    }
}

impl std::fmt::Display for ActionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message_key())
    }
}

/// A strategy's request to play an action for a fixed duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionRequest {
    pub action: ActionId,
    pub duration: Duration,
}

impl ActionRequest {
    pub fn new(action: ActionId, duration_ms: u64) -> Self {
        Self {
            action,
            duration: Duration::from_millis(duration_ms),
        }
    }
}
