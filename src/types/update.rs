//! Behavior snapshot emitted after each evaluation tick

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ActionId, PersonId};

/// Serializable snapshot of the engine, broadcast over the API WebSocket and
/// printed by the CLI's `--json` mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorUpdate {
    /// Wall-clock timestamp of the snapshot
    pub timestamp: DateTime<Utc>,
    /// Active strategy name
    pub strategy: String,
    /// Number of currently tracked people
    pub tracked_people: usize,
    /// Number of tracked people already greeted
    pub greeted: usize,
    /// Whether any hand is currently classified as waving
    pub waving: bool,
    /// Whether a non-idle action currently holds the lock
    pub action_locked: bool,
    /// Whether a beckon was ever substituted with a greet because the
    /// beckon clip is missing
    pub beckon_fallback: bool,
    /// The action holding the lock, if any
    pub active_action: Option<ActionId>,
    /// The person the avatar is looking at, if any
    pub gaze_target: Option<PersonId>,
}

impl BehaviorUpdate {
    /// Format for terminal display
    pub fn to_terminal_string(&self) -> String {
        format!(
            "people={} greeted={} waving={} action={} gaze={}",
            self.tracked_people,
            self.greeted,
            self.waving,
            self.active_action
                .map(|a| a.to_string())
                .unwrap_or_else(|| "-".to_string()),
            self.gaze_target
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string()),
        )
    }
}
