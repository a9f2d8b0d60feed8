//! On-screen message catalog

use serde::{Deserialize, Serialize};

use crate::types::ActionId;

/// Messages paired with each reactive action.
///
/// Deserializable from a user-supplied JSON file; falls back to built-in
/// text when no catalog is provided.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct MessageCatalog {
    pub greet: String,
    pub wave: String,
    pub beckon: String,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self {
            greet: "Hello there!".to_string(),
            wave: "Thanks for waving!".to_string(),
            beckon: "Come take a look!".to_string(),
        }
    }
}

impl MessageCatalog {
    /// Message for an action, or None for actions with no paired message
    pub fn for_action(&self, action: ActionId) -> Option<&str> {
        match action {
            ActionId::Idle => None,
            ActionId::Greet => Some(&self.greet),
            ActionId::Wave => Some(&self.wave),
            ActionId::Beckon => Some(&self.beckon),
        }
    }
}
