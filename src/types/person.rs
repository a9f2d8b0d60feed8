//! Tracked person state

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::types::DetectionBox;

/// Stable identifier for a tracked person.
///
/// Ids are handed out by a per-registry monotonic counter, so they are unique
/// for the registry's lifetime and ordering by id is insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PersonId(pub u64);

impl std::fmt::Display for PersonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "person-{}", self.0)
    }
}

/// State carried for one tracked person across frames.
///
/// Created on the first unmatched detection, mutated only by the registry,
/// destroyed on eviction or strategy reset.
#[derive(Debug, Clone)]
pub struct PersonState {
    pub id: PersonId,
    /// Most recent matched detection box
    pub detection: DetectionBox,
    /// When tracking began
    pub start_time: Instant,
    /// When the last matching detection arrived; never decreases
    pub last_seen: Instant,
    /// Selective strategy has greeted this person
    pub is_greeted: bool,
    /// Aggressive strategy has beckoned this person
    pub is_approached: bool,
}

impl PersonState {
    pub fn new(id: PersonId, detection: DetectionBox, now: Instant) -> Self {
        Self {
            id,
            detection,
            start_time: now,
            last_seen: now,
            is_greeted: false,
            is_approached: false,
        }
    }

    /// Refresh with a newly matched detection
    pub fn update(&mut self, detection: DetectionBox, now: Instant) {
        self.detection = detection;
        if now > self.last_seen {
            self.last_seen = now;
        }
    }

    /// How long this person has been continuously present (milliseconds)
    pub fn dwell_ms(&self, now: Instant) -> u64 {
        now.duration_since(self.start_time).as_millis() as u64
    }

    /// How long since the last matching detection (milliseconds)
    pub fn unseen_ms(&self, now: Instant) -> u64 {
        now.duration_since(self.last_seen).as_millis() as u64
    }
}
