//! Identity registry: nearest-neighbor matching with timeout eviction
//!
//! Each detection is matched to the closest tracked person within
//! TRACKING_DISTANCE_THRESHOLD pixels of its previous box center. Unmatched
//! detections create new people; tracked people unmatched for longer than
//! EVICTION_TIMEOUT_MS are evicted.

use std::time::Instant;

use crate::types::{DetectionBox, PersonId, PersonState};
use crate::{EVICTION_TIMEOUT_MS, TRACKING_DISTANCE_THRESHOLD};

/// Tracks person identities across detection frames.
///
/// People are stored in insertion order (ascending id), which makes every
/// "first match wins" scan in the engine deterministic: ties go to the
/// lowest id.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    people: Vec<PersonState>,
    next_id: u64,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match one detection tick against the tracked set.
    ///
    /// Returns the ids evicted in this call so the caller can drop any
    /// external references to them (e.g. the current gaze target).
    pub fn update(&mut self, detections: &[DetectionBox], now: Instant) -> Vec<PersonId> {
        let mut matched: Vec<PersonId> = Vec::with_capacity(detections.len());

        for detection in detections {
            match self.best_match(detection) {
                Some(idx) => {
                    self.people[idx].update(*detection, now);
                    matched.push(self.people[idx].id);
                }
                None => {
                    let id = PersonId(self.next_id);
                    self.next_id += 1;
                    self.people.push(PersonState::new(id, *detection, now));
                    matched.push(id);
                }
            }
        }

        // Evict people that received no match and have been unseen too long
        let mut evicted = Vec::new();
        self.people.retain(|p| {
            let keep = matched.contains(&p.id) || p.unseen_ms(now) <= EVICTION_TIMEOUT_MS;
            if !keep {
                evicted.push(p.id);
            }
            keep
        });
        evicted
    }

    /// Closest tracked person within the distance threshold, lowest id on ties.
    /// Each detection is matched independently, so two detections landing on
    /// the same person both refresh it rather than splitting a new track.
    fn best_match(&self, detection: &DetectionBox) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, person) in self.people.iter().enumerate() {
            let distance = person.detection.center_distance(detection);
            if distance < TRACKING_DISTANCE_THRESHOLD
                && best.map_or(true, |(_, d)| distance < d)
            {
                best = Some((idx, distance));
            }
        }
        best.map(|(idx, _)| idx)
    }

    /// Tracked people in insertion order
    pub fn people(&self) -> &[PersonState] {
        &self.people
    }

    /// Mutable access for strategy bookkeeping flags
    pub fn people_mut(&mut self) -> &mut [PersonState] {
        &mut self.people
    }

    pub fn get(&self, id: PersonId) -> Option<&PersonState> {
        self.people.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    /// Drop all tracked people (strategy switch)
    pub fn reset(&mut self) {
        self.people.clear();
    }
}

// =============================================================================
// TESTS
// =============================================================================
