//! Behavior strategies: when to greet and when to beckon
//!
//! Three interchangeable strategies evaluated against the registry:
//! - Selective: greet anyone who has dwelled past 2 seconds
//! - Aggressive: beckon the first person entering a frame-edge ROI band,
//!   under a global 8-second cooldown
//! - Hybrid: aggressive first, then selective, every pass

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::core::IdentityRegistry;
use crate::types::{ActionId, ActionRequest, FrameSize};
use crate::{
    BECKON_DURATION_MS, DWELL_TIME_THRESHOLD_MS, GREET_DURATION_MS, REACTION_COOLDOWN_MS,
    ROI_WIDTH,
};

/// Strategy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Selective,
    Aggressive,
    Hybrid,
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Selective => "selective",
            Strategy::Aggressive => "aggressive",
            Strategy::Hybrid => "hybrid",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "selective" => Ok(Strategy::Selective),
            "aggressive" => Ok(Strategy::Aggressive),
            "hybrid" => Ok(Strategy::Hybrid),
            other => Err(format!("unknown strategy: {}", other)),
        }
    }
}

/// Evaluates the active strategy over the registry and emits action requests.
///
/// The engine owns only strategy-local timers; per-person flags live on the
/// tracked people themselves.
#[derive(Debug)]
pub struct BehaviorStrategyEngine {
    strategy: Strategy,
    /// Last aggressive trigger, for the global cooldown
    last_aggressive_reaction: Option<Instant>,
    /// Set once a beckon had to be substituted with a greet
    beckon_fallback: bool,
}

impl BehaviorStrategyEngine {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            last_aggressive_reaction: None,
            beckon_fallback: false,
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Whether a beckon was ever substituted with a greet because the
    /// beckon clip is missing
    pub fn beckon_fallback(&self) -> bool {
        self.beckon_fallback
    }

    /// Switch strategies, resetting engine-local timers. The caller is
    /// responsible for the accompanying registry/target reset.
    pub fn set_strategy(&mut self, strategy: Strategy) {
        self.strategy = strategy;
        self.reset();
    }

    /// Clear all strategy-local timers
    pub fn reset(&mut self) {
        self.last_aggressive_reaction = None;
    }

    /// Run one evaluation pass. Multiple requests may be emitted (selective
    /// can greet several people in the same pass); aggressive contributes at
    /// most one and runs first under hybrid.
    pub fn evaluate(
        &mut self,
        registry: &mut IdentityRegistry,
        frame: FrameSize,
        now: Instant,
        beckon_available: bool,
    ) -> Vec<ActionRequest> {
        let mut requests = Vec::new();
        match self.strategy {
            Strategy::Selective => {
                self.run_selective(registry, now, &mut requests);
            }
            Strategy::Aggressive => {
                self.run_aggressive(registry, frame, now, beckon_available, &mut requests);
            }
            Strategy::Hybrid => {
                self.run_aggressive(registry, frame, now, beckon_available, &mut requests);
                self.run_selective(registry, now, &mut requests);
            }
        }
        requests
    }

    /// Greet everyone who has dwelled past the threshold and was not greeted
    /// yet. No early exit: several people can trigger in one pass.
    fn run_selective(
        &mut self,
        registry: &mut IdentityRegistry,
        now: Instant,
        requests: &mut Vec<ActionRequest>,
    ) {
        for person in registry.people_mut() {
            if person.is_greeted {
                continue;
            }
            if person.dwell_ms(now) > DWELL_TIME_THRESHOLD_MS {
                person.is_greeted = true;
                requests.push(ActionRequest::new(ActionId::Greet, GREET_DURATION_MS));
            }
        }
    }

    /// Beckon the first untouched person whose box center sits in the outer
    /// ROI band on either side of the frame. One trigger per pass, global
    /// cooldown between triggers.
    fn run_aggressive(
        &mut self,
        registry: &mut IdentityRegistry,
        frame: FrameSize,
        now: Instant,
        beckon_available: bool,
        requests: &mut Vec<ActionRequest>,
    ) {
        if let Some(last) = self.last_aggressive_reaction {
            if now.duration_since(last).as_millis() < REACTION_COOLDOWN_MS as u128 {
                return;
            }
        }

        let roi = frame.width * ROI_WIDTH;
        for person in registry.people_mut() {
            if person.is_approached || person.is_greeted {
                continue;
            }
            let (center_x, _) = person.detection.center();
            if center_x < roi || center_x > frame.width - roi {
                person.is_approached = true;
                self.last_aggressive_reaction = Some(now);

                // Fall back to greet when the beckon clip is missing
                if beckon_available {
                    requests.push(ActionRequest::new(ActionId::Beckon, BECKON_DURATION_MS));
                } else {
                    if !self.beckon_fallback {
                        eprintln!("⚠ beckon animation unavailable, greeting instead");
                    }
                    self.beckon_fallback = true;
                    requests.push(ActionRequest::new(ActionId::Greet, GREET_DURATION_MS));
                }
                return;
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
