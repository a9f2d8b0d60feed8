//! Behavior controller: orchestration of the perception → reaction path
//!
//! One controller owns the registry, strategy engine, arbiter, gaze pipeline,
//! and gesture tracker, and exposes the three entry points an embedder
//! drives: detection ingestion (reduced cadence), gesture ingestion, and the
//! per-frame gaze update.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;

use crate::core::{
    ActionArbiter, BehaviorStrategyEngine, GazeSmoother, GazeTargetSelector, GestureTracker,
    IdentityRegistry, Strategy,
};
use crate::types::{
    ActionId, AnimationSink, BehaviorUpdate, DetectionBox, FrameSize, HandFrame, LookAtSink,
    MessageCatalog, MessageSink, PersonId,
};
use crate::{DEFAULT_HEAD_POSITION, WAVE_DURATION_MS, WAVE_REACTION_COOLDOWN_MS};

/// Controller construction parameters
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub strategy: Strategy,
    pub frame: FrameSize,
    /// Run detection/strategy evaluation every Nth frame (1 = every frame).
    /// The first frame always evaluates.
    pub frame_skip: u32,
    /// Whether the beckon animation clip is loaded; beckons fall back to
    /// greets without it
    pub beckon_available: bool,
    pub messages: MessageCatalog,
    pub head_position: [f64; 3],
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Selective,
            frame: FrameSize::default(),
            frame_skip: 1,
            beckon_available: true,
            messages: MessageCatalog::default(),
            head_position: DEFAULT_HEAD_POSITION,
        }
    }
}

/// Drives avatar behavior from detection and gesture feeds
pub struct BehaviorController {
    registry: IdentityRegistry,
    engine: BehaviorStrategyEngine,
    arbiter: ActionArbiter,
    selector: GazeTargetSelector,
    smoother: GazeSmoother,
    gestures: GestureTracker,
    frame: FrameSize,
    frame_skip: u32,
    frame_count: u64,
    current_target: Option<PersonId>,
    wave_cooldown_until: Option<Instant>,
    beckon_available: bool,
}

impl BehaviorController {
    pub fn new(
        config: ControllerConfig,
        animation: Arc<dyn AnimationSink>,
        message: Arc<dyn MessageSink>,
        look_at: Arc<dyn LookAtSink>,
    ) -> Self {
        Self {
            registry: IdentityRegistry::new(),
            engine: BehaviorStrategyEngine::new(config.strategy),
            arbiter: ActionArbiter::new(animation, message, config.messages),
            selector: GazeTargetSelector,
            smoother: GazeSmoother::with_head_position(look_at, config.head_position),
            gestures: GestureTracker::new(),
            frame: config.frame,
            frame_skip: config.frame_skip.max(1),
            frame_count: 0,
            current_target: None,
            wave_cooldown_until: None,
            beckon_available: config.beckon_available,
        }
    }

    /// Count a rendered frame; true when this frame should run detector
    /// inference (first frame always, then every `frame_skip`th).
    pub fn begin_frame(&mut self) -> bool {
        self.frame_count += 1;
        self.frame_count == 1 || self.frame_count % self.frame_skip as u64 == 0
    }

    /// Ingest one detection tick: match identities, evict stale ones, run
    /// the active strategy, and re-arbitrate the gaze target.
    pub fn ingest_detections(&mut self, detections: &[DetectionBox], now: Instant) {
        let evicted = self.registry.update(detections, now);

        // An evicted person cannot stay the gaze target
        if let Some(target) = self.current_target {
            if evicted.contains(&target) {
                self.current_target = None;
                if !self.arbiter.is_locked() {
                    self.arbiter.play(ActionId::Idle, Duration::ZERO);
                }
            }
        }

        for request in self
            .engine
            .evaluate(&mut self.registry, self.frame, now, self.beckon_available)
        {
            self.arbiter.play(request.action, request.duration);
        }

        self.current_target = self.selector.select(self.registry.people(), self.frame);
    }

    /// Ingest one gesture tick. A fresh wave event while someone is being
    /// looked at plays the wave-back reaction, under its own cooldown on top
    /// of the detector's persistence window.
    pub fn ingest_gestures(&mut self, hands: &[HandFrame], now: Instant) {
        let started = self.gestures.process(hands, now);
        if !started || self.current_target.is_none() {
            return;
        }
        if self
            .wave_cooldown_until
            .is_some_and(|until| now < until)
        {
            return;
        }
        self.wave_cooldown_until =
            Some(now + Duration::from_millis(WAVE_REACTION_COOLDOWN_MS));
        self.arbiter
            .play(ActionId::Wave, Duration::from_millis(WAVE_DURATION_MS));
    }

    /// Advance the smoothed look-at point one frame and write it to the
    /// look-at sink. Runs every rendered frame.
    pub fn update_gaze(&mut self) -> [f64; 3] {
        let offset = self
            .current_target
            .and_then(|id| self.registry.get(id))
            .map(|person| {
                let (center_x, center_y) = person.detection.center();
                // Mirrored horizontally: the camera faces the user
                (
                    0.5 - center_x / self.frame.width,
                    center_y / self.frame.height - 0.5,
                )
            });
        self.smoother.update(offset)
    }

    /// Switch strategies. Clears all tracked people, engine timers, and the
    /// gaze target; an in-flight reaction keeps its lock and completes.
    pub fn set_strategy(&mut self, strategy: Strategy) {
        self.engine.set_strategy(strategy);
        self.registry.reset();
        self.current_target = None;
    }

    pub fn strategy(&self) -> Strategy {
        self.engine.strategy()
    }

    pub fn gaze_target(&self) -> Option<PersonId> {
        self.current_target
    }

    pub fn tracked_people(&self) -> usize {
        self.registry.len()
    }

    pub fn arbiter(&self) -> &ActionArbiter {
        &self.arbiter
    }

    /// Serializable state snapshot for the API/CLI
    pub fn snapshot(&self) -> BehaviorUpdate {
        BehaviorUpdate {
            timestamp: Utc::now(),
            strategy: self.engine.strategy().name().to_string(),
            tracked_people: self.registry.len(),
            greeted: self
                .registry
                .people()
                .iter()
                .filter(|p| p.is_greeted)
                .count(),
            waving: self.gestures.is_waving(),
            action_locked: self.arbiter.is_locked(),
            beckon_fallback: self.engine.beckon_fallback(),
            active_action: self.arbiter.active_action(),
            gaze_target: self.current_target,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NullAnimationSink, NullLookAtSink, NullMessageSink};

    fn controller(config: ControllerConfig) -> BehaviorController {
        BehaviorController::new(
            config,
            Arc::new(NullAnimationSink),
            Arc::new(NullMessageSink),
            Arc::new(NullLookAtSink),
        )
    }

    #[test]
    fn test_frame_skip_cadence() {
        let mut c = controller(ControllerConfig {
            frame_skip: 3,
            ..ControllerConfig::default()
        });
        let decisions: Vec<bool> = (0..7).map(|_| c.begin_frame()).collect();
        // First frame always runs, then frames 3 and 6
        assert_eq!(
            decisions,
            vec![true, false, true, false, false, true, false]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_target_cleared_on_eviction() {
        let mut c = controller(ControllerConfig::default());
        let t0 = Instant::now();
        c.ingest_detections(&[DetectionBox::new(300.0, 200.0, 40.0, 40.0)], t0);
        assert!(c.gaze_target().is_some());

        c.ingest_detections(&[], t0 + Duration::from_millis(600));
        assert!(c.gaze_target().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_strategy_switch_clears_tracking() {
        let mut c = controller(ControllerConfig::default());
        let t0 = Instant::now();
        c.ingest_detections(&[DetectionBox::new(300.0, 200.0, 40.0, 40.0)], t0);
        assert_eq!(c.tracked_people(), 1);

        c.set_strategy(Strategy::Aggressive);
        assert_eq!(c.tracked_people(), 0);
        assert!(c.gaze_target().is_none());
        assert_eq!(c.strategy(), Strategy::Aggressive);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gaze_follows_only_tracked_target() {
        let mut c = controller(ControllerConfig::default());
        let t0 = Instant::now();
        // Nobody tracked: straight ahead
        let forward = c.update_gaze();

        c.ingest_detections(&[DetectionBox::new(80.0, 100.0, 40.0, 40.0)], t0);
        let steered = c.update_gaze();
        assert_ne!(forward, steered);
    }
}
