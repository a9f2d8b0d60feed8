//! Procedural lip-sync synthesis
//!
//! A fixed-interval scheduler picks a random mouth shape every 150 ms and
//! crossfades the viseme expression channels toward it over 10 linear steps.
//! A "closed" pseudo-state fades everything to 0. At most one fade runs at a
//! time; scheduling a new one cancels whatever is in flight. The five viseme
//! channels are owned exclusively by this synthesizer.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::Rng;
use tokio::task::JoinHandle;

use crate::types::{ExpressionSink, FacialError};
use crate::{LIPSYNC_FADE_STEPS, LIPSYNC_INTERVAL_MS, LIPSYNC_WEIGHT};

/// The five mouth-shape expression channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viseme {
    Aa,
    Ih,
    Ou,
    Ee,
    Oh,
}

impl Viseme {
    pub const ALL: [Viseme; 5] = [Viseme::Aa, Viseme::Ih, Viseme::Ou, Viseme::Ee, Viseme::Oh];

    /// Expression channel name
    pub fn channel(&self) -> &'static str {
        match self {
            Viseme::Aa => "aa",
            Viseme::Ih => "ih",
            Viseme::Ou => "ou",
            Viseme::Ee => "ee",
            Viseme::Oh => "oh",
        }
    }

    fn index(&self) -> usize {
        Self::ALL.iter().position(|v| v == self).unwrap_or(0)
    }
}

#[derive(Default)]
struct State {
    running: bool,
    /// Viseme the last crossfade targeted, the "from" side of the next one
    prev: Option<Viseme>,
    /// Last weight written per viseme channel
    weights: [f32; 5],
    fade: Option<JoinHandle<()>>,
    scheduler: Option<JoinHandle<()>>,
}

struct Shared {
    state: Mutex<State>,
    sink: Arc<dyn ExpressionSink>,
}

/// Autonomous lip-sync scheduler against the expression sink.
///
/// Cheap to clone; clones share the same state. Requires a tokio runtime.
#[derive(Clone)]
pub struct LipSyncSynthesizer {
    shared: Arc<Shared>,
}

impl LipSyncSynthesizer {
    pub fn new(sink: Arc<dyn ExpressionSink>) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State::default()),
                sink,
            }),
        }
    }

    /// Begin the viseme scheduler.
    ///
    /// Fails with `SinkUnavailable` when the expression sink cannot accept
    /// weights and `AlreadyRunning` when already active; state is left
    /// unchanged in both cases.
    pub fn start(&self) -> Result<(), FacialError> {
        if !self.shared.sink.available() {
            return Err(FacialError::SinkUnavailable);
        }
        let mut state = self.shared.state.lock().unwrap();
        if state.running {
            return Err(FacialError::AlreadyRunning);
        }
        state.running = true;

        let shared = self.shared.clone();
        state.scheduler = Some(tokio::spawn(async move {
            scheduler_loop(shared).await;
        }));
        Ok(())
    }

    /// Stop the scheduler and fade every viseme channel to 0.
    ///
    /// Fails with `AlreadyStopped` when inactive. All owned channels are at
    /// 0 when this returns.
    pub async fn stop(&self) -> Result<(), FacialError> {
        {
            let mut state = self.shared.state.lock().unwrap();
            if !state.running {
                return Err(FacialError::AlreadyStopped);
            }
            state.running = false;
            state.prev = None;
            if let Some(handle) = state.scheduler.take() {
                handle.abort();
            }
            if let Some(handle) = state.fade.take() {
                handle.abort();
            }
        }
        fade_to_closed(&self.shared).await;
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.shared.state.lock().unwrap().running
    }

    /// Last weight written to a viseme channel
    pub fn weight(&self, viseme: Viseme) -> f32 {
        self.shared.state.lock().unwrap().weights[viseme.index()]
    }
}

async fn scheduler_loop(shared: Arc<Shared>) {
    let interval = Duration::from_millis(LIPSYNC_INTERVAL_MS);
    loop {
        tokio::time::sleep(interval).await;

        // Five visemes plus the closed pseudo-state, uniform
        let choice: usize = { rand::rng().random_range(0..=Viseme::ALL.len()) };

        let mut state = shared.state.lock().unwrap();
        if !state.running {
            break;
        }
        // A new fade always cancels the in-flight one
        if let Some(handle) = state.fade.take() {
            handle.abort();
        }

        if choice == Viseme::ALL.len() {
            state.prev = None;
            let shared = shared.clone();
            state.fade = Some(tokio::spawn(async move {
                fade_to_closed(&shared).await;
            }));
        } else {
            let next = Viseme::ALL[choice];
            let prev = state.prev;
            state.prev = Some(next);
            let shared = shared.clone();
            state.fade = Some(tokio::spawn(async move {
                crossfade(&shared, prev, next).await;
            }));
        }
    }
}

/// Linearly ramp the previous viseme down and the next one up to the target
/// weight, zeroing every other channel on the first step.
async fn crossfade(shared: &Arc<Shared>, prev: Option<Viseme>, next: Viseme) {
    let step_interval = fade_step_interval();
    let (prev_start, next_start) = {
        let state = shared.state.lock().unwrap();
        (
            prev.map(|p| state.weights[p.index()]).unwrap_or(0.0),
            state.weights[next.index()],
        )
    };

    for step in 1..=LIPSYNC_FADE_STEPS {
        tokio::time::sleep(step_interval).await;
        let (prev_value, next_value) =
            crossfade_step(step, LIPSYNC_FADE_STEPS, prev_start, next_start, LIPSYNC_WEIGHT);

        let mut state = shared.state.lock().unwrap();
        for viseme in Viseme::ALL {
            let value = if Some(viseme) == prev && viseme != next {
                prev_value
            } else if viseme == next {
                next_value
            } else {
                0.0
            };
            shared.sink.set_value(viseme.channel(), value);
            state.weights[viseme.index()] = value;
        }
    }
}

/// Linearly ramp every viseme channel from its current weight to 0
async fn fade_to_closed(shared: &Arc<Shared>) {
    let step_interval = fade_step_interval();
    let start = shared.state.lock().unwrap().weights;

    for step in 1..=LIPSYNC_FADE_STEPS {
        tokio::time::sleep(step_interval).await;
        let t = step as f32 / LIPSYNC_FADE_STEPS as f32;

        let mut state = shared.state.lock().unwrap();
        for viseme in Viseme::ALL {
            let value = start[viseme.index()] * (1.0 - t);
            shared.sink.set_value(viseme.channel(), value);
            state.weights[viseme.index()] = value;
        }
    }
}

/// Interpolated (previous, next) channel weights at a crossfade step
pub fn crossfade_step(
    step: u32,
    steps: u32,
    prev_start: f32,
    next_start: f32,
    target: f32,
) -> (f32, f32) {
    let t = step as f32 / steps as f32;
    (
        prev_start * (1.0 - t),
        next_start + (target - next_start) * t,
    )
}

/// Fades step at display cadence; ten steps span roughly one scheduler tick
fn fade_step_interval() -> Duration {
    Duration::from_secs_f64(1.0 / 60.0)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NullExpressionSink;

    #[test]
    fn test_crossfade_step_endpoints() {
        let (prev, next) = crossfade_step(10, 10, 0.6, 0.1, 0.6);
        assert!(prev.abs() < 1e-6);
        assert!((next - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_crossfade_step_midpoint() {
        let (prev, next) = crossfade_step(5, 10, 0.6, 0.0, 0.6);
        assert!((prev - 0.3).abs() < 1e-6);
        assert!((next - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_crossfade_resumes_from_current_weight() {
        // A cancelled fade left the next viseme at 0.2; the new fade ramps
        // from there, not from zero
        let (_, next) = crossfade_step(1, 10, 0.0, 0.2, 0.6);
        assert!((next - 0.24).abs() < 1e-6);
    }

    #[test]
    fn test_viseme_channels_are_distinct() {
        let mut channels: Vec<&str> = Viseme::ALL.iter().map(|v| v.channel()).collect();
        channels.sort();
        channels.dedup();
        assert_eq!(channels.len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_twice_fails() {
        let lipsync = LipSyncSynthesizer::new(Arc::new(NullExpressionSink));
        assert!(lipsync.start().is_ok());
        assert_eq!(lipsync.start(), Err(FacialError::AlreadyRunning));
        assert!(lipsync.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_when_inactive_fails() {
        let lipsync = LipSyncSynthesizer::new(Arc::new(NullExpressionSink));
        assert_eq!(lipsync.stop().await, Err(FacialError::AlreadyStopped));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_zeroes_all_visemes() {
        let lipsync = LipSyncSynthesizer::new(Arc::new(NullExpressionSink));
        lipsync.start().unwrap();

        // Let a few scheduler ticks and fades run
        tokio::time::sleep(Duration::from_millis(700)).await;

        lipsync.stop().await.unwrap();
        for viseme in Viseme::ALL {
            assert_eq!(lipsync.weight(viseme), 0.0);
        }
        assert!(!lipsync.is_running());
    }

    struct UnavailableSink;

    impl ExpressionSink for UnavailableSink {
        fn set_value(&self, _channel: &str, _weight: f32) {}
        fn available(&self) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn test_start_fails_without_sink() {
        let lipsync = LipSyncSynthesizer::new(Arc::new(UnavailableSink));
        assert_eq!(lipsync.start(), Err(FacialError::SinkUnavailable));
        assert!(!lipsync.is_running());
    }
}
