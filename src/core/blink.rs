//! Procedural blink synthesis
//!
//! A cooperative loop that sleeps a Gaussian-sampled inter-blink interval,
//! then plays one blink cycle: an exponential eyelid close followed by a
//! quadratic reopen, stepped at a fixed 60 fps. The loop owns the `blink`
//! expression channel exclusively and always returns it to 0.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::Notify;

use crate::types::{ExpressionSink, FacialError};
use crate::{
    BLINK_BETA, BLINK_CLOSING_RATE, BLINK_DURATION_RANGE_S, BLINK_FPS, BLINK_INTERVAL_RANGE_S,
    BLINK_OPEN_A,
};

/// Expression channel written by the blink loop
pub const BLINK_CHANNEL: &str = "blink";

struct Shared {
    active: AtomicBool,
    notify: Notify,
    sink: Arc<dyn ExpressionSink>,
}

/// Autonomous blink loop against the expression sink.
///
/// Cheap to clone; clones share the same loop state. Requires a tokio
/// runtime: `start` spawns the loop task.
#[derive(Clone)]
pub struct BlinkSynthesizer {
    shared: Arc<Shared>,
}

impl BlinkSynthesizer {
    pub fn new(sink: Arc<dyn ExpressionSink>) -> Self {
        Self {
            shared: Arc::new(Shared {
                active: AtomicBool::new(false),
                notify: Notify::new(),
                sink,
            }),
        }
    }

    /// Begin blinking. A no-op while already active.
    pub fn start(&self) -> Result<(), FacialError> {
        if !self.shared.sink.available() {
            return Err(FacialError::SinkUnavailable);
        }
        if self.shared.active.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let shared = self.shared.clone();
        tokio::spawn(async move {
            blink_loop(shared).await;
        });
        Ok(())
    }

    /// Stop blinking. The eyelid channel is zeroed immediately; the loop
    /// observes the stop at its next suspension point.
    pub fn stop(&self) {
        self.shared.active.store(false, Ordering::SeqCst);
        self.shared.notify.notify_waiters();
        self.shared.sink.set_value(BLINK_CHANNEL, 0.0);
    }

    pub fn is_active(&self) -> bool {
        self.shared.active.load(Ordering::SeqCst)
    }
}

async fn blink_loop(shared: Arc<Shared>) {
    let frame_interval = Duration::from_secs_f64(1.0 / BLINK_FPS as f64);

    while shared.active.load(Ordering::SeqCst) {
        let (interval_s, duration_s) = {
            let mut rng = rand::rng();
            (
                gaussian_in_range(BLINK_INTERVAL_RANGE_S.0, BLINK_INTERVAL_RANGE_S.1, &mut rng),
                gaussian_in_range(BLINK_DURATION_RANGE_S.0, BLINK_DURATION_RANGE_S.1, &mut rng),
            )
        };

        if !wait(&shared, Duration::from_secs_f64(interval_s)).await {
            break;
        }

        let frame_count = (duration_s * BLINK_FPS as f64).round() as u32;
        for frame in 0..frame_count {
            if !shared.active.load(Ordering::SeqCst) {
                break;
            }
            let t = frame as f64 / frame_count as f64;
            let weight = blink_weight(t, BLINK_CLOSING_RATE, BLINK_BETA, BLINK_OPEN_A);
            shared.sink.set_value(BLINK_CHANNEL, weight as f32);
            if !wait(&shared, frame_interval).await {
                break;
            }
        }
        shared.sink.set_value(BLINK_CHANNEL, 0.0);
    }
    shared.sink.set_value(BLINK_CHANNEL, 0.0);
}

/// Cancellable sleep; false when stopped while (or before) waiting
async fn wait(shared: &Shared, duration: Duration) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(duration) => shared.active.load(Ordering::SeqCst),
        _ = shared.notify.notified() => false,
    }
}

/// Eyelid closure weight over normalized cycle time `t` in [0, 1).
///
/// Closing phase (t <= tc): exponential rise `(e^{βt} - 1) / (e^{βtc} - 1)`.
/// Opening phase: quadratic descent `-a(t - tc)(1 - t) + (1 - t)/(1 - tc)`,
/// reaching 0 at t = 1.
pub fn blink_weight(t: f64, tc: f64, beta: f64, a: f64) -> f64 {
    if t <= tc {
        ((beta * t).exp() - 1.0) / ((beta * tc).exp() - 1.0)
    } else {
        -a * (t - tc) * (1.0 - t) + (1.0 - t) / (1.0 - tc)
    }
}

/// Gaussian sample via Box-Muller, folded into [min, max].
///
/// The raw normal deviate is scaled by 1/4, shifted to 0.5, clamped to
/// [0, 1], then mapped linearly into the target range.
pub fn gaussian_in_range<R: Rng>(min: f64, max: f64, rng: &mut R) -> f64 {
    let mut u: f64 = 0.0;
    let mut v: f64 = 0.0;
    while u == 0.0 {
        u = rng.random();
    }
    while v == 0.0 {
        v = rng.random();
    }
    let num = (-2.0 * u.ln()).sqrt() * (2.0 * std::f64::consts::PI * v).cos();
    let unit = (num / 4.0 + 0.5).clamp(0.0, 1.0);
    min + (max - min) * unit
}

// =============================================================================
// TESTS
// =============================================================================
