//! Integration tests for the reaction lifecycle
//!
//! Tests the full path: detections → controller → arbiter → sinks,
//! including the timed lock release back to idle.

use maneki::core::{BehaviorController, ControllerConfig, Strategy};
use maneki::types::{
    ActionId, AnimationSink, DetectionBox, MessageCatalog, MessageSink, NullLookAtSink,
};
use maneki::{DWELL_TIME_THRESHOLD_MS, GREET_DURATION_MS};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Default)]
struct Recorder {
    played: Mutex<Vec<ActionId>>,
    shown: Mutex<Vec<String>>,
    hidden: Mutex<usize>,
}

impl AnimationSink for Recorder {
    fn play_action(&self, action: ActionId) {
        self.played.lock().unwrap().push(action);
    }
    fn stop_action(&self, _action: ActionId) {}
}

impl MessageSink for Recorder {
    fn show(&self, text: &str, _duration: Duration) {
        self.shown.lock().unwrap().push(text.to_string());
    }
    fn hide(&self) {
        *self.hidden.lock().unwrap() += 1;
    }
}

fn controller_with_recorder(strategy: Strategy) -> (BehaviorController, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let controller = BehaviorController::new(
        ControllerConfig {
            strategy,
            ..ControllerConfig::default()
        },
        recorder.clone(),
        recorder.clone(),
        Arc::new(NullLookAtSink),
    );
    (controller, recorder)
}

/// The full greet lifecycle: dwell, greet with message, timed release to idle
#[tokio::test(start_paused = true)]
async fn test_greet_lifecycle() {
    let (mut controller, recorder) = controller_with_recorder(Strategy::Selective);
    let t0 = Instant::now();
    let detection = DetectionBox::new(300.0, 200.0, 60.0, 90.0);

    controller.ingest_detections(&[detection], t0);
    assert!(recorder.played.lock().unwrap().is_empty());

    // Past the dwell threshold: greet plays and takes the lock
    let trigger = t0 + Duration::from_millis(DWELL_TIME_THRESHOLD_MS + 1);
    controller.ingest_detections(&[detection], trigger);

    assert_eq!(*recorder.played.lock().unwrap(), vec![ActionId::Greet]);
    assert!(controller.arbiter().is_locked());
    assert_eq!(
        *recorder.shown.lock().unwrap(),
        vec![MessageCatalog::default().greet]
    );

    // The release fires after the greet duration: unlock, hide, back to idle
    tokio::time::sleep(Duration::from_millis(GREET_DURATION_MS + 1)).await;

    assert!(!controller.arbiter().is_locked());
    assert_eq!(
        *recorder.played.lock().unwrap(),
        vec![ActionId::Greet, ActionId::Idle]
    );
    assert_eq!(*recorder.hidden.lock().unwrap(), 1);
}

/// A second trigger while the lock is held is dropped, not queued
#[tokio::test(start_paused = true)]
async fn test_concurrent_triggers_do_not_queue() {
    let (mut controller, recorder) = controller_with_recorder(Strategy::Hybrid);
    let t0 = Instant::now();

    // Dweller crosses the threshold and greets
    let center = DetectionBox::new(300.0, 200.0, 60.0, 90.0);
    controller.ingest_detections(&[center], t0);
    let trigger = t0 + Duration::from_millis(DWELL_TIME_THRESHOLD_MS + 1);
    controller.ingest_detections(&[center], trigger);
    assert_eq!(recorder.played.lock().unwrap().len(), 1);

    // An edge newcomer would beckon, but the greet still holds the lock
    let edge = DetectionBox::new(20.0, 200.0, 60.0, 90.0);
    let during = trigger + Duration::from_millis(100);
    controller.ingest_detections(&[center, edge], during);

    assert_eq!(*recorder.played.lock().unwrap(), vec![ActionId::Greet]);
    assert_eq!(controller.arbiter().active_action(), Some(ActionId::Greet));
}

/// A strategy switch leaves the in-flight reaction to complete on its own
#[tokio::test(start_paused = true)]
async fn test_switch_preserves_in_flight_action() {
    let (mut controller, recorder) = controller_with_recorder(Strategy::Selective);
    let t0 = Instant::now();
    let detection = DetectionBox::new(300.0, 200.0, 60.0, 90.0);

    controller.ingest_detections(&[detection], t0);
    let trigger = t0 + Duration::from_millis(DWELL_TIME_THRESHOLD_MS + 1);
    controller.ingest_detections(&[detection], trigger);
    assert!(controller.arbiter().is_locked());

    controller.set_strategy(Strategy::Aggressive);
    assert!(controller.arbiter().is_locked());
    assert_eq!(controller.tracked_people(), 0);

    // The scheduled release still lands
    tokio::time::sleep(Duration::from_millis(GREET_DURATION_MS + 1)).await;
    assert!(!controller.arbiter().is_locked());
    assert_eq!(
        *recorder.played.lock().unwrap(),
        vec![ActionId::Greet, ActionId::Idle]
    );
}
