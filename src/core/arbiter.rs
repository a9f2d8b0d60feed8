//! Action arbiter: the single-foreground-action lock
//!
//! At most one non-idle reaction is visible at a time. A locked arbiter
//! drops further non-idle requests outright (no queue); the lock releases
//! itself after the action's duration and re-issues IDLE.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::types::{ActionId, AnimationSink, MessageCatalog, MessageSink};
use crate::MESSAGE_LEAD_OUT_MS;

#[derive(Debug, Default)]
struct LockState {
    locked: bool,
    active: Option<ActionId>,
    /// Bumped on every lock acquisition and explicit release; a scheduled
    /// release only fires if its generation is still current
    generation: u64,
}

struct Inner {
    lock: Mutex<LockState>,
    animation: Arc<dyn AnimationSink>,
    message: Arc<dyn MessageSink>,
    messages: MessageCatalog,
}

/// Plays actions through the animation sink under the foreground lock.
///
/// Cheap to clone; clones share the same lock. Scheduling the automatic
/// release uses `tokio::spawn`, so `play` must be called within a runtime.
#[derive(Clone)]
pub struct ActionArbiter {
    inner: Arc<Inner>,
}

impl ActionArbiter {
    pub fn new(
        animation: Arc<dyn AnimationSink>,
        message: Arc<dyn MessageSink>,
        messages: MessageCatalog,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                lock: Mutex::new(LockState::default()),
                animation,
                message,
                messages,
            }),
        }
    }

    /// Play an action for `duration`. Returns false when the request was
    /// dropped because a non-idle action holds the lock.
    ///
    /// Non-idle actions with a positive duration take the lock, show their
    /// paired message for `duration - 500ms`, and schedule the release.
    pub fn play(&self, action: ActionId, duration: Duration) -> bool {
        let generation = {
            let mut state = self.inner.lock.lock().unwrap();
            if state.locked && action != ActionId::Idle {
                return false;
            }
            if action != ActionId::Idle && !duration.is_zero() {
                state.locked = true;
                state.active = Some(action);
                state.generation += 1;
                Some(state.generation)
            } else {
                None
            }
        };

        self.inner.animation.play_action(action);
        self.show_message(action, duration);

        if let Some(generation) = generation {
            let arbiter = self.clone();
            tokio::spawn(async move {
                tokio::time::sleep(duration).await;
                arbiter.finish_release(generation);
            });
        }
        true
    }

    /// Explicitly clear the lock, invalidating any scheduled release. The
    /// active reaction keeps playing until the caller issues something else.
    pub fn release_now(&self) {
        let mut state = self.inner.lock.lock().unwrap();
        state.locked = false;
        state.active = None;
        state.generation += 1;
    }

    pub fn is_locked(&self) -> bool {
        self.inner.lock.lock().unwrap().locked
    }

    pub fn active_action(&self) -> Option<ActionId> {
        self.inner.lock.lock().unwrap().active
    }

    /// Scheduled release: clear the lock and return to idle. The idle
    /// re-issue hides the message on its way through `show_message`.
    /// Stale generations (lock already released or re-taken) are no-ops.
    fn finish_release(&self, generation: u64) {
        {
            let mut state = self.inner.lock.lock().unwrap();
            if state.generation != generation || !state.locked {
                return;
            }
            state.locked = false;
            state.active = None;
        }
        self.play(ActionId::Idle, Duration::ZERO);
    }

    fn show_message(&self, action: ActionId, duration: Duration) {
        let visible = duration.saturating_sub(Duration::from_millis(MESSAGE_LEAD_OUT_MS));
        match self.inner.messages.for_action(action) {
            Some(text) if !visible.is_zero() => self.inner.message.show(text, visible),
            _ => self.inner.message.hide(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct Recorder {
        played: StdMutex<Vec<ActionId>>,
        shown: StdMutex<Vec<(String, Duration)>>,
        hidden: StdMutex<usize>,
    }

    impl AnimationSink for Recorder {
        fn play_action(&self, action: ActionId) {
            self.played.lock().unwrap().push(action);
        }
        fn stop_action(&self, _action: ActionId) {}
    }

    impl MessageSink for Recorder {
        fn show(&self, text: &str, duration: Duration) {
            self.shown.lock().unwrap().push((text.to_string(), duration));
        }
        fn hide(&self) {
            *self.hidden.lock().unwrap() += 1;
        }
    }

    fn arbiter_with_recorder() -> (ActionArbiter, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let arbiter = ActionArbiter::new(
            recorder.clone(),
            recorder.clone(),
            MessageCatalog::default(),
        );
        (arbiter, recorder)
    }

    #[tokio::test(start_paused = true)]
    async fn test_locked_requests_are_dropped() {
        let (arbiter, recorder) = arbiter_with_recorder();

        assert!(arbiter.play(ActionId::Greet, Duration::from_millis(3000)));
        assert!(arbiter.is_locked());

        // Dropped: no sink calls, state untouched
        assert!(!arbiter.play(ActionId::Beckon, Duration::from_millis(2000)));
        assert_eq!(*recorder.played.lock().unwrap(), vec![ActionId::Greet]);
        assert_eq!(arbiter.active_action(), Some(ActionId::Greet));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_is_never_dropped() {
        let (arbiter, recorder) = arbiter_with_recorder();
        arbiter.play(ActionId::Greet, Duration::from_millis(3000));

        assert!(arbiter.play(ActionId::Idle, Duration::ZERO));
        assert_eq!(
            *recorder.played.lock().unwrap(),
            vec![ActionId::Greet, ActionId::Idle]
        );
        // Idle does not steal the lock
        assert!(arbiter.is_locked());
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_after_duration() {
        let (arbiter, recorder) = arbiter_with_recorder();
        arbiter.play(ActionId::Greet, Duration::from_millis(3000));

        tokio::time::sleep(Duration::from_millis(3001)).await;

        assert!(!arbiter.is_locked());
        assert_eq!(arbiter.active_action(), None);
        // Exactly one idle re-issue
        let played = recorder.played.lock().unwrap();
        assert_eq!(*played, vec![ActionId::Greet, ActionId::Idle]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_hides_message_exactly_once() {
        let (arbiter, recorder) = arbiter_with_recorder();
        arbiter.play(ActionId::Greet, Duration::from_millis(3000));
        assert_eq!(*recorder.hidden.lock().unwrap(), 0);

        tokio::time::sleep(Duration::from_millis(3001)).await;
        assert_eq!(*recorder.hidden.lock().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_message_shown_with_lead_out() {
        let (arbiter, recorder) = arbiter_with_recorder();
        arbiter.play(ActionId::Greet, Duration::from_millis(3000));

        let shown = recorder.shown.lock().unwrap();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].1, Duration::from_millis(2500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_duration_shows_no_message() {
        let (arbiter, recorder) = arbiter_with_recorder();
        arbiter.play(ActionId::Greet, Duration::ZERO);

        assert!(recorder.shown.lock().unwrap().is_empty());
        // Zero duration never takes the lock
        assert!(!arbiter.is_locked());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_release_is_harmless() {
        let (arbiter, recorder) = arbiter_with_recorder();
        arbiter.play(ActionId::Greet, Duration::from_millis(3000));
        arbiter.release_now();

        // A new reaction starts before the old release fires
        assert!(arbiter.play(ActionId::Beckon, Duration::from_millis(2000)));
        tokio::time::sleep(Duration::from_millis(1500)).await;

        // The greet release (t=3000 > 2000) must not clear the beckon lock
        // early; at t=1500 beckon still holds it
        assert!(arbiter.is_locked());
        assert_eq!(arbiter.active_action(), Some(ActionId::Beckon));

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(!arbiter.is_locked());
        let played = recorder.played.lock().unwrap();
        assert_eq!(
            *played,
            vec![ActionId::Greet, ActionId::Beckon, ActionId::Idle]
        );
    }
}
