//! One-shot timer slots
//!
//! Each `TimerKind` has at most one outstanding timer. Scheduling a slot
//! cancels the previous timer in it; every timer carries a generation number
//! so a firing that raced with a cancel is recognised as stale.

use std::collections::HashMap;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::machine::TimerKind;

struct Slot {
    generation: u64,
    token: CancellationToken,
}

/// Outstanding timers of one HUD
#[derive(Default)]
pub struct TimerSlots {
    slots: HashMap<TimerKind, Slot>,
    next_generation: u64,
}

impl TimerSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `on_fire(generation)` after `after`, replacing any timer in the slot
    ///
    /// `on_fire` should check `take_if_current` before acting. Returns false
    /// when there is no runtime to run the timer on.
    pub fn schedule<F>(&mut self, kind: TimerKind, after: Duration, on_fire: F) -> bool
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.cancel(kind);

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(?kind, "no tokio runtime, timer not scheduled");
            return false;
        };

        self.next_generation += 1;
        let generation = self.next_generation;
        let token = CancellationToken::new();
        let cancelled = token.clone();
        runtime.spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(after) => on_fire(generation),
            }
        });
        self.slots.insert(kind, Slot { generation, token });
        true
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        if let Some(slot) = self.slots.remove(&kind) {
            slot.token.cancel();
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, slot) in self.slots.drain() {
            slot.token.cancel();
        }
    }

    /// Claim a firing: true (and the slot is cleared) only for the live timer
    pub fn take_if_current(&mut self, kind: TimerKind, generation: u64) -> bool {
        match self.slots.get(&kind) {
            Some(slot) if slot.generation == generation => {
                self.slots.remove(&kind);
                true
            }
            _ => false,
        }
    }
}

impl Drop for TimerSlots {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    type Fired = Arc<Mutex<Vec<u64>>>;

    fn recorder(fired: &Fired) -> impl FnOnce(u64) + Send + 'static {
        let fired = fired.clone();
        move |generation| fired.lock().unwrap().push(generation)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay() {
        let fired = Fired::default();
        let mut timers = TimerSlots::new();
        timers.schedule(TimerKind::Grace, Duration::from_millis(500), recorder(&fired));

        tokio::time::sleep(Duration::from_millis(499)).await;
        assert!(fired.lock().unwrap().is_empty());
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(*fired.lock().unwrap(), vec![1]);
        assert!(timers.take_if_current(TimerKind::Grace, 1));
        assert!(!timers.take_if_current(TimerKind::Grace, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_replaces_previous() {
        let fired = Fired::default();
        let mut timers = TimerSlots::new();
        timers.schedule(TimerKind::DelayedHide, Duration::from_secs(1), recorder(&fired));
        timers.schedule(TimerKind::DelayedHide, Duration::from_secs(2), recorder(&fired));

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(*fired.lock().unwrap(), vec![2]);
        assert!(!timers.take_if_current(TimerKind::DelayedHide, 1));
        assert!(timers.take_if_current(TimerKind::DelayedHide, 2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_and_drop_stop_timers() {
        let fired = Fired::default();
        let mut timers = TimerSlots::new();
        timers.schedule(TimerKind::MinShow, Duration::from_secs(1), recorder(&fired));
        timers.cancel(TimerKind::MinShow);
        timers.schedule(TimerKind::FadeOut, Duration::from_secs(1), recorder(&fired));
        drop(timers);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(fired.lock().unwrap().is_empty());
    }

    #[test]
    fn test_without_runtime_schedule_reports_failure() {
        let mut timers = TimerSlots::new();
        assert!(!timers.schedule(TimerKind::Grace, Duration::from_secs(1), |_| {}));
        assert!(!timers.take_if_current(TimerKind::Grace, 0));
    }
}
