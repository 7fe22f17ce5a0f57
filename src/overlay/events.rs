//! HUD lifecycle events and delegate callbacks.
//!
//! Events go out on a `tokio::sync::broadcast` channel so any number of
//! observers (logging, tests, host glue) can follow a HUD. The delegate is
//! the direct-callback alternative: three independent optional slots.

use std::fmt;
use std::sync::Arc;

use tokio::sync::broadcast;

use super::hud::{Hud, HudId};

/// What happened to a HUD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HudEventKind {
    /// Became visible.
    Shown,
    /// Grace period ended after the task finished; nothing was shown.
    Suppressed,
    /// Hide finished; the completion has fired.
    Hidden,
    /// A delayed hide fired.
    HiddenAfterDelay,
    /// Dismissed by a tap.
    Tapped,
}

/// Lifecycle event for subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HudEvent {
    pub hud: HudId,
    pub kind: HudEventKind,
}

/// Broadcast sender for HUD events.
///
/// Sending to zero receivers silently succeeds.
#[derive(Clone)]
pub struct HudEventSender {
    tx: broadcast::Sender<HudEvent>,
}

impl HudEventSender {
    /// Create a new event sender with the specified buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Send an event to all subscribers.
    pub fn send(&self, event: HudEvent) {
        let _ = self.tx.send(event);
    }

    /// Create a new subscriber to receive events.
    pub fn subscribe(&self) -> HudEventReceiver {
        HudEventReceiver {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for HudEventSender {
    fn default() -> Self {
        Self::new(16)
    }
}

/// Receiver for HUD events.
///
/// A receiver that falls behind skips the missed events instead of
/// blocking the sender.
pub struct HudEventReceiver {
    rx: broadcast::Receiver<HudEvent>,
}

impl HudEventReceiver {
    /// Receive the next event, waiting asynchronously.
    ///
    /// Returns `None` once the HUD is gone.
    pub async fn recv(&mut self) -> Option<HudEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Try to receive an event without waiting.
    pub fn try_recv(&mut self) -> Option<HudEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }

    /// Drain every event currently queued.
    pub fn drain(&mut self) -> Vec<HudEvent> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}

/// Callback invoked with the HUD that triggered it.
pub type HudCallback = Arc<dyn Fn(&Hud) + Send + Sync>;

/// Optional per-event callbacks.
///
/// Callbacks run after the HUD's internal lock is released, so they may
/// call back into the HUD.
#[derive(Clone, Default)]
pub struct HudDelegate {
    pub was_hidden: Option<HudCallback>,
    pub was_hidden_after_delay: Option<HudCallback>,
    pub was_tapped: Option<HudCallback>,
}

impl HudDelegate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_hidden(mut self, f: impl Fn(&Hud) + Send + Sync + 'static) -> Self {
        self.was_hidden = Some(Arc::new(f));
        self
    }

    pub fn on_hidden_after_delay(mut self, f: impl Fn(&Hud) + Send + Sync + 'static) -> Self {
        self.was_hidden_after_delay = Some(Arc::new(f));
        self
    }

    pub fn on_tapped(mut self, f: impl Fn(&Hud) + Send + Sync + 'static) -> Self {
        self.was_tapped = Some(Arc::new(f));
        self
    }

    /// Slot for an event kind, if that event has one
    pub fn callback(&self, kind: HudEventKind) -> Option<HudCallback> {
        match kind {
            HudEventKind::Hidden => self.was_hidden.clone(),
            HudEventKind::HiddenAfterDelay => self.was_hidden_after_delay.clone(),
            HudEventKind::Tapped => self.was_tapped.clone(),
            HudEventKind::Shown | HudEventKind::Suppressed => None,
        }
    }
}

impl fmt::Debug for HudDelegate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HudDelegate")
            .field("was_hidden", &self.was_hidden.is_some())
            .field("was_hidden_after_delay", &self.was_hidden_after_delay.is_some())
            .field("was_tapped", &self.was_tapped.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn event(kind: HudEventKind) -> HudEvent {
        HudEvent {
            hud: HudId(Uuid::nil()),
            kind,
        }
    }

    #[tokio::test]
    async fn test_send_and_receive() {
        let tx = HudEventSender::default();
        let mut rx = tx.subscribe();
        tx.send(event(HudEventKind::Shown));
        assert_eq!(rx.recv().await.map(|e| e.kind), Some(HudEventKind::Shown));
    }

    #[test]
    fn test_send_without_receivers_is_fine() {
        HudEventSender::default().send(event(HudEventKind::Hidden));
    }

    #[test]
    fn test_lagged_receiver_skips_ahead() {
        let tx = HudEventSender::new(2);
        let mut rx = tx.subscribe();
        for _ in 0..5 {
            tx.send(event(HudEventKind::Shown));
        }
        tx.send(event(HudEventKind::Hidden));
        let kinds: Vec<_> = rx.drain().into_iter().map(|e| e.kind).collect();
        assert_eq!(kinds.last(), Some(&HudEventKind::Hidden));
        assert!(kinds.len() <= 2);
    }

    #[test]
    fn test_delegate_slots_are_independent() {
        let delegate = HudDelegate::new().on_tapped(|_| {});
        assert!(delegate.callback(HudEventKind::Tapped).is_some());
        assert!(delegate.callback(HudEventKind::Hidden).is_none());
        assert!(delegate.callback(HudEventKind::Shown).is_none());
    }
}
