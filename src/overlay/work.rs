//! Background work while the HUD is showing
//!
//! `run_while_showing` is the bridge between callers that do not know how
//! long their work will take and the grace/min-show timers: the HUD is
//! marked busy, shown, the work runs on a worker thread, and once it returns
//! the coordinating task clears the busy flag and hides the HUD.
//!
//! Worker code never touches the HUD directly; it gets a `ProgressReporter`
//! whose calls go through the HUD's lock like any other mutation.

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::hud::{Hud, WeakHud};

/// Where `run_while_showing` runs its work
#[derive(Debug, Clone, Default)]
pub enum WorkQueue {
    /// Tokio's blocking pool on the current runtime
    #[default]
    Blocking,
    /// Tokio's blocking pool on a specific runtime
    Runtime(Handle),
}

impl WorkQueue {
    fn handle(&self) -> Option<Handle> {
        match self {
            WorkQueue::Blocking => Handle::try_current().ok(),
            WorkQueue::Runtime(handle) => Some(handle.clone()),
        }
    }
}

/// Send-able handle for worker code to report progress
#[derive(Clone)]
pub struct ProgressReporter {
    hud: WeakHud,
}

impl ProgressReporter {
    /// Update determinate progress; no-op once the HUD is gone
    pub fn set_progress(&self, progress: f64) {
        if let Some(hud) = self.hud.upgrade() {
            hud.set_progress(progress);
        }
    }

    pub fn set_message(&self, message: impl Into<String>) {
        if let Some(hud) = self.hud.upgrade() {
            hud.set_message(message);
        }
    }

    pub fn hide(&self, animated: bool) {
        if let Some(hud) = self.hud.upgrade() {
            hud.hide(animated);
        }
    }

    /// False once every handle to the HUD was dropped
    pub fn is_alive(&self) -> bool {
        self.hud.upgrade().is_some()
    }
}

impl Hud {
    pub fn progress_reporter(&self) -> ProgressReporter {
        ProgressReporter {
            hud: self.downgrade(),
        }
    }

    /// Show while `work` runs on `queue`, then hide
    ///
    /// `on_complete` becomes the completion of this show/hide cycle. The
    /// returned handle resolves once the HUD has been told to hide; it is
    /// `None` when no runtime is available, in which case the work runs
    /// inline.
    pub fn run_while_showing<W, C>(
        &self,
        animated: bool,
        work: W,
        queue: &WorkQueue,
        on_complete: Option<C>,
    ) -> Option<JoinHandle<()>>
    where
        W: FnOnce(ProgressReporter) + Send + 'static,
        C: FnOnce() + Send + 'static,
    {
        if let Some(on_complete) = on_complete {
            self.set_completion(on_complete);
        }
        self.set_task_in_progress(true);
        self.show(animated);

        let reporter = self.progress_reporter();
        let Some(handle) = queue.handle() else {
            warn!(hud = %self.id(), "no tokio runtime, running work inline");
            work(reporter);
            self.cleanup();
            return None;
        };

        let hud = self.downgrade();
        let worker = handle.spawn_blocking(move || work(reporter));
        Some(handle.spawn(async move {
            if let Err(e) = worker.await {
                warn!("hud work failed: {}", e);
            }
            match hud.upgrade() {
                Some(hud) => {
                    debug!(hud = %hud.id(), "work finished");
                    hud.cleanup();
                }
                None => debug!("work finished after hud was dropped"),
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::geometry::Size;
    use crate::overlay::host::HostView;
    use crate::overlay::machine::HudPhase;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn hud() -> Hud {
        Hud::new(&HostView::new(Size::new(400.0, 300.0)))
    }

    #[tokio::test]
    async fn test_work_runs_then_hides() {
        let hud = hud();
        let done = Arc::new(AtomicUsize::new(0));
        let d = done.clone();
        let task = hud
            .run_while_showing(
                false,
                |reporter| reporter.set_progress(0.5),
                &WorkQueue::Blocking,
                Some(move || {
                    d.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();
        assert!(hud.task_in_progress());

        task.await.unwrap();
        assert_eq!(hud.phase(), HudPhase::Hidden);
        assert!(!hud.task_in_progress());
        assert_eq!(hud.progress(), 0.5);
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_panicking_work_still_hides() {
        let hud = hud();
        let task = hud
            .run_while_showing(
                false,
                |_| panic!("worker blew up"),
                &WorkQueue::Runtime(Handle::current()),
                None::<fn()>,
            )
            .unwrap();
        task.await.unwrap();
        assert_eq!(hud.phase(), HudPhase::Hidden);
    }

    #[test]
    fn test_without_runtime_runs_inline() {
        let hud = hud();
        let ran = Arc::new(AtomicUsize::new(0));
        let r = ran.clone();
        let task = hud.run_while_showing(
            false,
            move |_| {
                r.fetch_add(1, Ordering::SeqCst);
            },
            &WorkQueue::Blocking,
            None::<fn()>,
        );
        assert!(task.is_none());
        assert_eq!(ran.load(Ordering::SeqCst), 1);
        assert_eq!(hud.phase(), HudPhase::Hidden);
    }

    #[test]
    fn test_without_runtime_animated_cycle_completes() {
        let hud = hud();
        let done = Arc::new(AtomicUsize::new(0));
        let d = done.clone();
        let task = hud.run_while_showing(
            true,
            |reporter| reporter.set_progress(1.0),
            &WorkQueue::Blocking,
            Some(move || {
                d.fetch_add(1, Ordering::SeqCst);
            }),
        );
        assert!(task.is_none());
        assert_eq!(hud.phase(), HudPhase::Hidden);
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reporter_outliving_hud_is_harmless() {
        let hud = hud();
        let reporter = hud.progress_reporter();
        drop(hud);
        assert!(!reporter.is_alive());
        reporter.set_progress(0.3);
        reporter.hide(true);
    }
}
