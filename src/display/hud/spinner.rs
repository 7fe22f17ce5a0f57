//! Fin-ring spinner for indeterminate progress
//!
//! `FinRing` is the pure per-tick opacity model; `SpinnerAnimator` drives it
//! from a 50ms periodic task. The animator exclusively owns the ring; the
//! ticker only holds a weak reference and a repaint callback, so dropping
//! the animator (or the HUD that owns it) always ends the task.
//!
//! Stop policy: `stop()` fades out (no new fin is lit, decay continues until
//! every fin reaches the floor, then the ticker ends itself). `Hud` calls it
//! when the fade-out begins. `halt()` stops immediately and is used once the
//! HUD is hidden and on teardown.

use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Number of fins in the default ring
pub const DEFAULT_FIN_COUNT: usize = 12;

/// Tick period (~20 frames per second, independent of host frame rate)
pub const TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Per-tick exponential decay of every fin
pub const FADE_MULTIPLIER: f64 = 0.85;

/// Fin alpha while idle when the spinner stays displayed
pub const ALPHA_WHEN_STOPPED: f64 = 0.15;

/// Fin alpha while idle for the fully transparent variant
pub const ALPHA_HIDDEN_WHEN_STOPPED: f64 = 0.0;

/// A fin counts as settled once within this distance of the floor
const SETTLE_EPSILON: f64 = 0.01;

/// Callback used to ask the host for a repaint
pub type RepaintFn = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpinPhase {
    Stopped,
    Running,
    FadingOut,
}

/// Result of advancing the ring by one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Keep ticking
    Continue,
    /// Fade-out complete, the ring is stopped
    Finished,
}

/// Per-fin opacity state of the spinner ring
#[derive(Debug, Clone)]
pub struct FinRing {
    opacities: Vec<f64>,
    lit: usize,
    floor: f64,
    multiplier: f64,
    phase: SpinPhase,
}

impl FinRing {
    pub fn new(fin_count: usize, floor: f64) -> Self {
        let count = fin_count.max(1);
        let floor = floor.clamp(0.0, 1.0);
        Self {
            opacities: vec![floor; count],
            lit: 0,
            floor,
            multiplier: FADE_MULTIPLIER,
            phase: SpinPhase::Stopped,
        }
    }

    pub fn fin_count(&self) -> usize {
        self.opacities.len()
    }

    pub fn lit_index(&self) -> usize {
        self.lit
    }

    pub fn floor(&self) -> f64 {
        self.floor
    }

    /// Running or fading out
    pub fn is_animating(&self) -> bool {
        self.phase != SpinPhase::Stopped
    }

    pub fn is_fading_out(&self) -> bool {
        self.phase == SpinPhase::FadingOut
    }

    /// Opacity to draw fin `i` with
    pub fn opacity(&self, i: usize) -> f64 {
        match self.phase {
            SpinPhase::Stopped => self.floor,
            _ => self.opacities.get(i).copied().unwrap_or(self.floor),
        }
    }

    /// Opacities of all fins, in index order
    pub fn opacities(&self) -> Vec<f64> {
        (0..self.fin_count()).map(|i| self.opacity(i)).collect()
    }

    /// Reset to the first fin and start running
    pub fn start(&mut self) {
        self.opacities.iter_mut().for_each(|a| *a = self.floor);
        self.lit = 0;
        self.opacities[0] = 1.0;
        self.phase = SpinPhase::Running;
    }

    /// Stop lighting new fins; existing ones keep decaying
    pub fn stop(&mut self) {
        if self.phase == SpinPhase::Running {
            self.phase = SpinPhase::FadingOut;
        }
    }

    /// Stop immediately with every fin at the floor
    pub fn halt(&mut self) {
        self.opacities.iter_mut().for_each(|a| *a = self.floor);
        self.phase = SpinPhase::Stopped;
    }

    /// Advance one frame
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase == SpinPhase::Stopped {
            return TickOutcome::Finished;
        }

        for a in self.opacities.iter_mut() {
            *a = (*a * self.multiplier).max(self.floor);
        }

        if self.phase == SpinPhase::FadingOut {
            let settled = self
                .opacities
                .iter()
                .all(|a| (a - self.floor).abs() <= SETTLE_EPSILON);
            if settled {
                self.halt();
                return TickOutcome::Finished;
            }
        } else {
            self.lit = (self.lit + 1) % self.opacities.len();
            self.opacities[self.lit] = 1.0;
        }
        TickOutcome::Continue
    }
}

fn lock_ring(ring: &Mutex<FinRing>) -> std::sync::MutexGuard<'_, FinRing> {
    ring.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drives a `FinRing` from a periodic Tokio task
pub struct SpinnerAnimator {
    ring: Arc<Mutex<FinRing>>,
    ticker: Option<CancellationToken>,
    repaint: RepaintFn,
}

impl SpinnerAnimator {
    pub fn new(fin_count: usize, floor: f64, repaint: RepaintFn) -> Self {
        Self {
            ring: Arc::new(Mutex::new(FinRing::new(fin_count, floor))),
            ticker: None,
            repaint,
        }
    }

    /// Copy of the current ring state, for drawing
    pub fn snapshot(&self) -> FinRing {
        lock_ring(&self.ring).clone()
    }

    pub fn is_animating(&self) -> bool {
        lock_ring(&self.ring).is_animating()
    }

    /// Start (or restart) the animation from the first fin
    pub fn start(&mut self) {
        {
            let mut ring = lock_ring(&self.ring);
            if ring.is_animating() && !ring.is_fading_out() && self.ticker.is_some() {
                return;
            }
            ring.start();
        }
        self.cancel_ticker();

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("no tokio runtime, spinner stays on its first frame");
            return;
        };

        let token = CancellationToken::new();
        let ring = Arc::downgrade(&self.ring);
        let repaint = self.repaint.clone();
        runtime.spawn(run_ticker(ring, token.clone(), repaint));
        self.ticker = Some(token);
        debug!("spinner started");
        (self.repaint)();
    }

    /// Fade out; the ticker ends on its own once the ring settles
    pub fn stop(&mut self) {
        lock_ring(&self.ring).stop();
        debug!("spinner fading out");
    }

    /// Stop immediately and cancel the ticker
    pub fn halt(&mut self) {
        self.cancel_ticker();
        lock_ring(&self.ring).halt();
        (self.repaint)();
    }

    fn cancel_ticker(&mut self) {
        if let Some(token) = self.ticker.take() {
            token.cancel();
        }
    }
}

impl Drop for SpinnerAnimator {
    fn drop(&mut self) {
        self.cancel_ticker();
    }
}

async fn run_ticker(ring: Weak<Mutex<FinRing>>, cancel: CancellationToken, repaint: RepaintFn) {
    let start = tokio::time::Instant::now() + TICK_INTERVAL;
    let mut interval = tokio::time::interval_at(start, TICK_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        let Some(ring) = ring.upgrade() else {
            break;
        };
        let outcome = lock_ring(&ring).tick();
        repaint();
        if outcome == TickOutcome::Finished {
            debug!("spinner settled");
            break;
        }
    }
}
