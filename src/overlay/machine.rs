//! Show/hide state machine
//!
//! Pure: every operation takes the current time and returns the effects the
//! owner must apply (timers to schedule or cancel, notifications to send).
//! Nothing here spawns tasks or calls back into caller code.
//!
//! ```text
//! Hidden ──show──▶ PendingGrace ──grace fired, task running──▶ Visible
//!    │                  │                                        │
//!    └──show (no grace)─┼────────────────────────────────────────┘
//!                       └──grace fired, task done──▶ Hidden (awaiting hide)
//! Visible ──hide before min-show──▶ PendingMinShow ──timer──▶ Hiding
//! Visible ──hide──▶ Hiding ──fade-out timer──▶ Hidden (finished)
//! ```

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::debug;

use crate::config::AnimationType;

/// Length of the show and hide transitions
pub const FADE_DURATION: Duration = Duration::from_millis(200);

/// Lifecycle phase of a HUD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HudPhase {
    /// Not shown (initial and terminal state of a cycle)
    #[default]
    Hidden,
    /// Waiting for the grace period before appearing
    PendingGrace,
    Visible,
    /// Hide requested before the minimum show time elapsed
    PendingMinShow,
    /// Fade-out in flight
    Hiding,
}

impl HudPhase {
    /// True while anything is drawn
    pub fn is_on_screen(&self) -> bool {
        matches!(
            self,
            HudPhase::Visible | HudPhase::PendingMinShow | HudPhase::Hiding
        )
    }
}

/// One-shot timers owned by a HUD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    Grace,
    MinShow,
    DelayedHide,
    FadeOut,
}

impl TimerKind {
    pub const ALL: [TimerKind; 4] = [
        TimerKind::Grace,
        TimerKind::MinShow,
        TimerKind::DelayedHide,
        TimerKind::FadeOut,
    ];
}

/// Work the owner performs after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Schedule { timer: TimerKind, after: Duration },
    Cancel(TimerKind),
    /// Became visible; start indicator animation
    Shown,
    /// Grace period ended after the task finished; nothing was shown
    Suppressed,
    /// Cycle complete: detach, fire the completion, notify "hidden"
    Finished,
    /// A delayed hide fired
    HiddenAfterDelay,
    /// Dismissed by a tap
    Tapped,
    /// The tap belongs to whatever is behind the HUD
    PassThrough,
}

/// Timing knobs read on every transition
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Timing {
    pub grace_time: Duration,
    pub min_show_time: Duration,
    pub animation: AnimationType,
}

#[derive(Debug, Clone, Copy)]
struct Fade {
    from: f64,
    to: f64,
    start: Instant,
}

impl Fade {
    fn value(&self, now: Instant) -> f64 {
        let t = now.saturating_duration_since(self.start).as_secs_f64()
            / FADE_DURATION.as_secs_f64();
        self.from + (self.to - self.from) * t.clamp(0.0, 1.0)
    }
}

/// Show/hide lifecycle of one HUD
#[derive(Debug, Clone, Default)]
pub struct OverlayStateMachine {
    phase: HudPhase,
    timing: Timing,
    task_in_progress: bool,
    show_started: Option<Instant>,
    animated: bool,
    delayed_hide_animated: bool,
    /// Grace fired without a running task; a later hide still closes the cycle
    awaiting_hide: bool,
    opacity: f64,
    fade: Option<Fade>,
}

impl OverlayStateMachine {
    pub fn new(timing: Timing) -> Self {
        Self {
            timing,
            ..Default::default()
        }
    }

    pub fn phase(&self) -> HudPhase {
        self.phase
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    pub fn set_timing(&mut self, timing: Timing) {
        self.timing = timing;
    }

    pub fn task_in_progress(&self) -> bool {
        self.task_in_progress
    }

    pub fn set_task_in_progress(&mut self, in_progress: bool) {
        self.task_in_progress = in_progress;
    }

    pub fn show_started(&self) -> Option<Instant> {
        self.show_started
    }

    /// Transition opacity at `now`
    pub fn opacity(&self, now: Instant) -> f64 {
        match &self.fade {
            Some(fade) => fade.value(now),
            None => self.opacity,
        }
    }

    /// Panel scale at `now` for the configured animation
    pub fn scale(&self, now: Instant) -> f64 {
        self.timing.animation.scale_at(self.opacity(now))
    }

    /// True while an opacity transition is still running
    pub fn is_transitioning(&self, now: Instant) -> bool {
        self.fade
            .map(|f| now.saturating_duration_since(f.start) < FADE_DURATION)
            .unwrap_or(false)
    }

    /// Request the HUD to appear
    pub fn show(&mut self, animated: bool, now: Instant) -> Vec<Effect> {
        let mut effects = vec![Effect::Cancel(TimerKind::DelayedHide)];
        match self.phase {
            HudPhase::Visible | HudPhase::PendingGrace => {}
            HudPhase::PendingMinShow => {
                effects.push(Effect::Cancel(TimerKind::MinShow));
                self.phase = HudPhase::Visible;
            }
            HudPhase::Hiding => {
                debug!("show during fade-out, fading back in");
                effects.push(Effect::Cancel(TimerKind::FadeOut));
                self.reveal(animated, now, &mut effects);
            }
            HudPhase::Hidden => {
                self.animated = animated;
                self.awaiting_hide = false;
                if self.timing.grace_time > Duration::ZERO {
                    self.phase = HudPhase::PendingGrace;
                    effects.push(Effect::Schedule {
                        timer: TimerKind::Grace,
                        after: self.timing.grace_time,
                    });
                } else {
                    self.reveal(animated, now, &mut effects);
                }
            }
        }
        effects
    }

    /// Request the HUD to disappear
    pub fn hide(&mut self, animated: bool, now: Instant) -> Vec<Effect> {
        let mut effects = vec![Effect::Cancel(TimerKind::DelayedHide)];
        match self.phase {
            HudPhase::Hidden => {
                if self.awaiting_hide {
                    self.finish(&mut effects);
                }
            }
            HudPhase::Hiding => {
                if !animated {
                    effects.push(Effect::Cancel(TimerKind::FadeOut));
                    self.finish(&mut effects);
                }
            }
            HudPhase::PendingMinShow => {
                self.animated = animated;
            }
            HudPhase::PendingGrace => {
                effects.push(Effect::Cancel(TimerKind::Grace));
                self.finish(&mut effects);
            }
            HudPhase::Visible => {
                self.animated = animated;
                let elapsed = self
                    .show_started
                    .map(|t| now.saturating_duration_since(t))
                    .unwrap_or(Duration::MAX);
                if elapsed < self.timing.min_show_time {
                    self.phase = HudPhase::PendingMinShow;
                    effects.push(Effect::Schedule {
                        timer: TimerKind::MinShow,
                        after: self.timing.min_show_time - elapsed,
                    });
                } else {
                    self.begin_hide(now, &mut effects);
                }
            }
        }
        effects
    }

    /// Hide after `delay`; replaces any earlier delayed hide
    pub fn hide_after(&mut self, animated: bool, delay: Duration) -> Vec<Effect> {
        self.delayed_hide_animated = animated;
        vec![Effect::Schedule {
            timer: TimerKind::DelayedHide,
            after: delay,
        }]
    }

    /// A scheduled timer fired
    pub fn on_timer(&mut self, timer: TimerKind, now: Instant) -> Vec<Effect> {
        debug!(?timer, phase = ?self.phase, "timer fired");
        let mut effects = Vec::new();
        match timer {
            TimerKind::Grace => {
                if self.phase != HudPhase::PendingGrace {
                    return effects;
                }
                if self.task_in_progress {
                    self.reveal(self.animated, now, &mut effects);
                } else {
                    self.phase = HudPhase::Hidden;
                    self.awaiting_hide = true;
                    effects.push(Effect::Suppressed);
                }
            }
            TimerKind::MinShow => {
                if self.phase == HudPhase::PendingMinShow {
                    self.phase = HudPhase::Visible;
                    self.begin_hide(now, &mut effects);
                }
            }
            TimerKind::DelayedHide => {
                effects.push(Effect::HiddenAfterDelay);
                effects.extend(self.hide(self.delayed_hide_animated, now));
            }
            TimerKind::FadeOut => {
                if self.phase == HudPhase::Hiding {
                    self.finish(&mut effects);
                }
            }
        }
        effects
    }

    /// A tap landed on the overlay
    ///
    /// `on_panel` is true when the tap hit the panel itself. With no mask,
    /// taps outside the panel pass through to the host.
    pub fn tap(
        &mut self,
        on_panel: bool,
        passes_touches: bool,
        dismissible: bool,
        now: Instant,
    ) -> Vec<Effect> {
        let interactive = matches!(self.phase, HudPhase::Visible | HudPhase::PendingMinShow);
        if !interactive || (!on_panel && passes_touches) {
            return vec![Effect::PassThrough];
        }
        if !dismissible {
            return Vec::new();
        }
        let mut effects = vec![Effect::Tapped];
        effects.extend(self.cleanup(now));
        effects
    }

    /// The owning task finished: clear the flag and hide
    pub fn cleanup(&mut self, now: Instant) -> Vec<Effect> {
        self.task_in_progress = false;
        let animated = self.animated;
        self.hide(animated, now)
    }

    /// Drop back to a fresh hidden state, cancelling every timer
    pub fn reset(&mut self) -> Vec<Effect> {
        *self = Self::new(self.timing);
        TimerKind::ALL.iter().copied().map(Effect::Cancel).collect()
    }

    fn reveal(&mut self, animated: bool, now: Instant, effects: &mut Vec<Effect>) {
        let from = self.opacity(now);
        self.phase = HudPhase::Visible;
        self.show_started = Some(now);
        self.animated = animated;
        if animated && from < 1.0 {
            self.fade = Some(Fade { from, to: 1.0, start: now });
        } else {
            self.fade = None;
        }
        self.opacity = 1.0;
        effects.push(Effect::Shown);
    }

    fn begin_hide(&mut self, now: Instant, effects: &mut Vec<Effect>) {
        if !self.animated {
            self.finish(effects);
            return;
        }
        let from = self.opacity(now);
        self.phase = HudPhase::Hiding;
        self.fade = Some(Fade { from, to: 0.0, start: now });
        self.opacity = 0.0;
        effects.push(Effect::Schedule {
            timer: TimerKind::FadeOut,
            after: FADE_DURATION,
        });
    }

    fn finish(&mut self, effects: &mut Vec<Effect>) {
        self.phase = HudPhase::Hidden;
        self.show_started = None;
        self.awaiting_hide = false;
        self.fade = None;
        self.opacity = 0.0;
        effects.push(Effect::Finished);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine(grace_ms: u64, min_show_ms: u64) -> OverlayStateMachine {
        OverlayStateMachine::new(Timing {
            grace_time: Duration::from_millis(grace_ms),
            min_show_time: Duration::from_millis(min_show_ms),
            animation: AnimationType::Fade,
        })
    }

    fn finished(effects: &[Effect]) -> usize {
        effects.iter().filter(|e| **e == Effect::Finished).count()
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_show_without_grace_is_immediate() {
        let now = Instant::now();
        let mut m = machine(0, 0);
        let effects = m.show(false, now);
        assert!(effects.contains(&Effect::Shown));
        assert_eq!(m.phase(), HudPhase::Visible);
        assert_eq!(m.opacity(now), 1.0);
    }

    #[test]
    fn test_animated_show_fades_in() {
        let now = Instant::now();
        let mut m = machine(0, 0);
        m.show(true, now);
        assert_eq!(m.opacity(now), 0.0);
        assert!((m.opacity(now + ms(100)) - 0.5).abs() < 1e-9);
        assert_eq!(m.opacity(now + FADE_DURATION), 1.0);
        assert!(!m.is_transitioning(now + FADE_DURATION));
    }

    #[test]
    fn test_double_show_is_noop() {
        let now = Instant::now();
        let mut m = machine(0, 0);
        m.show(false, now);
        let effects = m.show(false, now);
        assert_eq!(effects, vec![Effect::Cancel(TimerKind::DelayedHide)]);
    }

    #[test]
    fn test_hide_while_hidden_does_not_finish() {
        let now = Instant::now();
        let mut m = machine(0, 0);
        assert_eq!(finished(&m.hide(false, now)), 0);

        m.show(false, now);
        assert_eq!(finished(&m.hide(false, now)), 1);
        assert_eq!(finished(&m.hide(false, now)), 0);
        assert_eq!(finished(&m.hide(true, now)), 0);
    }

    #[test]
    fn test_grace_schedules_and_reveals_when_task_running() {
        let now = Instant::now();
        let mut m = machine(500, 0);
        m.set_task_in_progress(true);
        let effects = m.show(true, now);
        assert!(effects.contains(&Effect::Schedule {
            timer: TimerKind::Grace,
            after: ms(500)
        }));
        assert_eq!(m.phase(), HudPhase::PendingGrace);

        let effects = m.on_timer(TimerKind::Grace, now + ms(500));
        assert!(effects.contains(&Effect::Shown));
        assert_eq!(m.phase(), HudPhase::Visible);
    }

    #[test]
    fn test_grace_suppresses_finished_task() {
        let now = Instant::now();
        let mut m = machine(500, 0);
        m.show(true, now);
        let effects = m.on_timer(TimerKind::Grace, now + ms(500));
        assert_eq!(effects, vec![Effect::Suppressed]);
        assert_eq!(m.phase(), HudPhase::Hidden);

        // the open cycle still closes exactly once
        assert_eq!(finished(&m.hide(true, now + ms(600))), 1);
        assert_eq!(finished(&m.hide(true, now + ms(700))), 0);
    }

    #[test]
    fn test_hide_during_grace_prevents_showing() {
        let now = Instant::now();
        let mut m = machine(500, 0);
        m.set_task_in_progress(true);
        m.show(true, now);
        let effects = m.cleanup(now + ms(100));
        assert!(effects.contains(&Effect::Cancel(TimerKind::Grace)));
        assert_eq!(finished(&effects), 1);

        // a stale grace firing is ignored
        assert!(m.on_timer(TimerKind::Grace, now + ms(500)).is_empty());
        assert_eq!(m.phase(), HudPhase::Hidden);
    }

    #[test]
    fn test_min_show_defers_hide() {
        let now = Instant::now();
        let mut m = machine(0, 1000);
        m.show(false, now);
        let effects = m.hide(false, now + ms(300));
        assert!(effects.contains(&Effect::Schedule {
            timer: TimerKind::MinShow,
            after: ms(700)
        }));
        assert_eq!(m.phase(), HudPhase::PendingMinShow);

        let effects = m.on_timer(TimerKind::MinShow, now + ms(1000));
        assert_eq!(finished(&effects), 1);
        assert_eq!(m.phase(), HudPhase::Hidden);
    }

    #[test]
    fn test_min_show_elapsed_hides_immediately() {
        let now = Instant::now();
        let mut m = machine(0, 1000);
        m.show(false, now);
        assert_eq!(finished(&m.hide(false, now + ms(1500))), 1);
    }

    #[test]
    fn test_show_during_min_show_keeps_visible() {
        let now = Instant::now();
        let mut m = machine(0, 1000);
        m.show(false, now);
        m.hide(false, now + ms(100));
        let effects = m.show(false, now + ms(200));
        assert!(effects.contains(&Effect::Cancel(TimerKind::MinShow)));
        assert_eq!(m.phase(), HudPhase::Visible);
    }

    #[test]
    fn test_animated_hide_waits_for_fade() {
        let now = Instant::now();
        let mut m = machine(0, 0);
        m.show(true, now);
        let effects = m.hide(true, now);
        assert_eq!(finished(&effects), 0);
        assert!(effects.contains(&Effect::Schedule {
            timer: TimerKind::FadeOut,
            after: FADE_DURATION
        }));
        assert_eq!(m.phase(), HudPhase::Hiding);

        let effects = m.on_timer(TimerKind::FadeOut, now + FADE_DURATION);
        assert_eq!(finished(&effects), 1);
        assert_eq!(m.opacity(now + FADE_DURATION), 0.0);
    }

    #[test]
    fn test_show_during_fade_out_fades_back_in() {
        let now = Instant::now();
        let mut m = machine(0, 0);
        m.show(false, now);
        m.hide(true, now);
        let mid = now + ms(100);
        let halfway = m.opacity(mid);

        let effects = m.show(true, mid);
        assert!(effects.contains(&Effect::Cancel(TimerKind::FadeOut)));
        assert_eq!(finished(&effects), 0);
        assert_eq!(m.phase(), HudPhase::Visible);
        assert!((m.opacity(mid) - halfway).abs() < 1e-9);

        // a fade-out timer that slipped through is ignored
        assert!(m.on_timer(TimerKind::FadeOut, mid + ms(100)).is_empty());
    }

    #[test]
    fn test_unanimated_hide_cuts_fade_short() {
        let now = Instant::now();
        let mut m = machine(0, 0);
        m.show(false, now);
        m.hide(true, now);
        let effects = m.hide(false, now + ms(50));
        assert_eq!(finished(&effects), 1);
        assert!(effects.contains(&Effect::Cancel(TimerKind::FadeOut)));
    }

    #[test]
    fn test_delayed_hide_notifies_then_hides() {
        let now = Instant::now();
        let mut m = machine(0, 0);
        m.show(false, now);
        m.hide_after(false, Duration::from_secs(2));
        let effects = m.on_timer(TimerKind::DelayedHide, now + Duration::from_secs(2));
        assert_eq!(effects.first(), Some(&Effect::HiddenAfterDelay));
        assert_eq!(finished(&effects), 1);
    }

    #[test]
    fn test_tap_dismisses_when_allowed() {
        let now = Instant::now();
        let mut m = machine(0, 0);
        m.set_task_in_progress(true);
        m.show(false, now);
        let effects = m.tap(true, true, true, now);
        assert_eq!(effects.first(), Some(&Effect::Tapped));
        assert_eq!(finished(&effects), 1);
        assert!(!m.task_in_progress());
    }

    #[test]
    fn test_tap_outside_unmasked_passes_through() {
        let now = Instant::now();
        let mut m = machine(0, 0);
        m.show(false, now);
        assert_eq!(m.tap(false, true, true, now), vec![Effect::PassThrough]);
        assert_eq!(m.phase(), HudPhase::Visible);
    }

    #[test]
    fn test_tap_absorbed_when_not_dismissible() {
        let now = Instant::now();
        let mut m = machine(0, 0);
        m.show(false, now);
        assert!(m.tap(true, false, false, now).is_empty());
        assert_eq!(m.phase(), HudPhase::Visible);
    }

    #[test]
    fn test_tap_while_hidden_passes_through() {
        let now = Instant::now();
        let mut m = machine(0, 0);
        assert_eq!(m.tap(true, false, true, now), vec![Effect::PassThrough]);
    }

    #[test]
    fn test_reset_cancels_everything() {
        let now = Instant::now();
        let mut m = machine(0, 1000);
        m.show(false, now);
        m.hide(false, now);
        let effects = m.reset();
        assert_eq!(effects.len(), TimerKind::ALL.len());
        assert_eq!(m.phase(), HudPhase::Hidden);
        assert_eq!(m.timing().min_show_time, ms(1000));
    }

    #[test]
    fn test_zoom_scale_follows_opacity() {
        let now = Instant::now();
        let mut m = OverlayStateMachine::new(Timing {
            animation: AnimationType::ZoomOut,
            ..Default::default()
        });
        m.show(true, now);
        assert_eq!(m.scale(now), 1.5);
        assert_eq!(m.scale(now + FADE_DURATION), 1.0);
    }
}
