//! The HUD handle
//!
//! `Hud` is a cheap clonable handle over shared state. All widget state sits
//! behind one mutex; every operation locks it, runs the state machine,
//! applies the resulting effects, and then (with the lock released) fires
//! completions, delegate callbacks and custom-view notifications, so caller
//! code may freely re-enter the HUD.
//!
//! Timers and the spinner only hold weak references. Dropping the last
//! handle cancels everything still pending.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::{watch, Notify};
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use super::events::{HudDelegate, HudEvent, HudEventKind, HudEventReceiver, HudEventSender};
use super::host::{HostId, HostView};
use super::machine::{Effect, HudPhase, OverlayStateMachine, TimerKind, Timing};
use super::registry::AttachedMap;
use super::timers::TimerSlots;
use crate::config::HudSettings;
use crate::display::draw::DrawList;
use crate::display::geometry::{Point, Size};
use crate::display::hud::{
    layout, render_frame, Frame, HudContent, HudLayout, HudMode, Indicator, IndicatorChange,
    LayoutInput, OverlayView, RepaintFn, SpinnerConfig,
};
use crate::display::text::{ApproximateMetrics, TextMeasure};

/// Identity of a HUD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HudId(pub Uuid);

impl fmt::Display for HudId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fired once when a show/hide cycle completes
pub type Completion = Box<dyn FnOnce() + Send>;

/// How a tap was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapResult {
    /// Deliver the tap to whatever is behind the HUD
    PassThrough,
    /// Swallowed without dismissing
    Absorbed,
    /// The HUD is hiding
    Dismissed,
}

/// Repaint requests from the HUD and its spinner
///
/// Every request bumps a counter and wakes one waiter; a request made while
/// nobody waits is remembered until the next wait.
#[derive(Default)]
pub struct RepaintSignal {
    count: AtomicU64,
    notify: Notify,
}

impl RepaintSignal {
    pub fn mark(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.notify.notify_one();
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub async fn notified(&self) {
        self.notify.notified().await
    }
}

struct Attachment {
    huds: Weak<AttachedMap>,
}

struct HudCore {
    settings: HudSettings,
    content: HudContent,
    indicator: Indicator,
    machine: OverlayStateMachine,
    timers: TimerSlots,
    completion: Option<Completion>,
    delegate: HudDelegate,
    attachment: Option<Attachment>,
    measure: Arc<dyn TextMeasure>,
}

struct HudShared {
    id: HudId,
    host: HostView,
    core: Mutex<HudCore>,
    events: HudEventSender,
    phase: watch::Sender<HudPhase>,
    repaint: Arc<RepaintSignal>,
}

/// Work collected under the lock and run after it is released
#[derive(Default)]
struct Deferred {
    events: Vec<HudEventKind>,
    completion: Option<Completion>,
    detach: Option<Attachment>,
    delegate: HudDelegate,
    views: Option<IndicatorChange>,
    pass_through: bool,
    dismissed: bool,
}

fn timing_of(settings: &HudSettings) -> Timing {
    Timing {
        grace_time: settings.grace_time,
        min_show_time: settings.min_show_time,
        animation: settings.animation,
    }
}

/// Handle to one overlay
#[derive(Clone)]
pub struct Hud {
    shared: Arc<HudShared>,
}

/// Non-owning handle; upgrading fails once every `Hud` is dropped
#[derive(Clone)]
pub struct WeakHud(Weak<HudShared>);

impl WeakHud {
    pub fn upgrade(&self) -> Option<Hud> {
        self.0.upgrade().map(|shared| Hud { shared })
    }
}

impl Hud {
    /// Create a hidden HUD for `host` with default settings
    pub fn new(host: &HostView) -> Self {
        Self::with_settings(host, HudSettings::default())
    }

    pub fn with_settings(host: &HostView, settings: HudSettings) -> Self {
        let repaint = Arc::new(RepaintSignal::default());
        let machine = OverlayStateMachine::new(timing_of(&settings));
        let (phase, _) = watch::channel(HudPhase::Hidden);

        let mut core = HudCore {
            settings,
            content: HudContent::default(),
            indicator: Indicator::None,
            machine,
            timers: TimerSlots::new(),
            completion: None,
            delegate: HudDelegate::default(),
            attachment: None,
            measure: Arc::new(ApproximateMetrics),
        };
        let spinner = spinner_config(&core.settings, &repaint);
        core.indicator.install(&core.content.mode, &spinner);

        let hud = Self {
            shared: Arc::new(HudShared {
                id: HudId(Uuid::new_v4()),
                host: host.clone(),
                core: Mutex::new(core),
                events: HudEventSender::default(),
                phase,
                repaint,
            }),
        };
        debug!(hud = %hud.id(), host = %host.id(), "hud created");
        hud
    }

    pub fn id(&self) -> HudId {
        self.shared.id
    }

    pub fn host(&self) -> &HostView {
        &self.shared.host
    }

    pub fn host_id(&self) -> HostId {
        self.shared.host.id()
    }

    pub fn downgrade(&self) -> WeakHud {
        WeakHud(Arc::downgrade(&self.shared))
    }

    fn lock(&self) -> MutexGuard<'_, HudCore> {
        self.shared.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ----- lifecycle -----

    /// Show, subject to the grace time
    pub fn show(&self, animated: bool) {
        self.transition(|machine, now| machine.show(animated, now));
    }

    /// Hide, subject to the minimum show time
    pub fn hide(&self, animated: bool) {
        self.transition(|machine, now| machine.hide(animated, now));
    }

    /// Hide after `delay`; a later show or hide cancels it
    pub fn hide_after(&self, animated: bool, delay: Duration) {
        self.transition(|machine, _| machine.hide_after(animated, delay));
    }

    /// Mark the owning task finished and hide
    pub fn cleanup(&self) {
        self.transition(|machine, now| machine.cleanup(now));
    }

    /// Deliver a tap at `point` (host coordinates)
    pub fn tap(&self, point: Point) -> TapResult {
        let (_, custom_size) = self.custom_view();
        let now = Instant::now();
        let deferred = {
            let mut core = self.lock();
            let on_panel = self.layout_locked(&core, custom_size).panel.contains(point);
            let passes = core.settings.mask.passes_touches();
            let dismissible = core.settings.dismissible;
            let effects = core.machine.tap(on_panel, passes, dismissible, now);
            self.apply(&mut core, effects)
        };
        let result = if deferred.pass_through {
            TapResult::PassThrough
        } else if deferred.dismissed {
            TapResult::Dismissed
        } else {
            TapResult::Absorbed
        };
        self.publish(deferred);
        result
    }

    /// Return to a fresh hidden state: timers cancelled, spinner stopped,
    /// custom view released, content and callbacks cleared
    pub fn reset(&self) {
        let deferred = {
            let mut core = self.lock();
            let effects = core.machine.reset();
            let mut deferred = self.apply(&mut core, effects);
            let detached = core.indicator.teardown();
            core.content = HudContent::default();
            core.completion = None;
            core.delegate = HudDelegate::default();
            let spinner = spinner_config(&core.settings, &self.shared.repaint);
            let core = &mut *core;
            let mut change = core.indicator.install(&core.content.mode, &spinner);
            change.detached = detached;
            deferred.views = Some(change);
            deferred
        };
        debug!(hud = %self.id(), "hud reset");
        self.publish(deferred);
    }

    /// Remove from the registry this HUD is attached to, if any
    pub fn detach(&self) {
        let attachment = self.lock().attachment.take();
        if let Some(attachment) = attachment {
            self.detach_from(attachment);
        }
    }

    pub(crate) fn attach_to(&self, huds: &Arc<AttachedMap>) {
        self.lock().attachment = Some(Attachment {
            huds: Arc::downgrade(huds),
        });
    }

    fn detach_from(&self, attachment: Attachment) {
        let Some(huds) = attachment.huds.upgrade() else {
            return;
        };
        let host = self.host_id();
        let emptied = match huds.get_mut(&host) {
            Some(mut list) => {
                list.retain(|hud| hud.id() != self.id());
                list.is_empty()
            }
            None => false,
        };
        if emptied {
            huds.remove_if(&host, |_, list| list.is_empty());
        }
        debug!(hud = %self.id(), host = %host, "hud detached");
    }

    // ----- configuration -----

    pub fn set_mode(&self, mode: HudMode) {
        let change = {
            let mut core = self.lock();
            let spinner = spinner_config(&core.settings, &self.shared.repaint);
            let core = &mut *core;
            core.content.mode = mode;
            let change = core.indicator.install(&core.content.mode, &spinner);
            if core.machine.phase().is_on_screen() {
                if let Some(spinner) = core.indicator.spinner_mut() {
                    spinner.start();
                }
            }
            change
        };
        change.notify();
        self.request_repaint();
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.lock().content.title = title.into();
        self.request_repaint();
    }

    pub fn set_message(&self, message: impl Into<String>) {
        self.lock().content.message = message.into();
        self.request_repaint();
    }

    /// Set determinate progress; clamped to [0, 1]
    pub fn set_progress(&self, progress: f64) {
        self.lock().content.set_progress(progress);
        self.request_repaint();
    }

    /// Edit settings in place; timing changes apply to the next transition
    pub fn update_settings(&self, f: impl FnOnce(&mut HudSettings)) {
        {
            let mut core = self.lock();
            f(&mut core.settings);
            let timing = timing_of(&core.settings);
            core.machine.set_timing(timing);
        }
        self.request_repaint();
    }

    pub fn set_settings(&self, settings: HudSettings) {
        self.update_settings(|s| *s = settings);
    }

    /// Tell the grace timer whether the owning task is still running
    pub fn set_task_in_progress(&self, in_progress: bool) {
        self.lock().machine.set_task_in_progress(in_progress);
    }

    /// Replace the completion fired when the current cycle finishes
    pub fn set_completion(&self, completion: impl FnOnce() + Send + 'static) {
        self.lock().completion = Some(Box::new(completion));
    }

    pub fn set_delegate(&self, delegate: HudDelegate) {
        self.lock().delegate = delegate;
    }

    pub fn set_text_measure(&self, measure: Arc<dyn TextMeasure>) {
        self.lock().measure = measure;
        self.request_repaint();
    }

    // ----- queries -----

    pub fn phase(&self) -> HudPhase {
        self.lock().machine.phase()
    }

    /// True while the panel is on screen (including while fading out)
    pub fn is_visible(&self) -> bool {
        self.phase().is_on_screen()
    }

    pub fn opacity(&self) -> f64 {
        self.lock().machine.opacity(Instant::now())
    }

    /// True while a fade is running; hosts should keep repainting
    pub fn is_transitioning(&self) -> bool {
        self.lock().machine.is_transitioning(Instant::now())
    }

    pub fn is_spinning(&self) -> bool {
        self.lock()
            .indicator
            .spinner()
            .map(|s| s.is_animating())
            .unwrap_or(false)
    }

    pub fn has_indicator(&self) -> bool {
        !self.lock().indicator.is_none()
    }

    pub fn mode(&self) -> HudMode {
        self.lock().content.mode.clone()
    }

    pub fn title(&self) -> String {
        self.lock().content.title.clone()
    }

    pub fn message(&self) -> String {
        self.lock().content.message.clone()
    }

    pub fn progress(&self) -> f64 {
        self.lock().content.progress()
    }

    pub fn settings(&self) -> HudSettings {
        self.lock().settings.clone()
    }

    pub fn task_in_progress(&self) -> bool {
        self.lock().machine.task_in_progress()
    }

    /// Lay out the panel against the host's current bounds
    pub fn layout(&self) -> HudLayout {
        let (_, custom_size) = self.custom_view();
        let core = self.lock();
        self.layout_locked(&core, custom_size)
    }

    /// The installed custom view and its size, asked without holding the lock
    fn custom_view(&self) -> (Option<Arc<dyn OverlayView>>, Size) {
        let view = self.lock().indicator.custom_view();
        let size = view
            .as_ref()
            .map(|v| v.intrinsic_size())
            .unwrap_or(Size::ZERO);
        (view, size)
    }

    fn layout_locked(&self, core: &HudCore, custom_size: Size) -> HudLayout {
        let input = LayoutInput {
            bounds: self.shared.host.bounds(),
            indicator: core
                .indicator
                .natural_size(core.settings.spinner_size, custom_size),
            title: &core.content.title,
            title_font: &core.settings.title_font,
            message: &core.content.message,
            message_font: &core.settings.message_font,
            margin: core.settings.margin,
            padding: core.settings.padding,
            min_size: core.settings.min_size,
            square: core.settings.square,
            position: core.settings.position,
        };
        layout(&input, core.measure.as_ref())
    }

    /// Paint the current frame
    ///
    /// A custom view draws into its slot after the lock is released, so it
    /// may read the HUD while painting.
    pub fn render(&self) -> DrawList {
        let (view, custom_size) = self.custom_view();
        let now = Instant::now();
        let frame = {
            let core = self.lock();
            let layout = self.layout_locked(&core, custom_size);
            render_frame(&Frame {
                bounds: self.shared.host.bounds(),
                layout: &layout,
                settings: &core.settings,
                content: &core.content,
                indicator: &core.indicator,
                opacity: core.machine.opacity(now),
                scale: core.machine.scale(now),
            })
        };
        match view {
            Some(view) => frame.expand_custom_views(|rect, list| view.draw(rect, list)),
            None => frame,
        }
    }

    // ----- observation -----

    pub fn subscribe(&self) -> HudEventReceiver {
        self.shared.events.subscribe()
    }

    /// Wait until something asks for a repaint
    pub async fn repaint_requested(&self) {
        self.shared.repaint.notified().await
    }

    /// Number of repaint requests so far
    pub fn repaint_count(&self) -> u64 {
        self.shared.repaint.count()
    }

    /// Wait until the HUD is hidden
    pub async fn wait_hidden(&self) {
        let mut phase = self.shared.phase.subscribe();
        let _ = phase.wait_for(|p| *p == HudPhase::Hidden).await;
    }

    fn request_repaint(&self) {
        self.shared.repaint.mark();
    }

    // ----- effects -----

    fn transition(&self, f: impl FnOnce(&mut OverlayStateMachine, Instant) -> Vec<Effect>) {
        let now = Instant::now();
        let deferred = {
            let mut core = self.lock();
            let effects = f(&mut core.machine, now);
            self.apply(&mut core, effects)
        };
        self.publish(deferred);
    }

    fn fire_timer(&self, timer: TimerKind, generation: u64) {
        let now = Instant::now();
        let deferred = {
            let mut core = self.lock();
            if !core.timers.take_if_current(timer, generation) {
                debug!(hud = %self.id(), ?timer, "stale timer ignored");
                return;
            }
            let effects = core.machine.on_timer(timer, now);
            self.apply(&mut core, effects)
        };
        self.publish(deferred);
    }

    fn apply(&self, core: &mut HudCore, effects: Vec<Effect>) -> Deferred {
        let mut deferred = Deferred::default();
        let mut pending = VecDeque::from(effects);
        while let Some(effect) = pending.pop_front() {
            match effect {
                Effect::Schedule { timer, after } => {
                    if timer == TimerKind::FadeOut {
                        if let Some(spinner) = core.indicator.spinner_mut() {
                            spinner.stop();
                        }
                    }
                    let hud = self.downgrade();
                    let scheduled = core.timers.schedule(timer, after, move |generation| {
                        if let Some(hud) = hud.upgrade() {
                            hud.fire_timer(timer, generation);
                        }
                    });
                    // Without a runtime nothing would ever fire: resolve now
                    if !scheduled {
                        debug!(hud = %self.id(), ?timer, "resolving timer immediately");
                        pending.extend(core.machine.on_timer(timer, Instant::now()));
                    }
                }
                Effect::Cancel(timer) => core.timers.cancel(timer),
                Effect::Shown => {
                    if let Some(spinner) = core.indicator.spinner_mut() {
                        spinner.start();
                    }
                    deferred.events.push(HudEventKind::Shown);
                }
                Effect::Suppressed => deferred.events.push(HudEventKind::Suppressed),
                Effect::Finished => {
                    if let Some(spinner) = core.indicator.spinner_mut() {
                        spinner.halt();
                    }
                    if core.settings.remove_on_hide {
                        deferred.detach = core.attachment.take();
                    }
                    deferred.completion = core.completion.take();
                    deferred.events.push(HudEventKind::Hidden);
                }
                Effect::HiddenAfterDelay => deferred.events.push(HudEventKind::HiddenAfterDelay),
                Effect::Tapped => {
                    deferred.dismissed = true;
                    deferred.events.push(HudEventKind::Tapped);
                }
                Effect::PassThrough => deferred.pass_through = true,
            }
        }
        if !deferred.events.is_empty() {
            deferred.delegate = core.delegate.clone();
        }
        self.shared.phase.send_replace(core.machine.phase());
        self.request_repaint();
        deferred
    }

    fn publish(&self, deferred: Deferred) {
        if let Some(change) = deferred.views {
            change.notify();
        }
        if let Some(attachment) = deferred.detach {
            self.detach_from(attachment);
        }
        if let Some(completion) = deferred.completion {
            completion();
        }
        for kind in deferred.events {
            match kind {
                HudEventKind::Shown => info!(hud = %self.id(), "hud shown"),
                HudEventKind::Hidden => info!(hud = %self.id(), "hud hidden"),
                _ => debug!(hud = %self.id(), ?kind, "hud event"),
            }
            self.shared.events.send(HudEvent {
                hud: self.id(),
                kind,
            });
            if let Some(callback) = deferred.delegate.callback(kind) {
                callback(self);
            }
        }
    }
}

fn spinner_config(settings: &HudSettings, repaint: &Arc<RepaintSignal>) -> SpinnerConfig {
    let signal = repaint.clone();
    let repaint: RepaintFn = Arc::new(move || signal.mark());
    SpinnerConfig {
        fin_count: settings.fin_count,
        floor: settings.spinner_floor,
        repaint,
    }
}

impl fmt::Debug for Hud {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hud")
            .field("id", &self.id())
            .field("host", &self.host_id())
            .field("phase", &self.phase())
            .finish()
    }
}

impl PartialEq for Hud {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Hud {}
