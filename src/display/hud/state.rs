//! HUD content and the attached indicator
//!
//! `HudMode` is what the caller asks for; `Indicator` is what is actually
//! installed. Switching modes goes through `Indicator::install`, which keeps
//! a compatible indicator, tears down an incompatible one, and reports which
//! custom views were attached or detached so the owner can notify them once
//! its lock is released.

use std::fmt;
use std::sync::{Arc, Weak};

use tracing::{debug, warn};

use super::progress::{clamp_progress, BAR_SIZE};
use super::spinner::{RepaintFn, SpinnerAnimator};
use crate::display::draw::{DrawList, DrawOp};
use crate::display::geometry::{Rect, Size};

/// A caller-owned view shown in place of a built-in indicator
pub trait OverlayView: Send + Sync {
    /// Size the view wants inside the panel
    fn intrinsic_size(&self) -> Size;

    /// Called once when the view becomes the HUD's indicator
    fn attached(&self) {}

    /// Called once when the view stops being the HUD's indicator
    fn detached(&self) {}

    /// Paint into the indicator slot
    fn draw(&self, rect: Rect, list: &mut DrawList) {
        list.push(DrawOp::CustomView { rect });
    }
}

/// Weak handle to a caller-owned `OverlayView`
#[derive(Clone)]
pub struct CustomView(Weak<dyn OverlayView>);

impl CustomView {
    pub fn new<V: OverlayView + 'static>(view: &Arc<V>) -> Self {
        let view: Arc<dyn OverlayView> = view.clone();
        Self(Arc::downgrade(&view))
    }

    /// The view, if the caller still owns it
    pub fn upgrade(&self) -> Option<Arc<dyn OverlayView>> {
        self.0.upgrade()
    }

    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }

    pub fn same_view(&self, other: &CustomView) -> bool {
        Weak::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for CustomView {
    fn eq(&self, other: &Self) -> bool {
        self.same_view(other)
    }
}

impl fmt::Debug for CustomView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CustomView")
            .field(&if self.is_alive() { "alive" } else { "dropped" })
            .finish()
    }
}

/// What the HUD displays
#[derive(Debug, Clone, PartialEq, Default)]
pub enum HudMode {
    /// Fin-ring spinner for unknown durations
    #[default]
    Indeterminate,
    /// Pie chart
    DeterminateCircular,
    /// Ring
    DeterminateAnnular,
    /// Horizontal capsule bar
    DeterminateBar,
    /// Checkmark
    Success,
    /// Cross
    Error,
    /// Labels only
    Text,
    /// Caller-owned view
    CustomView(CustomView),
}

impl HudMode {
    pub fn is_determinate(&self) -> bool {
        matches!(
            self,
            HudMode::DeterminateCircular | HudMode::DeterminateAnnular | HudMode::DeterminateBar
        )
    }
}

/// Everything the HUD shows, apart from styling
#[derive(Debug, Clone, Default)]
pub struct HudContent {
    pub mode: HudMode,
    pub title: String,
    pub message: String,
    progress: f64,
}

impl HudContent {
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn set_progress(&mut self, progress: f64) {
        self.progress = clamp_progress(progress);
    }
}

/// Spinner parameters used when a fresh spinner is installed
#[derive(Clone)]
pub struct SpinnerConfig {
    pub fin_count: usize,
    pub floor: f64,
    pub repaint: RepaintFn,
}

/// Custom views whose attachment changed during an install
#[derive(Default)]
pub struct IndicatorChange {
    pub attached: Option<Arc<dyn OverlayView>>,
    pub detached: Option<Arc<dyn OverlayView>>,
}

impl IndicatorChange {
    /// Notify the views; call without holding any HUD lock
    pub fn notify(self) {
        if let Some(view) = self.detached {
            view.detached();
        }
        if let Some(view) = self.attached {
            view.attached();
        }
    }
}

/// The indicator currently installed in the panel
#[derive(Default)]
pub enum Indicator {
    #[default]
    None,
    Spinner(SpinnerAnimator),
    Round {
        annular: bool,
    },
    Bar,
    Glyph {
        success: bool,
    },
    Custom(CustomView),
}

impl fmt::Debug for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Indicator::None => write!(f, "None"),
            Indicator::Spinner(_) => write!(f, "Spinner"),
            Indicator::Round { annular } => write!(f, "Round {{ annular: {annular} }}"),
            Indicator::Bar => write!(f, "Bar"),
            Indicator::Glyph { success } => write!(f, "Glyph {{ success: {success} }}"),
            Indicator::Custom(view) => write!(f, "Custom({view:?})"),
        }
    }
}

impl Indicator {
    pub fn is_none(&self) -> bool {
        matches!(self, Indicator::None)
    }

    pub fn spinner(&self) -> Option<&SpinnerAnimator> {
        match self {
            Indicator::Spinner(s) => Some(s),
            _ => None,
        }
    }

    pub fn spinner_mut(&mut self) -> Option<&mut SpinnerAnimator> {
        match self {
            Indicator::Spinner(s) => Some(s),
            _ => None,
        }
    }

    /// The installed caller-owned view, while it is alive
    pub fn custom_view(&self) -> Option<Arc<dyn OverlayView>> {
        match self {
            Indicator::Custom(view) => view.upgrade(),
            _ => None,
        }
    }

    /// Natural size of the installed indicator
    ///
    /// A custom view answers for itself through `custom_size`. That is caller
    /// code, so owners ask it before taking their lock.
    pub fn natural_size(&self, spinner_size: f64, custom_size: Size) -> Size {
        match self {
            Indicator::None => Size::ZERO,
            Indicator::Spinner(_) | Indicator::Round { .. } | Indicator::Glyph { .. } => {
                Size::square(spinner_size)
            }
            Indicator::Bar => BAR_SIZE,
            Indicator::Custom(_) => custom_size,
        }
    }

    /// Make the installed indicator match `mode`
    pub fn install(&mut self, mode: &HudMode, spinner: &SpinnerConfig) -> IndicatorChange {
        let mut change = IndicatorChange::default();

        let next = match (mode, &mut *self) {
            (HudMode::Indeterminate, Indicator::Spinner(_)) => return change,
            (HudMode::DeterminateCircular, Indicator::Round { annular })
            | (HudMode::DeterminateAnnular, Indicator::Round { annular }) => {
                *annular = *mode == HudMode::DeterminateAnnular;
                return change;
            }
            (HudMode::DeterminateBar, Indicator::Bar) => return change,
            (HudMode::CustomView(view), Indicator::Custom(current)) if view.same_view(current) => {
                return change;
            }
            (HudMode::Indeterminate, _) => Indicator::Spinner(SpinnerAnimator::new(
                spinner.fin_count,
                spinner.floor,
                spinner.repaint.clone(),
            )),
            (HudMode::DeterminateCircular, _) => Indicator::Round { annular: false },
            (HudMode::DeterminateAnnular, _) => Indicator::Round { annular: true },
            (HudMode::DeterminateBar, _) => Indicator::Bar,
            (HudMode::Success, _) => Indicator::Glyph { success: true },
            (HudMode::Error, _) => Indicator::Glyph { success: false },
            (HudMode::Text, _) => Indicator::None,
            (HudMode::CustomView(view), _) => match view.upgrade() {
                Some(live) => {
                    change.attached = Some(live);
                    Indicator::Custom(view.clone())
                }
                None => {
                    warn!("custom view already dropped, showing labels only");
                    Indicator::None
                }
            },
        };

        change.detached = self.teardown();
        debug!(indicator = ?next, "indicator installed");
        *self = next;
        change
    }

    /// Remove whatever is installed, returning a custom view to notify
    pub fn teardown(&mut self) -> Option<Arc<dyn OverlayView>> {
        match std::mem::take(self) {
            Indicator::Spinner(mut spinner) => {
                spinner.halt();
                None
            }
            Indicator::Custom(view) => view.upgrade(),
            _ => None,
        }
    }
}
