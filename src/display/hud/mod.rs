//! The self-drawn HUD panel
//!
//! - `spinner`: fin-ring opacity model and its 50ms animator
//! - `progress`: vector geometry for every indicator
//! - `layout`: panel and block placement
//! - `state`: content, modes and the installed indicator
//! - `renderer`: one frame as a display list

pub mod layout;
pub mod progress;
mod renderer;
pub mod spinner;
mod state;

pub use layout::{layout, HudLayout, HudPosition, LayoutInput};
pub use progress::{BarColors, BarFill, RoundColors};
pub use renderer::{panel_color, render_frame, rounded_panel, Frame};
pub use spinner::{
    FinRing, RepaintFn, SpinnerAnimator, ALPHA_HIDDEN_WHEN_STOPPED, ALPHA_WHEN_STOPPED,
    DEFAULT_FIN_COUNT, TICK_INTERVAL,
};
pub use state::{
    CustomView, HudContent, HudMode, Indicator, IndicatorChange, OverlayView, SpinnerConfig,
};
