//! progress-hud - self-drawn progress overlay
//!
//! A semi-transparent rounded panel shown above a host view with a spinner
//! or progress indicator and optional title/message. The crate computes its
//! own layout, emits every frame as a display list for the host to replay,
//! animates the spinner on its own timer, and runs the show/hide lifecycle
//! (grace time, minimum show time, fades, delegate and completion callbacks).
//!
//! The demo binary is in `main.rs`.

pub mod config;
pub mod display;
pub mod error;
pub mod overlay;
pub mod paths;

pub use config::{AnimationType, HudSettings, MaskType};
pub use display::hud::{CustomView, HudMode, HudPosition, OverlayView};
pub use error::HudError;
pub use overlay::{
    Hud, HudDelegate, HudEvent, HudEventKind, HudHostExt, HudPhase, HudRegistry, HudRequest,
    HostView, ProgressReporter, TapResult, WorkQueue,
};
