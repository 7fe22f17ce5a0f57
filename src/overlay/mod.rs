//! Overlay lifecycle
//!
//! The pure `machine` decides when a HUD appears and disappears; `Hud`
//! applies its effects with real timers, the spinner and caller callbacks.
//! `registry` maps host views to their HUDs, `work` runs background work
//! while a HUD is up, and `convenience` adds host-view shortcuts.

pub mod convenience;
pub mod events;
pub mod host;
pub mod hud;
pub mod machine;
pub mod registry;
mod timers;
pub mod work;

pub use convenience::{HudHostExt, HudRequest};
pub use events::{HudCallback, HudDelegate, HudEvent, HudEventKind, HudEventReceiver};
pub use host::{HostId, HostView};
pub use hud::{Completion, Hud, HudId, RepaintSignal, TapResult, WeakHud};
pub use machine::{HudPhase, FADE_DURATION};
pub use registry::HudRegistry;
pub use work::{ProgressReporter, WorkQueue};
