//! Host-view shortcuts
//!
//! Thin wrappers over the global registry's default HUD, for call sites that
//! just want "show a HUD on this view" without holding a handle.

use std::time::Duration;

use super::host::HostView;
use super::hud::Hud;
use super::registry::HudRegistry;
use crate::config::MaskType;
use crate::display::hud::{HudMode, HudPosition};
use crate::display::styles::HudStyle;

/// Everything `show_hud` can set in one call
#[derive(Debug, Clone, Default)]
pub struct HudRequest {
    pub title: String,
    pub message: String,
    pub mode: HudMode,
    pub style: Option<HudStyle>,
    pub mask: Option<MaskType>,
    pub position: Option<HudPosition>,
    /// Hide automatically after this long
    pub duration: Option<Duration>,
    pub animated: bool,
}

impl HudRequest {
    pub fn new(mode: HudMode) -> Self {
        Self {
            mode,
            animated: true,
            ..Default::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn style(mut self, style: HudStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn mask(mut self, mask: MaskType) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn position(mut self, position: HudPosition) -> Self {
        self.position = Some(position);
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn animated(mut self, animated: bool) -> Self {
        self.animated = animated;
        self
    }
}

/// HUD shortcuts on a host view
pub trait HudHostExt {
    /// Show the host's default HUD configured by `request`
    fn show_hud(&self, request: HudRequest) -> Hud;

    /// Update the progress of the HUD currently shown on this host
    fn set_hud_progress(&self, progress: f64);

    /// Hide the host's default HUD, now or after a delay
    fn hide_hud(&self, after_delay: Option<Duration>);
}

impl HudHostExt for HostView {
    fn show_hud(&self, request: HudRequest) -> Hud {
        let registry = HudRegistry::global();
        let hud = registry.default_hud(self);
        hud.update_settings(|s| {
            if let Some(style) = request.style {
                s.style = style;
            }
            if let Some(mask) = request.mask {
                s.mask = mask;
            }
            if let Some(position) = request.position {
                s.position = position;
            }
        });
        hud.set_mode(request.mode);
        hud.set_title(request.title);
        hud.set_message(request.message);
        registry.attach(&hud);
        hud.show(request.animated);
        if let Some(duration) = request.duration {
            hud.hide_after(request.animated, duration);
        }
        hud
    }

    fn set_hud_progress(&self, progress: f64) {
        if let Some(hud) = HudRegistry::global().current_default(self) {
            hud.set_progress(progress);
        }
    }

    fn hide_hud(&self, after_delay: Option<Duration>) {
        let Some(hud) = HudRegistry::global().current_default(self) else {
            return;
        };
        match after_delay {
            Some(delay) => hud.hide_after(true, delay),
            None => hud.hide(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::geometry::Size;
    use crate::overlay::machine::HudPhase;

    #[tokio::test(start_paused = true)]
    async fn test_show_and_hide_through_host() {
        let host = HostView::new(Size::new(320.0, 480.0));
        let hud = host.show_hud(
            HudRequest::new(HudMode::DeterminateAnnular)
                .title("Uploading")
                .mask(MaskType::Black)
                .animated(false),
        );
        assert!(hud.is_visible());
        assert_eq!(hud.settings().mask, MaskType::Black);
        assert_eq!(HudRegistry::global().find_attached(&host), Some(hud.clone()));

        host.set_hud_progress(0.4);
        assert_eq!(hud.progress(), 0.4);

        host.hide_hud(None);
        hud.wait_hidden().await;
        assert!(HudRegistry::global().find_attached(&host).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_duration_hides_automatically() {
        let host = HostView::new(Size::new(320.0, 480.0));
        let hud = host.show_hud(
            HudRequest::new(HudMode::Text)
                .title("Saved")
                .duration(Duration::from_secs(1)),
        );
        assert!(!hud.has_indicator());
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(hud.phase(), HudPhase::Hidden);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reuse_resets_previous_state() {
        let host = HostView::new(Size::new(320.0, 480.0));
        let first = host.show_hud(HudRequest::new(HudMode::Success).title("Done"));
        let second = host.show_hud(HudRequest::new(HudMode::Text).message("Next"));
        assert_eq!(first, second);
        assert!(second.title().is_empty());
        assert_eq!(second.message(), "Next");
    }
}
