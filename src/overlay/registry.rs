//! Host-to-HUD registry
//!
//! An explicit map from host identity to the HUDs attached to it, in attach
//! order. Convention is one HUD per host: `attach_and_show` tears down the
//! HUDs already on that host first.
//!
//! `HudRegistry::global()` is process-wide shared state. Its default
//! instances (`default_hud`) are reused across call sites and are reset
//! before every reuse.

use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use tracing::{debug, instrument};

use super::host::{HostId, HostView};
use super::hud::Hud;

/// HUDs currently attached, keyed by host
pub type AttachedMap = DashMap<HostId, Vec<Hud>>;

/// Registry of attached HUDs plus reusable per-host defaults
#[derive(Clone, Default)]
pub struct HudRegistry {
    attached: Arc<AttachedMap>,
    defaults: Arc<DashMap<HostId, Hud>>,
}

impl HudRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry
    pub fn global() -> &'static HudRegistry {
        static GLOBAL: OnceLock<HudRegistry> = OnceLock::new();
        GLOBAL.get_or_init(HudRegistry::new)
    }

    /// Create a HUD on `host`, replacing any HUD already there, and show it
    #[instrument(skip(self, host), fields(host = %host.id()))]
    pub fn attach_and_show(&self, host: &HostView, animated: bool) -> Hud {
        let hud = Hud::new(host);
        self.attach(&hud);
        hud.show(animated);
        hud
    }

    /// Attach an existing HUD to its host, tearing down whatever was there
    pub fn attach(&self, hud: &Hud) {
        let host = hud.host_id();
        for previous in self.find_all_attached_by_id(host) {
            if previous != *hud {
                debug!(hud = %previous.id(), "replacing attached hud");
                previous.reset();
                previous.detach();
            }
        }
        hud.attach_to(&self.attached);
        let mut list = self.attached.entry(host).or_default();
        if !list.contains(hud) {
            list.push(hud.clone());
        }
    }

    /// Most recently attached HUD on `host`
    pub fn find_attached(&self, host: &HostView) -> Option<Hud> {
        self.attached
            .get(&host.id())
            .and_then(|list| list.last().cloned())
    }

    /// All HUDs on `host`, oldest first
    pub fn find_all_attached(&self, host: &HostView) -> Vec<Hud> {
        self.find_all_attached_by_id(host.id())
    }

    fn find_all_attached_by_id(&self, host: HostId) -> Vec<Hud> {
        self.attached
            .get(&host)
            .map(|list| list.clone())
            .unwrap_or_default()
    }

    /// Hide the most recent HUD on `host`; false when there is none
    #[instrument(skip(self, host), fields(host = %host.id()))]
    pub fn hide(&self, host: &HostView, animated: bool) -> bool {
        match self.find_attached(host) {
            Some(hud) => {
                hud.update_settings(|s| s.remove_on_hide = true);
                hud.hide(animated);
                true
            }
            None => false,
        }
    }

    /// Hide every HUD on `host`, returning how many there were
    #[instrument(skip(self, host), fields(host = %host.id()))]
    pub fn hide_all(&self, host: &HostView, animated: bool) -> usize {
        let huds = self.find_all_attached(host);
        for hud in &huds {
            hud.update_settings(|s| s.remove_on_hide = true);
            hud.hide(animated);
        }
        huds.len()
    }

    /// Number of HUDs attached to `host`
    pub fn attached_count(&self, host: &HostView) -> usize {
        self.attached
            .get(&host.id())
            .map(|list| list.len())
            .unwrap_or(0)
    }

    /// The reusable HUD for `host`, reset to a fresh hidden state
    pub fn default_hud(&self, host: &HostView) -> Hud {
        let hud = self
            .defaults
            .entry(host.id())
            .or_insert_with(|| Hud::new(host))
            .clone();
        hud.reset();
        hud
    }

    /// The reusable HUD for `host` as it is, without resetting
    pub fn current_default(&self, host: &HostView) -> Option<Hud> {
        self.defaults.get(&host.id()).map(|hud| hud.clone())
    }

    /// Forget the reusable HUD for `host`
    pub fn release_default(&self, host: &HostView) {
        if let Some((_, hud)) = self.defaults.remove(&host.id()) {
            hud.reset();
            hud.detach();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::geometry::Size;
    use crate::overlay::machine::HudPhase;

    fn host() -> HostView {
        HostView::new(Size::new(400.0, 300.0))
    }

    #[tokio::test(start_paused = true)]
    async fn test_attach_and_find() {
        let registry = HudRegistry::new();
        let host = host();
        assert!(registry.find_attached(&host).is_none());

        let hud = registry.attach_and_show(&host, false);
        assert_eq!(registry.find_attached(&host), Some(hud.clone()));
        assert!(hud.is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_attach_replaces_first() {
        let registry = HudRegistry::new();
        let host = host();
        let first = registry.attach_and_show(&host, false);
        let second = registry.attach_and_show(&host, false);

        assert_eq!(registry.find_all_attached(&host), vec![second]);
        assert_eq!(first.phase(), HudPhase::Hidden);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hide_detaches_on_completion() {
        let registry = HudRegistry::new();
        let host = host();
        registry.attach_and_show(&host, false);

        assert!(registry.hide(&host, true));
        assert_eq!(registry.attached_count(&host), 1);
        tokio::time::sleep(std::time::Duration::from_millis(250)).await;
        assert_eq!(registry.attached_count(&host), 0);
        assert!(!registry.hide(&host, true));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hide_all_counts() {
        let registry = HudRegistry::new();
        let host = host();
        let other = self::host();
        registry.attach_and_show(&host, false);
        registry.attach_and_show(&other, false);

        assert_eq!(registry.hide_all(&host, false), 1);
        assert_eq!(registry.attached_count(&host), 0);
        assert_eq!(registry.attached_count(&other), 1);
        assert_eq!(registry.hide_all(&host, false), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_hud_is_reused_and_reset() {
        let registry = HudRegistry::new();
        let host = host();
        let hud = registry.default_hud(&host);
        hud.set_title("first");
        hud.show(false);

        let again = registry.default_hud(&host);
        assert_eq!(hud, again);
        assert_eq!(again.phase(), HudPhase::Hidden);
        assert!(again.title().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hosts_are_independent() {
        let registry = HudRegistry::new();
        let a = host();
        let b = host();
        registry.attach_and_show(&a, false);
        assert!(registry.find_attached(&b).is_none());
    }
}
