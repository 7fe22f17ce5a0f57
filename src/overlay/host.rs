//! Host views
//!
//! A `HostView` stands in for the toolkit view a HUD is drawn above. It only
//! carries an identity (the registry key) and its current bounds; the HUD
//! reads the bounds on every layout pass.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use uuid::Uuid;

use crate::display::geometry::Size;

/// Identity of a host view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostId(pub Uuid);

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A view that HUDs attach to; clones share identity and bounds
#[derive(Clone)]
pub struct HostView {
    id: HostId,
    bounds: Arc<RwLock<Size>>,
}

impl HostView {
    pub fn new(bounds: Size) -> Self {
        Self {
            id: HostId(Uuid::new_v4()),
            bounds: Arc::new(RwLock::new(bounds)),
        }
    }

    pub fn id(&self) -> HostId {
        self.id
    }

    pub fn bounds(&self) -> Size {
        *self.bounds.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resize; attached HUDs pick this up on their next layout pass
    pub fn set_bounds(&self, bounds: Size) {
        *self.bounds.write().unwrap_or_else(PoisonError::into_inner) = bounds;
    }
}

impl fmt::Debug for HostView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostView")
            .field("id", &self.id)
            .field("bounds", &self.bounds())
            .finish()
    }
}

impl PartialEq for HostView {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for HostView {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_bounds() {
        let host = HostView::new(Size::new(400.0, 300.0));
        let clone = host.clone();
        clone.set_bounds(Size::new(800.0, 600.0));
        assert_eq!(host.bounds(), Size::new(800.0, 600.0));
        assert_eq!(host, clone);
    }

    #[test]
    fn hosts_are_distinct() {
        let a = HostView::new(Size::ZERO);
        let b = HostView::new(Size::ZERO);
        assert_ne!(a.id(), b.id());
    }
}
