//! Anchor points, anchor surfaces and the registry that catalogs them

mod kind;
mod point;
mod registry;
mod surface;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use kind::{is_area_kind, is_point_kind, AnchorKind, CapabilityFilter, CapabilityRule};
pub use point::{AnchorNotice, AnchorPoint};
pub use registry::AnchorRegistry;
pub use surface::AnchorSurface;

/// Registry handle of an anchor point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnchorId(pub(crate) u64);

impl AnchorId {
    /// Id carried by anchors that were never registered
    pub const UNREGISTERED: AnchorId = AnchorId(0);

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for AnchorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "anchor#{}", self.0)
    }
}
