//! Anchor naming conventions and the capability rules they carry

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::object::ObjectKind;

/// Which object kinds an anchor accepts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapabilityFilter {
    #[default]
    Any,
    IncludesOnly(Vec<ObjectKind>),
    Excludes(Vec<ObjectKind>),
}

impl CapabilityFilter {
    pub fn includes(&self, kind: ObjectKind) -> bool {
        match self {
            CapabilityFilter::Any => true,
            CapabilityFilter::IncludesOnly(kinds) => kinds.contains(&kind),
            CapabilityFilter::Excludes(kinds) => !kinds.contains(&kind),
        }
    }
}

/// Declarative rule shared by every anchor of one kind
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityRule {
    pub filter: CapabilityFilter,
    /// Kind-specific snap distance; `None` uses the configured default
    pub min_distance: Option<f32>,
    /// Area rules generate anchor surfaces instead of single points
    pub area: bool,
}

/// Anchor conventions recognised by node name prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AnchorKind {
    Stand,
    Sph,
    Tube,
    CollectionTable,
    Tray,
    Petri,
    Spatula,
    MainArea,
    PlateStoveHelper,
    StirringStove,
}

impl AnchorKind {
    pub const ALL: [AnchorKind; 10] = [
        AnchorKind::Stand,
        AnchorKind::Sph,
        AnchorKind::Tube,
        AnchorKind::CollectionTable,
        AnchorKind::Tray,
        AnchorKind::Petri,
        AnchorKind::Spatula,
        AnchorKind::MainArea,
        AnchorKind::PlateStoveHelper,
        AnchorKind::StirringStove,
    ];

    /// Node name prefix of this kind
    pub fn name(&self) -> &'static str {
        match self {
            AnchorKind::Stand => "anchorStand",
            AnchorKind::Sph => "anchorSPH",
            AnchorKind::Tube => "tubeAnchor",
            AnchorKind::CollectionTable => "collectionTableAnchor",
            AnchorKind::Tray => "trayAnchor",
            AnchorKind::Petri => "petriAnchor",
            AnchorKind::Spatula => "spatulaAnchor",
            AnchorKind::MainArea => "mainArea",
            AnchorKind::PlateStoveHelper => "plateStoveHelper",
            AnchorKind::StirringStove => "stirringStoveAnchor",
        }
    }

    pub fn from_name(name: &str) -> Option<AnchorKind> {
        Self::ALL.iter().copied().find(|k| k.name() == name)
    }

    /// Kind whose prefix is the longest one matching `node_name`
    pub fn classify(node_name: &str) -> Option<AnchorKind> {
        Self::ALL
            .iter()
            .copied()
            .filter(|k| node_name.starts_with(k.name()))
            .max_by_key(|k| k.name().len())
    }

    pub fn rule(&self) -> CapabilityRule {
        use ObjectKind as O;

        let (filter, area) = match self {
            AnchorKind::Stand => (CapabilityFilter::IncludesOnly(vec![O::P100, O::P1000]), false),
            AnchorKind::Sph => (CapabilityFilter::IncludesOnly(vec![O::Cuvette]), false),
            AnchorKind::Tube => (CapabilityFilter::IncludesOnly(vec![O::Tube]), false),
            AnchorKind::CollectionTable => {
                (CapabilityFilter::IncludesOnly(vec![O::PetriCollection]), false)
            }
            AnchorKind::Tray | AnchorKind::Petri => {
                (CapabilityFilter::IncludesOnly(vec![O::PetriDish]), false)
            }
            AnchorKind::Spatula => (CapabilityFilter::IncludesOnly(vec![O::Spatula]), false),
            AnchorKind::MainArea => (CapabilityFilter::Excludes(vec![O::Tube, O::P100, O::P1000]), true),
            AnchorKind::PlateStoveHelper => {
                (CapabilityFilter::IncludesOnly(vec![O::PetriCollection]), true)
            }
            AnchorKind::StirringStove => (CapabilityFilter::IncludesOnly(vec![O::Erlenmeyer]), true),
        };

        CapabilityRule {
            filter,
            min_distance: None,
            area,
        }
    }

    pub fn is_area(&self) -> bool {
        self.rule().area
    }
}

impl fmt::Display for AnchorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Node names that produce a single anchor point
pub fn is_point_kind(node_name: &str) -> bool {
    AnchorKind::classify(node_name).is_some_and(|k| !k.is_area())
}

/// Node names that produce an anchor surface
pub fn is_area_kind(node_name: &str) -> bool {
    AnchorKind::classify(node_name).is_some_and(|k| k.is_area())
}
