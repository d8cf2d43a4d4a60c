use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Closed set of bench object types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectKind {
    Bin,
    Burner,
    Clock,
    Cuvette,
    Erlenmeyer,
    P100,
    P1000,
    PetriCollection,
    PetriDish,
    PlateStove,
    ServerButton,
    Spatula,
    SpatulaTray,
    Spectrophotometer,
    Stand,
    StirringStove,
    TipsBox100,
    TipsBox1000,
    Tray,
    Tube,
    TubesHolder,
    Tv,
    Vortex,
    SphDoor,
    SphKnob,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 25] = [
        ObjectKind::Bin,
        ObjectKind::Burner,
        ObjectKind::Clock,
        ObjectKind::Cuvette,
        ObjectKind::Erlenmeyer,
        ObjectKind::P100,
        ObjectKind::P1000,
        ObjectKind::PetriCollection,
        ObjectKind::PetriDish,
        ObjectKind::PlateStove,
        ObjectKind::ServerButton,
        ObjectKind::Spatula,
        ObjectKind::SpatulaTray,
        ObjectKind::Spectrophotometer,
        ObjectKind::Stand,
        ObjectKind::StirringStove,
        ObjectKind::TipsBox100,
        ObjectKind::TipsBox1000,
        ObjectKind::Tray,
        ObjectKind::Tube,
        ObjectKind::TubesHolder,
        ObjectKind::Tv,
        ObjectKind::Vortex,
        ObjectKind::SphDoor,
        ObjectKind::SphKnob,
    ];

    /// Scene node name that identifies this kind
    pub fn name(&self) -> &'static str {
        match self {
            ObjectKind::Bin => "bin",
            ObjectKind::Burner => "burner",
            ObjectKind::Clock => "clock",
            ObjectKind::Cuvette => "cuvette",
            ObjectKind::Erlenmeyer => "erlenmeyer",
            ObjectKind::P100 => "p100",
            ObjectKind::P1000 => "p1000",
            ObjectKind::PetriCollection => "petriCollection",
            ObjectKind::PetriDish => "petriDish",
            ObjectKind::PlateStove => "plateStove",
            ObjectKind::ServerButton => "serverButton",
            ObjectKind::Spatula => "spatula",
            ObjectKind::SpatulaTray => "spatulaTray",
            ObjectKind::Spectrophotometer => "spectrophotometer",
            ObjectKind::Stand => "stand",
            ObjectKind::StirringStove => "stirringStove",
            ObjectKind::TipsBox100 => "tipsbox100",
            ObjectKind::TipsBox1000 => "tipsbox1000",
            ObjectKind::Tray => "tray",
            ObjectKind::Tube => "tube",
            ObjectKind::TubesHolder => "tubesHolder",
            ObjectKind::Tv => "tv",
            ObjectKind::Vortex => "vortex",
            ObjectKind::SphDoor => "sphDoor",
            ObjectKind::SphKnob => "sphKnob",
        }
    }

    /// Kind whose name equals the node name exactly
    pub fn from_node_name(name: &str) -> Option<ObjectKind> {
        Self::ALL.iter().copied().find(|k| k.name() == name)
    }

    /// Fixtures stay where the scene put them
    pub fn grabbable(&self) -> bool {
        !matches!(
            self,
            ObjectKind::Burner
                | ObjectKind::Clock
                | ObjectKind::PlateStove
                | ObjectKind::ServerButton
                | ObjectKind::Spectrophotometer
                | ObjectKind::StirringStove
                | ObjectKind::Tray
                | ObjectKind::TubesHolder
                | ObjectKind::Tv
                | ObjectKind::SphDoor
                | ObjectKind::SphKnob
        )
    }

    /// Interaction points every object of this kind must expose
    pub fn required_points(&self) -> &'static [&'static str] {
        match self {
            ObjectKind::Bin => &["dropPoint"],
            ObjectKind::Cuvette | ObjectKind::Tube => &["capPoint"],
            ObjectKind::Erlenmeyer => &["pourPoint"],
            ObjectKind::P100 | ObjectKind::P1000 => &["tipPoint"],
            ObjectKind::PetriDish => &["contentPoint"],
            ObjectKind::TipsBox100 | ObjectKind::TipsBox1000 => &["tipsPoint"],
            ObjectKind::Vortex => &["hatPoint"],
            _ => &[],
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ObjectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_node_name(s).ok_or_else(|| format!("unknown object kind '{}'", s))
    }
}
