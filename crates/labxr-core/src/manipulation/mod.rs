//! Per-hand highlight, grab, carry and release

mod controller;
mod session;

use serde::Serialize;

use labxr_input::Handedness;

use crate::anchor::AnchorId;
use crate::object::ObjectId;

pub use controller::ManipulationController;
pub use session::{GrabSession, GrabState};

/// What a controller is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerState {
    Idle,
    Highlighting,
    Grabbing,
    Grabbed,
    Releasing,
}

/// Notable transitions, collected per controller until drained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ManipulationEvent {
    /// The pointed-at object changed; `None` when nothing is highlighted anymore
    Highlighted {
        hand: Handedness,
        object: Option<ObjectId>,
    },
    GrabStarted {
        hand: Handedness,
        object: ObjectId,
    },
    Grabbed {
        hand: Handedness,
        object: ObjectId,
    },
    Dropped {
        hand: Handedness,
        object: ObjectId,
        near_anchor: Option<AnchorId>,
    },
    Released {
        hand: Handedness,
        object: ObjectId,
        anchor: Option<AnchorId>,
    },
}

impl ManipulationEvent {
    pub fn hand(&self) -> Handedness {
        match self {
            ManipulationEvent::Highlighted { hand, .. }
            | ManipulationEvent::GrabStarted { hand, .. }
            | ManipulationEvent::Grabbed { hand, .. }
            | ManipulationEvent::Dropped { hand, .. }
            | ManipulationEvent::Released { hand, .. } => *hand,
        }
    }
}
