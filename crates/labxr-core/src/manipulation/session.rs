use labxr_spatial::{NodeId, Transform};

use crate::anchor::AnchorId;
use crate::object::ObjectId;

/// Phase of an ongoing grab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabState {
    /// Flying toward the hand
    Grabbing,
    /// Parented to the hand
    Grabbed,
    /// Flying back to an anchor or to where it was picked up
    Releasing,
}

/// One object's trip from its resting place into a hand and back
#[derive(Debug, Clone, PartialEq)]
pub struct GrabSession {
    pub object: ObjectId,
    pub state: GrabState,
    /// Frames spent in the current state
    pub elapsed_frames: u32,
    /// World units moved per frame while flying
    pub step: f32,
    /// World pose before the grab
    pub parking: Transform,
    pub original_parent: Option<NodeId>,
    pub near_anchor: Option<AnchorId>,
    pub placeholder: Option<NodeId>,
    /// Where a release flies to
    pub destination: Transform,
}

impl GrabSession {
    pub fn grabbing(
        object: ObjectId,
        step: f32,
        parking: Transform,
        original_parent: Option<NodeId>,
        placeholder: Option<NodeId>,
    ) -> Self {
        Self {
            object,
            state: GrabState::Grabbing,
            elapsed_frames: 0,
            step,
            parking,
            original_parent,
            near_anchor: None,
            placeholder,
            destination: parking,
        }
    }

    pub(crate) fn enter(&mut self, state: GrabState) {
        self.state = state;
        self.elapsed_frames = 0;
    }

    /// The hand still owns the object
    pub fn holding(&self) -> bool {
        matches!(self.state, GrabState::Grabbing | GrabState::Grabbed)
    }
}
