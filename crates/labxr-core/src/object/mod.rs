//! Manipulable objects: kinds, behaviors, construction and pooling

mod behavior;
mod factory;
mod kind;
mod manipulable;
mod pool;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use behavior::{Hook, HookContext, NoBehavior, ObjectBehavior, ToggleBehavior};
pub use factory::{BehaviorCtor, ObjectFactory};
pub use kind::ObjectKind;
pub use manipulable::{InteractionPoint, ManipulableObject, ObjectHit};
pub use pool::ObjectPool;

/// Pool handle of a manipulable object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub(crate) u64);

impl ObjectId {
    /// Id carried by objects that were never added to a pool
    pub const UNREGISTERED: ObjectId = ObjectId(0);

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object#{}", self.0)
    }
}
