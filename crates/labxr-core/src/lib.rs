//! Spatial anchoring and object manipulation engine
//!
//! A [`Workspace`] bundles the scene arena, the [`AnchorRegistry`] and the
//! [`ObjectPool`]. Each hand drives a [`ManipulationController`] that
//! highlights, grabs, carries and releases objects, snapping them onto the
//! nearest eligible anchor. [`Lab`] runs both controllers once per frame.

pub mod anchor;
pub mod error;
pub mod lab;
pub mod manipulation;
pub mod object;
pub mod workspace;

pub use anchor::{
    AnchorId, AnchorKind, AnchorNotice, AnchorPoint, AnchorRegistry, AnchorSurface, CapabilityFilter,
    CapabilityRule,
};
pub use error::{LabError, Result};
pub use lab::Lab;
pub use manipulation::{ControllerState, GrabSession, GrabState, ManipulationController, ManipulationEvent};
pub use object::{
    BehaviorCtor, Hook, HookContext, InteractionPoint, ManipulableObject, NoBehavior, ObjectBehavior, ObjectFactory,
    ObjectHit, ObjectId, ObjectKind, ObjectPool, ToggleBehavior,
};
pub use workspace::Workspace;

/// Check the parts of a configuration that depend on engine vocabulary
pub fn validate_config(config: &labxr_config::LabConfig) -> Result<()> {
    config.validate()?;
    config.validate_anchor_kinds(AnchorKind::ALL.iter().map(AnchorKind::name))?;
    Ok(())
}
