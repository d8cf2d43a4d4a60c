//! labxr - spatial anchoring and object manipulation for a virtual wet lab
//!
//! This crate re-exports the workspace members so applications can depend on
//! a single package:
//!
//! - [`spatial`]: vectors, quaternions, bounds and the scene arena
//! - [`input`]: controller events, gamepad edges and the keyboard simulator
//! - [`config`]: TOML configuration loading
//! - [`engine`]: anchors, manipulable objects and the grab state machine

pub use labxr_config as config;
pub use labxr_core as engine;
pub use labxr_input as input;
pub use labxr_spatial as spatial;

pub use labxr_config::LabConfig;
pub use labxr_core::{
    AnchorRegistry, Lab, ManipulationController, ManipulationEvent, ObjectPool, Workspace,
};
