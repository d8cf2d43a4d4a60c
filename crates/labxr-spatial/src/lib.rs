//! Spatial primitives for the labxr manipulation engine
//!
//! Uses a right-handed coordinate system:
//! - X: Right (+) / Left (-)
//! - Y: Up (+) / Down (-)
//! - Z: Forward (+) / Backward (-)
//!
//! Besides the math types this crate hosts [`Scene`], a small arena of named
//! transform nodes. The manipulation engine only ever talks to the scene
//! through node ids: world pose, parenting, visibility and local extents.

mod bounds;
mod point3d;
mod quaternion;
mod ray;
mod scene;
mod transform;
mod vector3d;

pub use bounds::Bounds;
pub use point3d::Point3D;
pub use quaternion::Quaternion;
pub use ray::{Ray, RayHit};
pub use scene::{NodeId, Scene, SceneNode};
pub use transform::Transform;
pub use vector3d::Vector3D;

/// Tolerance used by the approximate comparisons in this crate
pub const EPSILON: f32 = 1e-4;
