//! Rigid transforms (position, rotation, scale)

use serde::{Deserialize, Serialize};

use super::{Point3D, Quaternion, Vector3D};

/// Position + rotation + scale of a node relative to its parent.
///
/// Composition assumes uniform (or axis-aligned) scale, which is all the
/// engine produces; sheared results of non-uniform parent scale are not modelled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Point3D,
    pub rotation: Quaternion,
    pub scale: Vector3D,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            position: Point3D::ORIGIN,
            rotation: Quaternion::IDENTITY,
            scale: Vector3D::ONE,
        }
    }

    pub fn from_position(position: Point3D) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    pub fn from_position_rotation(position: Point3D, rotation: Quaternion) -> Self {
        Self {
            position,
            rotation,
            ..Self::identity()
        }
    }

    pub fn with_scale(mut self, scale: Vector3D) -> Self {
        self.scale = scale;
        self
    }

    pub fn forward(&self) -> Vector3D {
        self.rotation.forward()
    }

    /// Local point to the space this transform is expressed in
    pub fn transform_point(&self, local: Point3D) -> Point3D {
        let scaled = local.to_vector().mul_elements(&self.scale);
        self.position + self.rotation.rotate_vector(scaled)
    }

    /// Direction vectors ignore position and scale
    pub fn transform_direction(&self, direction: Vector3D) -> Vector3D {
        self.rotation.rotate_vector(direction)
    }

    pub fn inverse_transform_point(&self, world: Point3D) -> Point3D {
        let unrotated = self.rotation.inverse().rotate_vector(world - self.position);
        unrotated.div_elements(&self.scale).to_point()
    }

    pub fn inverse_transform_direction(&self, direction: Vector3D) -> Vector3D {
        self.rotation.inverse().rotate_vector(direction)
    }

    /// `self * child`: the world transform of a node whose parent is at `self`
    pub fn compose(&self, child: &Transform) -> Transform {
        Transform {
            position: self.transform_point(child.position),
            rotation: (self.rotation * child.rotation).normalize(),
            scale: self.scale.mul_elements(&child.scale),
        }
    }

    pub fn inverse(&self) -> Transform {
        let rotation = self.rotation.inverse();
        let scale = self.scale.recip();
        let position = rotation
            .rotate_vector(-self.position.to_vector())
            .mul_elements(&scale)
            .to_point();
        Transform {
            position,
            rotation,
            scale,
        }
    }

    /// Express this (world) transform in the frame of `parent_world`
    pub fn relative_to(&self, parent_world: &Transform) -> Transform {
        parent_world.inverse().compose(self)
    }

    pub fn translate(&mut self, offset: Vector3D) {
        self.position = self.position + offset;
    }

    /// Position and rotation match within tolerance
    pub fn approx_eq(&self, other: &Transform) -> bool {
        self.position.approx_eq(&other.position) && self.rotation.approx_eq(&other.rotation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
