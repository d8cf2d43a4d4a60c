//! Rays for controller pointing and hit testing

use super::{NodeId, Point3D, Transform, Vector3D};

/// A half-line with a unit direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3D,
    pub direction: Vector3D,
}

impl Ray {
    /// The direction is normalized on construction
    pub fn new(origin: Point3D, direction: Vector3D) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Ray leaving a pose along its forward axis
    pub fn from_pose(pose: &Transform) -> Self {
        Self::new(pose.position, pose.forward())
    }

    pub fn at(&self, t: f32) -> Point3D {
        self.origin + self.direction * t
    }

    /// Re-express a world ray in the local space of a node placed at `world`.
    ///
    /// The local direction is not renormalized so that the ray parameter stays
    /// proportional under uniform scale.
    pub fn to_local(&self, world: &Transform) -> Ray {
        Ray {
            origin: world.inverse_transform_point(self.origin),
            direction: world
                .inverse_transform_direction(self.direction)
                .div_elements(&world.scale),
        }
    }
}

/// A ray intersection with a scene node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Node whose bounds were hit
    pub node: NodeId,
    /// World-space hit point
    pub point: Point3D,
    /// World-space distance from the ray origin
    pub distance: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bounds, Quaternion};
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_from_pose_follows_rotation() {
        let pose = Transform::from_position_rotation(
            Point3D::ORIGIN,
            Quaternion::from_axis_angle(Vector3D::UP, FRAC_PI_2),
        );
        let ray = Ray::from_pose(&pose);
        assert!((ray.direction.x - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_local_ray_keeps_hit_point() {
        let node = Transform::from_position(Point3D::new(0.0, 0.0, 4.0)).with_scale(Vector3D::splat(2.0));
        let bounds = Bounds::aabb_centered(Point3D::ORIGIN, Vector3D::splat(0.5));
        let ray = Ray::new(Point3D::ORIGIN, Vector3D::FORWARD);

        let local = ray.to_local(&node);
        let t = bounds.ray_distance(&local).unwrap();
        let world_hit = node.transform_point(local.at(t));
        assert!(world_hit.approx_eq(&Point3D::new(0.0, 0.0, 3.0)));
    }
}
