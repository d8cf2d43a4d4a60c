//! Positions in world or local space

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

use super::Vector3D;

/// A position in 3D space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3D {
    /// Origin point (0, 0, 0)
    pub const ORIGIN: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Point3D) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Squared distance, for comparisons that do not need the real length
    pub fn distance_squared(&self, other: &Point3D) -> f32 {
        (*self - *other).magnitude_squared()
    }

    /// Linear interpolation between two points
    pub fn lerp(&self, other: &Point3D, t: f32) -> Self {
        *self + (*other - *self) * t
    }

    /// Move toward `target` by at most `max_step` units.
    ///
    /// Returns the new point and whether the target was reached.
    pub fn step_toward(&self, target: &Point3D, max_step: f32) -> (Point3D, bool) {
        let delta = *target - *self;
        let remaining = delta.magnitude();
        if remaining < max_step {
            (*target, true)
        } else {
            (*self + delta.normalize() * max_step, false)
        }
    }

    /// Component-wise comparison within [`crate::EPSILON`]
    pub fn approx_eq(&self, other: &Point3D) -> bool {
        self.distance(other) < crate::EPSILON
    }

    /// Vector from the origin to this point
    pub fn to_vector(&self) -> Vector3D {
        Vector3D::new(self.x, self.y, self.z)
    }
}

impl Add<Vector3D> for Point3D {
    type Output = Point3D;

    fn add(self, rhs: Vector3D) -> Self::Output {
        Point3D::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub<Vector3D> for Point3D {
    type Output = Point3D;

    fn sub(self, rhs: Vector3D) -> Self::Output {
        Point3D::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Sub for Point3D {
    type Output = Vector3D;

    fn sub(self, rhs: Self) -> Self::Output {
        Vector3D::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}
