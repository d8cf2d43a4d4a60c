//! Unit quaternions for orientations

use serde::{Deserialize, Serialize};
use std::ops::Mul;

use super::Vector3D;

/// An orientation in 3D space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quaternion {
    /// No rotation
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation of `angle_radians` around `axis`
    pub fn from_axis_angle(axis: Vector3D, angle_radians: f32) -> Self {
        let (sin_half, cos_half) = (angle_radians * 0.5).sin_cos();
        let axis = axis.normalize();
        Self::new(axis.x * sin_half, axis.y * sin_half, axis.z * sin_half, cos_half)
    }

    /// Yaw around +Y followed by pitch around the rotated +X
    pub fn from_yaw_pitch(yaw: f32, pitch: f32) -> Self {
        Self::from_axis_angle(Vector3D::UP, yaw) * Self::from_axis_angle(Vector3D::RIGHT, pitch)
    }

    fn dot(&self, other: &Quaternion) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    pub fn magnitude(&self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn normalize(&self) -> Self {
        let mag = self.magnitude();
        if mag > f32::EPSILON {
            Self::new(self.x / mag, self.y / mag, self.z / mag, self.w / mag)
        } else {
            Self::IDENTITY
        }
    }

    pub fn conjugate(&self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Inverse rotation; equals the conjugate for unit quaternions
    pub fn inverse(&self) -> Self {
        let mag_sq = self.dot(self);
        if mag_sq > f32::EPSILON {
            let c = self.conjugate();
            Self::new(c.x / mag_sq, c.y / mag_sq, c.z / mag_sq, c.w / mag_sq)
        } else {
            Self::IDENTITY
        }
    }

    pub fn rotate_vector(&self, v: Vector3D) -> Vector3D {
        let q = Vector3D::new(self.x, self.y, self.z);
        let uv = q.cross(&v);
        let uuv = q.cross(&uv);
        v + (uv * self.w + uuv) * 2.0
    }

    /// Angle in radians of the rotation that takes `self` to `other`
    pub fn angle_to(&self, other: &Quaternion) -> f32 {
        let d = self.normalize().dot(&other.normalize()).abs().min(1.0);
        2.0 * d.acos()
    }

    /// Same orientation within a small angular tolerance (q and -q are equal)
    pub fn approx_eq(&self, other: &Quaternion) -> bool {
        self.angle_to(other) < 5e-3
    }

    pub fn forward(&self) -> Vector3D {
        self.rotate_vector(Vector3D::FORWARD)
    }

    pub fn up(&self) -> Vector3D {
        self.rotate_vector(Vector3D::UP)
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Quaternion {
    type Output = Quaternion;

    fn mul(self, rhs: Self) -> Self::Output {
        Quaternion::new(
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_quarter_turn_about_up() {
        let q = Quaternion::from_axis_angle(Vector3D::UP, FRAC_PI_2);
        let v = q.rotate_vector(Vector3D::FORWARD);
        assert!((v.x - 1.0).abs() < 0.0001);
        assert!(v.z.abs() < 0.0001);
    }

    #[test]
    fn test_inverse_cancels() {
        let q = Quaternion::from_yaw_pitch(0.7, -0.3);
        assert!((q * q.inverse()).approx_eq(&Quaternion::IDENTITY));
    }

    #[test]
    fn test_approx_eq_ignores_sign() {
        let q = Quaternion::from_axis_angle(Vector3D::RIGHT, 0.4);
        let neg = Quaternion::new(-q.x, -q.y, -q.z, -q.w);
        assert!(q.approx_eq(&neg));
        assert!(!q.approx_eq(&Quaternion::IDENTITY));
    }
}
