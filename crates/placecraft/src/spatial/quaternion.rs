//! Unit quaternions for orientation and rotation deltas

use serde::{Deserialize, Serialize};
use std::ops::Mul;

use super::{Vector3D, EPSILON};

/// A rotation quaternion (x, y, z imaginary, w real)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quaternion {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation of `angle_radians` about `axis` (normalized internally)
    pub fn from_axis_angle(axis: Vector3D, angle_radians: f32) -> Self {
        let axis = axis.normalize();
        let (sin_half, cos_half) = (angle_radians * 0.5).sin_cos();
        Self::new(axis.x * sin_half, axis.y * sin_half, axis.z * sin_half, cos_half)
    }

    /// Build from Euler angles in radians: `x` pitch, `y` yaw, `z` roll.
    ///
    /// Rotations compose as yaw * pitch * roll, so roll is applied first.
    pub fn from_euler(angles: Vector3D) -> Self {
        let yaw = Self::from_axis_angle(Vector3D::UP, angles.y);
        let pitch = Self::from_axis_angle(Vector3D::RIGHT, angles.x);
        let roll = Self::from_axis_angle(Vector3D::FORWARD, angles.z);
        yaw * pitch * roll
    }

    /// Inverse of [`Quaternion::from_euler`]; pitch is clamped to ±π/2
    pub fn to_euler(&self) -> Vector3D {
        let q = self.normalize();
        let (x, y, z, w) = (q.x, q.y, q.z, q.w);

        let m11 = 1.0 - 2.0 * (y * y + z * z);
        let m13 = 2.0 * (x * z + w * y);
        let m21 = 2.0 * (x * y + w * z);
        let m22 = 1.0 - 2.0 * (x * x + z * z);
        let m23 = 2.0 * (y * z - w * x);
        let m31 = 2.0 * (x * z - w * y);
        let m33 = 1.0 - 2.0 * (x * x + y * y);

        let pitch = (-m23.clamp(-1.0, 1.0)).asin();
        if m23.abs() < 0.999_999 {
            Vector3D::new(pitch, m13.atan2(m33), m21.atan2(m22))
        } else {
            // Gimbal lock: fold roll into yaw
            Vector3D::new(pitch, (-m31).atan2(m11), 0.0)
        }
    }

    /// Rotation axis and angle in `[0, π]`
    pub fn to_axis_angle(&self) -> (Vector3D, f32) {
        let mut q = self.normalize();
        if q.w < 0.0 {
            q = Self::new(-q.x, -q.y, -q.z, -q.w);
        }
        let angle = 2.0 * q.w.clamp(-1.0, 1.0).acos();
        let sin_half = (1.0 - q.w * q.w).max(0.0).sqrt();
        if sin_half < EPSILON {
            (Vector3D::UP, 0.0)
        } else {
            (Vector3D::new(q.x, q.y, q.z) * (1.0 / sin_half), angle)
        }
    }

    /// Magnitude of the rotation in radians, in `[0, π]`
    pub fn angle(&self) -> f32 {
        self.to_axis_angle().1
    }

    /// Twist part of the swing/twist decomposition about `axis`.
    ///
    /// This is the component of the rotation that turns around `axis`; the
    /// remaining swing is discarded.
    pub fn twist(&self, axis: Vector3D) -> Self {
        let axis = axis.normalize();
        let imaginary = Vector3D::new(self.x, self.y, self.z);
        let projected = axis * imaginary.dot(&axis);
        let twist = Self::new(projected.x, projected.y, projected.z, self.w);
        if twist.magnitude() < EPSILON {
            // 180° swing perpendicular to the axis carries no twist
            Self::IDENTITY
        } else {
            twist.normalize()
        }
    }

    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }

    pub fn normalize(&self) -> Self {
        let mag = self.magnitude();
        if mag > 0.0 {
            Self::new(self.x / mag, self.y / mag, self.z / mag, self.w / mag)
        } else {
            Self::IDENTITY
        }
    }

    /// Inverse rotation (conjugate scaled by the squared norm)
    pub fn inverse(&self) -> Self {
        let mag_sq = self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w;
        if mag_sq > 0.0 {
            let inv = 1.0 / mag_sq;
            Self::new(-self.x * inv, -self.y * inv, -self.z * inv, self.w * inv)
        } else {
            Self::IDENTITY
        }
    }

    pub fn rotate_vector(&self, v: Vector3D) -> Vector3D {
        let q_vec = Vector3D::new(self.x, self.y, self.z);
        let uv = q_vec.cross(&v);
        let uuv = q_vec.cross(&uv);
        v + (uv * self.w + uuv) * 2.0
    }

    /// True when both represent the same orientation within `tolerance`
    pub fn approx_eq(&self, other: &Quaternion, tolerance: f32) -> bool {
        let dot = self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w;
        (1.0 - dot.abs()) <= tolerance
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
