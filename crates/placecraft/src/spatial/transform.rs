//! Position + rotation + scale, and its 4x4 affine matrix form

use serde::{Deserialize, Serialize};

use super::{Point3D, Quaternion, Vector3D, EPSILON};

/// Column-major 4x4 affine matrix, `m[column][row]`
pub type Matrix4 = [[f32; 4]; 4];

/// A scene object's transform. Scale is applied first, then rotation, then
/// translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Point3D,
    pub rotation: Quaternion,
    pub scale: Vector3D,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Point3D::ORIGIN,
        rotation: Quaternion::IDENTITY,
        scale: Vector3D::ONE,
    };

    pub fn from_position(position: Point3D) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn from_position_rotation(position: Point3D, rotation: Quaternion) -> Self {
        Self {
            position,
            rotation,
            scale: Vector3D::ONE,
        }
    }

    pub fn with_position(mut self, position: Point3D) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Quaternion) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vector3D) -> Self {
        self.scale = scale;
        self
    }

    /// Local point to the space this transform lives in
    pub fn transform_point(&self, local: Point3D) -> Point3D {
        self.position + self.transform_vector(local.to_vector())
    }

    /// Scale and rotate a vector, ignoring translation
    pub fn transform_vector(&self, v: Vector3D) -> Vector3D {
        self.rotation.rotate_vector(v.component_mul(&self.scale))
    }

    /// Rotate a direction, ignoring translation and scale
    pub fn transform_direction(&self, direction: Vector3D) -> Vector3D {
        self.rotation.rotate_vector(direction)
    }

    pub fn inverse_transform_point(&self, world: Point3D) -> Point3D {
        self.inverse_transform_vector(world - self.position).to_point()
    }

    pub fn inverse_transform_vector(&self, v: Vector3D) -> Vector3D {
        self.rotation
            .inverse()
            .rotate_vector(v)
            .component_div(&self.scale)
    }

    /// Compose with a child's local transform, yielding the child's transform
    /// in this transform's parent space.
    pub fn compose(&self, local: &Transform) -> Transform {
        Transform {
            position: self.transform_point(local.position),
            rotation: (self.rotation * local.rotation).normalize(),
            scale: self.scale.component_mul(&local.scale),
        }
    }

    /// Inverse of [`Transform::compose`]: the local transform that, composed
    /// under `parent`, yields `self`.
    pub fn relative_to(&self, parent: &Transform) -> Transform {
        Transform {
            position: parent.inverse_transform_point(self.position),
            rotation: (parent.rotation.inverse() * self.rotation).normalize(),
            scale: self.scale.component_div(&parent.scale),
        }
    }

    pub fn to_matrix(&self) -> Matrix4 {
        let x = self.transform_vector(Vector3D::RIGHT);
        let y = self.transform_vector(Vector3D::UP);
        let z = self.transform_vector(Vector3D::FORWARD);
        let p = self.position;
        [
            [x.x, x.y, x.z, 0.0],
            [y.x, y.y, y.z, 0.0],
            [z.x, z.y, z.z, 0.0],
            [p.x, p.y, p.z, 1.0],
        ]
    }

    /// Decompose an affine matrix without shear. Zero-length basis columns
    /// decompose to zero scale on that axis.
    pub fn from_matrix(m: &Matrix4) -> Self {
        let column = |i: usize| Vector3D::new(m[i][0], m[i][1], m[i][2]);
        let (cx, cy, cz) = (column(0), column(1), column(2));
        let scale = Vector3D::new(cx.magnitude(), cy.magnitude(), cz.magnitude());
        let rotation = rotation_from_basis(cx.normalize(), cy.normalize(), cz.normalize());

        Self {
            position: Point3D::new(m[3][0], m[3][1], m[3][2]),
            rotation,
            scale,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

fn rotation_from_basis(x: Vector3D, y: Vector3D, z: Vector3D) -> Quaternion {
    let (m00, m01, m02) = (x.x, y.x, z.x);
    let (m10, m11, m12) = (x.y, y.y, z.y);
    let (m20, m21, m22) = (x.z, y.z, z.z);
    let trace = m00 + m11 + m22;

    let q = if trace > 0.0 {
        let s = (trace + 1.0).sqrt() * 2.0;
        Quaternion::new((m21 - m12) / s, (m02 - m20) / s, (m10 - m01) / s, 0.25 * s)
    } else if m00 > m11 && m00 > m22 {
        let s = (1.0 + m00 - m11 - m22).max(EPSILON).sqrt() * 2.0;
        Quaternion::new(0.25 * s, (m01 + m10) / s, (m02 + m20) / s, (m21 - m12) / s)
    } else if m11 > m22 {
        let s = (1.0 + m11 - m00 - m22).max(EPSILON).sqrt() * 2.0;
        Quaternion::new((m01 + m10) / s, 0.25 * s, (m12 + m21) / s, (m02 - m20) / s)
    } else {
        let s = (1.0 + m22 - m00 - m11).max(EPSILON).sqrt() * 2.0;
        Quaternion::new((m02 + m20) / s, (m12 + m21) / s, 0.25 * s, (m10 - m01) / s)
    };
    q.normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn assert_point_close(a: Point3D, b: Point3D) {
        assert!(a.distance(&b) < 0.0001, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_transform_point() {
        let t = Transform::from_position(Point3D::new(10.0, 0.0, 0.0))
            .with_scale(Vector3D::splat(2.0));
        assert_point_close(
            t.transform_point(Point3D::new(1.0, 0.0, 0.0)),
            Point3D::new(12.0, 0.0, 0.0),
        );
    }

    #[test]
    fn test_inverse_transform() {
        let t = Transform::from_position(Point3D::new(5.0, 5.0, 5.0))
            .with_rotation(Quaternion::from_axis_angle(Vector3D::UP, 0.7))
            .with_scale(Vector3D::new(2.0, 1.0, 3.0));
        let local = Point3D::new(1.0, -2.0, 0.5);
        assert_point_close(t.inverse_transform_point(t.transform_point(local)), local);
    }

    #[test]
    fn test_compose_and_relative() {
        let parent = Transform::from_position_rotation(
            Point3D::new(0.0, 1.0, 0.0),
            Quaternion::from_axis_angle(Vector3D::UP, FRAC_PI_2),
        );
        let local = Transform::from_position(Point3D::new(0.0, 0.0, 1.0));
        let world = parent.compose(&local);
        assert_point_close(world.position, Point3D::new(1.0, 1.0, 0.0));

        let back = world.relative_to(&parent);
        assert_point_close(back.position, local.position);
        assert!(back.rotation.approx_eq(&Quaternion::IDENTITY, 0.0001));
    }

    #[test]
    fn test_matrix_round_trip() {
        let t = Transform::from_position(Point3D::new(1.0, 2.0, 3.0))
            .with_rotation(Quaternion::from_euler(Vector3D::new(0.2, 1.3, -0.4)))
            .with_scale(Vector3D::new(1.5, 0.5, 2.0));
        let back = Transform::from_matrix(&t.to_matrix());
        assert_point_close(back.position, t.position);
        assert!(back.rotation.approx_eq(&t.rotation, 0.0001));
        assert!((back.scale - t.scale).magnitude() < 0.0001);
    }
}
