//! Indexed triangle meshes used for visuals and static colliders

use crate::error::ShapeError;
use crate::spatial::{Bounds, Point3D, Vector3D};

/// Validated, indexed triangle mesh in some local space
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleMesh {
    vertices: Vec<Point3D>,
    faces: Vec<[u32; 3]>,
    bounds: Bounds,
}

impl TriangleMesh {
    /// Validate indices and precompute bounds
    pub fn new(vertices: Vec<Point3D>, faces: Vec<[u32; 3]>) -> Result<Self, ShapeError> {
        if faces.is_empty() {
            return Err(ShapeError::EmptyGeometry);
        }
        for (face_index, face) in faces.iter().enumerate() {
            if let Some(&index) = face.iter().find(|&&i| i as usize >= vertices.len()) {
                return Err(ShapeError::IndexOutOfBounds {
                    face: face_index,
                    index,
                    vertex_count: vertices.len(),
                });
            }
        }
        let bounds = Bounds::from_points(vertices.iter()).ok_or(ShapeError::EmptyGeometry)?;

        Ok(Self {
            vertices,
            faces,
            bounds,
        })
    }

    /// Axis-aligned quad in the XZ plane, centered on the origin
    pub fn horizontal_quad(width: f32, depth: f32) -> Self {
        let (hw, hd) = (width / 2.0, depth / 2.0);
        Self {
            vertices: vec![
                Point3D::new(-hw, 0.0, -hd),
                Point3D::new(hw, 0.0, -hd),
                Point3D::new(hw, 0.0, hd),
                Point3D::new(-hw, 0.0, hd),
            ],
            faces: vec![[0, 1, 2], [0, 2, 3]],
            bounds: Bounds::new(Point3D::new(-hw, 0.0, -hd), Point3D::new(hw, 0.0, hd)),
        }
    }

    pub fn vertices(&self) -> &[Point3D] {
        &self.vertices
    }

    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn triangle(&self, face: &[u32; 3]) -> [Point3D; 3] {
        face.map(|i| self.vertices[i as usize])
    }

    /// Nearest two-sided triangle hit along a normalized ray
    pub fn ray_intersection(&self, origin: Point3D, direction: Vector3D) -> Option<f32> {
        self.bounds.expand(1.0e-4).ray_intersection(origin, direction)?;

        self.faces
            .iter()
            .filter_map(|face| ray_triangle(origin, direction, self.triangle(face)))
            .min_by(f32::total_cmp)
    }
}

/// Möller–Trumbore intersection, culling nothing
fn ray_triangle(origin: Point3D, direction: Vector3D, [a, b, c]: [Point3D; 3]) -> Option<f32> {
    const PARALLEL: f32 = 1.0e-7;

    let edge1 = b - a;
    let edge2 = c - a;
    let p = direction.cross(&edge2);
    let det = edge1.dot(&p);
    if det.abs() < PARALLEL {
        return None;
    }
    let inv_det = 1.0 / det;
    let s = origin - a;
    let u = s.dot(&p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(&edge1);
    let v = direction.dot(&q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = edge2.dot(&q) * inv_det;
    (t >= 0.0).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_indices() {
        let err = TriangleMesh::new(vec![Point3D::ORIGIN], vec![[0, 1, 2]]).unwrap_err();
        assert_eq!(
            err,
            ShapeError::IndexOutOfBounds {
                face: 0,
                index: 1,
                vertex_count: 1
            }
        );
        assert_eq!(
            TriangleMesh::new(vec![], vec![]).unwrap_err(),
            ShapeError::EmptyGeometry
        );
    }

    #[test]
    fn test_quad_hit_from_above() {
        let quad = TriangleMesh::horizontal_quad(2.0, 2.0);
        let hit = quad.ray_intersection(Point3D::new(0.3, 1.0, -0.2), Vector3D::DOWN);
        assert!((hit.unwrap() - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_quad_miss_outside_footprint() {
        let quad = TriangleMesh::horizontal_quad(2.0, 2.0);
        assert!(quad
            .ray_intersection(Point3D::new(1.5, 1.0, 0.0), Vector3D::DOWN)
            .is_none());
        assert!(quad
            .ray_intersection(Point3D::new(0.0, -1.0, 0.0), Vector3D::DOWN)
            .is_none());
    }
}
