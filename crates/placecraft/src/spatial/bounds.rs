//! Axis-aligned bounds for collision approximations and ray tests

use serde::{Deserialize, Serialize};

use super::{Point3D, Vector3D};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Point3D,
    pub max: Point3D,
}

impl Bounds {
    pub fn new(min: Point3D, max: Point3D) -> Self {
        Self { min, max }
    }

    pub fn aabb_centered(center: Point3D, half_extents: Vector3D) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Tightest box around `points`, or `None` when there are none
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3D>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    pub fn contains(&self, point: Point3D) -> bool {
        (self.min.x..=self.max.x).contains(&point.x)
            && (self.min.y..=self.max.y).contains(&point.y)
            && (self.min.z..=self.max.z).contains(&point.z)
    }

    /// Grow the box by `margin` on every side
    pub fn expand(&self, margin: f32) -> Self {
        Self {
            min: self.min - Vector3D::splat(margin),
            max: self.max + Vector3D::splat(margin),
        }
    }

    /// Distance along a ray to the first intersection with this box.
    ///
    /// `direction` must be normalized. A ray starting inside hits at 0.
    pub fn ray_intersection(&self, origin: Point3D, direction: Vector3D) -> Option<f32> {
        let (min, max) = (self.min, self.max);
        let mut t_min = 0.0_f32;
        let mut t_max = f32::INFINITY;
        for (o, d, lo, hi) in [
            (origin.x, direction.x, min.x, max.x),
            (origin.y, direction.y, min.y, max.y),
            (origin.z, direction.z, min.z, max.z),
        ] {
            if d.abs() < f32::EPSILON {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let (t0, t1) = {
                let a = (lo - o) * inv;
                let b = (hi - o) * inv;
                if a <= b {
                    (a, b)
                } else {
                    (b, a)
                }
            };
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }
        Some(t_min)
    }
}
