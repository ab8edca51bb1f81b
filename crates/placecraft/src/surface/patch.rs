//! Anchor snapshots from the sensor and the patches the index keeps for them

use std::sync::Arc;

use uuid::Uuid;

use super::SurfaceLabel;
use crate::scene::ObjectId;
use crate::spatial::{Matrix4, Point3D, Transform};

/// Sensor-assigned anchor identity
pub type PatchId = Uuid;

/// Triangulated geometry buffer of one anchor, in anchor-local space
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PatchGeometry {
    pub vertices: Vec<Point3D>,
    pub faces: Vec<[u32; 3]>,
    /// Optional per-face labels, parallel to `faces`
    pub classifications: Option<Vec<SurfaceLabel>>,
}

impl PatchGeometry {
    pub fn new(vertices: Vec<Point3D>, faces: Vec<[u32; 3]>) -> Self {
        Self {
            vertices,
            faces,
            classifications: None,
        }
    }

    pub fn with_classifications(mut self, labels: Vec<SurfaceLabel>) -> Self {
        self.classifications = Some(labels);
        self
    }

    /// Flat rectangle in the anchor's XZ plane, with every face labeled
    pub fn rectangle(width: f32, depth: f32, label: SurfaceLabel) -> Self {
        let (hw, hd) = (width / 2.0, depth / 2.0);
        Self::new(
            vec![
                Point3D::new(-hw, 0.0, -hd),
                Point3D::new(hw, 0.0, -hd),
                Point3D::new(hw, 0.0, hd),
                Point3D::new(-hw, 0.0, hd),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .with_classifications(vec![label; 2])
    }

    pub fn dominant_label(&self) -> SurfaceLabel {
        match &self.classifications {
            Some(labels) => SurfaceLabel::dominant(labels.iter().copied()),
            None => SurfaceLabel::None,
        }
    }
}

/// Immutable anchor state pushed by the sensor
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorSnapshot {
    pub id: PatchId,
    /// Anchor origin and orientation in scene space
    pub transform: Transform,
    pub geometry: Arc<PatchGeometry>,
}

impl AnchorSnapshot {
    pub fn new(id: PatchId, transform: Transform, geometry: PatchGeometry) -> Self {
        Self {
            id,
            transform,
            geometry: Arc::new(geometry),
        }
    }

    /// Snapshot from the sensor's 4x4 affine origin matrix
    pub fn from_matrix(id: PatchId, origin: &Matrix4, geometry: PatchGeometry) -> Self {
        Self::new(id, Transform::from_matrix(origin), geometry)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorEventKind {
    Added,
    Updated,
    Removed,
}

/// One delta from the sensor's anchor stream
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorEvent {
    pub kind: AnchorEventKind,
    pub anchor: AnchorSnapshot,
}

impl AnchorEvent {
    pub fn added(anchor: AnchorSnapshot) -> Self {
        Self {
            kind: AnchorEventKind::Added,
            anchor,
        }
    }

    pub fn updated(anchor: AnchorSnapshot) -> Self {
        Self {
            kind: AnchorEventKind::Updated,
            anchor,
        }
    }

    pub fn removed(anchor: AnchorSnapshot) -> Self {
        Self {
            kind: AnchorEventKind::Removed,
            anchor,
        }
    }

    pub fn id(&self) -> PatchId {
        self.anchor.id
    }
}

/// A surface patch the index currently represents in the scene
#[derive(Debug, Clone)]
pub struct SurfacePatch {
    pub id: PatchId,
    pub transform: Transform,
    pub geometry: Arc<PatchGeometry>,
    /// Mode of the per-face labels
    pub label: SurfaceLabel,
    /// Scene object carrying the collider and visual
    pub entity: ObjectId,
    /// Build generation this representation came from
    pub generation: u64,
}
