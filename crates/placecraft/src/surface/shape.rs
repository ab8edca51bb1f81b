//! Collider generation from patch geometry

use std::sync::Arc;

use async_trait::async_trait;

use super::PatchGeometry;
use crate::error::ShapeError;
use crate::scene::{CollisionShape, TriangleMesh};

/// Builds a static collider for a patch. Builds can be slow and always run
/// off the interaction thread.
#[async_trait]
pub trait ShapeBuilder: Send + Sync {
    async fn build(&self, geometry: Arc<PatchGeometry>) -> Result<CollisionShape, ShapeError>;
}

/// Exact triangle-mesh collider, validated on the blocking pool
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticMeshBuilder;

#[async_trait]
impl ShapeBuilder for StaticMeshBuilder {
    async fn build(&self, geometry: Arc<PatchGeometry>) -> Result<CollisionShape, ShapeError> {
        let mesh = tokio::task::spawn_blocking(move || {
            TriangleMesh::new(geometry.vertices.clone(), geometry.faces.clone())
        })
        .await
        .map_err(|_| ShapeError::Cancelled)??;

        Ok(CollisionShape::StaticMesh(Arc::new(mesh)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::{Point3D, Vector3D};
    use crate::surface::SurfaceLabel;

    #[tokio::test]
    async fn test_builds_mesh_collider() {
        let geometry = Arc::new(PatchGeometry::rectangle(2.0, 2.0, SurfaceLabel::Floor));
        let shape = StaticMeshBuilder.build(geometry).await.unwrap();

        let hit = shape.ray_intersection(Point3D::new(0.0, 1.0, 0.0), Vector3D::DOWN);
        assert!((hit.unwrap() - 1.0).abs() < 0.0001);
    }

    #[tokio::test]
    async fn test_empty_geometry_fails() {
        let result = StaticMeshBuilder
            .build(Arc::new(PatchGeometry::default()))
            .await;
        assert_eq!(result.unwrap_err(), ShapeError::EmptyGeometry);
    }
}
