//! Contract with the rendering/scene-graph runtime
//!
//! The engine never owns object lifetimes or renders anything itself; every
//! transform read/write, hierarchy walk and hit-test goes through
//! [`SceneGraph`]. [`MemoryScene`] is a complete in-process implementation
//! used for simulation and tests.

mod material;
mod memory;
mod mesh;

pub use material::{Color, Material};
pub use memory::MemoryScene;
pub use mesh::TriangleMesh;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::spatial::{Bounds, Point3D, Transform, Vector3D};

/// Identity of an object in the scene runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One result of a scene hit-test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    pub object: ObjectId,
    /// Hit point in scene space
    pub position: Point3D,
    /// Distance from the ray origin, in scene units
    pub distance: f32,
}

/// Collider attached to an object, expressed in the object's local space
#[derive(Debug, Clone, PartialEq)]
pub enum CollisionShape {
    /// Conservative box approximation
    Box(Bounds),
    /// Exact static triangle mesh
    StaticMesh(Arc<TriangleMesh>),
}

impl CollisionShape {
    pub fn local_bounds(&self) -> Bounds {
        match self {
            CollisionShape::Box(bounds) => *bounds,
            CollisionShape::StaticMesh(mesh) => mesh.bounds(),
        }
    }

    /// Local-space ray test; `direction` must be normalized
    pub fn ray_intersection(&self, origin: Point3D, direction: Vector3D) -> Option<f32> {
        match self {
            CollisionShape::Box(bounds) => bounds.ray_intersection(origin, direction),
            CollisionShape::StaticMesh(mesh) => mesh.ray_intersection(origin, direction),
        }
    }
}

/// Operations the engine consumes from the scene runtime.
///
/// Implementations are driven from a single interaction thread; none of these
/// calls need to be thread-safe.
pub trait SceneGraph {
    /// Whether the object is still alive in the scene
    fn contains(&self, object: ObjectId) -> bool;

    fn parent(&self, object: ObjectId) -> Option<ObjectId>;

    fn children(&self, object: ObjectId) -> Vec<ObjectId>;

    fn world_transform(&self, object: ObjectId) -> Option<Transform>;

    fn set_world_transform(&mut self, object: ObjectId, transform: Transform);

    /// All collider hits along the ray, nearest first
    fn raycast(&self, origin: Point3D, direction: Vector3D) -> Vec<RaycastHit>;

    /// Mark an object as able to receive pointer/hand input
    fn set_input_target(&mut self, object: ObjectId, enabled: bool);

    /// Derive conservative colliders from the object's visual geometry
    fn generate_collision_shapes(&mut self, object: ObjectId, recursive: bool);

    fn set_collision_shape(&mut self, object: ObjectId, shape: Option<CollisionShape>);

    fn set_mesh(&mut self, object: ObjectId, mesh: Option<Arc<TriangleMesh>>);

    fn set_material(&mut self, object: ObjectId, material: Material);

    /// Create a new object, optionally parented
    fn spawn(&mut self, name: &str, parent: Option<ObjectId>, transform: Transform) -> ObjectId;

    /// Remove an object and its descendants
    fn despawn(&mut self, object: ObjectId);

    /// Walk from `object`'s parent up to the scene root
    fn ancestors(&self, object: ObjectId) -> Vec<ObjectId> {
        let mut chain = Vec::new();
        let mut current = self.parent(object);
        while let Some(node) = current {
            chain.push(node);
            current = self.parent(node);
        }
        chain
    }

    /// True when `object` is `ancestor` or lies below it
    fn is_within(&self, object: ObjectId, ancestor: ObjectId) -> bool {
        object == ancestor || self.ancestors(object).contains(&ancestor)
    }
}
