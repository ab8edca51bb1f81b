//! In-process scene graph for simulation and tests

use std::collections::HashMap;
use std::sync::Arc;

use super::{CollisionShape, Material, ObjectId, RaycastHit, SceneGraph, TriangleMesh};
use crate::spatial::{Point3D, Transform, Vector3D};

#[derive(Debug, Clone)]
struct Node {
    name: String,
    parent: Option<ObjectId>,
    children: Vec<ObjectId>,
    local: Transform,
    mesh: Option<Arc<TriangleMesh>>,
    collision: Option<CollisionShape>,
    material: Option<Material>,
    input_target: bool,
}

/// Hierarchical scene with box/mesh hit-testing.
///
/// Transforms are stored parent-relative; world transforms are resolved on
/// demand by walking up the hierarchy.
#[derive(Debug, Default)]
pub struct MemoryScene {
    nodes: HashMap<ObjectId, Node>,
    next_id: u64,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn name(&self, object: ObjectId) -> Option<&str> {
        self.nodes.get(&object).map(|n| n.name.as_str())
    }

    pub fn material(&self, object: ObjectId) -> Option<Material> {
        self.nodes.get(&object).and_then(|n| n.material)
    }

    pub fn collision_shape(&self, object: ObjectId) -> Option<&CollisionShape> {
        self.nodes.get(&object).and_then(|n| n.collision.as_ref())
    }

    pub fn mesh(&self, object: ObjectId) -> Option<&Arc<TriangleMesh>> {
        self.nodes.get(&object).and_then(|n| n.mesh.as_ref())
    }

    pub fn is_input_target(&self, object: ObjectId) -> bool {
        self.nodes.get(&object).is_some_and(|n| n.input_target)
    }

    /// Spawn a child carrying `mesh` as its visual geometry
    pub fn spawn_mesh(
        &mut self,
        name: &str,
        parent: Option<ObjectId>,
        transform: Transform,
        mesh: TriangleMesh,
    ) -> ObjectId {
        let id = self.spawn(name, parent, transform);
        self.set_mesh(id, Some(Arc::new(mesh)));
        id
    }

    fn parent_world(&self, object: ObjectId) -> Transform {
        self.parent(object)
            .and_then(|p| self.world_transform(p))
            .unwrap_or(Transform::IDENTITY)
    }

    fn hit_object(
        &self,
        object: ObjectId,
        shape: &CollisionShape,
        origin: Point3D,
        direction: Vector3D,
    ) -> Option<RaycastHit> {
        let world = self.world_transform(object)?;
        let local_origin = world.inverse_transform_point(origin);
        let local_direction = world.inverse_transform_vector(direction).normalize();
        if local_direction == Vector3D::ZERO {
            return None;
        }

        let t = shape.ray_intersection(local_origin, local_direction)?;
        let position = world.transform_point(local_origin + local_direction * t);
        Some(RaycastHit {
            object,
            position,
            distance: origin.distance(&position),
        })
    }
}

impl SceneGraph for MemoryScene {
    fn contains(&self, object: ObjectId) -> bool {
        self.nodes.contains_key(&object)
    }

    fn parent(&self, object: ObjectId) -> Option<ObjectId> {
        self.nodes.get(&object).and_then(|n| n.parent)
    }

    fn children(&self, object: ObjectId) -> Vec<ObjectId> {
        self.nodes
            .get(&object)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn world_transform(&self, object: ObjectId) -> Option<Transform> {
        let node = self.nodes.get(&object)?;
        Some(match node.parent {
            Some(parent) => self
                .world_transform(parent)
                .unwrap_or(Transform::IDENTITY)
                .compose(&node.local),
            None => node.local,
        })
    }

    fn set_world_transform(&mut self, object: ObjectId, transform: Transform) {
        let parent_world = self.parent_world(object);
        if let Some(node) = self.nodes.get_mut(&object) {
            node.local = transform.relative_to(&parent_world);
        }
    }

    fn raycast(&self, origin: Point3D, direction: Vector3D) -> Vec<RaycastHit> {
        let direction = direction.normalize();
        let mut hits: Vec<RaycastHit> = self
            .nodes
            .iter()
            .filter_map(|(id, node)| {
                let shape = node.collision.as_ref()?;
                self.hit_object(*id, shape, origin, direction)
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    fn set_input_target(&mut self, object: ObjectId, enabled: bool) {
        if let Some(node) = self.nodes.get_mut(&object) {
            node.input_target = enabled;
        }
    }

    fn generate_collision_shapes(&mut self, object: ObjectId, recursive: bool) {
        let mut pending = vec![object];
        while let Some(id) = pending.pop() {
            let Some(node) = self.nodes.get_mut(&id) else {
                continue;
            };
            if let Some(mesh) = &node.mesh {
                node.collision = Some(CollisionShape::Box(mesh.bounds()));
            }
            if recursive {
                pending.extend(node.children.iter().copied());
            }
        }
    }

    fn set_collision_shape(&mut self, object: ObjectId, shape: Option<CollisionShape>) {
        if let Some(node) = self.nodes.get_mut(&object) {
            node.collision = shape;
        }
    }

    fn set_mesh(&mut self, object: ObjectId, mesh: Option<Arc<TriangleMesh>>) {
        if let Some(node) = self.nodes.get_mut(&object) {
            node.mesh = mesh;
        }
    }

    fn set_material(&mut self, object: ObjectId, material: Material) {
        if let Some(node) = self.nodes.get_mut(&object) {
            node.material = Some(material);
        }
    }

    fn spawn(&mut self, name: &str, parent: Option<ObjectId>, transform: Transform) -> ObjectId {
        self.next_id += 1;
        let id = ObjectId(self.next_id);
        let parent = parent.filter(|p| self.nodes.contains_key(p));
        if let Some(parent_node) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent_node.children.push(id);
        }
        self.nodes.insert(
            id,
            Node {
                name: name.to_string(),
                parent,
                children: Vec::new(),
                local: transform,
                mesh: None,
                collision: None,
                material: None,
                input_target: false,
            },
        );
        id
    }

    fn despawn(&mut self, object: ObjectId) {
        let Some(node) = self.nodes.remove(&object) else {
            return;
        };
        if let Some(parent) = node.parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|c| *c != object);
        }
        for child in node.children {
            self.despawn(child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::Quaternion;

    #[test]
    fn test_child_follows_parent() {
        let mut scene = MemoryScene::new();
        let parent = scene.spawn(
            "parent",
            None,
            Transform::from_position(Point3D::new(1.0, 0.0, 0.0)),
        );
        let child = scene.spawn(
            "child",
            Some(parent),
            Transform::from_position(Point3D::new(0.0, 1.0, 0.0)),
        );

        scene.set_world_transform(parent, Transform::from_position(Point3D::new(5.0, 0.0, 0.0)));
        let world = scene.world_transform(child).unwrap();
        assert!(world.position.distance(&Point3D::new(5.0, 1.0, 0.0)) < 0.0001);
    }

    #[test]
    fn test_set_world_transform_under_rotated_parent() {
        let mut scene = MemoryScene::new();
        let parent = scene.spawn(
            "parent",
            None,
            Transform::from_position_rotation(
                Point3D::new(0.0, 2.0, 0.0),
                Quaternion::from_axis_angle(Vector3D::UP, 1.0),
            ),
        );
        let child = scene.spawn("child", Some(parent), Transform::IDENTITY);
        let target = Point3D::new(3.0, 1.0, -2.0);
        scene.set_world_transform(child, Transform::from_position(target));

        let world = scene.world_transform(child).unwrap();
        assert!(world.position.distance(&target) < 0.0001);
        assert!(world.rotation.approx_eq(&Quaternion::IDENTITY, 0.0001));
    }

    #[test]
    fn test_raycast_orders_hits() {
        let mut scene = MemoryScene::new();
        let floor = scene.spawn_mesh(
            "floor",
            None,
            Transform::IDENTITY,
            TriangleMesh::horizontal_quad(4.0, 4.0),
        );
        let table = scene.spawn_mesh(
            "table",
            None,
            Transform::from_position(Point3D::new(0.0, 0.7, 0.0)),
            TriangleMesh::horizontal_quad(1.0, 1.0),
        );
        scene.generate_collision_shapes(floor, false);
        scene.generate_collision_shapes(table, false);

        let hits = scene.raycast(Point3D::new(0.0, 2.0, 0.0), Vector3D::DOWN);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].object, table);
        assert!((hits[0].distance - 1.3).abs() < 0.0001);
        assert_eq!(hits[1].object, floor);
        assert!((hits[1].position.y).abs() < 0.0001);
    }

    #[test]
    fn test_raycast_respects_scale() {
        let mut scene = MemoryScene::new();
        let pad = scene.spawn_mesh(
            "pad",
            None,
            Transform::from_position(Point3D::new(0.0, 1.0, 0.0)).with_scale(Vector3D::splat(4.0)),
            TriangleMesh::horizontal_quad(1.0, 1.0),
        );
        scene.generate_collision_shapes(pad, false);

        // Outside the unscaled quad, inside the scaled one
        let hits = scene.raycast(Point3D::new(1.5, 3.0, 0.0), Vector3D::DOWN);
        assert_eq!(hits.len(), 1);
        assert!((hits[0].distance - 2.0).abs() < 0.0001);
    }

    #[test]
    fn test_despawn_removes_subtree() {
        let mut scene = MemoryScene::new();
        let root = scene.spawn("root", None, Transform::IDENTITY);
        let child = scene.spawn("child", Some(root), Transform::IDENTITY);
        let grandchild = scene.spawn("grandchild", Some(child), Transform::IDENTITY);
        let other = scene.spawn("other", None, Transform::IDENTITY);

        scene.despawn(child);
        assert!(!scene.contains(child));
        assert!(!scene.contains(grandchild));
        assert!(scene.children(root).is_empty());
        assert!(scene.contains(other));
        assert_eq!(scene.len(), 2);
    }
}
