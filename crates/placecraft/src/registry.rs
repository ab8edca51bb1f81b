//! Named entities that can receive gestures

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::scene::{ObjectId, SceneGraph};

/// Association between a name and a scene object. The registry never owns
/// the object's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManagedEntity {
    pub name: String,
    pub object: ObjectId,
}

/// Entity registry keyed by name
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: HashMap<String, ManagedEntity>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `object` under `name`, making it and its children
    /// hit-testable. Re-registering a name replaces the previous mapping.
    pub fn register<S: SceneGraph>(
        &mut self,
        scene: &mut S,
        object: ObjectId,
        name: impl Into<String>,
    ) -> ManagedEntity {
        let name = name.into();
        scene.set_input_target(object, true);
        scene.generate_collision_shapes(object, true);

        let entity = ManagedEntity {
            name: name.clone(),
            object,
        };
        if let Some(previous) = self.entities.insert(name.clone(), entity.clone()) {
            debug!(entity = %name, previous = %previous.object, "entity re-registered");
        }
        entity
    }

    /// Remove a mapping; unknown names are ignored
    pub fn unregister(&mut self, name: &str) -> Option<ManagedEntity> {
        self.entities.remove(name)
    }

    pub fn lookup(&self, name: &str) -> Option<&ManagedEntity> {
        self.entities.get(name)
    }

    /// Find the registered entity a raw hit belongs to: the hit object itself
    /// if registered, otherwise its nearest registered ancestor.
    ///
    /// An object registered under several names resolves to the
    /// lexicographically smallest one.
    pub fn resolve_owner<S: SceneGraph>(&self, scene: &S, hit: ObjectId) -> Option<&ManagedEntity> {
        if let Some(entity) = self.owning(hit) {
            return Some(entity);
        }
        scene
            .ancestors(hit)
            .into_iter()
            .find_map(|ancestor| self.owning(ancestor))
    }

    fn owning(&self, object: ObjectId) -> Option<&ManagedEntity> {
        self.entities
            .values()
            .filter(|entity| entity.object == object)
            .min_by(|a, b| a.name.cmp(&b.name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
