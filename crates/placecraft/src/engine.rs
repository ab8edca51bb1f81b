//! Interaction-thread owner of the scene and every engine component

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::gesture::{GestureStateMachine, InteractionObserver};
use crate::input::InputSample;
use crate::registry::{EntityRegistry, ManagedEntity};
use crate::scene::{ObjectId, RaycastHit, SceneGraph};
use crate::spatial::{Point3D, Vector3D};
use crate::surface::{SurfaceIndex, SurfaceSensor};

/// Bundles a scene with the registry, surface index and gesture machine
/// that operate on it. All methods run on the caller's thread; background
/// sensor and shape work only reaches the scene through [`Self::pump`] and
/// [`Self::settle`].
pub struct InteractionEngine<S: SceneGraph> {
    config: EngineConfig,
    scene: S,
    registry: EntityRegistry,
    surfaces: SurfaceIndex,
    gestures: GestureStateMachine,
}

impl<S: SceneGraph> InteractionEngine<S> {
    pub fn new(scene: S, config: EngineConfig) -> Self {
        Self {
            surfaces: SurfaceIndex::new(config.debug),
            gestures: GestureStateMachine::new(config.gesture, config.placement),
            registry: EntityRegistry::new(),
            scene,
            config,
        }
    }

    /// Replace the surface index, e.g. to use a custom shape builder
    pub fn with_surface_index(mut self, surfaces: SurfaceIndex) -> Self {
        self.surfaces = surfaces;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn surfaces(&self) -> &SurfaceIndex {
        &self.surfaces
    }

    pub fn gestures(&self) -> &GestureStateMachine {
        &self.gestures
    }

    pub fn add_observer(&mut self, observer: impl InteractionObserver + 'static) {
        self.gestures.add_observer(observer);
    }

    pub fn register(&mut self, object: ObjectId, name: impl Into<String>) -> ManagedEntity {
        self.registry.register(&mut self.scene, object, name)
    }

    pub fn unregister(&mut self, name: &str) -> Option<ManagedEntity> {
        self.registry.unregister(name)
    }

    /// Feed one input sample to the gesture machine
    pub fn handle_input(&mut self, sample: impl Into<InputSample>) {
        let sample = sample.into();
        self.gestures.handle(&mut self.scene, &self.registry, &sample);
    }

    /// Nearest hit along the ray that belongs to a registered entity
    pub fn pick(
        &self,
        origin: Point3D,
        direction: Vector3D,
    ) -> Option<(RaycastHit, &ManagedEntity)> {
        self.scene
            .raycast(origin, direction)
            .into_iter()
            .find_map(|hit| {
                self.registry
                    .resolve_owner(&self.scene, hit.object)
                    .map(|owner| (hit, owner))
            })
    }

    pub async fn start_detection(&mut self, sensor: Arc<dyn SurfaceSensor>) {
        self.surfaces.start(sensor).await;
    }

    pub async fn stop_detection(&mut self) {
        self.surfaces.stop(&mut self.scene).await;
    }

    pub fn is_detecting(&self) -> bool {
        self.surfaces.is_detecting()
    }

    pub fn set_visualization(&mut self, show: bool) {
        self.surfaces.set_visualization(&mut self.scene, show);
    }

    /// Apply whatever sensor output and shape builds are ready
    pub async fn pump(&mut self) {
        self.surfaces.pump(&mut self.scene).await;
    }

    /// Apply pending sensor output and wait for every outstanding build
    pub async fn settle(&mut self) {
        self.surfaces.settle(&mut self.scene).await;
    }

    pub fn into_scene(self) -> S {
        self.scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{MemoryScene, TriangleMesh};
    use crate::spatial::Transform;

    #[test]
    fn test_pick_resolves_registered_owner() {
        let mut scene = MemoryScene::new();
        let lamp = scene.spawn("lamp", None, Transform::from_position(Point3D::new(0.0, 1.0, 0.0)));
        scene.spawn_mesh(
            "shade",
            Some(lamp),
            Transform::IDENTITY,
            TriangleMesh::horizontal_quad(0.5, 0.5),
        );

        let mut engine = InteractionEngine::new(scene, EngineConfig::default());
        assert!(engine.pick(Point3D::new(0.0, 3.0, 0.0), Vector3D::DOWN).is_none());

        engine.register(lamp, "lamp");
        let (hit, owner) = engine.pick(Point3D::new(0.0, 3.0, 0.0), Vector3D::DOWN).unwrap();
        assert_eq!(owner.name, "lamp");
        assert!((hit.distance - 2.0).abs() < 0.0001);
    }
}
