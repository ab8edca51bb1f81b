//! Live index of detected surface patches
//!
//! Sensor output and shape builds run on tokio tasks and only ever send
//! values back through channels. Scene state is touched exclusively from
//! [`SurfaceIndex::pump`], [`SurfaceIndex::settle`] and the other `&mut`
//! methods, which the owner calls from the interaction thread.

use std::collections::HashMap;
use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use super::{
    AnchorEvent, AnchorEventKind, AnchorSnapshot, AuthorizationStatus, PatchId, ProviderState,
    SensorStreams, SessionEvent, ShapeBuilder, StaticMeshBuilder, SurfaceLabel, SurfacePatch,
    SurfaceSensor,
};
use crate::config::DebugConfig;
use crate::error::ShapeError;
use crate::scene::{CollisionShape, Material, SceneGraph};

struct InFlight {
    generation: u64,
    handle: AbortHandle,
}

struct BuildResult {
    generation: u64,
    anchor: AnchorSnapshot,
    shape: Result<CollisionShape, ShapeError>,
}

enum Inbound {
    Anchor(AnchorEvent),
    Session(SessionEvent),
}

pub struct SurfaceIndex {
    debug: DebugConfig,
    builder: Arc<dyn ShapeBuilder>,
    patches: HashMap<PatchId, SurfacePatch>,
    next_generation: u64,
    in_flight: HashMap<PatchId, InFlight>,
    built_tx: UnboundedSender<BuildResult>,
    built_rx: UnboundedReceiver<BuildResult>,
    inbox_tx: UnboundedSender<Inbound>,
    inbox_rx: UnboundedReceiver<Inbound>,
    forwarders: Vec<AbortHandle>,
    sensor: Option<Arc<dyn SurfaceSensor>>,
    is_detecting: bool,
}

impl SurfaceIndex {
    pub fn new(debug: DebugConfig) -> Self {
        Self::with_builder(debug, Arc::new(StaticMeshBuilder))
    }

    pub fn with_builder(debug: DebugConfig, builder: Arc<dyn ShapeBuilder>) -> Self {
        let (built_tx, built_rx) = unbounded_channel();
        let (inbox_tx, inbox_rx) = unbounded_channel();
        Self {
            debug,
            builder,
            patches: HashMap::new(),
            next_generation: 0,
            in_flight: HashMap::new(),
            built_tx,
            built_rx,
            inbox_tx,
            inbox_rx,
            forwarders: Vec::new(),
            sensor: None,
            is_detecting: false,
        }
    }

    /// Start detection on `sensor`.
    ///
    /// Never fails: an unsupported sensor is left alone and a session that
    /// cannot start is logged (when debug logging is on). Either way
    /// [`SurfaceIndex::is_detecting`] stays false.
    pub async fn start(&mut self, sensor: Arc<dyn SurfaceSensor>) {
        if self.is_detecting {
            debug!("surface detection already running");
            return;
        }
        if !sensor.is_supported() {
            if self.debug.logging {
                debug!("surface reconstruction is not supported on this runtime");
            }
            return;
        }

        let streams = match sensor.start().await {
            Ok(streams) => streams,
            Err(err) => {
                if self.debug.logging {
                    warn!(error = %err, "failed to start surface detection");
                }
                return;
            }
        };

        let SensorStreams {
            mut anchors,
            mut session_events,
        } = streams;

        let inbox = self.inbox_tx.clone();
        let anchor_task = tokio::spawn(async move {
            while let Some(event) = anchors.next().await {
                if inbox.send(Inbound::Anchor(event)).is_err() {
                    break;
                }
            }
        });

        let inbox = self.inbox_tx.clone();
        let session_task = tokio::spawn(async move {
            while let Some(event) = session_events.next().await {
                if inbox.send(Inbound::Session(event)).is_err() {
                    break;
                }
            }
        });

        self.forwarders = vec![anchor_task.abort_handle(), session_task.abort_handle()];
        self.sensor = Some(sensor);
        self.is_detecting = true;
        info!("surface detection started");
    }

    /// Stop detection, cancel outstanding builds and remove every patch
    pub async fn stop<S: SceneGraph>(&mut self, scene: &mut S) {
        for handle in self.forwarders.drain(..) {
            handle.abort();
        }
        for (_, flight) in self.in_flight.drain() {
            flight.handle.abort();
        }
        // Fresh channels: a forwarder or build still finishing a send talks
        // to a receiver that no longer exists.
        let (inbox_tx, inbox_rx) = unbounded_channel();
        self.inbox_tx = inbox_tx;
        self.inbox_rx = inbox_rx;
        let (built_tx, built_rx) = unbounded_channel();
        self.built_tx = built_tx;
        self.built_rx = built_rx;

        if let Some(sensor) = self.sensor.take() {
            if let Err(err) = sensor.stop().await {
                if self.debug.logging {
                    warn!(error = %err, "surface sensor did not stop cleanly");
                }
            }
        }

        for (_, patch) in self.patches.drain() {
            scene.despawn(patch.entity);
        }
        if self.is_detecting {
            info!("surface detection stopped");
        }
        self.is_detecting = false;
    }

    /// Apply one anchor delta. Added and updated anchors schedule a shape
    /// build; the patch appears once the build is installed by `pump`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn apply<S: SceneGraph>(&mut self, scene: &mut S, event: AnchorEvent) {
        let id = event.id();
        debug!(patch_id = %id, kind = ?event.kind, "anchor event");
        match event.kind {
            AnchorEventKind::Added | AnchorEventKind::Updated => self.schedule_build(event.anchor),
            AnchorEventKind::Removed => {
                if let Some(flight) = self.in_flight.remove(&id) {
                    flight.handle.abort();
                }
                if let Some(patch) = self.patches.remove(&id) {
                    scene.despawn(patch.entity);
                }
            }
        }
    }

    fn schedule_build(&mut self, anchor: AnchorSnapshot) {
        self.next_generation += 1;
        let generation = self.next_generation;
        let id = anchor.id;

        let builder = self.builder.clone();
        let results = self.built_tx.clone();
        let geometry = anchor.geometry.clone();
        let build = tokio::spawn(async move { builder.build(geometry).await });
        let handle = build.abort_handle();

        // Reports back even when the builder panics or the build is aborted.
        tokio::spawn(async move {
            let shape = match build.await {
                Ok(shape) => shape,
                Err(err) if err.is_panic() => Err(ShapeError::Panicked),
                Err(_) => Err(ShapeError::Cancelled),
            };
            let _ = results.send(BuildResult {
                generation,
                anchor,
                shape,
            });
        });

        let flight = InFlight { generation, handle };
        if let Some(previous) = self.in_flight.insert(id, flight) {
            debug!(patch_id = %id, generation = previous.generation, "superseding shape build");
            previous.handle.abort();
        }
    }

    /// Marshal pending sensor output and finished builds onto the scene
    pub async fn pump<S: SceneGraph>(&mut self, scene: &mut S) {
        while let Ok(inbound) = self.inbox_rx.try_recv() {
            match inbound {
                Inbound::Anchor(event) => {
                    if self.is_detecting {
                        self.apply(scene, event);
                    }
                }
                Inbound::Session(event) => {
                    if self.handle_session_event(event) {
                        self.stop(scene).await;
                        return;
                    }
                }
            }
        }

        while let Ok(result) = self.built_rx.try_recv() {
            self.install(scene, result);
        }
    }

    /// Pump, then wait for every in-flight build to land
    pub async fn settle<S: SceneGraph>(&mut self, scene: &mut S) {
        tokio::task::yield_now().await;
        self.pump(scene).await;
        while !self.in_flight.is_empty() {
            match self.built_rx.recv().await {
                Some(result) => self.install(scene, result),
                None => break,
            }
        }
    }

    /// Returns true when the event requires detection to stop
    fn handle_session_event(&self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::AuthorizationChanged(AuthorizationStatus::Denied) => {
                info!("surface authorization revoked");
                true
            }
            SessionEvent::AuthorizationChanged(status) => {
                debug!(?status, "surface authorization changed");
                false
            }
            SessionEvent::DataProviderStateChanged {
                state: ProviderState::Stopped,
                error,
            } => {
                if let Some(error) = error {
                    if self.debug.logging {
                        warn!(%error, "surface data provider stopped with error");
                    }
                }
                true
            }
            SessionEvent::DataProviderStateChanged { state, .. } => {
                debug!(?state, "surface data provider state changed");
                false
            }
        }
    }

    fn install<S: SceneGraph>(&mut self, scene: &mut S, result: BuildResult) {
        let id = result.anchor.id;
        match self.in_flight.get(&id) {
            Some(flight) if flight.generation == result.generation => {
                self.in_flight.remove(&id);
            }
            _ => {
                debug!(
                    patch_id = %id,
                    generation = result.generation,
                    "discarding stale shape build"
                );
                return;
            }
        }

        let shape = match result.shape {
            Ok(shape) => shape,
            Err(err) => {
                if self.debug.logging {
                    warn!(
                        patch_id = %id,
                        error = %err,
                        "shape build failed, keeping previous patch"
                    );
                }
                return;
            }
        };

        let anchor = result.anchor;
        let label = anchor.geometry.dominant_label();
        let entity = scene.spawn(&format!("surface-{}", id), None, anchor.transform);
        if let CollisionShape::StaticMesh(mesh) = &shape {
            scene.set_mesh(entity, Some(mesh.clone()));
        }
        scene.set_collision_shape(entity, Some(shape));
        scene.set_material(entity, self.material_for(label));

        let patch = SurfacePatch {
            id,
            transform: anchor.transform,
            geometry: anchor.geometry,
            label,
            entity,
            generation: result.generation,
        };
        // The replacement is in the map before the old entity goes away.
        if let Some(previous) = self.patches.insert(id, patch) {
            scene.despawn(previous.entity);
        }
        debug!(patch_id = %id, ?label, generation = result.generation, "patch installed");
    }

    fn material_for(&self, label: SurfaceLabel) -> Material {
        if self.debug.visualization {
            Material::Wireframe(label.color())
        } else {
            Material::Occlusion
        }
    }

    /// Switch every known patch between debug wireframes and occluders.
    /// Geometry and colliders are untouched.
    pub fn set_visualization<S: SceneGraph>(&mut self, scene: &mut S, show: bool) {
        self.debug.visualization = show;
        for patch in self.patches.values() {
            scene.set_material(patch.entity, self.material_for(patch.label));
        }
    }

    pub fn visualization_enabled(&self) -> bool {
        self.debug.visualization
    }

    pub fn is_detecting(&self) -> bool {
        self.is_detecting
    }

    pub fn patch(&self, id: &PatchId) -> Option<&SurfacePatch> {
        self.patches.get(id)
    }

    pub fn patch_ids(&self) -> impl Iterator<Item = PatchId> + '_ {
        self.patches.keys().copied()
    }

    pub fn patches_with_label(&self, label: SurfaceLabel) -> impl Iterator<Item = &SurfacePatch> {
        self.patches.values().filter(move |patch| patch.label == label)
    }

    pub fn dominant_label(&self, id: &PatchId) -> Option<SurfaceLabel> {
        self.patches.get(id).map(|patch| patch.label)
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Shape builds scheduled but not yet installed
    pub fn pending_builds(&self) -> usize {
        self.in_flight.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SensorError;
    use crate::scene::{Color, MemoryScene};
    use crate::spatial::{Point3D, Transform, Vector3D};
    use crate::surface::{PatchGeometry, ReplaySensor};
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::time::Duration;
    use uuid::Uuid;

    fn anchor(id: PatchId, label: SurfaceLabel, height: f32) -> AnchorSnapshot {
        AnchorSnapshot::new(
            id,
            Transform::from_position(Point3D::new(0.0, height, 0.0)),
            PatchGeometry::rectangle(2.0, 2.0, label),
        )
    }

    async fn pump_until(
        index: &mut SurfaceIndex,
        scene: &mut MemoryScene,
        done: impl Fn(&SurfaceIndex) -> bool,
    ) {
        for _ in 0..200 {
            index.settle(scene).await;
            if done(index) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("surface index never reached the expected state");
    }

    /// Sleeps longer for wall-labeled geometry
    struct SlowWalls;

    #[async_trait]
    impl ShapeBuilder for SlowWalls {
        async fn build(
            &self,
            geometry: Arc<PatchGeometry>,
        ) -> Result<CollisionShape, ShapeError> {
            if geometry.dominant_label() == SurfaceLabel::Wall {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            StaticMeshBuilder.build(geometry).await
        }
    }

    struct PanickingBuilder;

    #[async_trait]
    impl ShapeBuilder for PanickingBuilder {
        async fn build(
            &self,
            _geometry: Arc<PatchGeometry>,
        ) -> Result<CollisionShape, ShapeError> {
            panic!("collider backend crashed");
        }
    }

    #[tokio::test]
    async fn test_added_patch_is_collidable() {
        let mut scene = MemoryScene::new();
        let mut index = SurfaceIndex::new(DebugConfig::default());
        let id = Uuid::new_v4();

        index.apply(&mut scene, AnchorEvent::added(anchor(id, SurfaceLabel::Floor, 0.5)));
        assert!(index.is_empty());
        assert_eq!(index.pending_builds(), 1);

        index.settle(&mut scene).await;
        let patch = index.patch(&id).unwrap();
        assert_eq!(patch.label, SurfaceLabel::Floor);
        assert_eq!(scene.material(patch.entity), Some(Material::Occlusion));

        let hits = scene.raycast(Point3D::new(0.3, 2.0, 0.3), Vector3D::DOWN);
        assert_eq!(hits[0].object, patch.entity);
        assert!((hits[0].distance - 1.5).abs() < 0.0001);
    }

    #[tokio::test]
    async fn test_update_replaces_entity_and_remove_clears() {
        let mut scene = MemoryScene::new();
        let mut index = SurfaceIndex::new(DebugConfig::default());
        let id = Uuid::new_v4();

        index.apply(&mut scene, AnchorEvent::added(anchor(id, SurfaceLabel::Floor, 0.0)));
        index.settle(&mut scene).await;
        let first = index.patch(&id).unwrap().entity;

        index.apply(&mut scene, AnchorEvent::updated(anchor(id, SurfaceLabel::Table, 0.7)));
        // Old representation stays until the new one is installed.
        assert_eq!(index.patch(&id).unwrap().entity, first);
        index.settle(&mut scene).await;

        let patch = index.patch(&id).unwrap();
        assert_ne!(patch.entity, first);
        assert!(!scene.contains(first));
        assert_eq!(patch.label, SurfaceLabel::Table);
        assert_eq!(scene.len(), 1);

        index.apply(&mut scene, AnchorEvent::removed(anchor(id, SurfaceLabel::Table, 0.7)));
        assert!(index.patch(&id).is_none());
        assert!(scene.is_empty());
    }

    #[tokio::test]
    async fn test_superseded_build_is_discarded() {
        let mut scene = MemoryScene::new();
        let mut index = SurfaceIndex::with_builder(DebugConfig::default(), Arc::new(SlowWalls));
        let id = Uuid::new_v4();

        index.apply(&mut scene, AnchorEvent::added(anchor(id, SurfaceLabel::Wall, 0.0)));
        index.apply(&mut scene, AnchorEvent::updated(anchor(id, SurfaceLabel::Floor, 0.0)));
        index.settle(&mut scene).await;
        tokio::time::sleep(Duration::from_millis(80)).await;
        index.pump(&mut scene).await;

        assert_eq!(index.dominant_label(&id), Some(SurfaceLabel::Floor));
        assert_eq!(scene.len(), 1);
    }

    #[tokio::test]
    async fn test_stale_generation_never_installs() {
        let mut scene = MemoryScene::new();
        let mut index = SurfaceIndex::new(DebugConfig::default());
        let id = Uuid::new_v4();

        index.apply(&mut scene, AnchorEvent::added(anchor(id, SurfaceLabel::Floor, 0.0)));
        index.settle(&mut scene).await;
        let generation = index.patch(&id).unwrap().generation;

        let stale = anchor(id, SurfaceLabel::Ceiling, 3.0);
        let shape = StaticMeshBuilder.build(stale.geometry.clone()).await;
        index.install(
            &mut scene,
            BuildResult {
                generation: generation - 1,
                anchor: stale,
                shape,
            },
        );
        assert_eq!(index.dominant_label(&id), Some(SurfaceLabel::Floor));
        assert_eq!(scene.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_build_keeps_previous_patch() {
        let mut scene = MemoryScene::new();
        let debug = DebugConfig {
            logging: true,
            ..DebugConfig::default()
        };
        let mut index = SurfaceIndex::new(debug);
        let id = Uuid::new_v4();

        index.apply(&mut scene, AnchorEvent::added(anchor(id, SurfaceLabel::Seat, 0.4)));
        index.settle(&mut scene).await;
        let entity = index.patch(&id).unwrap().entity;

        let empty = AnchorSnapshot::new(id, Transform::IDENTITY, PatchGeometry::default());
        index.apply(&mut scene, AnchorEvent::updated(empty));
        index.settle(&mut scene).await;

        assert_eq!(index.patch(&id).unwrap().entity, entity);
        assert_eq!(index.pending_builds(), 0);
    }

    #[tokio::test]
    async fn test_panicking_builder_does_not_stall_settle() {
        let mut scene = MemoryScene::new();
        let debug = DebugConfig {
            logging: true,
            ..DebugConfig::default()
        };
        let mut index = SurfaceIndex::with_builder(debug, Arc::new(PanickingBuilder));

        let id = Uuid::new_v4();
        index.apply(&mut scene, AnchorEvent::added(anchor(id, SurfaceLabel::Floor, 0.0)));
        let settled = tokio::time::timeout(Duration::from_secs(2), index.settle(&mut scene)).await;

        assert!(settled.is_ok());
        assert_eq!(index.pending_builds(), 0);
        assert!(index.is_empty());
        assert!(scene.is_empty());
    }

    #[tokio::test]
    async fn test_stop_cancels_build_in_progress() {
        let mut scene = MemoryScene::new();
        let mut index = SurfaceIndex::with_builder(DebugConfig::default(), Arc::new(SlowWalls));

        let wall = anchor(Uuid::new_v4(), SurfaceLabel::Wall, 1.0);
        index.apply(&mut scene, AnchorEvent::added(wall));
        assert_eq!(index.pending_builds(), 1);

        index.stop(&mut scene).await;
        tokio::time::sleep(Duration::from_millis(80)).await;
        index.pump(&mut scene).await;

        assert!(index.is_empty());
        assert!(scene.is_empty());
        assert_eq!(index.pending_builds(), 0);
    }

    #[tokio::test]
    async fn test_event_sent_across_stop_never_reaches_next_session() {
        let mut scene = MemoryScene::new();
        let mut index = SurfaceIndex::new(DebugConfig::default());
        let (sensor, _handle) = ReplaySensor::new();
        index.start(Arc::new(sensor)).await;

        // A forwarder that was mid-send when detection stopped.
        let late_forwarder = index.inbox_tx.clone();
        index.stop(&mut scene).await;
        let late = AnchorEvent::added(anchor(Uuid::new_v4(), SurfaceLabel::Table, 0.7));
        assert!(late_forwarder.send(Inbound::Anchor(late)).is_err());

        let (sensor, _handle) = ReplaySensor::new();
        index.start(Arc::new(sensor)).await;
        assert!(index.is_detecting());
        index.settle(&mut scene).await;

        assert!(index.is_empty());
        assert!(scene.is_empty());
        assert_eq!(index.pending_builds(), 0);
    }

    #[tokio::test]
    async fn test_converges_to_final_event_state() {
        let mut scene = MemoryScene::new();
        let mut index = SurfaceIndex::with_builder(DebugConfig::default(), Arc::new(SlowWalls));
        let ids: Vec<PatchId> = (0..5).map(|_| Uuid::new_v4()).collect();
        let labels = [SurfaceLabel::Wall, SurfaceLabel::Floor, SurfaceLabel::Table];

        let mut live = HashSet::new();
        for step in 0..40usize {
            let id = ids[(step * 7) % ids.len()];
            let snapshot = anchor(id, labels[step % labels.len()], step as f32 * 0.1);
            let event = match step % 4 {
                0 => AnchorEvent::added(snapshot),
                1 | 2 => AnchorEvent::updated(snapshot),
                _ => AnchorEvent::removed(snapshot),
            };
            if event.kind == AnchorEventKind::Removed {
                live.remove(&id);
            } else {
                live.insert(id);
            }
            index.apply(&mut scene, event);
            if step % 9 == 0 {
                index.pump(&mut scene).await;
            }
        }
        index.settle(&mut scene).await;

        let present: HashSet<PatchId> = index.patch_ids().collect();
        assert_eq!(present, live);
        assert_eq!(scene.len(), live.len());
    }

    #[tokio::test]
    async fn test_visualization_toggle_swaps_materials_only() {
        let mut scene = MemoryScene::new();
        let mut index = SurfaceIndex::new(DebugConfig::default());
        let floor = Uuid::new_v4();
        let wall = Uuid::new_v4();

        index.apply(&mut scene, AnchorEvent::added(anchor(floor, SurfaceLabel::Floor, 0.0)));
        index.apply(&mut scene, AnchorEvent::added(anchor(wall, SurfaceLabel::Wall, 1.0)));
        index.settle(&mut scene).await;
        let floor_entity = index.patch(&floor).unwrap().entity;

        index.set_visualization(&mut scene, true);
        assert!(index.visualization_enabled());
        assert_eq!(scene.material(floor_entity), Some(Material::Wireframe(Color::Green)));
        let wall_entity = index.patch(&wall).unwrap().entity;
        assert_eq!(scene.material(wall_entity), Some(Material::Wireframe(Color::Blue)));
        assert_eq!(index.patch(&floor).unwrap().entity, floor_entity);

        index.set_visualization(&mut scene, false);
        assert_eq!(scene.material(floor_entity), Some(Material::Occlusion));
        assert_eq!(index.patches_with_label(SurfaceLabel::Wall).count(), 1);
    }

    #[tokio::test]
    async fn test_sensor_stream_feeds_index() {
        let mut scene = MemoryScene::new();
        let mut index = SurfaceIndex::new(DebugConfig::default());
        let (sensor, handle) = ReplaySensor::new();
        let sensor = Arc::new(sensor);

        index.start(sensor.clone()).await;
        assert!(index.is_detecting());

        let id = Uuid::new_v4();
        handle.push(AnchorEvent::added(anchor(id, SurfaceLabel::Table, 0.7)));
        pump_until(&mut index, &mut scene, |index| index.len() == 1).await;
        assert_eq!(index.dominant_label(&id), Some(SurfaceLabel::Table));

        index.stop(&mut scene).await;
        assert!(!index.is_detecting());
        assert!(index.is_empty());
        assert!(scene.is_empty());
        assert!(!sensor.is_running());
    }

    #[tokio::test]
    async fn test_authorization_revoked_stops_detection() {
        let mut scene = MemoryScene::new();
        let mut index = SurfaceIndex::new(DebugConfig::default());
        let (sensor, handle) = ReplaySensor::new();
        let sensor = Arc::new(sensor);
        index.start(sensor.clone()).await;

        handle.push(AnchorEvent::added(anchor(Uuid::new_v4(), SurfaceLabel::Floor, 0.0)));
        pump_until(&mut index, &mut scene, |index| index.len() == 1).await;

        handle.push_session_event(SessionEvent::AuthorizationChanged(
            AuthorizationStatus::Denied,
        ));
        pump_until(&mut index, &mut scene, |index| !index.is_detecting()).await;

        assert!(index.is_empty());
        assert!(scene.is_empty());
        assert!(!sensor.is_running());
    }

    #[tokio::test]
    async fn test_provider_stop_ends_detection() {
        let mut scene = MemoryScene::new();
        let mut index = SurfaceIndex::new(DebugConfig {
            logging: true,
            ..DebugConfig::default()
        });
        let (sensor, handle) = ReplaySensor::new();
        index.start(Arc::new(sensor)).await;

        handle.push_session_event(SessionEvent::DataProviderStateChanged {
            state: ProviderState::Paused,
            error: None,
        });
        index.settle(&mut scene).await;
        assert!(index.is_detecting());

        handle.push_session_event(SessionEvent::DataProviderStateChanged {
            state: ProviderState::Stopped,
            error: Some("tracking lost".to_string()),
        });
        pump_until(&mut index, &mut scene, |index| !index.is_detecting()).await;
    }

    #[tokio::test]
    async fn test_start_failures_leave_detection_off() {
        let mut index = SurfaceIndex::new(DebugConfig {
            logging: true,
            ..DebugConfig::default()
        });

        index.start(Arc::new(ReplaySensor::unsupported())).await;
        assert!(!index.is_detecting());

        let (sensor, _) = ReplaySensor::new();
        index
            .start(Arc::new(sensor.failing_with(SensorError::PermissionDenied)))
            .await;
        assert!(!index.is_detecting());
    }
}
