//! Gesture state machine
//!
//! Drag, rotate and scale are independent `idle -> active -> idle` machines.
//! Each resolves its target through the [`EntityRegistry`] on the first
//! sample, applies cumulative values against the transform captured then,
//! and reports through the registered [`InteractionObserver`]s. Nothing here
//! returns an error: a sample that cannot be applied is dropped.

use tracing::debug;

use super::session::{DragStart, InteractionSession, RotateStart, ScaleStart, Sessions};
use super::{GestureChange, GestureEvent, GestureEventKind, GestureKind, InteractionObserver};
use crate::config::{GestureConfig, PlacementConfig, RotationMode};
use crate::input::{DragSample, GesturePhase, InputSample, RotateSample, ScaleSample};
use crate::placement::PlacementValidator;
use crate::registry::EntityRegistry;
use crate::scene::{ObjectId, SceneGraph};
use crate::spatial::{Point3D, Transform, Vector3D};

pub struct GestureStateMachine {
    config: GestureConfig,
    validator: PlacementValidator,
    sessions: Sessions,
    observers: Vec<Box<dyn InteractionObserver>>,
}

impl GestureStateMachine {
    pub fn new(config: GestureConfig, placement: PlacementConfig) -> Self {
        Self {
            config,
            validator: PlacementValidator::new(placement),
            sessions: Sessions::default(),
            observers: Vec::new(),
        }
    }

    pub fn add_observer(&mut self, observer: impl InteractionObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn validator(&self) -> &PlacementValidator {
        &self.validator
    }

    pub fn is_active(&self, kind: GestureKind) -> bool {
        self.sessions.is_active(kind)
    }

    /// Name of the entity the given gesture kind is manipulating
    pub fn active_target(&self, kind: GestureKind) -> Option<&str> {
        self.sessions.target(kind)
    }

    pub fn handle<S: SceneGraph>(
        &mut self,
        scene: &mut S,
        registry: &EntityRegistry,
        sample: &InputSample,
    ) {
        match sample {
            InputSample::Drag(sample) => self.handle_drag(scene, registry, sample),
            InputSample::Rotate(sample) => self.handle_rotate(scene, registry, sample),
            InputSample::Scale(sample) => self.handle_scale(scene, registry, sample),
        }
    }

    /// Abandon a gesture without committing. The object stays where the last
    /// sample left it.
    pub fn cancel(&mut self, kind: GestureKind) {
        if self.sessions.clear(kind) {
            debug!(?kind, "gesture cancelled");
        }
        if kind == GestureKind::Drag {
            self.validator.clear();
        }
    }

    pub fn cancel_all(&mut self) {
        for kind in [GestureKind::Drag, GestureKind::Rotate, GestureKind::Scale] {
            self.cancel(kind);
        }
    }

    /// Start a session for the registered owner of `target`
    fn begin<S: SceneGraph, A>(
        &self,
        scene: &S,
        registry: &EntityRegistry,
        kind: GestureKind,
        target: ObjectId,
        start: impl FnOnce(&Transform) -> A,
    ) -> Option<InteractionSession<A>> {
        let Some(owner) = registry.resolve_owner(scene, target) else {
            debug!(target = %target, ?kind, "ignoring gesture on unregistered object");
            return None;
        };
        if self.config.exclusive_targets {
            if let Some(holder) = self.sessions.holder(owner.object, kind) {
                debug!(entity = %owner.name, ?kind, ?holder, "entity held by another gesture");
                return None;
            }
        }
        let initial_transform = scene.world_transform(owner.object)?;
        debug!(entity = %owner.name, ?kind, "gesture began");
        Some(InteractionSession {
            target_name: owner.name.clone(),
            object: owner.object,
            initial_transform,
            start: start(&initial_transform),
        })
    }

    pub fn handle_drag<S: SceneGraph>(
        &mut self,
        scene: &mut S,
        registry: &EntityRegistry,
        sample: &DragSample,
    ) {
        match sample.phase {
            GesturePhase::Cancelled => return self.cancel(GestureKind::Drag),
            GesturePhase::Ended => return self.end_drag(scene),
            GesturePhase::Began => {
                self.sessions.drag = None;
                self.validator.clear();
            }
            GesturePhase::Changed => {}
        }

        if self.sessions.drag.is_none() {
            self.sessions.drag = self.begin(scene, registry, GestureKind::Drag, sample.target, |t| {
                DragStart { position: t.position }
            });
        }
        let Some(session) = self.sessions.drag.clone() else {
            return;
        };

        let (Some(offset), Some(current)) = (
            sample.scene_translation(scene),
            scene.world_transform(session.object),
        ) else {
            return;
        };

        let position = session.start.position + offset;
        let moved = current.with_position(position);
        scene.set_world_transform(session.object, moved);
        self.notify_transform(&session.target_name, &moved);

        let below = scene
            .raycast(position, Vector3D::DOWN)
            .into_iter()
            .find(|hit| !scene.is_within(hit.object, session.object));

        self.emit(
            GestureEvent::new(
                GestureEventKind::Drag,
                GestureKind::Drag,
                &session.target_name,
                moved,
            )
            .with_initial(session.initial_transform)
            .with_change(GestureChange::Drag { offset }),
        );

        match below {
            Some(hit) => {
                let max_distance = self.validator.config().max_distance;
                let allowed =
                    self.validator
                        .check_placement(position, max_distance, hit.position, hit.distance);
                let reported = if allowed {
                    self.validator.state().position
                } else {
                    hit.position
                };
                self.notify_placement(&session.target_name, allowed, reported);
            }
            None => self.validator.clear(),
        }
    }

    fn end_drag<S: SceneGraph>(&mut self, scene: &mut S) {
        let Some(session) = self.sessions.drag.take() else {
            return;
        };
        let Some(final_transform) = scene.world_transform(session.object) else {
            self.validator.clear();
            return;
        };

        self.emit(
            GestureEvent::new(
                GestureEventKind::Ended,
                GestureKind::Drag,
                &session.target_name,
                final_transform,
            )
            .with_initial(session.initial_transform),
        );

        if self.validator.can_place() {
            let position = self.validator.state().position;
            if self.validator.commit_placement(scene, session.object) {
                let placed = scene
                    .world_transform(session.object)
                    .unwrap_or(final_transform.with_position(position));
                self.emit(
                    GestureEvent::new(
                        GestureEventKind::Placement,
                        GestureKind::Drag,
                        &session.target_name,
                        placed,
                    )
                    .with_initial(session.initial_transform)
                    .with_change(GestureChange::Placement {
                        allowed: true,
                        position,
                    }),
                );
                self.notify_transform(&session.target_name, &placed);
            }
        }
        self.validator.clear();
        debug!(entity = %session.target_name, "drag ended");
    }

    pub fn handle_rotate<S: SceneGraph>(
        &mut self,
        scene: &mut S,
        registry: &EntityRegistry,
        sample: &RotateSample,
    ) {
        let locked_axis = match self.config.rotation {
            RotationMode::Disabled => return,
            RotationMode::Free => None,
            RotationMode::Locked(axis) => Some(axis),
        };

        match sample.phase {
            GesturePhase::Cancelled => return self.cancel(GestureKind::Rotate),
            GesturePhase::Ended => {
                if let Some(session) = self.sessions.rotate.take() {
                    self.emit_ended(scene, GestureKind::Rotate, &session);
                }
                return;
            }
            GesturePhase::Began => self.sessions.rotate = None,
            GesturePhase::Changed => {}
        }

        if self.sessions.rotate.is_none() {
            self.sessions.rotate =
                self.begin(scene, registry, GestureKind::Rotate, sample.target, |t| {
                    RotateStart {
                        orientation: t.rotation,
                        locked_axis,
                    }
                });
        }
        let Some(session) = self.sessions.rotate.clone() else {
            return;
        };
        let Some(current) = scene.world_transform(session.object) else {
            return;
        };

        let delta = match session.start.locked_axis {
            Some(axis) => sample.rotation.twist(axis.vector()),
            None => sample.rotation.normalize(),
        };
        let rotated = current.with_rotation((delta * session.start.orientation).normalize());
        scene.set_world_transform(session.object, rotated);
        self.notify_transform(&session.target_name, &rotated);

        let (axis, angle) = delta.to_axis_angle();
        self.emit(
            GestureEvent::new(
                GestureEventKind::Rotate,
                GestureKind::Rotate,
                &session.target_name,
                rotated,
            )
            .with_initial(session.initial_transform)
            .with_change(GestureChange::Rotate {
                angle,
                axis,
                euler: delta.to_euler(),
            }),
        );
    }

    pub fn handle_scale<S: SceneGraph>(
        &mut self,
        scene: &mut S,
        registry: &EntityRegistry,
        sample: &ScaleSample,
    ) {
        match sample.phase {
            GesturePhase::Cancelled => return self.cancel(GestureKind::Scale),
            GesturePhase::Ended => {
                if let Some(session) = self.sessions.scale.take() {
                    self.emit_ended(scene, GestureKind::Scale, &session);
                }
                return;
            }
            GesturePhase::Began => self.sessions.scale = None,
            GesturePhase::Changed => {}
        }

        if self.sessions.scale.is_none() {
            self.sessions.scale =
                self.begin(scene, registry, GestureKind::Scale, sample.target, |t| {
                    ScaleStart { scale: t.scale }
                });
        }
        let Some(session) = self.sessions.scale.clone() else {
            return;
        };
        let Some(current) = scene.world_transform(session.object) else {
            return;
        };

        let factor = self.config.scale_limits.clamp(sample.magnification);
        let scale = session.start.scale * factor;
        let scaled = current.with_scale(scale);
        scene.set_world_transform(session.object, scaled);
        self.notify_transform(&session.target_name, &scaled);

        self.emit(
            GestureEvent::new(
                GestureEventKind::Scale,
                GestureKind::Scale,
                &session.target_name,
                scaled,
            )
            .with_initial(session.initial_transform)
            .with_change(GestureChange::Scale { factor, scale }),
        );
    }

    fn emit_ended<S: SceneGraph, A>(
        &self,
        scene: &S,
        kind: GestureKind,
        session: &InteractionSession<A>,
    ) {
        let Some(final_transform) = scene.world_transform(session.object) else {
            return;
        };
        self.emit(
            GestureEvent::new(GestureEventKind::Ended, kind, &session.target_name, final_transform)
                .with_initial(session.initial_transform),
        );
        debug!(entity = %session.target_name, ?kind, "gesture ended");
    }

    fn emit(&self, event: GestureEvent) {
        for observer in &self.observers {
            observer.on_gesture_event(&event);
        }
    }

    fn notify_transform(&self, entity: &str, transform: &Transform) {
        for observer in &self.observers {
            observer.on_transform_changed(entity, transform);
        }
    }

    fn notify_placement(&self, entity: &str, allowed: bool, position: Point3D) {
        for observer in &self.observers {
            observer.on_placement_status_changed(entity, allowed, position);
        }
    }
}
