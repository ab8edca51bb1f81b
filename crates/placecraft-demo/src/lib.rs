//! Scripted placecraft session
//!
//! Replays a floor and a table into a [`MemoryScene`], then drags a cube
//! onto the table, turns it a quarter turn and scales it up, printing every
//! notification the engine emits.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tracing::info;
use uuid::Uuid;

use placecraft::scene::TriangleMesh;
use placecraft::surface::{AnchorEvent, AnchorSnapshot, PatchGeometry, ReplaySensor, SurfaceLabel};
use placecraft::{
    DragSample, EngineConfig, GesturePhase, InteractionEngine, MemoryScene, Notification, ObjectId,
    Point3D, Quaternion, RotateSample, ScaleSample, SceneGraph, Transform, Vector3D,
};

/// Options for one demo run
#[derive(Debug, Clone)]
pub struct DemoOptions {
    pub config: EngineConfig,
    /// Changed samples per gesture
    pub steps: usize,
    /// Print notifications as JSON lines where possible
    pub json: bool,
}

const TABLE_TOP: Point3D = Point3D::new(1.5, 0.7, 0.0);

pub async fn run_demo(options: DemoOptions) -> Result<()> {
    let steps = options.steps.max(1);
    let mut scene = MemoryScene::new();
    let cube = scene.spawn("cube", None, Transform::from_position(Point3D::new(0.0, 1.2, 0.5)));
    let body = scene.spawn_mesh(
        "cube-body",
        Some(cube),
        Transform::IDENTITY,
        TriangleMesh::horizontal_quad(0.2, 0.2),
    );

    let mut engine = InteractionEngine::new(scene, options.config.clone());
    let (tx, mut notifications) = unbounded_channel();
    engine.add_observer(tx);
    engine.register(cube, "cube");

    let (sensor, handle) = ReplaySensor::new();
    engine.start_detection(Arc::new(sensor)).await;
    if !engine.is_detecting() {
        bail!("surface detection failed to start");
    }

    handle.push(AnchorEvent::added(AnchorSnapshot::new(
        Uuid::new_v4(),
        Transform::IDENTITY,
        PatchGeometry::rectangle(6.0, 6.0, SurfaceLabel::Floor),
    )));
    handle.push(AnchorEvent::added(AnchorSnapshot::new(
        Uuid::new_v4(),
        Transform::from_position(TABLE_TOP),
        PatchGeometry::rectangle(1.0, 0.8, SurfaceLabel::Table),
    )));
    wait_for_surfaces(&mut engine, 2).await?;
    info!(patches = engine.surfaces().len(), "surfaces detected");

    let start = engine
        .scene()
        .world_transform(cube)
        .unwrap_or(Transform::IDENTITY);
    let target = TABLE_TOP.offset_y(0.15);
    drag(&mut engine, body, target - start.position, steps);
    print_notifications(&mut notifications, options.json);

    rotate(&mut engine, body, std::f32::consts::FRAC_PI_2, steps);
    scale(&mut engine, body, 1.5, steps);
    print_notifications(&mut notifications, options.json);

    engine.set_visualization(!engine.surfaces().visualization_enabled());
    for label in [SurfaceLabel::Floor, SurfaceLabel::Table] {
        println!(
            "{:?}: {} patch(es), color {:?}",
            label,
            engine.surfaces().patches_with_label(label).count(),
            label.color()
        );
    }

    if let Some(placed) = engine.scene().world_transform(cube) {
        println!(
            "cube at ({:.3}, {:.3}, {:.3}), scale {:.2}",
            placed.position.x, placed.position.y, placed.position.z, placed.scale.x
        );
    }

    engine.stop_detection().await;
    info!(remaining = engine.scene().len(), "detection stopped");
    Ok(())
}

async fn wait_for_surfaces(
    engine: &mut InteractionEngine<MemoryScene>,
    count: usize,
) -> Result<()> {
    for _ in 0..100 {
        engine.settle().await;
        if engine.surfaces().len() >= count {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    bail!(
        "only {} of {} surfaces arrived",
        engine.surfaces().len(),
        count
    )
}

fn drag(
    engine: &mut InteractionEngine<MemoryScene>,
    target: ObjectId,
    offset: Vector3D,
    steps: usize,
) {
    engine.handle_input(DragSample::new(GesturePhase::Began, target, Vector3D::ZERO));
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        engine.handle_input(DragSample::new(GesturePhase::Changed, target, offset * t));
    }
    engine.handle_input(DragSample::new(GesturePhase::Ended, target, offset));
}

fn rotate(engine: &mut InteractionEngine<MemoryScene>, target: ObjectId, angle: f32, steps: usize) {
    engine.handle_input(RotateSample::new(GesturePhase::Began, target, Quaternion::IDENTITY));
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        let rotation = Quaternion::from_axis_angle(Vector3D::UP, angle * t);
        engine.handle_input(RotateSample::new(GesturePhase::Changed, target, rotation));
    }
    let rotation = Quaternion::from_axis_angle(Vector3D::UP, angle);
    engine.handle_input(RotateSample::new(GesturePhase::Ended, target, rotation));
}

fn scale(engine: &mut InteractionEngine<MemoryScene>, target: ObjectId, factor: f32, steps: usize) {
    engine.handle_input(ScaleSample::new(GesturePhase::Began, target, 1.0));
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        let factor_now = 1.0 + (factor - 1.0) * t;
        engine.handle_input(ScaleSample::new(GesturePhase::Changed, target, factor_now));
    }
    engine.handle_input(ScaleSample::new(GesturePhase::Ended, target, factor));
}

fn print_notifications(notifications: &mut UnboundedReceiver<Notification>, json: bool) {
    while let Ok(notification) = notifications.try_recv() {
        match notification {
            Notification::Gesture(event) => {
                if json {
                    match serde_json::to_string(&event) {
                        Ok(line) => println!("{}", line),
                        Err(err) => eprintln!("failed to encode event: {}", err),
                    }
                } else {
                    println!(
                        "[{:?}] {} {:?} change={:?}",
                        event.gesture, event.entity_name, event.kind, event.change
                    );
                }
            }
            Notification::PlacementStatus {
                entity,
                allowed,
                position,
            } => {
                println!(
                    "  placement {} allowed={} at ({:.3}, {:.3}, {:.3})",
                    entity, allowed, position.x, position.y, position.z
                );
            }
            Notification::TransformChanged { entity, transform } => {
                tracing::debug!(%entity, position = ?transform.position, "transform changed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_demo_runs_to_completion() {
        let options = DemoOptions {
            config: EngineConfig::default(),
            steps: 3,
            json: true,
        };
        run_demo(options).await.unwrap();
    }
}
