//! Outward gesture events

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::spatial::{Point3D, Transform, Vector3D};

/// The three independent gesture sub-machines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureKind {
    Drag,
    Rotate,
    Scale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureEventKind {
    Drag,
    Rotate,
    Scale,
    Ended,
    Placement,
}

/// Kind-specific payload carried by a [`GestureEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GestureChange {
    /// Scene-space offset from the drag origin
    Drag { offset: Vector3D },
    /// Rotation since the gesture began: angle in radians about `axis`, and
    /// the same rotation as pitch/yaw/roll
    Rotate {
        angle: f32,
        axis: Vector3D,
        euler: Vector3D,
    },
    /// Applied magnification and the resulting scale
    Scale { factor: f32, scale: Vector3D },
    Placement { allowed: bool, position: Point3D },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GestureEvent {
    pub kind: GestureEventKind,
    /// Sub-machine that produced the event
    pub gesture: GestureKind,
    pub entity_name: String,
    pub current_transform: Transform,
    pub initial_transform: Option<Transform>,
    pub change: Option<GestureChange>,
    pub timestamp: DateTime<Utc>,
}

impl GestureEvent {
    pub fn new(
        kind: GestureEventKind,
        gesture: GestureKind,
        entity_name: impl Into<String>,
        current_transform: Transform,
    ) -> Self {
        Self {
            kind,
            gesture,
            entity_name: entity_name.into(),
            current_transform,
            initial_transform: None,
            change: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_initial(mut self, initial: Transform) -> Self {
        self.initial_transform = Some(initial);
        self
    }

    pub fn with_change(mut self, change: GestureChange) -> Self {
        self.change = Some(change);
        self
    }
}
