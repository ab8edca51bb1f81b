//! Per-kind interaction sessions

use super::GestureKind;
use crate::config::Axis;
use crate::scene::ObjectId;
use crate::spatial::{Point3D, Quaternion, Transform, Vector3D};

/// State of one active gesture, from first sample to release
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionSession<A> {
    pub target_name: String,
    pub object: ObjectId,
    /// World transform captured when the session began
    pub initial_transform: Transform,
    pub start: A,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragStart {
    pub position: Point3D,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotateStart {
    pub orientation: Quaternion,
    pub locked_axis: Option<Axis>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleStart {
    pub scale: Vector3D,
}

/// At most one session per gesture kind
#[derive(Debug, Default)]
pub struct Sessions {
    pub drag: Option<InteractionSession<DragStart>>,
    pub rotate: Option<InteractionSession<RotateStart>>,
    pub scale: Option<InteractionSession<ScaleStart>>,
}

impl Sessions {
    pub fn is_active(&self, kind: GestureKind) -> bool {
        self.target(kind).is_some()
    }

    pub fn target(&self, kind: GestureKind) -> Option<&str> {
        match kind {
            GestureKind::Drag => self.drag.as_ref().map(|s| s.target_name.as_str()),
            GestureKind::Rotate => self.rotate.as_ref().map(|s| s.target_name.as_str()),
            GestureKind::Scale => self.scale.as_ref().map(|s| s.target_name.as_str()),
        }
    }

    /// Gesture kind, other than `except`, currently holding `object`
    pub fn holder(&self, object: ObjectId, except: GestureKind) -> Option<GestureKind> {
        let held = [
            (GestureKind::Drag, self.drag.as_ref().map(|s| s.object)),
            (GestureKind::Rotate, self.rotate.as_ref().map(|s| s.object)),
            (GestureKind::Scale, self.scale.as_ref().map(|s| s.object)),
        ];
        held.into_iter()
            .find(|(kind, held)| *kind != except && *held == Some(object))
            .map(|(kind, _)| kind)
    }

    /// Drop a session; true when one was active
    pub fn clear(&mut self, kind: GestureKind) -> bool {
        match kind {
            GestureKind::Drag => self.drag.take().is_some(),
            GestureKind::Rotate => self.rotate.take().is_some(),
            GestureKind::Scale => self.scale.take().is_some(),
        }
    }
}
