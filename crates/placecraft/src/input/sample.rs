//! Per-kind gesture samples

use super::GesturePhase;
use crate::scene::{ObjectId, SceneGraph};
use crate::spatial::{Quaternion, Vector3D};

/// Frame a translation value is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinateSpace {
    #[default]
    Scene,
    /// Local space of the given object
    Local(ObjectId),
}

/// One drag sample. `translation` is the total offset since `Began`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSample {
    pub phase: GesturePhase,
    /// Object the input layer hit; may be any descendant of a registered entity
    pub target: ObjectId,
    pub translation: Vector3D,
    pub space: CoordinateSpace,
}

impl DragSample {
    pub fn new(phase: GesturePhase, target: ObjectId, translation: Vector3D) -> Self {
        Self {
            phase,
            target,
            translation,
            space: CoordinateSpace::Scene,
        }
    }

    pub fn in_space(mut self, space: CoordinateSpace) -> Self {
        self.space = space;
        self
    }

    /// Translation converted to scene space. `None` when the local frame's
    /// object is gone.
    pub fn scene_translation<S: SceneGraph>(&self, scene: &S) -> Option<Vector3D> {
        match self.space {
            CoordinateSpace::Scene => Some(self.translation),
            CoordinateSpace::Local(frame) => scene
                .world_transform(frame)
                .map(|world| world.transform_vector(self.translation)),
        }
    }
}

/// One rotation sample. `rotation` is the total rotation since `Began`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotateSample {
    pub phase: GesturePhase,
    pub target: ObjectId,
    pub rotation: Quaternion,
}

impl RotateSample {
    pub fn new(phase: GesturePhase, target: ObjectId, rotation: Quaternion) -> Self {
        Self {
            phase,
            target,
            rotation,
        }
    }
}

/// One magnification sample, relative to the scale at `Began`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleSample {
    pub phase: GesturePhase,
    pub target: ObjectId,
    pub magnification: f32,
}

impl ScaleSample {
    pub fn new(phase: GesturePhase, target: ObjectId, magnification: f32) -> Self {
        Self {
            phase,
            target,
            magnification,
        }
    }
}

/// Any sample, for callers that multiplex all gesture streams
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputSample {
    Drag(DragSample),
    Rotate(RotateSample),
    Scale(ScaleSample),
}

impl InputSample {
    pub fn phase(&self) -> GesturePhase {
        match self {
            InputSample::Drag(sample) => sample.phase,
            InputSample::Rotate(sample) => sample.phase,
            InputSample::Scale(sample) => sample.phase,
        }
    }

    pub fn target(&self) -> ObjectId {
        match self {
            InputSample::Drag(sample) => sample.target,
            InputSample::Rotate(sample) => sample.target,
            InputSample::Scale(sample) => sample.target,
        }
    }
}

impl From<DragSample> for InputSample {
    fn from(sample: DragSample) -> Self {
        InputSample::Drag(sample)
    }
}

impl From<RotateSample> for InputSample {
    fn from(sample: RotateSample) -> Self {
        InputSample::Rotate(sample)
    }
}

impl From<ScaleSample> for InputSample {
    fn from(sample: ScaleSample) -> Self {
        InputSample::Scale(sample)
    }
}
