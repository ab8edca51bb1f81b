//! placecraft: interaction and surface placement engine for live 3D scenes
//!
//! This crate provides:
//! - Named entity registration with owner resolution for raw scene hits
//! - A live index of sensor-detected surface patches with async collider builds
//! - Placement scoring against the surfaces below a dragged object
//! - Drag, rotate and scale gesture state machines with structured events
//!
//! The scene runtime, the surface sensor and the input layer are external;
//! they are reached through [`SceneGraph`], [`SurfaceSensor`] and the sample
//! types in [`input`]. [`MemoryScene`] and [`ReplaySensor`] are in-process
//! implementations for simulation and tests.

pub mod config;
pub mod engine;
pub mod error;
pub mod gesture;
pub mod input;
pub mod placement;
pub mod registry;
pub mod scene;
pub mod spatial;
pub mod surface;

// Re-export commonly used types
pub use config::{
    Axis, DebugConfig, EngineConfig, GestureConfig, PlacementConfig, RotationMode, ScaleLimits,
};
pub use engine::InteractionEngine;
pub use error::{ConfigError, SensorError, ShapeError};
pub use gesture::{
    GestureChange, GestureEvent, GestureEventKind, GestureKind, GestureStateMachine,
    InteractionObserver, Notification,
};
pub use input::{CoordinateSpace, DragSample, GesturePhase, InputSample, RotateSample, ScaleSample};
pub use placement::{PlacementIndicator, PlacementState, PlacementValidator};
pub use registry::{EntityRegistry, ManagedEntity};
pub use scene::{MemoryScene, ObjectId, RaycastHit, SceneGraph};
pub use spatial::{Bounds, Point3D, Quaternion, Transform, Vector3D};
pub use surface::{
    AnchorEvent, AnchorSnapshot, PatchGeometry, PatchId, ReplayHandle, ReplaySensor,
    SurfaceIndex, SurfaceLabel, SurfaceSensor,
};
