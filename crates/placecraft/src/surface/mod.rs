//! Surface placement subsystem
//!
//! Ingests anchor deltas from a [`SurfaceSensor`], keeps one collidable,
//! label-colored scene entity per detected patch and exposes the result to
//! placement queries through ordinary scene raycasts.

mod index;
mod label;
mod patch;
mod sensor;
mod shape;

pub use index::SurfaceIndex;
pub use label::SurfaceLabel;
pub use patch::{AnchorEvent, AnchorEventKind, AnchorSnapshot, PatchGeometry, PatchId, SurfacePatch};
pub use sensor::{
    AuthorizationStatus, ProviderState, ReplayHandle, ReplaySensor, SensorStreams, SessionEvent,
    SurfaceSensor,
};
pub use shape::{ShapeBuilder, StaticMeshBuilder};
