//! Spatial primitives shared by the scene contract, the surface index and the
//! gesture machine.
//!
//! Right-handed coordinate system, matching the scene runtime:
//! - X: Right (+) / Left (-)
//! - Y: Up (+) / Down (-)
//! - Z: Forward (+) / Backward (-)

mod bounds;
mod point3d;
mod quaternion;
mod transform;
mod vector3d;

pub use bounds::Bounds;
pub use point3d::Point3D;
pub use quaternion::Quaternion;
pub use transform::{Matrix4, Transform};
pub use vector3d::Vector3D;

/// Tolerance used for float comparisons across the crate
pub const EPSILON: f32 = 1.0e-6;
