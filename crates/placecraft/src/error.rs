//! Error types.
//!
//! Interactive paths (gestures, placement, surface updates) never return
//! these to callers: they degrade to logged no-ops or `false`. Errors only
//! surface from configuration loading and from the collaborator traits'
//! own signatures.

use std::path::PathBuf;

/// Failures reading or parsing engine configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Failures reported by the surface-reconstruction sensor service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SensorError {
    #[error("Surface reconstruction is not supported on this runtime")]
    Unsupported,

    #[error("Permission to use the surface sensor was denied")]
    PermissionDenied,

    #[error("Surface sensor is busy")]
    ResourceBusy,

    #[error("Sensor session error: {0}")]
    Session(String),
}

/// Failures building a collider from patch geometry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    #[error("Geometry has no triangles")]
    EmptyGeometry,

    #[error("Face {face} references vertex {index}, but only {vertex_count} vertices exist")]
    IndexOutOfBounds {
        face: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("Shape build was cancelled")]
    Cancelled,

    #[error("Shape builder panicked")]
    Panicked,
}

pub type Result<T> = std::result::Result<T, ConfigError>;
