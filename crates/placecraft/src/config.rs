//! Engine configuration, loaded from TOML
//!
//! Debug switches that would otherwise be global mutable flags live here and
//! are handed to each component at construction.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::spatial::Vector3D;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "PLACECRAFT_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub debug: DebugConfig,
    pub placement: PlacementConfig,
    pub gesture: GestureConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Draw surface patches as label-colored wireframes instead of occluders
    pub visualization: bool,
    /// Log swallowed sensor and shape failures
    pub logging: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Hits farther than this below a dragged object deny placement
    pub max_distance: f32,
    /// Lift above the hit point, against z-fighting with the surface
    pub surface_offset: f32,
    /// Indicator scale at exactly `max_distance`
    pub min_indicator_scale: f32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            max_distance: 0.3,
            surface_offset: 0.001,
            min_indicator_scale: 0.25,
        }
    }
}

/// Axis a rotation gesture may be locked to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn vector(&self) -> Vector3D {
        match self {
            Axis::X => Vector3D::RIGHT,
            Axis::Y => Vector3D::UP,
            Axis::Z => Vector3D::FORWARD,
        }
    }
}

/// Rotation gesture policy. Leaving it unset in TOML means `Free`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationMode {
    /// No restriction
    #[default]
    Free,
    /// Only the twist about this axis is applied
    Locked(Axis),
    /// Rotation samples are ignored
    Disabled,
}

/// Bounds on the scale gesture's magnification factor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleLimits {
    /// Lower bound; `0.0` removes it
    pub min_factor: f32,
    pub max_factor: Option<f32>,
}

impl Default for ScaleLimits {
    fn default() -> Self {
        Self {
            min_factor: 0.01,
            max_factor: None,
        }
    }
}

impl ScaleLimits {
    pub fn unbounded() -> Self {
        Self {
            min_factor: 0.0,
            max_factor: None,
        }
    }

    pub fn clamp(&self, factor: f32) -> f32 {
        let mut factor = factor;
        if self.min_factor > 0.0 {
            factor = factor.max(self.min_factor);
        }
        if let Some(max) = self.max_factor {
            factor = factor.min(max);
        }
        factor
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub rotation: RotationMode,
    pub scale_limits: ScaleLimits,
    /// Refuse a second gesture kind on an entity another kind already holds
    pub exclusive_targets: bool,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            rotation: RotationMode::Free,
            scale_limits: ScaleLimits::default(),
            exclusive_targets: true,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Platform config location, e.g. `~/.config/placecraft/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "placecraft", "placecraft")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Resolve configuration: explicit path, then `PLACECRAFT_CONFIG`, then
    /// the platform default location, then built-in defaults. Only a missing
    /// file at the platform default location is tolerated.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::load(Path::new(&path));
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let placement = &self.placement;
        if !(placement.max_distance > 0.0) {
            return Err(ConfigError::Invalid {
                field: "placement.max_distance",
                reason: format!("must be positive, got {}", placement.max_distance),
            });
        }
        if !(0.0..=1.0).contains(&placement.min_indicator_scale) {
            return Err(ConfigError::Invalid {
                field: "placement.min_indicator_scale",
                reason: format!("must be within [0, 1], got {}", placement.min_indicator_scale),
            });
        }
        let limits = &self.gesture.scale_limits;
        if limits.min_factor < 0.0 {
            return Err(ConfigError::Invalid {
                field: "gesture.scale_limits.min_factor",
                reason: "must not be negative".to_string(),
            });
        }
        if let Some(max) = limits.max_factor {
            if max < limits.min_factor {
                return Err(ConfigError::Invalid {
                    field: "gesture.scale_limits.max_factor",
                    reason: format!("{} is below min_factor {}", max, limits.min_factor),
                });
            }
        }
        Ok(())
    }
}
