//! Input layer samples
//!
//! Continuous pointer/hand manipulation arrives as phase-tagged samples, one
//! stream per gesture kind. Values are cumulative since the gesture began.

mod sample;

pub use sample::{CoordinateSpace, DragSample, InputSample, RotateSample, ScaleSample};

use serde::{Deserialize, Serialize};

/// Lifecycle phase of one input sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GesturePhase {
    Began,
    Changed,
    Ended,
    /// Interrupted by the input layer; nothing is committed
    Cancelled,
}

impl GesturePhase {
    /// Ended or cancelled
    pub fn is_terminal(&self) -> bool {
        matches!(self, GesturePhase::Ended | GesturePhase::Cancelled)
    }
}
