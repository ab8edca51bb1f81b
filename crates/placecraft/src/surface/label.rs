//! Semantic classification of reconstructed surfaces

use serde::{Deserialize, Serialize};

use crate::scene::Color;

/// Closed set of per-face labels reported by the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceLabel {
    #[default]
    None,
    Floor,
    Table,
    Wall,
    Ceiling,
    Door,
    Window,
    Seat,
}

impl SurfaceLabel {
    /// Every label, in declaration order. This order is the tie-break order
    /// for [`SurfaceLabel::dominant`].
    pub const ALL: [SurfaceLabel; 8] = [
        SurfaceLabel::None,
        SurfaceLabel::Floor,
        SurfaceLabel::Table,
        SurfaceLabel::Wall,
        SurfaceLabel::Ceiling,
        SurfaceLabel::Door,
        SurfaceLabel::Window,
        SurfaceLabel::Seat,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Debug wireframe color for this label
    pub fn color(&self) -> Color {
        match self {
            SurfaceLabel::None => Color::Grey,
            SurfaceLabel::Floor => Color::Green,
            SurfaceLabel::Table => Color::Yellow,
            SurfaceLabel::Wall => Color::Blue,
            SurfaceLabel::Ceiling => Color::Cyan,
            SurfaceLabel::Door => Color::BROWN,
            SurfaceLabel::Window => Color::PURPLE,
            SurfaceLabel::Seat => Color::ORANGE,
        }
    }

    /// Most frequent label among `labels`.
    ///
    /// `None` faces are counted like any other label. Ties go to the label
    /// that comes first in [`SurfaceLabel::ALL`], so `[Wall, Wall, Floor,
    /// Floor]` resolves to `Floor`. An empty input resolves to `None`.
    pub fn dominant(labels: impl IntoIterator<Item = SurfaceLabel>) -> SurfaceLabel {
        let mut counts = [0usize; SurfaceLabel::ALL.len()];
        for label in labels {
            counts[label.index()] += 1;
        }

        let mut best = SurfaceLabel::ALL[0];
        for label in SurfaceLabel::ALL.into_iter().skip(1) {
            if counts[label.index()] > counts[best.index()] {
                best = label;
            }
        }
        best
    }
}
