//! Visual materials the engine assigns to objects it spawns

use serde::{Deserialize, Serialize};

/// Display color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Color {
    Grey,
    Green,
    Blue,
    Yellow,
    Cyan,
    Rgb(u8, u8, u8),
}

impl Color {
    pub const ORANGE: Self = Color::Rgb(255, 165, 0);
    pub const PURPLE: Self = Color::Rgb(128, 0, 128);
    pub const BROWN: Self = Color::Rgb(139, 69, 19);

    pub fn to_rgb(&self) -> (u8, u8, u8) {
        match self {
            Color::Grey => (128, 128, 128),
            Color::Green => (0, 255, 0),
            Color::Blue => (0, 0, 255),
            Color::Yellow => (255, 255, 0),
            Color::Cyan => (0, 255, 255),
            Color::Rgb(r, g, b) => (*r, *g, *b),
        }
    }
}

/// How an engine-spawned object is drawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Material {
    /// Invisible, but writes depth so real-world surfaces hide virtual content
    Occlusion,
    /// Debug wireframe in a flat color
    Wireframe(Color),
}

impl Material {
    pub fn is_visible(&self) -> bool {
        !matches!(self, Material::Occlusion)
    }
}
