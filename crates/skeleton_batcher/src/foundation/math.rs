//! Math utilities and types
//!
//! Provides the 2D math types used by the batching pipeline.

pub use nalgebra::{Vector2, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// RGBA colour with every channel in [0, 1]
pub type Color = Vec4;

/// Named colours used by the pipeline and the debug overlay
pub mod colors {
    use super::Color;

    /// Opaque white, the neutral tint
    pub fn white() -> Color {
        Color::new(1.0, 1.0, 1.0, 1.0)
    }

    /// Opaque red
    pub fn red() -> Color {
        Color::new(1.0, 0.0, 0.0, 1.0)
    }

    /// Opaque green
    pub fn green() -> Color {
        Color::new(0.0, 1.0, 0.0, 1.0)
    }

    /// Opaque blue
    pub fn blue() -> Color {
        Color::new(0.0, 0.0, 1.0, 1.0)
    }

    /// Opaque cyan
    pub fn cyan() -> Color {
        Color::new(0.0, 1.0, 1.0, 1.0)
    }
}

/// Converts an `[r, g, b, a]` array into a [`Color`]
pub fn color_from_array(rgba: [f32; 4]) -> Color {
    Color::new(rgba[0], rgba[1], rgba[2], rgba[3])
}

/// Axis-aligned rectangle in screen space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Top-left corner
    pub position: Vec2,

    /// Width and height
    pub size: Vec2,
}

impl Rect {
    /// Create a rectangle from its corner and size
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    /// Create the smallest rectangle spanning two corners
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self {
            position: min,
            size: max - min,
        }
    }

    /// Minimum corner
    pub fn min(&self) -> Vec2 {
        self.position
    }

    /// Maximum corner
    pub fn max(&self) -> Vec2 {
        self.position + self.size
    }

    /// Check if this rectangle contains a point (edges inclusive)
    pub fn contains_point(&self, point: Vec2) -> bool {
        let max = self.max();
        point.x >= self.position.x && point.x <= max.x &&
        point.y >= self.position.y && point.y <= max.y
    }
}

/// 2D transform representing position, rotation and scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    /// Position in screen space
    pub position: Vec2,

    /// Rotation in radians
    pub rotation: f32,

    /// Scale factors
    pub scale: Vec2,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            rotation: 0.0,
            scale: Vec2::new(1.0, 1.0),
        }
    }
}

impl Transform2D {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }
}
