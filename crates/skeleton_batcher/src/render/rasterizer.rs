//! Rasterizer abstraction
//!
//! The batching pipeline never talks to a graphics API directly. Everything it
//! produces reaches the screen through this trait, in submission order.

use std::sync::Arc;

use crate::foundation::math::{Color, Rect, Vec2};
use crate::render::{BlendMode, RenderResult, TriangleBatch};

/// Destination for batched draw and state commands
///
/// Implementations may keep a clone of a submitted batch for as long as the
/// GPU reads it. The pipeline only recycles a batch's buffers once every clone
/// has been dropped.
pub trait Rasterizer {
    /// Draw an indexed triangle list with the batch's bound texture
    fn draw_triangles(&mut self, batch: &Arc<TriangleBatch>) -> RenderResult<()>;

    /// Change the compositing mode for every following draw
    fn set_blend_mode(&mut self, mode: BlendMode) -> RenderResult<()>;

    /// Draw a screen-space line
    fn draw_line(&mut self, start: Vec2, end: Vec2, color: Color, width: f32) -> RenderResult<()>;

    /// Draw a filled screen-space rectangle
    fn draw_rect(&mut self, rect: Rect, color: Color) -> RenderResult<()>;
}
