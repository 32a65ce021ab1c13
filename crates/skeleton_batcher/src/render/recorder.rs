//! Recording rasterizer
//!
//! Captures everything submitted to it as plain data. Used for headless runs
//! and throughout the test suite. It can also simulate a GPU that keeps
//! reading submitted buffers for a number of frames after submission.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::foundation::logging::trace;
use crate::foundation::math::{Color, Rect, Vec2};
use crate::render::{BlendMode, Rasterizer, RenderError, RenderResult, TextureId, TriangleBatch};

/// Snapshot of a drawn batch
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedBatch {
    /// Texture bound for the draw
    pub texture: TextureId,
    /// Screen-space positions
    pub positions: Vec<Vec2>,
    /// Per-vertex colours
    pub colors: Vec<Color>,
    /// Per-vertex texture coordinates
    pub uvs: Vec<Vec2>,
    /// Triangle indices
    pub indices: Vec<u32>,
}

impl RecordedBatch {
    fn capture(batch: &TriangleBatch, texture: TextureId) -> Self {
        Self {
            texture,
            positions: batch.positions().to_vec(),
            colors: batch.colors().to_vec(),
            uvs: batch.uvs().to_vec(),
            indices: batch.indices().to_vec(),
        }
    }
}

/// A command as seen by the rasterizer
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCommand {
    /// Triangle draw
    DrawTriangles(RecordedBatch),
    /// Compositing mode change
    SetBlendMode(BlendMode),
    /// Debug line
    Line {
        /// Start point
        start: Vec2,
        /// End point
        end: Vec2,
        /// Line colour
        color: Color,
        /// Line width in pixels
        width: f32,
    },
    /// Debug rectangle
    Rect {
        /// Rectangle bounds
        rect: Rect,
        /// Fill colour
        color: Color,
    },
}

/// Rasterizer that records submissions instead of drawing them
#[derive(Debug, Default)]
pub struct RecordingRasterizer {
    commands: Vec<RecordedCommand>,
    current_frame: Vec<Arc<TriangleBatch>>,
    in_flight: VecDeque<Vec<Arc<TriangleBatch>>>,
    latency: usize,
    rejected_texture: Option<TextureId>,
}

impl RecordingRasterizer {
    /// Create a recorder that releases batches as soon as they are captured
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a recorder that holds every drawn batch for `frames` calls to
    /// [`end_frame`](Self::end_frame)
    pub fn with_latency(frames: usize) -> Self {
        Self {
            latency: frames,
            ..Self::default()
        }
    }

    /// Fail every draw that binds `texture`
    pub fn reject_texture(&mut self, texture: TextureId) {
        self.rejected_texture = Some(texture);
    }

    /// Everything submitted so far, in order
    pub fn commands(&self) -> &[RecordedCommand] {
        &self.commands
    }

    /// Forget recorded commands; held batches are unaffected
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Recorded triangle draws, in order
    pub fn draw_calls(&self) -> impl Iterator<Item = &RecordedBatch> + '_ {
        self.commands.iter().filter_map(|command| match command {
            RecordedCommand::DrawTriangles(batch) => Some(batch),
            _ => None,
        })
    }

    /// Recorded blend mode changes, in order
    pub fn blend_changes(&self) -> impl Iterator<Item = BlendMode> + '_ {
        self.commands.iter().filter_map(|command| match command {
            RecordedCommand::SetBlendMode(mode) => Some(*mode),
            _ => None,
        })
    }

    /// Number of batches currently kept alive by this recorder
    pub fn held_batches(&self) -> usize {
        self.current_frame.len() + self.in_flight.iter().map(Vec::len).sum::<usize>()
    }

    /// Mark the end of a presented frame, releasing batches older than the latency
    pub fn end_frame(&mut self) {
        if self.latency == 0 {
            return;
        }

        self.in_flight.push_back(std::mem::take(&mut self.current_frame));
        while self.in_flight.len() > self.latency {
            self.in_flight.pop_front();
        }
    }
}

impl Rasterizer for RecordingRasterizer {
    fn draw_triangles(&mut self, batch: &Arc<TriangleBatch>) -> RenderResult<()> {
        let texture = batch
            .texture()
            .ok_or_else(|| RenderError::Rasterizer("batch has no texture bound".to_string()))?;

        if self.rejected_texture == Some(texture) {
            return Err(RenderError::Rasterizer(format!("texture {texture:?} rejected")));
        }

        trace!(
            "Recording draw: {} vertices, {} indices, texture {:?}",
            batch.vertex_count(),
            batch.index_count(),
            texture
        );
        self.commands.push(RecordedCommand::DrawTriangles(RecordedBatch::capture(batch, texture)));

        if self.latency > 0 {
            self.current_frame.push(Arc::clone(batch));
        }
        Ok(())
    }

    fn set_blend_mode(&mut self, mode: BlendMode) -> RenderResult<()> {
        self.commands.push(RecordedCommand::SetBlendMode(mode));
        Ok(())
    }

    fn draw_line(&mut self, start: Vec2, end: Vec2, color: Color, width: f32) -> RenderResult<()> {
        self.commands.push(RecordedCommand::Line { start, end, color, width });
        Ok(())
    }

    fn draw_rect(&mut self, rect: Rect, color: Color) -> RenderResult<()> {
        self.commands.push(RecordedCommand::Rect { rect, color });
        Ok(())
    }
}
