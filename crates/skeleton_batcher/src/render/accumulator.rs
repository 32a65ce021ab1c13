//! # Batch Accumulator
//!
//! Packs attachment geometry into fixed-capacity, single-texture batches and
//! queues them as draw commands, interleaved with blend-mode changes, in the
//! exact order the caller submitted them.
//!
//! ## Batching Rules
//!
//! - A batch is closed when the next attachment binds a different texture
//! - A batch is closed when the next attachment would push it past its vertex
//!   or index capacity
//! - A batch is closed before every blend-mode change
//! - Closing a batch that holds no indices queues nothing
//!
//! ## Lifecycle
//!
//! `reset()` → `add()`/`add_blend_mode()` … → `flush()` → `reset()` …
//!
//! Calling `add`, `add_blend_mode` or `flush` after `flush` without an
//! intervening `reset` fails with [`BatchError::ResetRequired`].

use std::sync::Arc;

use crate::config::ConfigError;
use crate::core::config::BatcherConfig;
use crate::foundation::logging::{debug, trace};
use crate::foundation::math::Color;
use crate::render::{
    AttachmentGeometry, BatchCommand, BlendMode, CommandQueue, Flip, Rasterizer, RenderResult,
    TextureId, TriangleBatch,
};

/// Result type for batching operations
pub type BatchResult<T> = Result<T, BatchError>;

/// Errors that can occur while accumulating geometry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchError {
    /// Vertex data is not a whole number of `(x, y)` pairs
    #[error("Vertex data has an odd float count: {0}")]
    OddVertexData(usize),

    /// UV data does not have one pair per vertex
    #[error("UV float count {uvs} does not match vertex float count {vertices}")]
    UvMismatch {
        /// Vertex floats supplied
        vertices: usize,
        /// UV floats supplied
        uvs: usize,
    },

    /// Index data is not a whole number of triangles
    #[error("Index count {0} is not a multiple of 3")]
    PartialTriangle(usize),

    /// An index references a vertex the attachment does not have
    #[error("Index {index} is out of range for an attachment with {vertex_count} vertices")]
    IndexOutOfRange {
        /// Offending index
        index: u16,
        /// Vertices in the attachment
        vertex_count: usize,
    },

    /// A single attachment is larger than an empty batch
    #[error("Attachment with {vertices} vertices and {indices} indices exceeds batch capacity of {capacity} vertices")]
    ExceedsCapacity {
        /// Attachment vertices
        vertices: usize,
        /// Attachment indices
        indices: usize,
        /// Batch vertex capacity
        capacity: usize,
    },

    /// The accumulator was used after `flush` without a `reset`
    #[error("{operation} called after flush; reset() must start the next pass")]
    ResetRequired {
        /// Rejected operation
        operation: &'static str,
    },
}

impl BatchError {
    /// Check if this error is a caller lifecycle bug rather than bad geometry
    pub fn is_lifecycle_violation(&self) -> bool {
        matches!(self, Self::ResetRequired { .. })
    }
}

/// Accumulator lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccumulatorState {
    /// Accepting geometry
    Accumulating,
    /// Flushed; waiting for `reset`
    Flushed,
}

/// Statistics for the current pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Attachments appended
    pub attachments: usize,
    /// Draw batches queued
    pub batches: usize,
    /// Blend-mode commands queued
    pub blend_changes: usize,
    /// Vertices appended
    pub vertices: usize,
    /// Indices appended
    pub indices: usize,
    /// Batches closed because the texture changed
    pub texture_splits: usize,
    /// Batches closed because capacity ran out
    pub capacity_splits: usize,
    /// Retired draw commands reclaimed by the last reset
    pub reclaimed_batches: usize,
    /// Reclaimed batches whose storage was recycled
    pub recycled_batches: usize,
}

impl BatchStats {
    /// Average vertices per queued batch
    #[allow(clippy::cast_precision_loss)]
    pub fn average_batch_vertices(&self) -> f32 {
        if self.batches == 0 {
            0.0
        } else {
            self.vertices as f32 / self.batches as f32
        }
    }
}

/// Packs geometry into texture-coherent batches
#[derive(Debug)]
pub struct BatchAccumulator {
    config: BatcherConfig,
    active: TriangleBatch,
    queue: CommandQueue,
    free_batches: Vec<TriangleBatch>,
    state: AccumulatorState,
    stats: BatchStats,
}

impl BatchAccumulator {
    /// Create an accumulator
    pub fn new(config: BatcherConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let active = Self::allocate(&config);
        let queue = CommandQueue::new(config.retire_lag);
        debug!(
            "Created batch accumulator: {} vertices / {} indices per batch, retire lag {}",
            config.batch_capacity,
            config.index_capacity(),
            config.retire_lag
        );

        Ok(Self {
            config,
            active,
            queue,
            free_batches: Vec::new(),
            state: AccumulatorState::Accumulating,
            stats: BatchStats::default(),
        })
    }

    fn allocate(config: &BatcherConfig) -> TriangleBatch {
        if config.preallocate {
            TriangleBatch::preallocated(config.batch_capacity)
        } else {
            TriangleBatch::new(config.batch_capacity)
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &BatcherConfig {
        &self.config
    }

    /// Lifecycle state
    pub fn state(&self) -> AccumulatorState {
        self.state
    }

    /// Statistics for the current pass
    pub fn stats(&self) -> &BatchStats {
        &self.stats
    }

    /// Batch currently being filled
    pub fn active(&self) -> &TriangleBatch {
        &self.active
    }

    /// Commands queued since the last flush
    pub fn pending(&self) -> &[BatchCommand] {
        self.queue.pending()
    }

    /// Commands submitted by the most recent flush, if not yet reclaimed
    pub fn last_flushed(&self) -> Option<&[BatchCommand]> {
        self.queue.last_flushed()
    }

    /// Commands retired and awaiting reclamation
    pub fn retired_len(&self) -> usize {
        self.queue.retired_len()
    }

    /// Recycled batches ready for reuse
    pub fn free_batches(&self) -> usize {
        self.free_batches.len()
    }

    fn ensure_accumulating(&self, operation: &'static str) -> BatchResult<()> {
        match self.state {
            AccumulatorState::Accumulating => Ok(()),
            AccumulatorState::Flushed => Err(BatchError::ResetRequired { operation }),
        }
    }

    /// Append one attachment's geometry
    ///
    /// `vertices` and `uvs` are flat `[x, y, ...]` slices of equal length and
    /// `indices` are attachment-local triangle indices. Geometry with no
    /// indices is ignored. Malformed geometry is rejected without touching
    /// the active batch.
    pub fn add(
        &mut self,
        texture: TextureId,
        vertices: &[f32],
        uvs: &[f32],
        indices: &[u16],
        color: Color,
        flip: Flip,
    ) -> BatchResult<()> {
        self.ensure_accumulating("add")?;
        let vertex_count = validate_geometry(vertices, uvs, indices, &self.config)?;

        if indices.is_empty() {
            trace!("Ignoring attachment without triangles");
            return Ok(());
        }

        match self.active.texture() {
            None => self.active.bind(texture),
            Some(bound) if bound != texture => {
                self.stats.texture_splits += 1;
                self.close_active();
                self.active.bind(texture);
            }
            Some(_) => {}
        }

        if !self.active.fits(vertex_count, indices.len()) {
            self.stats.capacity_splits += 1;
            self.close_active();
            self.active.bind(texture);
        }

        self.active.append(vertices, uvs, indices, color, flip);
        self.stats.attachments += 1;
        self.stats.vertices += vertex_count;
        self.stats.indices += indices.len();
        Ok(())
    }

    /// Check extracted geometry without queuing anything
    ///
    /// Returns the vertex count [`add_geometry`](Self::add_geometry) would
    /// append, or the error it would reject the geometry with.
    pub fn check_geometry(&self, geometry: &AttachmentGeometry<'_>) -> BatchResult<usize> {
        validate_geometry(geometry.vertices, geometry.uvs, geometry.indices, &self.config)
    }

    /// Append extracted attachment geometry
    pub fn add_geometry(&mut self, geometry: &AttachmentGeometry<'_>, flip: Flip) -> BatchResult<()> {
        self.add(
            geometry.texture,
            geometry.vertices,
            geometry.uvs,
            geometry.indices,
            geometry.color,
            flip,
        )
    }

    /// Close the active batch and queue a blend-mode change
    pub fn add_blend_mode(&mut self, mode: BlendMode) -> BatchResult<()> {
        self.ensure_accumulating("add_blend_mode")?;
        self.close_active();
        self.queue.push(BatchCommand::SetBlendMode(mode));
        self.stats.blend_changes += 1;
        Ok(())
    }

    /// Close the active batch and submit every queued command in order
    ///
    /// The accumulator refuses further work until [`reset`](Self::reset),
    /// even if the rasterizer reported an error part way through.
    pub fn flush(&mut self, rasterizer: &mut dyn Rasterizer) -> RenderResult<()> {
        self.ensure_accumulating("flush")?;
        self.close_active();
        self.state = AccumulatorState::Flushed;

        let submitted = self.queue.flush(rasterizer)?;
        debug!(
            "Flushed {} commands ({} batches, {} blend changes, {} vertices)",
            submitted, self.stats.batches, self.stats.blend_changes, self.stats.vertices
        );
        Ok(())
    }

    /// Start a new pass
    ///
    /// Generations flushed at least `retire_lag` resets ago are reclaimed.
    /// The most recent generation stays alive when the lag is greater than 1.
    pub fn reset(&mut self) {
        let report = self.queue.reclaim(&mut self.free_batches);
        if report.reclaimed > 0 {
            trace!(
                "Reclaimed {} batches ({} recycled, {} still shared)",
                report.reclaimed, report.recycled, report.released_shared
            );
        }

        self.stats = BatchStats {
            reclaimed_batches: report.reclaimed,
            recycled_batches: report.recycled,
            ..BatchStats::default()
        };
        self.state = AccumulatorState::Accumulating;
    }

    /// Queue the active batch if it holds anything, then start a fresh one
    fn close_active(&mut self) {
        if self.active.is_empty() {
            self.active.clear();
            return;
        }

        let next = self
            .free_batches
            .pop()
            .unwrap_or_else(|| Self::allocate(&self.config));
        let closed = std::mem::replace(&mut self.active, next);

        trace!(
            "Closed batch: texture {:?}, {} vertices, {} indices",
            closed.texture(),
            closed.vertex_count(),
            closed.index_count()
        );
        self.stats.batches += 1;
        self.queue.push(BatchCommand::DrawBatch(Arc::new(closed)));
    }
}

/// Check attachment geometry and return its vertex count
fn validate_geometry(
    vertices: &[f32],
    uvs: &[f32],
    indices: &[u16],
    config: &BatcherConfig,
) -> BatchResult<usize> {
    if vertices.len() % 2 != 0 {
        return Err(BatchError::OddVertexData(vertices.len()));
    }

    if uvs.len() != vertices.len() {
        return Err(BatchError::UvMismatch {
            vertices: vertices.len(),
            uvs: uvs.len(),
        });
    }

    if indices.len() % 3 != 0 {
        return Err(BatchError::PartialTriangle(indices.len()));
    }

    let vertex_count = vertices.len() / 2;
    if let Some(&index) = indices.iter().find(|&&index| usize::from(index) >= vertex_count) {
        return Err(BatchError::IndexOutOfRange { index, vertex_count });
    }

    if vertex_count > config.batch_capacity || indices.len() > config.index_capacity() {
        return Err(BatchError::ExceedsCapacity {
            vertices: vertex_count,
            indices: indices.len(),
            capacity: config.batch_capacity,
        });
    }

    Ok(vertex_count)
}
