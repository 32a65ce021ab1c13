//! # Render Batching Pipeline
//!
//! Turns a posed skeleton into an ordered list of draw and state commands for
//! a 2D rasterizer.
//!
//! ## Architecture
//!
//! ```text
//! Skeleton pose ──► GeometryExtractor ──► BatchAccumulator ──► CommandQueue ──► Rasterizer
//!                  (per attachment)      (fixed capacity,     (pending → retired
//!                                         one texture)         → reclaimed)
//! ```
//!
//! - **GeometryExtractor**: Walks slots in draw order and resolves geometry
//! - **BatchAccumulator**: Packs geometry into texture-coherent batches
//! - **CommandQueue**: Replays commands in order and keeps submitted buffers
//!   alive until a later reset
//! - **SkeletonRenderer**: Drives one accumulate/flush/reset cycle per frame
//!   for the primary and overlay passes
//!
//! ## Frame Lifecycle
//!
//! Each pass runs `reset()`, any number of `add()`/`add_blend_mode()` calls,
//! then `flush()`. Buffers submitted in pass N are only reclaimed by the
//! reset that starts pass N + `retire_lag`.

pub mod accumulator;
pub mod batch;
pub mod bounds;
pub mod command;
pub mod extract;
pub mod rasterizer;
pub mod recorder;
pub mod renderer;

#[cfg(test)]
mod tests;

use crate::foundation::math::Vec2;

pub use accumulator::{AccumulatorState, BatchAccumulator, BatchError, BatchResult, BatchStats};
pub use batch::TriangleBatch;
pub use bounds::skeleton_bounds;
pub use command::{BatchCommand, CommandKind, CommandQueue, ReclaimReport};
pub use extract::{AttachmentGeometry, ExtractStats, GeometryExtractor, RenderPass, QUAD_TRIANGLES};
pub use rasterizer::Rasterizer;
pub use recorder::{RecordedBatch, RecordedCommand, RecordingRasterizer};
pub use renderer::{FrameStats, SkeletonRenderer};

pub use crate::skeleton::BlendMode;

/// Opaque texture handle issued by the resource collaborator
///
/// Identity is the only property the pipeline inspects: two attachments can
/// share a batch exactly when their handles compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u64);

/// Axis mirroring applied when converting world space to screen space
///
/// World space is Y-up and screen space is Y-down, so the default conversion
/// negates Y. Setting `y` keeps world-space Y unchanged; setting `x` mirrors
/// horizontally. The batcher, the debug overlay and the bounds helper all go
/// through [`Flip::to_screen`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Flip {
    /// Mirror horizontally
    pub x: bool,
    /// Skip the default Y inversion
    pub y: bool,
}

impl Flip {
    /// No mirroring
    pub const NONE: Self = Self { x: false, y: false };

    /// Create flip flags
    pub const fn new(x: bool, y: bool) -> Self {
        Self { x, y }
    }

    /// Map a world-space point to screen space
    pub fn to_screen(self, x: f32, y: f32) -> Vec2 {
        Vec2::new(
            if self.x { -x } else { x },
            if self.y { y } else { -y },
        )
    }
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors surfaced by the rendering pipeline
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The rasterizer rejected a submitted command
    #[error("Rasterizer error: {0}")]
    Rasterizer(String),

    /// The skeleton handed to the renderer is not a usable pose
    ///
    /// This is a caller lifecycle bug, such as drawing before the pose has
    /// been populated.
    #[error("Invalid skeleton pose: {0}")]
    InvalidPose(String),

    /// A batching operation failed
    #[error("Batching error: {0}")]
    Batch(#[from] BatchError),
}

#[cfg(test)]
mod flip_tests {
    use super::*;

    #[test]
    fn test_default_inverts_y() {
        assert_eq!(Flip::NONE.to_screen(3.0, 4.0), Vec2::new(3.0, -4.0));
    }

    #[test]
    fn test_flip_x_mirrors() {
        assert_eq!(Flip::new(true, false).to_screen(3.0, 4.0), Vec2::new(-3.0, -4.0));
    }

    #[test]
    fn test_flip_y_keeps_world_y() {
        assert_eq!(Flip::new(false, true).to_screen(3.0, 4.0), Vec2::new(3.0, 4.0));
    }
}
