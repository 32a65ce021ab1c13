//! # Skeleton Batcher
//!
//! Per-frame render batching for skinned 2D skeletal characters.
//!
//! ## Features
//!
//! - **Geometry Extraction**: Walks a posed skeleton in draw order and resolves
//!   world-space vertices, UVs, triangles, textures and tints per attachment
//! - **Texture-Coherent Batching**: Fixed-capacity triangle batches split on
//!   texture changes, capacity overflow and blend-mode changes
//! - **Deferred-Safe Command Queue**: Flushed batches stay alive for a
//!   configurable number of frames so a deferred rasterizer never observes a
//!   reclaimed buffer
//! - **Overlay Pass**: Attachments matched by a path prefix always composite
//!   above the primary pass
//! - **Debug Overlay**: Wireframes, bounding polygons and bone gizmos
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use skeleton_batcher::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut renderer = SkeletonRenderer::new(RenderConfig::default())?;
//!     let mut rasterizer = RecordingRasterizer::new();
//!     let skeleton = Skeleton::new(Vec::new(), Vec::new());
//!
//!     // Once per rendered frame, after the pose has been evaluated
//!     renderer.render_frame(&skeleton, &mut rasterizer)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod core;
pub mod skeleton;
pub mod render;
pub mod debug;
pub mod assets;
pub mod scene;

/// Common imports for pipeline users
pub mod prelude {
    pub use crate::{
        assets::NameRemapper,
        config::{Config, ConfigError},
        core::config::{BatcherConfig, DebugDrawConfig, RenderConfig},
        debug::{DebugLayers, DebugShape, SkeletonDebugDraw},
        foundation::math::{Color, Rect, Transform2D, Vec2},
        render::{
            BatchAccumulator, BatchCommand, BatchError, BatchStats, CommandKind, Flip,
            FrameStats, GeometryExtractor, Rasterizer, RecordingRasterizer, RenderError,
            RenderPass, SkeletonRenderer, TextureId, TriangleBatch, skeleton_bounds,
        },
        scene::{FollowerArena, FollowerHandle, FollowerParams},
        skeleton::{
            Attachment, AttachmentKind, BlendMode, Bone, BoundingBoxAttachment, MeshAttachment,
            RegionAttachment, Skeleton, Slot,
        },
    };
}
