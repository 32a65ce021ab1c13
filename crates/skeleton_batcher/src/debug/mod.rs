//! Debug module for skeleton visualization
//!
//! Wireframes for attachments, bone segments and bone origin markers, drawn
//! after both render passes.

pub mod draw;

pub use draw::{DebugColors, DebugLayers, DebugShape, SkeletonDebugDraw};
