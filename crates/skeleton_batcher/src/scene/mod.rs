//! Scene integration
//!
//! Host-side objects that track the pose without being drawn by the batcher.
//!
//! ## Architecture
//!
//! ```text
//! Skeleton pose (bones)
//!      ↓
//! FollowerArena (bone bindings + offsets)
//!      ↓
//! Host scene nodes (Transform2D per handle)
//! ```

mod followers;

pub use followers::{follower_transform, Follower, FollowerArena, FollowerError, FollowerHandle, FollowerParams};
