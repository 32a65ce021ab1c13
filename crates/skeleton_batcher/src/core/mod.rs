//! # Core Module
//!
//! Shared configuration types used by the batching pipeline and its
//! collaborators.

pub mod config;

// Re-export commonly used config types
pub use config::{
    BatcherConfig,
    DebugDrawConfig,
    RenderConfig,
    Config,
    ConfigError,
};
