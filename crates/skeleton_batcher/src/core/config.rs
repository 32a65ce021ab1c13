//! # Pipeline Configuration
//!
//! Typed configuration for the batching pipeline, the overlay pass and the
//! debug overlay. Every structure deserializes with defaults for missing
//! fields, so a config file only needs to name what it changes.
//!
//! ## Configuration Categories
//!
//! - **Batcher Config**: Batch capacity, retirement lag, buffer preallocation
//! - **Debug Draw Config**: Which diagnostic layers the overlay emits
//! - **Render Config**: Per-character settings (tint, flips, overlay prefix)

use serde::{Serialize, Deserialize};

use crate::debug::DebugLayers;
use crate::foundation::math::{color_from_array, Color};

pub use crate::config::{Config, ConfigError};

/// Reference batch capacity in vertices
pub const DEFAULT_BATCH_CAPACITY: usize = 1024;

/// Largest accepted batch capacity in vertices
pub const MAX_BATCH_CAPACITY: usize = 1 << 20;

/// Largest accepted retirement lag in frames
pub const MAX_RETIRE_LAG: usize = 16;

/// Path substring that routes an attachment to the overlay pass
pub const DEFAULT_OVERLAY_PREFIX: &str = "fx/";

/// # Batcher Configuration
///
/// Capacity and buffer lifetime settings for one batch accumulator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatcherConfig {
    /// Maximum vertices per batch; index capacity is three times this
    pub batch_capacity: usize,
    /// Number of resets a flushed generation survives before reclamation
    ///
    /// A lag of 1 frees pass N's buffers at pass N+1's reset. Raise it when
    /// the rasterizer keeps reading submitted buffers for more than one
    /// additional frame.
    pub retire_lag: usize,
    /// Reserve full capacity when a batch buffer is created
    pub preallocate: bool,
}

impl BatcherConfig {
    /// Create a batcher configuration with the given capacity
    pub fn new(batch_capacity: usize) -> Self {
        Self {
            batch_capacity,
            ..Self::default()
        }
    }

    /// Set the retirement lag in frames
    pub fn with_retire_lag(mut self, frames: usize) -> Self {
        self.retire_lag = frames;
        self
    }

    /// Enable or disable buffer preallocation
    pub fn with_preallocation(mut self, enabled: bool) -> Self {
        self.preallocate = enabled;
        self
    }

    /// Maximum indices per batch
    pub fn index_capacity(&self) -> usize {
        self.batch_capacity.saturating_mul(3)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_capacity == 0 {
            return Err(ConfigError::Invalid("batch capacity must be at least 1".to_string()));
        }

        if self.batch_capacity > MAX_BATCH_CAPACITY {
            return Err(ConfigError::Invalid(format!(
                "batch capacity {} exceeds the maximum of {} vertices",
                self.batch_capacity, MAX_BATCH_CAPACITY
            )));
        }

        if self.retire_lag == 0 {
            return Err(ConfigError::Invalid(
                "retire lag must be at least 1 frame".to_string(),
            ));
        }

        if self.retire_lag > MAX_RETIRE_LAG {
            return Err(ConfigError::Invalid(format!(
                "retire lag {} exceeds the maximum of {} frames",
                self.retire_lag, MAX_RETIRE_LAG
            )));
        }

        Ok(())
    }
}

impl Default for BatcherConfig {
    fn default() -> Self {
        Self {
            batch_capacity: DEFAULT_BATCH_CAPACITY,
            retire_lag: 1,
            preallocate: true,
        }
    }
}

/// # Debug Draw Configuration
///
/// Diagnostic layers drawn on top of the character. All layers are off by
/// default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugDrawConfig {
    /// Outline region attachments
    pub regions: bool,
    /// Wireframe mesh attachments
    pub meshes: bool,
    /// Outline bounding-box attachments
    pub bounding_boxes: bool,
    /// Draw bone segments and origin markers
    pub bones: bool,
}

impl DebugDrawConfig {
    /// Convert to the layer mask consumed by the debug overlay
    pub fn layers(&self) -> DebugLayers {
        let mut layers = DebugLayers::empty();
        layers.set(DebugLayers::REGIONS, self.regions);
        layers.set(DebugLayers::MESHES, self.meshes);
        layers.set(DebugLayers::BOUNDING_BOXES, self.bounding_boxes);
        layers.set(DebugLayers::BONES, self.bones);
        layers
    }
}

/// # Render Configuration
///
/// Per-character rendering settings consumed by
/// [`SkeletonRenderer`](crate::render::SkeletonRenderer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Accumulator settings shared by the primary and overlay passes
    pub batcher: BatcherConfig,
    /// Attachment path substring selecting the overlay pass
    pub overlay_prefix: String,
    /// Mirror the character horizontally
    pub flip_x: bool,
    /// Keep world-space Y instead of inverting it into screen space
    pub flip_y: bool,
    /// Skeleton-wide RGBA tint
    pub modulate: [f32; 4],
    /// Debug overlay layers
    pub debug: DebugDrawConfig,
}

impl RenderConfig {
    /// Create a new render configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom batcher configuration
    pub fn with_batcher(mut self, batcher: BatcherConfig) -> Self {
        self.batcher = batcher;
        self
    }

    /// Set the overlay path prefix
    pub fn with_overlay_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.overlay_prefix = prefix.into();
        self
    }

    /// Set the flip flags
    pub fn with_flip(mut self, flip_x: bool, flip_y: bool) -> Self {
        self.flip_x = flip_x;
        self.flip_y = flip_y;
        self
    }

    /// Set the skeleton tint
    pub fn with_modulate(mut self, rgba: [f32; 4]) -> Self {
        self.modulate = rgba;
        self
    }

    /// Set debug overlay layers
    pub fn with_debug(mut self, debug: DebugDrawConfig) -> Self {
        self.debug = debug;
        self
    }

    /// Skeleton tint as a colour
    pub fn modulate_color(&self) -> Color {
        color_from_array(self.modulate)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.batcher.validate()?;

        if self.overlay_prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "overlay prefix cannot be empty".to_string(),
            ));
        }

        if let Some(channel) = self.modulate.iter().find(|c| !(0.0..=1.0).contains(*c)) {
            return Err(ConfigError::Invalid(format!(
                "modulate channel {channel} is outside [0, 1]"
            )));
        }

        Ok(())
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            batcher: BatcherConfig::default(),
            overlay_prefix: DEFAULT_OVERLAY_PREFIX.to_string(),
            flip_x: false,
            flip_y: false,
            modulate: [1.0, 1.0, 1.0, 1.0],
            debug: DebugDrawConfig::default(),
        }
    }
}

impl Config for RenderConfig {}
