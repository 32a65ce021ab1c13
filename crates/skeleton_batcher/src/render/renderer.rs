//! # Skeleton Renderer
//!
//! Per-character frame driver. Owns one accumulator for the character and one
//! for its overlay effects, and runs a full reset → accumulate → flush cycle
//! on both every frame.
//!
//! ## Frame Order
//!
//! 1. Primary pass: every non-overlay attachment in draw order
//! 2. Overlay pass: attachments whose path contains the overlay prefix
//! 3. Debug overlay, when any layer is enabled
//!
//! Blend-mode changes are emitted only when the next attachment in the same
//! pass uses a different mode than the previous one. A pass that changed mode
//! restores `Normal` before it is flushed.

use crate::config::ConfigError;
use crate::core::config::{DebugDrawConfig, RenderConfig};
use crate::debug::SkeletonDebugDraw;
use crate::foundation::logging::{debug, warn};
use crate::foundation::math::Color;
use crate::render::{
    BatchAccumulator, BatchStats, BlendMode, ExtractStats, Flip, GeometryExtractor, Rasterizer,
    RenderError, RenderPass, RenderResult,
};
use crate::skeleton::Skeleton;

/// Statistics for the most recently rendered frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frames rendered by this renderer, including this one
    pub frame: u64,
    /// Primary pass batching statistics
    pub primary: BatchStats,
    /// Overlay pass batching statistics
    pub overlay: BatchStats,
    /// Slots that produced no geometry
    pub extract: ExtractStats,
    /// Attachments rejected as malformed
    pub malformed_attachments: usize,
    /// Debug shapes submitted
    pub debug_shapes: usize,
}

impl FrameStats {
    /// Triangle draw calls across both passes
    pub fn draw_calls(&self) -> usize {
        self.primary.batches + self.overlay.batches
    }
}

/// Renders one skeleton per frame through a [`Rasterizer`]
#[derive(Debug)]
pub struct SkeletonRenderer {
    config: RenderConfig,
    primary: BatchAccumulator,
    overlay: BatchAccumulator,
    debug_draw: SkeletonDebugDraw,
    frame: u64,
    last_frame: FrameStats,
}

impl SkeletonRenderer {
    /// Create a renderer from a validated configuration
    pub fn new(config: RenderConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let primary = BatchAccumulator::new(config.batcher.clone())?;
        let overlay = BatchAccumulator::new(config.batcher.clone())?;
        let debug_draw = SkeletonDebugDraw::new(config.debug.layers());

        debug!(
            "Created skeleton renderer (overlay prefix '{}', flip {}/{})",
            config.overlay_prefix, config.flip_x, config.flip_y
        );

        Ok(Self {
            config,
            primary,
            overlay,
            debug_draw,
            frame: 0,
            last_frame: FrameStats::default(),
        })
    }

    /// Configuration in use
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Current flip flags
    pub fn flip(&self) -> Flip {
        Flip::new(self.config.flip_x, self.config.flip_y)
    }

    /// Change the flip flags
    pub fn set_flip(&mut self, flip: Flip) {
        self.config.flip_x = flip.x;
        self.config.flip_y = flip.y;
    }

    /// Skeleton-wide tint
    pub fn modulate(&self) -> Color {
        self.config.modulate_color()
    }

    /// Change the skeleton-wide tint; channels are clamped to [0, 1]
    pub fn set_modulate(&mut self, color: Color) {
        let clamped = color.map(|channel| channel.clamp(0.0, 1.0));
        self.config.modulate = [clamped.x, clamped.y, clamped.z, clamped.w];
    }

    /// Change the overlay path prefix
    pub fn set_overlay_prefix(&mut self, prefix: impl Into<String>) -> Result<(), ConfigError> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(ConfigError::Invalid("overlay prefix cannot be empty".to_string()));
        }
        self.config.overlay_prefix = prefix;
        Ok(())
    }

    /// Change the debug overlay layers
    pub fn set_debug(&mut self, debug: DebugDrawConfig) {
        self.config.debug = debug;
        self.debug_draw.set_layers(debug.layers());
    }

    /// Primary pass accumulator
    pub fn primary(&self) -> &BatchAccumulator {
        &self.primary
    }

    /// Overlay pass accumulator
    pub fn overlay(&self) -> &BatchAccumulator {
        &self.overlay
    }

    /// Debug overlay
    pub fn debug_draw(&self) -> &SkeletonDebugDraw {
        &self.debug_draw
    }

    /// Statistics for the last rendered frame
    pub fn last_frame_stats(&self) -> &FrameStats {
        &self.last_frame
    }

    /// Render one frame of a posed skeleton
    ///
    /// Malformed attachments are logged and skipped. Rasterizer errors abort
    /// the frame after both passes have been flushed; the next call starts
    /// clean either way.
    pub fn render_frame(
        &mut self,
        skeleton: &Skeleton,
        rasterizer: &mut dyn Rasterizer,
    ) -> RenderResult<&FrameStats> {
        skeleton.validate_draw_order().map_err(RenderError::InvalidPose)?;

        self.frame += 1;
        self.primary.reset();
        self.overlay.reset();

        let flip = self.flip();
        let tint = self.config.modulate_color();
        let mut primary_mode = BlendMode::Normal;
        let mut overlay_mode = BlendMode::Normal;
        let mut malformed = 0;

        let mut extractor = GeometryExtractor::new(skeleton, tint, &self.config.overlay_prefix);
        for geometry in extractor.by_ref() {
            let (accumulator, mode) = match geometry.pass {
                RenderPass::Primary => (&mut self.primary, &mut primary_mode),
                RenderPass::Overlay => (&mut self.overlay, &mut overlay_mode),
            };

            if let Err(err) = accumulator.check_geometry(&geometry) {
                warn!("Skipping attachment in slot '{}': {}", geometry.slot_name, err);
                malformed += 1;
                continue;
            }

            // Nothing to draw, so no blend change either.
            if geometry.indices.is_empty() {
                continue;
            }

            if geometry.blend_mode != *mode {
                accumulator.add_blend_mode(geometry.blend_mode)?;
                *mode = geometry.blend_mode;
            }

            accumulator.add_geometry(&geometry, flip)?;
        }
        let extract = extractor.stats();

        for (accumulator, mode) in [(&mut self.primary, primary_mode), (&mut self.overlay, overlay_mode)] {
            if mode != BlendMode::Normal {
                accumulator.add_blend_mode(BlendMode::Normal)?;
            }
        }

        let primary_result = self.primary.flush(rasterizer);
        let overlay_result = self.overlay.flush(rasterizer);
        primary_result?;
        overlay_result?;

        let debug_shapes = if self.debug_draw.build(skeleton, flip) > 0 {
            self.debug_draw.submit(rasterizer)?
        } else {
            0
        };

        self.last_frame = FrameStats {
            frame: self.frame,
            primary: self.primary.stats().clone(),
            overlay: self.overlay.stats().clone(),
            extract,
            malformed_attachments: malformed,
            debug_shapes,
        };

        debug!(
            "Frame {}: {} draw calls, {} vertices, {} debug shapes",
            self.frame,
            self.last_frame.draw_calls(),
            self.last_frame.primary.vertices + self.last_frame.overlay.vertices,
            debug_shapes
        );

        Ok(&self.last_frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::BatcherConfig;
    use crate::foundation::math::colors;
    use crate::render::{RecordedCommand, RecordingRasterizer, TextureId};
    use crate::skeleton::{Attachment, Bone, MeshAttachment, RegionAttachment, Slot};

    fn region(path: &str, texture: u64) -> Attachment {
        Attachment::Region(RegionAttachment {
            name: path.to_string(),
            path: path.to_string(),
            texture: Some(TextureId(texture)),
            world_vertices: [0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0],
            uvs: [0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0],
            color: colors::white(),
        })
    }

    fn skeleton(slots: Vec<Slot>) -> Skeleton {
        Skeleton::new(vec![Bone::new("root", 0.0, 0.0)], slots)
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = RenderConfig::new().with_batcher(BatcherConfig::new(0));
        assert!(SkeletonRenderer::new(config).is_err());
    }

    #[test]
    fn test_invalid_draw_order_is_an_error() {
        let mut renderer = SkeletonRenderer::new(RenderConfig::default()).unwrap();
        let mut pose = skeleton(vec![Slot::new("a", 0)]);
        pose.draw_order.clear();

        let result = renderer.render_frame(&pose, &mut RecordingRasterizer::new());
        assert!(matches!(result, Err(RenderError::InvalidPose(_))));
    }

    #[test]
    fn test_blend_modes_emitted_on_change_only() {
        let pose = skeleton(vec![
            Slot::new("a", 0).with_attachment(region("a", 1)),
            Slot::new("b", 0).with_blend_mode(BlendMode::Additive).with_attachment(region("b", 1)),
            Slot::new("c", 0).with_blend_mode(BlendMode::Additive).with_attachment(region("c", 1)),
            Slot::new("d", 0).with_attachment(region("d", 1)),
        ]);

        let mut renderer = SkeletonRenderer::new(RenderConfig::default()).unwrap();
        let mut rasterizer = RecordingRasterizer::new();
        renderer.render_frame(&pose, &mut rasterizer).unwrap();

        let modes: Vec<_> = rasterizer.blend_changes().collect();
        assert_eq!(modes, vec![BlendMode::Additive, BlendMode::Normal]);
        assert_eq!(rasterizer.draw_calls().count(), 3);
    }

    #[test]
    fn test_pass_restores_normal_blend() {
        let pose = skeleton(vec![Slot::new("glow", 0)
            .with_blend_mode(BlendMode::Screen)
            .with_attachment(region("glow", 1))]);

        let mut renderer = SkeletonRenderer::new(RenderConfig::default()).unwrap();
        let mut rasterizer = RecordingRasterizer::new();
        renderer.render_frame(&pose, &mut rasterizer).unwrap();

        let commands = rasterizer.commands();
        assert_eq!(commands.first(), Some(&RecordedCommand::SetBlendMode(BlendMode::Screen)));
        assert_eq!(commands.last(), Some(&RecordedCommand::SetBlendMode(BlendMode::Normal)));
    }

    #[test]
    fn test_overlay_drawn_after_primary() {
        let pose = skeleton(vec![
            Slot::new("spark", 0).with_attachment(region("fx/spark", 2)),
            Slot::new("body", 0).with_attachment(region("body", 1)),
        ]);

        let mut renderer = SkeletonRenderer::new(RenderConfig::default()).unwrap();
        let mut rasterizer = RecordingRasterizer::new();
        let stats = renderer.render_frame(&pose, &mut rasterizer).unwrap().clone();

        let textures: Vec<_> = rasterizer.draw_calls().map(|draw| draw.texture.0).collect();
        assert_eq!(textures, vec![1, 2]);
        assert_eq!(stats.primary.batches, 1);
        assert_eq!(stats.overlay.batches, 1);
        assert_eq!(stats.draw_calls(), 2);
    }

    #[test]
    fn test_malformed_attachment_skipped() {
        let broken = Attachment::Mesh(MeshAttachment {
            name: "broken".to_string(),
            path: "broken".to_string(),
            texture: Some(TextureId(1)),
            world_vertices: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            uvs: vec![0.0; 6],
            triangles: vec![0, 1, 7],
            color: colors::white(),
        });
        let pose = skeleton(vec![
            Slot::new("broken", 0).with_attachment(broken),
            Slot::new("body", 0).with_attachment(region("body", 1)),
        ]);

        let mut renderer = SkeletonRenderer::new(RenderConfig::default()).unwrap();
        let mut rasterizer = RecordingRasterizer::new();
        let stats = renderer.render_frame(&pose, &mut rasterizer).unwrap();

        assert_eq!(stats.malformed_attachments, 1);
        assert_eq!(stats.primary.attachments, 1);
        assert_eq!(rasterizer.draw_calls().count(), 1);
    }

    #[test]
    fn test_malformed_attachment_emits_no_blend_change() {
        let broken = Attachment::Mesh(MeshAttachment {
            name: "broken".to_string(),
            path: "broken".to_string(),
            texture: Some(TextureId(1)),
            world_vertices: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            uvs: vec![0.0; 6],
            triangles: vec![0, 1, 7],
            color: colors::white(),
        });
        let pose = skeleton(vec![Slot::new("broken", 0)
            .with_blend_mode(BlendMode::Additive)
            .with_attachment(broken)]);

        let mut renderer = SkeletonRenderer::new(RenderConfig::default()).unwrap();
        let mut rasterizer = RecordingRasterizer::new();
        let stats = renderer.render_frame(&pose, &mut rasterizer).unwrap();

        assert_eq!(stats.malformed_attachments, 1);
        assert_eq!(stats.primary.blend_changes, 0);
        assert!(rasterizer.commands().is_empty());
    }

    #[test]
    fn test_blend_change_brackets_only_accepted_geometry() {
        let broken = Attachment::Mesh(MeshAttachment {
            name: "broken".to_string(),
            path: "broken".to_string(),
            texture: Some(TextureId(1)),
            world_vertices: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            uvs: vec![0.0; 4],
            triangles: vec![0, 1, 2],
            color: colors::white(),
        });
        let pose = skeleton(vec![
            Slot::new("broken", 0)
                .with_blend_mode(BlendMode::Multiply)
                .with_attachment(broken),
            Slot::new("glow", 0)
                .with_blend_mode(BlendMode::Additive)
                .with_attachment(region("glow", 1)),
        ]);

        let mut renderer = SkeletonRenderer::new(RenderConfig::default()).unwrap();
        let mut rasterizer = RecordingRasterizer::new();
        renderer.render_frame(&pose, &mut rasterizer).unwrap();

        let commands = rasterizer.commands();
        assert_eq!(commands.len(), 3);
        assert!(matches!(commands[0], RecordedCommand::SetBlendMode(BlendMode::Additive)));
        assert!(matches!(commands[1], RecordedCommand::DrawTriangles(_)));
        assert!(matches!(commands[2], RecordedCommand::SetBlendMode(BlendMode::Normal)));
    }

    #[test]
    fn test_rasterizer_failure_does_not_poison_next_frame() {
        let pose = skeleton(vec![
            Slot::new("body", 0).with_attachment(region("body", 1)),
            Slot::new("spark", 0).with_attachment(region("fx/spark", 2)),
        ]);

        let mut renderer = SkeletonRenderer::new(RenderConfig::default()).unwrap();
        let mut failing = RecordingRasterizer::new();
        failing.reject_texture(TextureId(1));
        assert!(matches!(
            renderer.render_frame(&pose, &mut failing),
            Err(RenderError::Rasterizer(_))
        ));

        let mut rasterizer = RecordingRasterizer::new();
        renderer.render_frame(&pose, &mut rasterizer).unwrap();
        assert_eq!(rasterizer.draw_calls().count(), 2);
    }

    #[test]
    fn test_set_modulate_clamps() {
        let mut renderer = SkeletonRenderer::new(RenderConfig::default()).unwrap();
        renderer.set_modulate(Color::new(2.0, -1.0, 0.5, 1.0));
        assert_eq!(renderer.modulate(), Color::new(1.0, 0.0, 0.5, 1.0));
        assert!(renderer.config().validate().is_ok());
    }

    #[test]
    fn test_empty_overlay_prefix_rejected() {
        let mut renderer = SkeletonRenderer::new(RenderConfig::default()).unwrap();
        assert!(renderer.set_overlay_prefix("").is_err());
        assert!(renderer.set_overlay_prefix("glow/").is_ok());
        assert_eq!(renderer.config().overlay_prefix, "glow/");
    }

    #[test]
    fn test_debug_overlay_follows_passes() {
        let pose = skeleton(vec![Slot::new("body", 0).with_attachment(region("body", 1))]);
        let mut renderer = SkeletonRenderer::new(RenderConfig::default()).unwrap();
        renderer.set_debug(DebugDrawConfig { bones: true, ..Default::default() });

        let mut rasterizer = RecordingRasterizer::new();
        let stats = renderer.render_frame(&pose, &mut rasterizer).unwrap();
        assert_eq!(stats.debug_shapes, 2);

        let commands = rasterizer.commands();
        assert!(matches!(commands[0], RecordedCommand::DrawTriangles(_)));
        assert!(matches!(commands[1], RecordedCommand::Line { .. }));
        assert!(matches!(commands[2], RecordedCommand::Rect { .. }));
    }
}
