//! Multi-frame buffer lifetime

use super::strip;
use crate::core::config::{BatcherConfig, RenderConfig};
use crate::render::{RecordingRasterizer, SkeletonRenderer};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_are_independent() {
        let mut renderer = SkeletonRenderer::new(RenderConfig::default()).unwrap();
        let mut rasterizer = RecordingRasterizer::new();

        renderer.render_frame(&strip(&[1, 2]), &mut rasterizer).unwrap();
        rasterizer.clear_commands();

        renderer.render_frame(&strip(&[3]), &mut rasterizer).unwrap();
        let textures: Vec<_> = rasterizer.draw_calls().map(|draw| draw.texture.0).collect();
        assert_eq!(textures, vec![3]);
        assert_eq!(renderer.last_frame_stats().frame, 2);
    }

    #[test]
    fn test_previous_frame_reclaimed_at_next_reset() {
        let mut renderer = SkeletonRenderer::new(RenderConfig::default()).unwrap();
        let mut rasterizer = RecordingRasterizer::new();
        let pose = strip(&[1, 2, 1]);

        renderer.render_frame(&pose, &mut rasterizer).unwrap();
        assert_eq!(renderer.primary().retired_len(), 3);

        let stats = renderer.render_frame(&pose, &mut rasterizer).unwrap();
        assert_eq!(stats.primary.reclaimed_batches, 3);
        assert_eq!(stats.primary.recycled_batches, 3);
        assert_eq!(renderer.primary().retired_len(), 3);
    }

    #[test]
    fn test_buffers_in_use_survive_reclamation() {
        // The rasterizer keeps every batch for one extra frame while the
        // accumulator retires after one reset.
        let mut renderer = SkeletonRenderer::new(RenderConfig::default()).unwrap();
        let mut rasterizer = RecordingRasterizer::with_latency(1);
        let pose = strip(&[1, 2]);

        renderer.render_frame(&pose, &mut rasterizer).unwrap();
        rasterizer.end_frame();
        let first: Vec<_> = rasterizer.draw_calls().cloned().collect();

        rasterizer.clear_commands();
        let stats = renderer.render_frame(&pose, &mut rasterizer).unwrap().clone();
        rasterizer.end_frame();

        assert_eq!(stats.primary.reclaimed_batches, 2);
        assert_eq!(stats.primary.recycled_batches, 0);
        assert_eq!(rasterizer.held_batches(), 2);

        let second: Vec<_> = rasterizer.draw_calls().cloned().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_retire_lag_matching_latency_recycles() {
        let config = RenderConfig::new().with_batcher(BatcherConfig::default().with_retire_lag(2));
        let mut renderer = SkeletonRenderer::new(config).unwrap();
        let mut rasterizer = RecordingRasterizer::with_latency(1);
        let pose = strip(&[1]);

        let mut recycled = Vec::new();
        for _ in 0..4 {
            let stats = renderer.render_frame(&pose, &mut rasterizer).unwrap();
            recycled.push(stats.primary.recycled_batches);
            rasterizer.end_frame();
        }

        assert_eq!(recycled, vec![0, 0, 1, 1]);
        assert_eq!(renderer.primary().retired_len(), 2);
    }
}
