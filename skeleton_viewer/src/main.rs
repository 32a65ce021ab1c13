//! Headless skeleton viewer
//!
//! Renders a few frames of a demo character through the recording rasterizer
//! and logs what reached it. Pass a `.toml` or `.ron` render config as the
//! first argument to override the defaults.

mod demo_rig;

use std::path::Path;

use skeleton_batcher::foundation::logging;
use skeleton_batcher::prelude::*;
use skeleton_batcher::scene::FollowerError;
use thiserror::Error;

const FRAMES: u32 = 3;

#[derive(Debug, Error)]
enum ViewerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Follower error: {0}")]
    Follower(#[from] FollowerError),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_with_default(logging::LevelFilter::Info);

    log::info!("Starting skeleton viewer");

    match run() {
        Ok(()) => {
            log::info!("Skeleton viewer finished successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Viewer error: {}", e);
            Err(e.into())
        }
    }
}

fn load_config() -> Result<RenderConfig, ConfigError> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading render config from {}", path);
            RenderConfig::load_from_file(Path::new(&path))
        }
        None => Ok(RenderConfig::default().with_debug(DebugDrawConfig {
            bones: true,
            ..Default::default()
        })),
    }
}

fn run() -> Result<(), ViewerError> {
    let config = load_config()?;
    let mut renderer = SkeletonRenderer::new(config)?;
    let mut rasterizer = RecordingRasterizer::with_latency(1);
    let mut skeleton = demo_rig::build();

    let mut followers = FollowerArena::new();
    let sword = followers.attach(
        &skeleton,
        "hand",
        FollowerParams {
            offset: Vec2::new(6.0, 0.0),
            rotation_degrees: -90.0,
            ..Default::default()
        },
    )?;

    for frame in 0..FRAMES {
        demo_rig::pose(&mut skeleton, frame);
        rasterizer.clear_commands();

        let stats = renderer.render_frame(&skeleton, &mut rasterizer)?.clone();
        log::info!(
            "Frame {}: {} draw calls ({} primary, {} overlay), {} blend changes, {} debug shapes",
            stats.frame,
            stats.draw_calls(),
            stats.primary.batches,
            stats.overlay.batches,
            stats.primary.blend_changes + stats.overlay.blend_changes,
            stats.debug_shapes
        );
        log::info!(
            "  skipped: {} bounding boxes, {} missing textures; recycled {} of {} reclaimed batches",
            stats.extract.bounding_boxes,
            stats.extract.missing_texture,
            stats.primary.recycled_batches + stats.overlay.recycled_batches,
            stats.primary.reclaimed_batches + stats.overlay.reclaimed_batches
        );

        for draw in rasterizer.draw_calls() {
            log::debug!(
                "  draw texture {:?}: {} vertices, {} indices",
                draw.texture,
                draw.positions.len(),
                draw.indices.len()
            );
        }

        if let Some(bounds) = skeleton_bounds(&skeleton, renderer.flip()) {
            log::info!(
                "  bounds: ({:.1}, {:.1}) to ({:.1}, {:.1})",
                bounds.min().x,
                bounds.min().y,
                bounds.max().x,
                bounds.max().y
            );
        }

        let transform = followers.transform(sword, &skeleton)?;
        log::info!(
            "  sword at ({:.1}, {:.1}), rotation {:.1}°",
            transform.position.x,
            transform.position.y,
            transform.rotation.to_degrees()
        );

        rasterizer.end_frame();
    }

    log::info!(
        "Rasterizer still holds {} batches after {} frames",
        rasterizer.held_batches(),
        FRAMES
    );
    Ok(())
}
