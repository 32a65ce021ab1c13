//! End-to-end tests for the render pipeline

mod lifecycle;

use crate::foundation::math::{colors, Color};
use crate::render::TextureId;
use crate::skeleton::{Attachment, Bone, RegionAttachment, Skeleton, Slot};

/// Unit quad at an offset, with full-texture UVs
pub(crate) fn quad(name: &str, texture: u64, x: f32, y: f32) -> Attachment {
    Attachment::Region(RegionAttachment {
        name: name.to_string(),
        path: name.to_string(),
        texture: Some(TextureId(texture)),
        world_vertices: [x, y, x + 1.0, y, x + 1.0, y + 1.0, x, y + 1.0],
        uvs: [0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0],
        color: colors::white(),
    })
}

/// Single-bone skeleton holding one quad per `(texture, x)` entry
pub(crate) fn strip(textures: &[u64]) -> Skeleton {
    let slots = textures
        .iter()
        .enumerate()
        .map(|(index, &texture)| {
            #[allow(clippy::cast_precision_loss)]
            let x = index as f32 * 2.0;
            Slot::new(format!("slot{index}"), 0).with_attachment(quad(&format!("part{index}"), texture, x, 0.0))
        })
        .collect();
    Skeleton::new(vec![Bone::new("root", 0.0, 0.0)], slots)
}

pub(crate) fn assert_color_eq(actual: &Color, expected: &Color) {
    approx::assert_relative_eq!(actual.x, expected.x);
    approx::assert_relative_eq!(actual.y, expected.y);
    approx::assert_relative_eq!(actual.z, expected.z);
    approx::assert_relative_eq!(actual.w, expected.w);
}
