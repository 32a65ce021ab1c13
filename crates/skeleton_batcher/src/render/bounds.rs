//! Screen-space bounds of a posed skeleton

use crate::foundation::math::{Rect, Vec2};
use crate::render::Flip;
use crate::skeleton::{AttachmentKind, Skeleton};

/// Axis-aligned rectangle around every region and mesh vertex
///
/// Uses the same world-to-screen conversion as the batcher, so the rectangle
/// encloses exactly what gets drawn. Attachments without a texture still
/// count. Returns `None` when the skeleton has no region or mesh vertices.
pub fn skeleton_bounds(skeleton: &Skeleton, flip: Flip) -> Option<Rect> {
    let mut min = Vec2::repeat(f32::INFINITY);
    let mut max = Vec2::repeat(f32::NEG_INFINITY);
    let mut found = false;

    for slot in &skeleton.slots {
        let Some(attachment) = slot.attachment.as_ref() else {
            continue;
        };
        if attachment.kind() == AttachmentKind::BoundingBox {
            continue;
        }

        for pair in attachment.world_vertices().chunks_exact(2) {
            let point = flip.to_screen(pair[0], pair[1]);
            min = min.inf(&point);
            max = max.sup(&point);
            found = true;
        }
    }

    found.then(|| Rect::from_min_max(min, max))
}
