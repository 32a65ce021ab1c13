//! Attachment geometry extraction
//!
//! Walks a posed skeleton in draw order and yields the drawable geometry of
//! each slot: world vertices, UVs, triangle indices, resolved tint and the
//! pass the attachment belongs to. Bounding boxes, empty slots and attachments
//! whose texture is not loaded produce nothing.

use crate::foundation::logging::trace;
use crate::foundation::math::Color;
use crate::render::{BlendMode, TextureId};
use crate::skeleton::{Attachment, Skeleton, Slot};

/// Two triangles covering a region attachment's four corners
pub static QUAD_TRIANGLES: [u16; 6] = [0, 1, 2, 2, 3, 0];

/// Which accumulator an attachment is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderPass {
    /// The character itself
    Primary,
    /// Effects drawn after the whole primary pass
    Overlay,
}

/// Drawable geometry of one slot
#[derive(Debug, Clone, Copy)]
pub struct AttachmentGeometry<'a> {
    /// Index of the slot in [`Skeleton::slots`]
    pub slot: usize,
    /// Slot name, for diagnostics
    pub slot_name: &'a str,
    /// Texture to bind
    pub texture: TextureId,
    /// World-space vertices, flat `[x, y, ...]`
    pub vertices: &'a [f32],
    /// Texture coordinates, flat `[u, v, ...]`
    pub uvs: &'a [f32],
    /// Attachment-local triangle indices
    pub indices: &'a [u16],
    /// Skeleton × slot × attachment tint
    pub color: Color,
    /// Slot compositing mode
    pub blend_mode: BlendMode,
    /// Destination pass
    pub pass: RenderPass,
}

impl AttachmentGeometry<'_> {
    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 2
    }
}

/// Combine the three tint levels channel by channel
pub fn resolve_tint(skeleton: &Color, slot: &Color, attachment: &Color) -> Color {
    skeleton.component_mul(slot).component_mul(attachment)
}

/// Counters for slots that produced no geometry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractStats {
    /// Slots visited
    pub visited: usize,
    /// Slots with no attachment
    pub empty_slots: usize,
    /// Attachments skipped because their texture is not loaded
    pub missing_texture: usize,
    /// Bounding-box attachments skipped
    pub bounding_boxes: usize,
}

/// Draw-order iterator over drawable attachment geometry
pub struct GeometryExtractor<'a> {
    skeleton: &'a Skeleton,
    order: std::slice::Iter<'a, usize>,
    tint: Color,
    overlay_prefix: &'a str,
    stats: ExtractStats,
}

impl<'a> GeometryExtractor<'a> {
    /// Create an extractor
    ///
    /// Attachments whose path contains `overlay_prefix` are routed to
    /// [`RenderPass::Overlay`]. The prefix is expected to be non-empty, as
    /// enforced by [`RenderConfig::validate`](crate::core::config::RenderConfig::validate).
    pub fn new(skeleton: &'a Skeleton, tint: Color, overlay_prefix: &'a str) -> Self {
        Self {
            skeleton,
            order: skeleton.draw_order.iter(),
            tint,
            overlay_prefix,
            stats: ExtractStats::default(),
        }
    }

    /// Counters accumulated so far
    pub fn stats(&self) -> ExtractStats {
        self.stats
    }

    fn pass_for(&self, path: &str) -> RenderPass {
        if path.contains(self.overlay_prefix) {
            RenderPass::Overlay
        } else {
            RenderPass::Primary
        }
    }

    fn extract(&mut self, index: usize, slot: &'a Slot) -> Option<AttachmentGeometry<'a>> {
        self.stats.visited += 1;

        let Some(attachment) = slot.attachment.as_ref() else {
            self.stats.empty_slots += 1;
            return None;
        };

        let (texture, vertices, uvs, indices, color, path) = match attachment {
            Attachment::Region(region) => (
                region.texture,
                region.world_vertices.as_slice(),
                region.uvs.as_slice(),
                QUAD_TRIANGLES.as_slice(),
                region.color,
                region.path.as_str(),
            ),
            Attachment::Mesh(mesh) => (
                mesh.texture,
                mesh.world_vertices.as_slice(),
                mesh.uvs.as_slice(),
                mesh.triangles.as_slice(),
                mesh.color,
                mesh.path.as_str(),
            ),
            Attachment::BoundingBox(_) => {
                self.stats.bounding_boxes += 1;
                return None;
            }
        };

        let Some(texture) = texture else {
            trace!("Slot '{}': attachment '{}' has no texture, skipping", slot.name, attachment.name());
            self.stats.missing_texture += 1;
            return None;
        };

        Some(AttachmentGeometry {
            slot: index,
            slot_name: &slot.name,
            texture,
            vertices,
            uvs,
            indices,
            color: resolve_tint(&self.tint, &slot.color, &color),
            blend_mode: slot.blend_mode,
            pass: self.pass_for(path),
        })
    }
}

impl<'a> Iterator for GeometryExtractor<'a> {
    type Item = AttachmentGeometry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let skeleton = self.skeleton;
        loop {
            let &index = self.order.next()?;
            let Some(slot) = skeleton.slots.get(index) else {
                continue;
            };
            if let Some(geometry) = self.extract(index, slot) {
                return Some(geometry);
            }
        }
    }
}
