//! # Posed Skeleton Interface
//!
//! Data handed over by the animation runtime once per frame. Pose evaluation
//! (timelines, mixing, constraints) happens upstream; by the time a
//! [`Skeleton`] reaches the batching pipeline every bone carries its world
//! transform and every drawable attachment carries its world-space vertices.
//!
//! Vertex arrays are flat `[x0, y0, x1, y1, ...]` float slices, matching the
//! layout the runtime produces. UV arrays use the same layout.

use serde::{Serialize, Deserialize};

use crate::foundation::math::{colors, Color, Vec2};
use crate::render::TextureId;

/// Compositing mode requested by a slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlendMode {
    /// Standard alpha blending
    #[default]
    Normal,
    /// Additive blending
    Additive,
    /// Multiplicative blending
    Multiply,
    /// Screen blending
    Screen,
}

/// A bone with its world transform already resolved
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    /// Bone name
    pub name: String,
    /// Setup-pose length, used for debug gizmos
    pub length: f32,
    /// World position X
    pub world_x: f32,
    /// World position Y
    pub world_y: f32,
    /// World matrix component (row 0, column 0)
    pub a: f32,
    /// World matrix component (row 0, column 1)
    pub b: f32,
    /// World matrix component (row 1, column 0)
    pub c: f32,
    /// World matrix component (row 1, column 1)
    pub d: f32,
}

impl Bone {
    /// Create an unrotated, unscaled bone at a world position
    pub fn new(name: impl Into<String>, world_x: f32, world_y: f32) -> Self {
        Self {
            name: name.into(),
            length: 0.0,
            world_x,
            world_y,
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
        }
    }

    /// Set the bone length
    pub fn with_length(mut self, length: f32) -> Self {
        self.length = length;
        self
    }

    /// Set the world matrix
    pub fn with_matrix(mut self, a: f32, b: f32, c: f32, d: f32) -> Self {
        self.a = a;
        self.b = b;
        self.c = c;
        self.d = d;
        self
    }

    /// World-space origin
    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.world_x, self.world_y)
    }

    /// World-space tip, `length` along the bone's local X axis
    pub fn tip(&self) -> Vec2 {
        Vec2::new(
            self.length.mul_add(self.a, self.world_x),
            self.length.mul_add(self.c, self.world_y),
        )
    }

    /// World scale along the bone's local X axis
    pub fn world_scale_x(&self) -> f32 {
        self.a.hypot(self.c)
    }

    /// World scale along the bone's local Y axis
    pub fn world_scale_y(&self) -> f32 {
        self.b.hypot(self.d)
    }

    /// World rotation in radians as consumed by followers
    pub fn world_rotation(&self) -> f32 {
        self.c.atan2(self.d)
    }
}

/// Textured quad attachment
#[derive(Debug, Clone, PartialEq)]
pub struct RegionAttachment {
    /// Attachment name
    pub name: String,
    /// Atlas path; matched against the overlay prefix
    pub path: String,
    /// Resolved texture, `None` when the atlas page is not loaded
    pub texture: Option<TextureId>,
    /// Four world-space corners
    pub world_vertices: [f32; 8],
    /// Four texture coordinates
    pub uvs: [f32; 8],
    /// Attachment tint
    pub color: Color,
}

/// Arbitrary triangulated, textured mesh attachment
#[derive(Debug, Clone, PartialEq)]
pub struct MeshAttachment {
    /// Attachment name
    pub name: String,
    /// Atlas path; matched against the overlay prefix
    pub path: String,
    /// Resolved texture, `None` when the atlas page is not loaded
    pub texture: Option<TextureId>,
    /// World-space vertices
    pub world_vertices: Vec<f32>,
    /// Texture coordinates, one pair per vertex
    pub uvs: Vec<f32>,
    /// Triangle list, three attachment-local vertex indices per triangle
    pub triangles: Vec<u16>,
    /// Attachment tint
    pub color: Color,
}

/// Collision polygon attachment; never rendered
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBoxAttachment {
    /// Attachment name
    pub name: String,
    /// Polygon in bone-local space
    pub vertices: Vec<f32>,
    /// Polygon in world space
    pub world_vertices: Vec<f32>,
}

/// Discriminant of an [`Attachment`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentKind {
    /// Textured quad
    Region,
    /// Textured triangle mesh
    Mesh,
    /// Collision polygon
    BoundingBox,
}

/// Anything a slot can hold
#[derive(Debug, Clone, PartialEq)]
pub enum Attachment {
    /// Textured quad
    Region(RegionAttachment),
    /// Textured triangle mesh
    Mesh(MeshAttachment),
    /// Collision polygon
    BoundingBox(BoundingBoxAttachment),
}

impl Attachment {
    /// Attachment name
    pub fn name(&self) -> &str {
        match self {
            Self::Region(region) => &region.name,
            Self::Mesh(mesh) => &mesh.name,
            Self::BoundingBox(bounds) => &bounds.name,
        }
    }

    /// Attachment discriminant
    pub fn kind(&self) -> AttachmentKind {
        match self {
            Self::Region(_) => AttachmentKind::Region,
            Self::Mesh(_) => AttachmentKind::Mesh,
            Self::BoundingBox(_) => AttachmentKind::BoundingBox,
        }
    }

    /// World-space vertices as a flat `[x, y, ...]` slice
    pub fn world_vertices(&self) -> &[f32] {
        match self {
            Self::Region(region) => &region.world_vertices,
            Self::Mesh(mesh) => &mesh.world_vertices,
            Self::BoundingBox(bounds) => &bounds.world_vertices,
        }
    }
}

/// An entry in the skeleton's draw order
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    /// Slot name
    pub name: String,
    /// Index of the owning bone in [`Skeleton::bones`]
    pub bone: usize,
    /// Slot tint
    pub color: Color,
    /// Compositing mode for this slot's attachment
    pub blend_mode: BlendMode,
    /// Current attachment, if any
    pub attachment: Option<Attachment>,
}

impl Slot {
    /// Create an empty slot on a bone
    pub fn new(name: impl Into<String>, bone: usize) -> Self {
        Self {
            name: name.into(),
            bone,
            color: colors::white(),
            blend_mode: BlendMode::Normal,
            attachment: None,
        }
    }

    /// Set the slot tint
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set the blend mode
    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = blend_mode;
        self
    }

    /// Set the attachment
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

/// A posed skeleton
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Skeleton {
    /// Skeleton position X in the host's space
    pub x: f32,
    /// Skeleton position Y in the host's space
    pub y: f32,
    /// Bones with world transforms
    pub bones: Vec<Bone>,
    /// Slots in setup order
    pub slots: Vec<Slot>,
    /// Indices into `slots`, back to front
    pub draw_order: Vec<usize>,
}

impl Skeleton {
    /// Create a skeleton whose draw order is the setup order of its slots
    pub fn new(bones: Vec<Bone>, slots: Vec<Slot>) -> Self {
        let draw_order = (0..slots.len()).collect();
        Self {
            x: 0.0,
            y: 0.0,
            bones,
            slots,
            draw_order,
        }
    }

    /// Slots in draw order
    ///
    /// Out-of-range draw-order entries are skipped; use
    /// [`validate_draw_order`](Self::validate_draw_order) to reject them.
    pub fn draw_order_slots(&self) -> impl Iterator<Item = &Slot> + '_ {
        self.draw_order.iter().filter_map(|&index| self.slots.get(index))
    }

    /// Check that the draw order references every slot exactly once
    pub fn validate_draw_order(&self) -> Result<(), String> {
        if self.draw_order.len() != self.slots.len() {
            return Err(format!(
                "draw order has {} entries for {} slots",
                self.draw_order.len(),
                self.slots.len()
            ));
        }

        let mut seen = vec![false; self.slots.len()];
        for &index in &self.draw_order {
            match seen.get_mut(index) {
                Some(flag) if !*flag => *flag = true,
                Some(_) => return Err(format!("slot {index} appears twice in the draw order")),
                None => return Err(format!("draw order references missing slot {index}")),
            }
        }

        Ok(())
    }

    /// Find a bone index by name
    pub fn find_bone(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|bone| bone.name == name)
    }

    /// Find a slot by name
    pub fn find_slot(&self, name: &str) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.name == name)
    }

    /// Polygon of a bounding-box attachment, Y inverted for screen space
    ///
    /// Returns `None` when the slot does not exist or does not currently hold
    /// a bounding box with the given name. The polygon is in bone-local
    /// space, ready to be wrapped in a collision shape that follows the bone.
    pub fn bounding_polygon(&self, slot_name: &str, attachment_name: &str) -> Option<Vec<Vec2>> {
        let slot = self.find_slot(slot_name)?;
        match slot.attachment.as_ref()? {
            Attachment::BoundingBox(bounds) if bounds.name == attachment_name => Some(
                bounds
                    .vertices
                    .chunks_exact(2)
                    .map(|pair| Vec2::new(pair[0], -pair[1]))
                    .collect(),
            ),
            _ => None,
        }
    }
}
