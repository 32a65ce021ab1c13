//! Debug drawing primitives and the skeleton overlay
//!
//! Shapes are rebuilt from the pose every frame and submitted straight to the
//! rasterizer; nothing persists between frames.

use crate::foundation::math::{colors, Color, Rect, Vec2};
use crate::render::{Flip, Rasterizer, RenderResult};
use crate::skeleton::{Attachment, Skeleton};

/// Width of bone segments in pixels
pub const BONE_LINE_WIDTH: f32 = 2.0;

/// Width of attachment wireframe edges in pixels
pub const WIREFRAME_WIDTH: f32 = 1.0;

/// Side length of a bone origin marker in pixels
pub const ORIGIN_MARKER_SIZE: f32 = 3.0;

bitflags::bitflags! {
    /// Diagnostic layers drawn by the overlay
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DebugLayers: u8 {
        /// Outline region attachments
        const REGIONS = 1 << 0;
        /// Wireframe mesh attachments
        const MESHES = 1 << 1;
        /// Outline bounding-box attachments
        const BOUNDING_BOXES = 1 << 2;
        /// Bone segments and origin markers
        const BONES = 1 << 3;
    }
}

/// Debug shape primitives submitted to the rasterizer
#[derive(Clone, Debug, PartialEq)]
pub enum DebugShape {
    /// Line segment from start to end
    Line {
        /// Start point in screen space
        start: Vec2,
        /// End point in screen space
        end: Vec2,
        /// Line colour
        color: Color,
        /// Line width in pixels
        width: f32,
    },

    /// Filled rectangle
    Rect {
        /// Bounds in screen space
        rect: Rect,
        /// Fill colour
        color: Color,
    },
}

impl DebugShape {
    /// Submit this shape
    pub fn submit(&self, rasterizer: &mut dyn Rasterizer) -> RenderResult<()> {
        match self {
            Self::Line { start, end, color, width } => rasterizer.draw_line(*start, *end, *color, *width),
            Self::Rect { rect, color } => rasterizer.draw_rect(*rect, *color),
        }
    }
}

/// Colours used by the overlay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugColors {
    /// Region outlines
    pub region: Color,
    /// Mesh wireframes
    pub mesh: Color,
    /// Bounding-box outlines
    pub bounding_box: Color,
    /// Bone segments
    pub bone: Color,
    /// Origin marker of the root bone
    pub root_origin: Color,
    /// Origin markers of every other bone
    pub bone_origin: Color,
}

impl Default for DebugColors {
    fn default() -> Self {
        Self {
            region: colors::blue(),
            mesh: colors::cyan(),
            bounding_box: colors::green(),
            bone: colors::red(),
            root_origin: colors::green(),
            bone_origin: colors::blue(),
        }
    }
}

/// Builds diagnostic shapes for a posed skeleton
#[derive(Debug, Clone)]
pub struct SkeletonDebugDraw {
    layers: DebugLayers,
    colors: DebugColors,
    shapes: Vec<DebugShape>,
    points: Vec<Vec2>,

    /// Master enable/disable flag
    pub enabled: bool,
}

impl SkeletonDebugDraw {
    /// Create an overlay drawing the given layers
    pub fn new(layers: DebugLayers) -> Self {
        Self {
            layers,
            colors: DebugColors::default(),
            shapes: Vec::new(),
            points: Vec::new(),
            enabled: true,
        }
    }

    /// Override the default colours
    pub fn with_colors(mut self, colors: DebugColors) -> Self {
        self.colors = colors;
        self
    }

    /// Layers currently drawn
    pub fn layers(&self) -> DebugLayers {
        self.layers
    }

    /// Change the drawn layers
    pub fn set_layers(&mut self, layers: DebugLayers) {
        self.layers = layers;
    }

    /// Shapes produced by the last [`build`](Self::build)
    pub fn shapes(&self) -> &[DebugShape] {
        &self.shapes
    }

    /// Rebuild the overlay for a pose, returning the number of shapes
    pub fn build(&mut self, skeleton: &Skeleton, flip: Flip) -> usize {
        self.shapes.clear();
        if !self.enabled || self.layers.is_empty() {
            return 0;
        }

        if self.layers.intersects(DebugLayers::REGIONS | DebugLayers::MESHES | DebugLayers::BOUNDING_BOXES) {
            self.build_attachments(skeleton, flip);
        }

        if self.layers.contains(DebugLayers::BONES) {
            self.build_bones(skeleton, flip);
        }

        self.shapes.len()
    }

    fn build_attachments(&mut self, skeleton: &Skeleton, flip: Flip) {
        for slot in skeleton.draw_order_slots() {
            let Some(attachment) = slot.attachment.as_ref() else {
                continue;
            };

            let (layer, color, triangles) = match attachment {
                Attachment::Region(_) => (DebugLayers::REGIONS, self.colors.region, None),
                Attachment::Mesh(mesh) => (DebugLayers::MESHES, self.colors.mesh, Some(mesh.triangles.as_slice())),
                Attachment::BoundingBox(_) => (DebugLayers::BOUNDING_BOXES, self.colors.bounding_box, None),
            };
            if !self.layers.contains(layer) {
                continue;
            }

            self.points.clear();
            self.points.extend(
                attachment
                    .world_vertices()
                    .chunks_exact(2)
                    .map(|pair| flip.to_screen(pair[0], pair[1])),
            );

            match triangles {
                Some(triangles) if !triangles.is_empty() => {
                    wireframe_triangles(&mut self.shapes, &self.points, triangles, color);
                }
                _ => outline_polygon(&mut self.shapes, &self.points, color),
            }
        }
    }

    fn build_bones(&mut self, skeleton: &Skeleton, flip: Flip) {
        for bone in &skeleton.bones {
            let origin = bone.origin();
            let tip = bone.tip();
            self.shapes.push(DebugShape::Line {
                start: flip.to_screen(origin.x, origin.y),
                end: flip.to_screen(tip.x, tip.y),
                color: self.colors.bone,
                width: BONE_LINE_WIDTH,
            });
        }

        let half = (ORIGIN_MARKER_SIZE - 1.0) / 2.0;
        for (index, bone) in skeleton.bones.iter().enumerate() {
            let center = flip.to_screen(bone.world_x, bone.world_y);
            let color = if index == 0 {
                self.colors.root_origin
            } else {
                self.colors.bone_origin
            };
            self.shapes.push(DebugShape::Rect {
                rect: Rect::new(center.x - half, center.y - half, ORIGIN_MARKER_SIZE, ORIGIN_MARKER_SIZE),
                color,
            });
        }
    }

    /// Submit the shapes from the last build, returning how many were drawn
    pub fn submit(&self, rasterizer: &mut dyn Rasterizer) -> RenderResult<usize> {
        for shape in &self.shapes {
            shape.submit(rasterizer)?;
        }
        Ok(self.shapes.len())
    }
}

impl Default for SkeletonDebugDraw {
    fn default() -> Self {
        Self::new(DebugLayers::empty())
    }
}

/// Closed outline through consecutive points
fn outline_polygon(shapes: &mut Vec<DebugShape>, points: &[Vec2], color: Color) {
    if points.len() < 2 {
        return;
    }

    for (index, &start) in points.iter().enumerate() {
        let end = points[(index + 1) % points.len()];
        shapes.push(DebugShape::Line { start, end, color, width: WIREFRAME_WIDTH });
    }
}

/// Every edge of every triangle; triangles with stray indices are skipped
fn wireframe_triangles(shapes: &mut Vec<DebugShape>, points: &[Vec2], triangles: &[u16], color: Color) {
    for triangle in triangles.chunks_exact(3) {
        let corner = |i: usize| points.get(usize::from(triangle[i])).copied();
        let (Some(a), Some(b), Some(c)) = (corner(0), corner(1), corner(2)) else {
            continue;
        };

        for (start, end) in [(a, b), (b, c), (c, a)] {
            shapes.push(DebugShape::Line { start, end, color, width: WIREFRAME_WIDTH });
        }
    }
}
