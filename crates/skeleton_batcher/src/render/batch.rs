//! Fixed-capacity triangle batch
//!
//! A batch owns three parallel per-vertex arrays (positions, colours, UVs)
//! and a flat index array, all bound to a single texture. Indices are local to
//! the batch: geometry appended later is rebased by the vertex count at the
//! time it was appended.

use crate::foundation::math::{Color, Vec2};
use crate::render::{Flip, TextureId};

/// Texture-coherent group of triangles emitted as one draw call
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleBatch {
    texture: Option<TextureId>,
    positions: Vec<Vec2>,
    colors: Vec<Color>,
    uvs: Vec<Vec2>,
    indices: Vec<u32>,
    capacity: usize,
}

impl TriangleBatch {
    /// Create an empty batch that grows on demand up to `capacity` vertices
    pub fn new(capacity: usize) -> Self {
        Self {
            texture: None,
            positions: Vec::new(),
            colors: Vec::new(),
            uvs: Vec::new(),
            indices: Vec::new(),
            capacity,
        }
    }

    /// Create an empty batch with full capacity reserved up front
    pub fn preallocated(capacity: usize) -> Self {
        Self {
            texture: None,
            positions: Vec::with_capacity(capacity),
            colors: Vec::with_capacity(capacity),
            uvs: Vec::with_capacity(capacity),
            indices: Vec::with_capacity(capacity * 3),
            capacity,
        }
    }

    /// Bound texture, `None` until the first geometry is appended
    pub fn texture(&self) -> Option<TextureId> {
        self.texture
    }

    /// Maximum vertices
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Maximum indices
    pub fn index_capacity(&self) -> usize {
        self.capacity * 3
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of indices
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Check if this batch has nothing to draw
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Screen-space vertex positions
    pub fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    /// Per-vertex colours
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Per-vertex texture coordinates
    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }

    /// Batch-local triangle indices
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Check whether geometry of the given size can be appended
    pub fn fits(&self, vertex_count: usize, index_count: usize) -> bool {
        self.vertex_count() + vertex_count <= self.capacity
            && self.index_count() + index_count <= self.index_capacity()
    }

    pub(crate) fn bind(&mut self, texture: TextureId) {
        self.texture = Some(texture);
    }

    /// Drop all geometry and the texture binding, keeping allocations
    pub(crate) fn clear(&mut self) {
        self.texture = None;
        self.positions.clear();
        self.colors.clear();
        self.uvs.clear();
        self.indices.clear();
    }

    /// Append validated geometry
    ///
    /// `vertices` and `uvs` are flat `[x, y, ...]` arrays of equal length and
    /// every index is below the appended vertex count. The caller has checked
    /// [`fits`](Self::fits).
    pub(crate) fn append(
        &mut self,
        vertices: &[f32],
        uvs: &[f32],
        indices: &[u16],
        color: Color,
        flip: Flip,
    ) {
        debug_assert!(self.fits(vertices.len() / 2, indices.len()));

        // Capacity is validated to fit the u32 index range.
        #[allow(clippy::cast_possible_truncation)]
        let base = self.positions.len() as u32;
        self.indices.extend(indices.iter().map(|&index| base + u32::from(index)));

        for (position, uv) in vertices.chunks_exact(2).zip(uvs.chunks_exact(2)) {
            self.positions.push(flip.to_screen(position[0], position[1]));
            self.colors.push(color);
            self.uvs.push(Vec2::new(uv[0], uv[1]));
        }
    }
}
