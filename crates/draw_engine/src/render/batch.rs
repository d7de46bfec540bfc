//! Triangle batches handed to the host's graphics submission call
//!
//! The renderer's only output: camera-relative vertex runs grouped by
//! blend/texture state. Vertex structs are `#[repr(C)]` plain-old-data
//! so the host can upload them to GPU buffers without conversion.

use crate::command::TextureId;
use crate::foundation::math::Vec3;

/// Colored vertex for the untextured triangle pass
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorVertex {
    /// Camera-relative position
    pub position: [f32; 3],

    /// Linear RGBA color
    pub color: [f32; 4],
}

// Safe to implement Pod and Zeroable since the struct is only f32 arrays
// with no padding.
unsafe impl bytemuck::Pod for ColorVertex {}
unsafe impl bytemuck::Zeroable for ColorVertex {}

/// Textured vertex for the textured quad pass
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TexturedVertex {
    /// Camera-relative position
    pub position: [f32; 3],

    /// Texture coordinates
    pub tex_coord: [f32; 2],

    /// Linear RGBA tint
    pub color: [f32; 4],
}

unsafe impl bytemuck::Pod for TexturedVertex {}
unsafe impl bytemuck::Zeroable for TexturedVertex {}

/// Shared batch of untextured triangles, in submission order
#[derive(Debug, Default)]
pub struct TriangleBatch {
    vertices: Vec<ColorVertex>,
}

impl TriangleBatch {
    /// Create an empty batch with reserved capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(capacity),
        }
    }

    /// Append one vertex
    pub fn push(&mut self, position: Vec3, color: [f32; 4]) {
        self.vertices.push(ColorVertex {
            position: [position.x, position.y, position.z],
            color,
        });
    }

    /// Append one triangle
    pub fn push_triangle(&mut self, corners: [Vec3; 3], colors: [[f32; 4]; 3]) {
        for (corner, color) in corners.iter().zip(colors.iter()) {
            self.push(*corner, *color);
        }
    }

    /// All vertices, three per triangle
    pub fn vertices(&self) -> &[ColorVertex] {
        &self.vertices
    }

    /// Number of complete triangles
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// True when nothing has been emitted
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Discard all vertices, keeping the allocation
    pub fn clear(&mut self) {
        self.vertices.clear();
    }
}

/// Batch of textured-quad triangles sharing one texture
#[derive(Debug)]
pub struct TexturedBatch {
    /// Texture every triangle in the batch samples
    pub texture: TextureId,
    vertices: Vec<TexturedVertex>,
}

impl TexturedBatch {
    /// Create an empty batch for one texture
    pub fn new(texture: TextureId) -> Self {
        Self {
            texture,
            vertices: Vec::new(),
        }
    }

    /// Append one vertex
    pub fn push(&mut self, position: Vec3, tex_coord: [f32; 2], color: [f32; 4]) {
        self.vertices.push(TexturedVertex {
            position: [position.x, position.y, position.z],
            tex_coord,
            color,
        });
    }

    /// All vertices, three per triangle
    pub fn vertices(&self) -> &[TexturedVertex] {
        &self.vertices
    }

    /// Number of complete triangles
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// True when nothing has been emitted
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Host-side consumer of finished batches
///
/// Implemented by the host's graphics layer; the pipeline calls
/// `draw_triangles` once for the shared untextured batch and
/// `draw_textured` once per texture group, in a stable order.
pub trait BatchConsumer {
    /// Submit the shared untextured triangle batch
    fn draw_triangles(&mut self, batch: &TriangleBatch);

    /// Submit one textured batch; the texture is bound once per call
    fn draw_textured(&mut self, batch: &TexturedBatch);
}
