//! # Procedural Geometry Generation
//!
//! CPU-side geometry for UI quads, nine-slices and gizmo line meshes, plus
//! the glue that moves it into the shared render buffers.
//!
//! ## Usage
//!
//! ```rust
//! use haggis_ui::gfx::geometry::{generate_quad, AtlasRegion};
//!
//! // A 100x30 quad sampling the whole texture
//! let quad = generate_quad(100.0, 30.0, AtlasRegion::FULL_UV);
//! assert_eq!(quad.vertex_count(), 4);
//! ```

pub mod primitives;

pub use primitives::*;

use log::warn;

use crate::gfx::renderer::{GeometryRange, RenderBackend, RenderBuffer};

/// Vertices and triangle (or line) indices ready for upload
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryData<V> {
    pub vertices: Vec<V>,
    pub indices: Vec<u32>,
}

impl<V: bytemuck::Pod> GeometryData<V> {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Allocates ranges sized for this geometry and uploads it.
    pub fn upload(&self, backend: &mut dyn RenderBackend) -> Option<GeometryRange> {
        let mut range = GeometryRange::allocate(
            backend,
            self.vertex_bytes().len() as u64,
            self.index_bytes().len() as u64,
        )?;
        if !self.load_into(backend, &mut range) {
            range.free(backend);
            return None;
        }
        Some(range)
    }

    /// Uploads into existing ranges. Fails if the geometry outgrew them.
    pub fn load_into(&self, backend: &mut dyn RenderBackend, range: &mut GeometryRange) -> bool {
        let vertex_bytes = self.vertex_bytes();
        let index_bytes = self.index_bytes();
        if vertex_bytes.len() as u64 > range.vertex_size || index_bytes.len() as u64 > range.index_size {
            warn!("geometry upload does not fit its allocated range");
            return false;
        }
        if !vertex_bytes.is_empty()
            && !backend.renderbuffer_load_range(RenderBuffer::Vertex, range.vertex_offset, vertex_bytes)
        {
            return false;
        }
        if !index_bytes.is_empty()
            && !backend.renderbuffer_load_range(RenderBuffer::Index, range.index_offset, index_bytes)
        {
            return false;
        }
        range.vertex_count = self.vertices.len() as u32;
        range.index_count = self.indices.len() as u32;
        true
    }

    /// Re-uploads only the vertex range (index data unchanged).
    pub fn reload_vertices(&self, backend: &mut dyn RenderBackend, range: &GeometryRange) -> bool {
        let bytes = self.vertex_bytes();
        bytes.len() as u64 <= range.vertex_size
            && backend.renderbuffer_load_range(RenderBuffer::Vertex, range.vertex_offset, bytes)
    }
}

impl<V: bytemuck::Pod> Default for GeometryData<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::renderer::HeadlessRenderer;
    use crate::gfx::vertex::Vertex2D;

    #[test]
    fn test_upload_and_reload() {
        let mut backend = HeadlessRenderer::new();
        let mut quad = generate_quad(10.0, 10.0, AtlasRegion::FULL_UV);
        let range = quad.upload(&mut backend).unwrap();
        assert_eq!(range.vertex_count, 4);
        assert_eq!(range.index_count, 6);
        assert_eq!(range.vertex_size, 4 * Vertex2D::SIZE);

        quad.vertices[2].position = [20.0, 20.0];
        assert!(quad.reload_vertices(&mut backend, &range));
        let stored = backend
            .read_range(RenderBuffer::Vertex, range.vertex_offset, range.vertex_size)
            .unwrap();
        assert_eq!(stored, quad.vertex_bytes());
    }

    #[test]
    fn test_upload_failure_rolls_back() {
        let mut backend = HeadlessRenderer::new().with_buffer_capacity(RenderBuffer::Index, 8);
        let quad = generate_quad(10.0, 10.0, AtlasRegion::FULL_UV);
        assert!(quad.upload(&mut backend).is_none());
        assert_eq!(backend.live_allocations(RenderBuffer::Vertex), 0);
    }
}
