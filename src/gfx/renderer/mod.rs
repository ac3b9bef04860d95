//! # Render Backend Interface
//!
//! The UI and the gizmo never talk to a graphics API directly. They consume
//! the narrow [`RenderBackend`] trait: sub-allocation inside the shared
//! vertex/index buffers, per-control binding-set instances, draw state and
//! draw submission. A frame's output is a [`RenderList`] of [`Renderable`]s,
//! which [`submit_render_list`] turns into backend calls.
//!
//! ## Stencil clipping
//!
//! A clip mask is drawn first with stencil **write** enabled (compare
//! `Always`, op `Replace`, reference = mask id). Everything clipped by that
//! mask is then drawn with stencil **test** enabled (compare `Equal`,
//! reference = mask id, write mask 0).
//!
//! [`submit_render_list`]: pass::submit_render_list

pub mod headless;
pub mod pass;

pub use headless::{HeadlessRenderer, RenderCommand};
pub use pass::{submit_render_list, UiPassSettings};

use cgmath::Matrix4;

/// One of the two process-wide geometry pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderBuffer {
    Vertex,
    Index,
}

/// Identifies a shader program known to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderId(pub u32);

/// Identifies a texture (font atlas, UI atlas) known to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    None,
    Front,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding {
    CounterClockwise,
    Clockwise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Always,
    Equal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StencilOp {
    Keep,
    Replace,
}

/// Screen rectangle in pixels, used for viewport and scissor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Renderer operations consumed by the UI and the editor gizmo.
///
/// Methods that can fail return `bool`/`Option`; callers log and carry on.
pub trait RenderBackend {
    /// Reserves `size` bytes in a shared buffer, returning the byte offset.
    fn renderbuffer_allocate(&mut self, buffer: RenderBuffer, size: u64) -> Option<u64>;
    /// Returns a range previously obtained from [`renderbuffer_allocate`](Self::renderbuffer_allocate).
    fn renderbuffer_free(&mut self, buffer: RenderBuffer, size: u64, offset: u64) -> bool;
    /// Uploads `data` at `offset`.
    fn renderbuffer_load_range(&mut self, buffer: RenderBuffer, offset: u64, data: &[u8]) -> bool;
    /// Draws `count` elements starting at the byte `offset`.
    fn renderbuffer_draw(
        &mut self,
        buffer: RenderBuffer,
        offset: u64,
        count: u32,
        instance_count: u32,
        drawing_indices: bool,
    ) -> bool;

    fn shader_acquire_binding_set_instance(&mut self, shader: ShaderId, set_index: u32) -> Option<u32>;
    fn shader_release_binding_set_instance(&mut self, shader: ShaderId, set_index: u32, id: u32) -> bool;
    fn shader_apply_binding_set(&mut self, shader: ShaderId, set_index: u32, id: u32) -> bool;
    fn shader_set_binding_texture(&mut self, shader: ShaderId, binding: u32, texture: TextureHandle) -> bool;
    fn shader_set_binding_sampler(&mut self, shader: ShaderId, binding: u32, texture: TextureHandle) -> bool;
    fn shader_set_binding_data(&mut self, shader: ShaderId, binding: u32, data: &[u8]) -> bool;
    fn shader_set_immediate_data(&mut self, shader: ShaderId, data: &[u8]) -> bool;

    fn set_viewport(&mut self, viewport: Viewport);
    fn set_scissor(&mut self, scissor: Viewport);
    fn set_cull_mode(&mut self, mode: CullMode);
    fn set_winding(&mut self, winding: Winding);
    fn set_depth_test_enabled(&mut self, enabled: bool);
    fn set_depth_write_enabled(&mut self, enabled: bool);
    fn set_stencil_test_enabled(&mut self, enabled: bool);
    fn set_stencil_reference(&mut self, reference: u32);
    fn set_stencil_write_mask(&mut self, mask: u32);
    fn set_stencil_compare_mask(&mut self, mask: u32);
    fn set_stencil_op(&mut self, fail: StencilOp, pass: StencilOp, depth_fail: StencilOp, compare: CompareOp);
}

/// Byte ranges a piece of geometry occupies in the shared buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GeometryRange {
    pub vertex_offset: u64,
    pub vertex_size: u64,
    pub vertex_count: u32,
    pub index_offset: u64,
    pub index_size: u64,
    pub index_count: u32,
}

impl GeometryRange {
    /// Allocates vertex and index ranges in one go, rolling back on partial failure.
    ///
    /// An `index_size` of zero allocates no index range (line lists, point data).
    pub fn allocate(
        backend: &mut dyn RenderBackend,
        vertex_size: u64,
        index_size: u64,
    ) -> Option<Self> {
        let vertex_offset = backend.renderbuffer_allocate(RenderBuffer::Vertex, vertex_size)?;
        let index_offset = if index_size == 0 {
            0
        } else {
            match backend.renderbuffer_allocate(RenderBuffer::Index, index_size) {
                Some(offset) => offset,
                None => {
                    backend.renderbuffer_free(RenderBuffer::Vertex, vertex_size, vertex_offset);
                    return None;
                }
            }
        };
        Some(Self {
            vertex_offset,
            vertex_size,
            vertex_count: 0,
            index_offset,
            index_size,
            index_count: 0,
        })
    }

    pub fn free(&self, backend: &mut dyn RenderBackend) {
        if self.vertex_size > 0 {
            backend.renderbuffer_free(RenderBuffer::Vertex, self.vertex_size, self.vertex_offset);
        }
        if self.index_size > 0 {
            backend.renderbuffer_free(RenderBuffer::Index, self.index_size, self.index_offset);
        }
    }
}

/// One entry of a frame's render list.
#[derive(Debug, Clone, PartialEq)]
pub enum Renderable {
    /// Textured/tinted UI geometry.
    Ui(UiRenderable),
    /// Begin writing a clip mask into the stencil buffer.
    ClipBegin {
        reference_id: u32,
        model: Matrix4<f32>,
        geometry: GeometryRange,
    },
    /// Stop clipping against `reference_id`; restores the enclosing mask, if any.
    ClipEnd {
        reference_id: u32,
        restore: Option<u32>,
    },
    /// Gizmo line geometry in world space.
    Gizmo(GizmoRenderable),
}

#[derive(Debug, Clone, PartialEq)]
pub struct UiRenderable {
    pub model: Matrix4<f32>,
    pub geometry: GeometryRange,
    pub binding_id: Option<u32>,
    pub texture: Option<TextureHandle>,
    pub colour: [f32; 4],
    /// Stencil reference to test against, if the control is inside a clip mask.
    pub clip_reference: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GizmoRenderable {
    pub model: Matrix4<f32>,
    pub geometry: GeometryRange,
}

/// Frame-scoped list of renderables produced by the UI and the gizmo.
#[derive(Debug, Default, Clone)]
pub struct RenderList {
    entries: Vec<Renderable>,
}

impl RenderList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, renderable: Renderable) {
        self.entries.push(renderable);
    }

    pub fn entries(&self) -> &[Renderable] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Just the UI geometry entries, in submission order.
    pub fn ui_entries(&self) -> impl Iterator<Item = &UiRenderable> {
        self.entries.iter().filter_map(|entry| match entry {
            Renderable::Ui(ui) => Some(ui),
            _ => None,
        })
    }
}
