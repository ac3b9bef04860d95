//! # Headless Render Backend
//!
//! A [`RenderBackend`] that keeps buffer contents in memory and records every
//! state change and draw as a [`RenderCommand`]. It lets hosts run the UI
//! without a GPU and lets tests assert on exactly what a frame submitted.

use std::collections::{BTreeMap, HashMap};

use log::{trace, warn};

use super::{
    CompareOp, CullMode, RenderBackend, RenderBuffer, ShaderId, StencilOp, TextureHandle, Viewport,
    Winding,
};

/// A recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    Viewport(Viewport),
    Scissor(Viewport),
    CullMode(CullMode),
    Winding(Winding),
    DepthTest(bool),
    DepthWrite(bool),
    StencilTest(bool),
    StencilReference(u32),
    StencilWriteMask(u32),
    StencilCompareMask(u32),
    StencilOp {
        fail: StencilOp,
        pass: StencilOp,
        depth_fail: StencilOp,
        compare: CompareOp,
    },
    ApplyBindingSet {
        set_index: u32,
        id: u32,
    },
    BindTexture {
        binding: u32,
        texture: TextureHandle,
    },
    BindSampler {
        binding: u32,
        texture: TextureHandle,
    },
    BindData {
        binding: u32,
        len: usize,
    },
    Immediate {
        len: usize,
    },
    Draw {
        buffer: RenderBuffer,
        offset: u64,
        count: u32,
        instance_count: u32,
        drawing_indices: bool,
    },
}

/// First-fit byte allocator over one buffer.
#[derive(Debug, Default)]
struct BufferPool {
    data: Vec<u8>,
    /// Free blocks keyed by offset.
    free: BTreeMap<u64, u64>,
    live: HashMap<u64, u64>,
    end: u64,
    capacity: Option<u64>,
}

impl BufferPool {
    fn allocate(&mut self, size: u64) -> Option<u64> {
        if size == 0 {
            return None;
        }
        let found = self
            .free
            .iter()
            .find(|(_, block)| **block >= size)
            .map(|(offset, block)| (*offset, *block));
        let offset = match found {
            Some((offset, block)) => {
                self.free.remove(&offset);
                if block > size {
                    self.free.insert(offset + size, block - size);
                }
                offset
            }
            None => {
                if let Some(capacity) = self.capacity {
                    if self.end + size > capacity {
                        return None;
                    }
                }
                let offset = self.end;
                self.end += size;
                self.data.resize(self.end as usize, 0);
                offset
            }
        };
        self.live.insert(offset, size);
        Some(offset)
    }

    fn free(&mut self, size: u64, offset: u64) -> bool {
        match self.live.get(&offset) {
            Some(&live_size) if live_size == size => {
                self.live.remove(&offset);
                self.free.insert(offset, size);
                self.coalesce();
                true
            }
            _ => false,
        }
    }

    fn coalesce(&mut self) {
        let blocks: Vec<(u64, u64)> = self.free.iter().map(|(o, s)| (*o, *s)).collect();
        self.free.clear();
        let mut current: Option<(u64, u64)> = None;
        for (offset, size) in blocks {
            current = match current {
                Some((start, len)) if start + len == offset => Some((start, len + size)),
                Some(block) => {
                    self.free.insert(block.0, block.1);
                    Some((offset, size))
                }
                None => Some((offset, size)),
            };
        }
        if let Some((start, len)) = current {
            self.free.insert(start, len);
        }
    }

    fn load(&mut self, offset: u64, bytes: &[u8]) -> bool {
        let end = offset as usize + bytes.len();
        if end > self.data.len() {
            return false;
        }
        self.data[offset as usize..end].copy_from_slice(bytes);
        true
    }
}

/// In-memory render backend.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    vertex: BufferPool,
    index: BufferPool,
    next_binding_id: u32,
    free_binding_ids: Vec<u32>,
    live_bindings: HashMap<(u32, u32), Vec<u32>>,
    binding_limit: Option<usize>,
    failing_draws: bool,
    commands: Vec<RenderCommand>,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps a buffer's size so allocations beyond it fail.
    pub fn with_buffer_capacity(mut self, buffer: RenderBuffer, capacity: u64) -> Self {
        self.pool_mut(buffer).capacity = Some(capacity);
        self
    }

    /// Caps the number of simultaneously live binding-set instances.
    pub fn with_binding_limit(mut self, limit: usize) -> Self {
        self.binding_limit = Some(limit);
        self
    }

    /// Makes every subsequent draw report failure.
    pub fn set_failing_draws(&mut self, failing: bool) {
        self.failing_draws = failing;
    }

    fn pool(&self, buffer: RenderBuffer) -> &BufferPool {
        match buffer {
            RenderBuffer::Vertex => &self.vertex,
            RenderBuffer::Index => &self.index,
        }
    }

    fn pool_mut(&mut self, buffer: RenderBuffer) -> &mut BufferPool {
        match buffer {
            RenderBuffer::Vertex => &mut self.vertex,
            RenderBuffer::Index => &mut self.index,
        }
    }

    /// Number of currently allocated ranges in a buffer.
    pub fn live_allocations(&self, buffer: RenderBuffer) -> usize {
        self.pool(buffer).live.len()
    }

    /// Total bytes currently allocated in a buffer.
    pub fn live_bytes(&self, buffer: RenderBuffer) -> u64 {
        self.pool(buffer).live.values().sum()
    }

    /// Number of binding-set instances not yet released.
    pub fn live_binding_instances(&self) -> usize {
        self.live_bindings.values().map(Vec::len).sum()
    }

    /// Copy of the bytes stored at a range.
    pub fn read_range(&self, buffer: RenderBuffer, offset: u64, size: u64) -> Option<Vec<u8>> {
        let data = &self.pool(buffer).data;
        let end = (offset + size) as usize;
        (end <= data.len()).then(|| data[offset as usize..end].to_vec())
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Drains the command log (typically once per frame).
    pub fn take_commands(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl RenderBackend for HeadlessRenderer {
    fn renderbuffer_allocate(&mut self, buffer: RenderBuffer, size: u64) -> Option<u64> {
        let offset = self.pool_mut(buffer).allocate(size);
        if offset.is_none() {
            warn!("headless renderer: {:?} allocation of {} bytes failed", buffer, size);
        }
        offset
    }

    fn renderbuffer_free(&mut self, buffer: RenderBuffer, size: u64, offset: u64) -> bool {
        let freed = self.pool_mut(buffer).free(size, offset);
        if !freed {
            warn!(
                "headless renderer: free of unknown {:?} range {}+{}",
                buffer, offset, size
            );
        }
        freed
    }

    fn renderbuffer_load_range(&mut self, buffer: RenderBuffer, offset: u64, data: &[u8]) -> bool {
        self.pool_mut(buffer).load(offset, data)
    }

    fn renderbuffer_draw(
        &mut self,
        buffer: RenderBuffer,
        offset: u64,
        count: u32,
        instance_count: u32,
        drawing_indices: bool,
    ) -> bool {
        self.commands.push(RenderCommand::Draw {
            buffer,
            offset,
            count,
            instance_count,
            drawing_indices,
        });
        !self.failing_draws
    }

    fn shader_acquire_binding_set_instance(&mut self, shader: ShaderId, set_index: u32) -> Option<u32> {
        if let Some(limit) = self.binding_limit {
            if self.live_binding_instances() >= limit {
                return None;
            }
        }
        let id = self.free_binding_ids.pop().unwrap_or_else(|| {
            let id = self.next_binding_id;
            self.next_binding_id += 1;
            id
        });
        self.live_bindings
            .entry((shader.0, set_index))
            .or_default()
            .push(id);
        trace!("headless renderer: binding instance {} acquired", id);
        Some(id)
    }

    fn shader_release_binding_set_instance(&mut self, shader: ShaderId, set_index: u32, id: u32) -> bool {
        let Some(ids) = self.live_bindings.get_mut(&(shader.0, set_index)) else {
            return false;
        };
        match ids.iter().position(|live| *live == id) {
            Some(position) => {
                ids.swap_remove(position);
                self.free_binding_ids.push(id);
                true
            }
            None => false,
        }
    }

    fn shader_apply_binding_set(&mut self, _shader: ShaderId, set_index: u32, id: u32) -> bool {
        self.commands.push(RenderCommand::ApplyBindingSet { set_index, id });
        true
    }

    fn shader_set_binding_texture(&mut self, _shader: ShaderId, binding: u32, texture: TextureHandle) -> bool {
        self.commands.push(RenderCommand::BindTexture { binding, texture });
        true
    }

    fn shader_set_binding_sampler(&mut self, _shader: ShaderId, binding: u32, texture: TextureHandle) -> bool {
        self.commands.push(RenderCommand::BindSampler { binding, texture });
        true
    }

    fn shader_set_binding_data(&mut self, _shader: ShaderId, binding: u32, data: &[u8]) -> bool {
        self.commands.push(RenderCommand::BindData {
            binding,
            len: data.len(),
        });
        true
    }

    fn shader_set_immediate_data(&mut self, _shader: ShaderId, data: &[u8]) -> bool {
        self.commands.push(RenderCommand::Immediate { len: data.len() });
        true
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.commands.push(RenderCommand::Viewport(viewport));
    }

    fn set_scissor(&mut self, scissor: Viewport) {
        self.commands.push(RenderCommand::Scissor(scissor));
    }

    fn set_cull_mode(&mut self, mode: CullMode) {
        self.commands.push(RenderCommand::CullMode(mode));
    }

    fn set_winding(&mut self, winding: Winding) {
        self.commands.push(RenderCommand::Winding(winding));
    }

    fn set_depth_test_enabled(&mut self, enabled: bool) {
        self.commands.push(RenderCommand::DepthTest(enabled));
    }

    fn set_depth_write_enabled(&mut self, enabled: bool) {
        self.commands.push(RenderCommand::DepthWrite(enabled));
    }

    fn set_stencil_test_enabled(&mut self, enabled: bool) {
        self.commands.push(RenderCommand::StencilTest(enabled));
    }

    fn set_stencil_reference(&mut self, reference: u32) {
        self.commands.push(RenderCommand::StencilReference(reference));
    }

    fn set_stencil_write_mask(&mut self, mask: u32) {
        self.commands.push(RenderCommand::StencilWriteMask(mask));
    }

    fn set_stencil_compare_mask(&mut self, mask: u32) {
        self.commands.push(RenderCommand::StencilCompareMask(mask));
    }

    fn set_stencil_op(&mut self, fail: StencilOp, pass: StencilOp, depth_fail: StencilOp, compare: CompareOp) {
        self.commands.push(RenderCommand::StencilOp {
            fail,
            pass,
            depth_fail,
            compare,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_free_reuses_space() {
        let mut renderer = HeadlessRenderer::new();
        let a = renderer.renderbuffer_allocate(RenderBuffer::Vertex, 64).unwrap();
        let b = renderer.renderbuffer_allocate(RenderBuffer::Vertex, 32).unwrap();
        assert_eq!(a, 0);
        assert_eq!(b, 64);
        assert!(renderer.renderbuffer_free(RenderBuffer::Vertex, 64, a));
        let c = renderer.renderbuffer_allocate(RenderBuffer::Vertex, 16).unwrap();
        assert_eq!(c, 0);
        assert_eq!(renderer.live_allocations(RenderBuffer::Vertex), 2);
        assert!(!renderer.renderbuffer_free(RenderBuffer::Vertex, 64, 999));
    }

    #[test]
    fn test_adjacent_free_blocks_coalesce() {
        let mut renderer = HeadlessRenderer::new();
        let a = renderer.renderbuffer_allocate(RenderBuffer::Index, 8).unwrap();
        let b = renderer.renderbuffer_allocate(RenderBuffer::Index, 8).unwrap();
        renderer.renderbuffer_free(RenderBuffer::Index, 8, a);
        renderer.renderbuffer_free(RenderBuffer::Index, 8, b);
        assert_eq!(renderer.renderbuffer_allocate(RenderBuffer::Index, 16), Some(0));
    }

    #[test]
    fn test_capacity_limit_fails_allocation() {
        let mut renderer = HeadlessRenderer::new().with_buffer_capacity(RenderBuffer::Vertex, 32);
        assert!(renderer.renderbuffer_allocate(RenderBuffer::Vertex, 32).is_some());
        assert!(renderer.renderbuffer_allocate(RenderBuffer::Vertex, 1).is_none());
    }

    #[test]
    fn test_load_range_round_trip() {
        let mut renderer = HeadlessRenderer::new();
        let offset = renderer.renderbuffer_allocate(RenderBuffer::Vertex, 4).unwrap();
        assert!(renderer.renderbuffer_load_range(RenderBuffer::Vertex, offset, &[1, 2, 3, 4]));
        assert_eq!(renderer.read_range(RenderBuffer::Vertex, offset, 4), Some(vec![1, 2, 3, 4]));
        assert!(!renderer.renderbuffer_load_range(RenderBuffer::Vertex, offset + 2, &[0; 8]));
    }

    #[test]
    fn test_binding_instances_recycle() {
        let shader = ShaderId(1);
        let mut renderer = HeadlessRenderer::new().with_binding_limit(1);
        let id = renderer.shader_acquire_binding_set_instance(shader, 1).unwrap();
        assert!(renderer.shader_acquire_binding_set_instance(shader, 1).is_none());
        assert!(renderer.shader_release_binding_set_instance(shader, 1, id));
        assert_eq!(renderer.shader_acquire_binding_set_instance(shader, 1), Some(id));
    }
}
