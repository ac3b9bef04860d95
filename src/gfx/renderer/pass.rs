//! # UI Render Pass
//!
//! Turns a frame's [`RenderList`] into backend calls. UI geometry is drawn
//! with an orthographic pixel projection (top-left origin, y down); gizmo
//! geometry with the camera's view-projection.

use cgmath::{ortho, Matrix4, SquareMatrix};
use log::{error, trace};

use super::{
    CompareOp, CullMode, GeometryRange, RenderBackend, RenderBuffer, RenderList, Renderable,
    ShaderId, StencilOp, Viewport, Winding,
};
use crate::gfx::vertex::UiImmediateData;

/// Binding slot of the atlas texture/sampler in the UI shader.
pub const UI_TEXTURE_BINDING: u32 = 0;
/// Binding-set index of per-control instance state.
pub const UI_INSTANCE_SET: u32 = 1;

/// Per-frame settings for [`submit_render_list`].
#[derive(Debug, Clone, Copy)]
pub struct UiPassSettings {
    pub ui_shader: ShaderId,
    pub gizmo_shader: ShaderId,
    pub viewport: Viewport,
    /// Camera view-projection used for gizmo entries.
    pub view_projection: Matrix4<f32>,
}

impl UiPassSettings {
    pub fn new(ui_shader: ShaderId, gizmo_shader: ShaderId, width: f32, height: f32) -> Self {
        Self {
            ui_shader,
            gizmo_shader,
            viewport: Viewport {
                x: 0.0,
                y: 0.0,
                width,
                height,
            },
            view_projection: Matrix4::identity(),
        }
    }

    /// Pixel-space orthographic projection for the viewport.
    pub fn projection(&self) -> Matrix4<f32> {
        ortho(
            0.0,
            self.viewport.width,
            self.viewport.height,
            0.0,
            -100.0,
            100.0,
        )
    }
}

fn draw_geometry(backend: &mut dyn RenderBackend, geometry: &GeometryRange) -> bool {
    if geometry.index_count > 0 {
        // Bind the vertex range, then draw through the index range.
        backend.renderbuffer_draw(
            RenderBuffer::Vertex,
            geometry.vertex_offset,
            geometry.vertex_count,
            0,
            false,
        ) && backend.renderbuffer_draw(
            RenderBuffer::Index,
            geometry.index_offset,
            geometry.index_count,
            1,
            true,
        )
    } else {
        backend.renderbuffer_draw(
            RenderBuffer::Vertex,
            geometry.vertex_offset,
            geometry.vertex_count,
            1,
            false,
        )
    }
}

fn push_immediate(backend: &mut dyn RenderBackend, shader: ShaderId, model: Matrix4<f32>, colour: [f32; 4]) {
    let data = UiImmediateData {
        model: model.into(),
        colour,
    };
    backend.shader_set_immediate_data(shader, bytemuck::bytes_of(&data));
}

/// Submits every entry of `list` in order. Returns the number of failed draws.
pub fn submit_render_list(
    backend: &mut dyn RenderBackend,
    settings: &UiPassSettings,
    list: &RenderList,
) -> usize {
    let projection = settings.projection();
    let mut failures = 0;

    backend.set_viewport(settings.viewport);
    backend.set_scissor(settings.viewport);
    backend.set_cull_mode(CullMode::None);
    backend.set_winding(Winding::CounterClockwise);
    backend.set_depth_test_enabled(false);
    backend.set_depth_write_enabled(false);
    backend.set_stencil_test_enabled(false);

    for entry in list.entries() {
        match entry {
            Renderable::ClipBegin {
                reference_id,
                model,
                geometry,
            } => {
                trace!("ui pass: clip mask {} begin", reference_id);
                backend.set_stencil_test_enabled(true);
                backend.set_stencil_reference(*reference_id);
                backend.set_stencil_compare_mask(0xFF);
                backend.set_stencil_write_mask(0xFF);
                backend.set_stencil_op(StencilOp::Keep, StencilOp::Replace, StencilOp::Replace, CompareOp::Always);
                push_immediate(backend, settings.ui_shader, projection * *model, [1.0; 4]);
                if !draw_geometry(backend, geometry) {
                    error!("ui pass: failed to draw clip mask {}", reference_id);
                    failures += 1;
                }
                backend.set_stencil_write_mask(0);
                backend.set_stencil_op(StencilOp::Keep, StencilOp::Keep, StencilOp::Keep, CompareOp::Equal);
            }
            Renderable::ClipEnd { reference_id, restore } => {
                trace!("ui pass: clip mask {} end", reference_id);
                match restore {
                    Some(outer) => {
                        backend.set_stencil_reference(*outer);
                        backend.set_stencil_op(StencilOp::Keep, StencilOp::Keep, StencilOp::Keep, CompareOp::Equal);
                    }
                    None => backend.set_stencil_test_enabled(false),
                }
            }
            Renderable::Ui(ui) => {
                if let Some(id) = ui.binding_id {
                    backend.shader_apply_binding_set(settings.ui_shader, UI_INSTANCE_SET, id);
                }
                if let Some(texture) = ui.texture {
                    backend.shader_set_binding_texture(settings.ui_shader, UI_TEXTURE_BINDING, texture);
                    backend.shader_set_binding_sampler(settings.ui_shader, UI_TEXTURE_BINDING, texture);
                }
                push_immediate(backend, settings.ui_shader, projection * ui.model, ui.colour);
                if !draw_geometry(backend, &ui.geometry) {
                    error!("ui pass: draw failed for ui geometry at {}", ui.geometry.vertex_offset);
                    failures += 1;
                }
            }
            Renderable::Gizmo(gizmo) => {
                backend.set_depth_test_enabled(false);
                push_immediate(
                    backend,
                    settings.gizmo_shader,
                    settings.view_projection * gizmo.model,
                    [1.0; 4],
                );
                if !draw_geometry(backend, &gizmo.geometry) {
                    error!("ui pass: draw failed for gizmo geometry");
                    failures += 1;
                }
            }
        }
    }

    backend.set_stencil_test_enabled(false);
    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::renderer::{HeadlessRenderer, RenderCommand, UiRenderable};

    fn quad(offset: u64) -> GeometryRange {
        GeometryRange {
            vertex_offset: offset,
            vertex_size: 64,
            vertex_count: 4,
            index_offset: offset,
            index_size: 24,
            index_count: 6,
        }
    }

    fn ui(offset: u64, clip: Option<u32>) -> Renderable {
        Renderable::Ui(UiRenderable {
            model: Matrix4::identity(),
            geometry: quad(offset),
            binding_id: Some(3),
            texture: None,
            colour: [1.0; 4],
            clip_reference: clip,
        })
    }

    #[test]
    fn test_clip_mask_stencil_protocol() {
        let mut backend = HeadlessRenderer::new();
        let settings = UiPassSettings::new(ShaderId(1), ShaderId(2), 800.0, 600.0);
        let mut list = RenderList::new();
        list.push(Renderable::ClipBegin {
            reference_id: 7,
            model: Matrix4::identity(),
            geometry: quad(0),
        });
        list.push(ui(64, Some(7)));
        list.push(Renderable::ClipEnd {
            reference_id: 7,
            restore: None,
        });

        assert_eq!(submit_render_list(&mut backend, &settings, &list), 0);
        let commands = backend.take_commands();
        let write = commands
            .iter()
            .position(|c| {
                *c == RenderCommand::StencilOp {
                    fail: StencilOp::Keep,
                    pass: StencilOp::Replace,
                    depth_fail: StencilOp::Replace,
                    compare: CompareOp::Always,
                }
            })
            .unwrap();
        let test = commands
            .iter()
            .position(|c| matches!(c, RenderCommand::StencilOp { compare: CompareOp::Equal, .. }))
            .unwrap();
        assert!(write < test);
        assert!(commands.contains(&RenderCommand::StencilReference(7)));
        assert!(commands[write..test].contains(&RenderCommand::StencilWriteMask(0)));
        assert_eq!(commands.last(), Some(&RenderCommand::StencilTest(false)));
    }

    #[test]
    fn test_draw_failures_do_not_abort_frame() {
        let mut backend = HeadlessRenderer::new();
        backend.set_failing_draws(true);
        let settings = UiPassSettings::new(ShaderId(1), ShaderId(2), 100.0, 100.0);
        let mut list = RenderList::new();
        list.push(ui(0, None));
        list.push(ui(64, None));
        assert_eq!(submit_render_list(&mut backend, &settings, &list), 2);
        let applied = backend
            .commands()
            .iter()
            .filter(|c| matches!(c, RenderCommand::ApplyBindingSet { .. }))
            .count();
        assert_eq!(applied, 2);
    }
}
