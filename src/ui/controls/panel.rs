//! Solid-colour rectangle.

use crate::error::{Result, UiError};
use crate::gfx::geometry::{generate_quad, AtlasRegion};
use crate::gfx::renderer::RenderList;

use super::{visual_model, ControlMesh};
use crate::ui::control::{BaseControl, Rect};
use crate::ui::handle::{ControlHandle, ControlKind};
use crate::ui::state::UiState;

pub struct Panel {
    pub base: BaseControl,
    pub colour: [f32; 4],
    pub mesh: ControlMesh,
}

impl UiState {
    /// Creates a panel of `size` pixels attached to the root.
    pub fn panel_create(&mut self, name: &str, size: [f32; 2], colour: [f32; 4]) -> Result<ControlHandle> {
        if size[0] < 0.0 || size[1] < 0.0 {
            return Err(UiError::InvalidInput(format!("negative panel size {:?}", size)));
        }
        let mut base = self.new_base(ControlKind::Panel, name);
        base.bounds = Rect::sized(size[0], size[1]);
        let transform = base.transform;
        let mesh = ControlMesh::new(generate_quad(size[0], size[1], AtlasRegion::FULL_UV));
        let inserted = self.controls.panels.insert_with(|handle| {
            base.handle = handle;
            Panel { base, colour, mesh }
        });
        self.finish_create(inserted, ControlKind::Panel, transform)
    }

    pub fn panel_set_colour(&mut self, handle: ControlHandle, colour: [f32; 4]) -> Result<()> {
        self.expect_kind(handle, ControlKind::Panel)?;
        let panel = self.controls.panels.get_mut(handle).ok_or(UiError::InvalidHandle(handle))?;
        panel.colour = colour;
        Ok(())
    }

    pub fn panel_colour(&self, handle: ControlHandle) -> Option<[f32; 4]> {
        self.controls.panels.get(handle).map(|p| p.colour)
    }
}

pub(crate) fn resize(ui: &mut UiState, handle: ControlHandle) {
    if let Some(panel) = ui.controls.panels.get_mut(handle) {
        let bounds = panel.base.bounds;
        panel
            .mesh
            .set_data(generate_quad(bounds.width, bounds.height, AtlasRegion::FULL_UV));
    }
}

pub(crate) fn render(ui: &mut UiState, handle: ControlHandle, list: &mut RenderList, clip: Option<u32>) -> bool {
    let Some(model) = visual_model(ui, handle) else {
        return false;
    };
    let shader = ui.config.ui_shader;
    let renderer = ui.services.renderer.clone();
    let Some(panel) = ui.controls.panels.get_mut(handle) else {
        return false;
    };
    if !panel.mesh.prepare(&mut *renderer.borrow_mut(), shader) {
        return false;
    }
    if let Some(renderable) = panel.mesh.renderable(model, None, panel.colour, clip) {
        list.push(renderable);
    }
    true
}

pub(crate) fn destroy(ui: &mut UiState, handle: ControlHandle) {
    let shader = ui.config.ui_shader;
    let renderer = ui.services.renderer.clone();
    if let Some(panel) = ui.controls.panels.get_mut(handle) {
        panel.mesh.release(&mut *renderer.borrow_mut(), shader);
    }
}
