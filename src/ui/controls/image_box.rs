//! A single quad textured from a region of an atlas.

use crate::error::{Result, UiError};
use crate::gfx::geometry::{generate_quad, AtlasRegion};
use crate::gfx::renderer::{RenderList, TextureHandle};

use super::{visual_model, ControlMesh};
use crate::ui::control::{BaseControl, Rect};
use crate::ui::handle::{ControlHandle, ControlKind};
use crate::ui::state::UiState;

pub struct ImageBox {
    pub base: BaseControl,
    pub texture: TextureHandle,
    pub region: AtlasRegion,
    pub mesh: ControlMesh,
}

impl UiState {
    pub fn image_box_create(
        &mut self,
        name: &str,
        texture: TextureHandle,
        region: AtlasRegion,
        size: [f32; 2],
    ) -> Result<ControlHandle> {
        if size[0] < 0.0 || size[1] < 0.0 {
            return Err(UiError::InvalidInput(format!("negative image size {:?}", size)));
        }
        let mut base = self.new_base(ControlKind::ImageBox, name);
        base.bounds = Rect::sized(size[0], size[1]);
        let transform = base.transform;
        let mesh = ControlMesh::new(generate_quad(size[0], size[1], region));
        let inserted = self.controls.image_boxes.insert_with(|handle| {
            base.handle = handle;
            ImageBox {
                base,
                texture,
                region,
                mesh,
            }
        });
        self.finish_create(inserted, ControlKind::ImageBox, transform)
    }

    /// Shows a different part of the atlas.
    pub fn image_box_set_region(&mut self, handle: ControlHandle, region: AtlasRegion) -> Result<()> {
        self.expect_kind(handle, ControlKind::ImageBox)?;
        let image = self
            .controls
            .image_boxes
            .get_mut(handle)
            .ok_or(UiError::InvalidHandle(handle))?;
        if image.region != region {
            image.region = region;
            let bounds = image.base.bounds;
            image.mesh.set_data(generate_quad(bounds.width, bounds.height, region));
        }
        Ok(())
    }

    pub fn image_box_region(&self, handle: ControlHandle) -> Option<AtlasRegion> {
        self.controls.image_boxes.get(handle).map(|i| i.region)
    }
}

pub(crate) fn resize(ui: &mut UiState, handle: ControlHandle) {
    if let Some(image) = ui.controls.image_boxes.get_mut(handle) {
        let bounds = image.base.bounds;
        image
            .mesh
            .set_data(generate_quad(bounds.width, bounds.height, image.region));
    }
}

pub(crate) fn render(ui: &mut UiState, handle: ControlHandle, list: &mut RenderList, clip: Option<u32>) -> bool {
    let Some(model) = visual_model(ui, handle) else {
        return false;
    };
    let shader = ui.config.ui_shader;
    let renderer = ui.services.renderer.clone();
    let Some(image) = ui.controls.image_boxes.get_mut(handle) else {
        return false;
    };
    if !image.mesh.prepare(&mut *renderer.borrow_mut(), shader) {
        return false;
    }
    if let Some(renderable) = image
        .mesh
        .renderable(model, Some(image.texture), [1.0, 1.0, 1.0, 1.0], clip)
    {
        list.push(renderable);
    }
    true
}

pub(crate) fn destroy(ui: &mut UiState, handle: ControlHandle) {
    let shader = ui.config.ui_shader;
    let renderer = ui.services.renderer.clone();
    if let Some(image) = ui.controls.image_boxes.get_mut(handle) {
        image.mesh.release(&mut *renderer.borrow_mut(), shader);
    }
}
