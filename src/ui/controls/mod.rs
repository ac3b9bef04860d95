//! # Control Variants
//!
//! One module per control kind. Every variant embeds a [`BaseControl`] and
//! lives in its own [`TypedArray`]; the hook functions below route the
//! dispatcher and the frame driver to the variant's behaviour, falling back
//! to the base behaviour (run the user callback) for kinds that do not
//! override a hook.

pub mod button;
pub mod checkbox;
pub mod image_box;
pub mod label;
pub mod panel;
pub mod scrollable;
pub mod textbox;
pub mod tree_item;

pub use button::{Button, ButtonKind, ButtonSkin};
pub use checkbox::{Checkbox, CheckboxState};
pub use image_box::ImageBox;
pub use label::Label;
pub use panel::Panel;
pub use scrollable::{ScrollAxes, Scrollable};
pub use textbox::Textbox;
pub use tree_item::TreeItem;

use cgmath::{Matrix4, Vector3};
use log::warn;

use crate::error::Result;
use crate::gfx::font::FontHandle;
use crate::gfx::geometry::GeometryData;
use crate::gfx::renderer::pass::UI_INSTANCE_SET;
use crate::gfx::renderer::{GeometryRange, RenderBackend, RenderList, Renderable, ShaderId, TextureHandle, UiRenderable};
use crate::gfx::vertex::Vertex2D;

use super::callbacks::{KeyEvent, MouseEvent, MouseEventKind};
use super::control::BaseControl;
use super::handle::{ControlHandle, ControlKind};
use super::state::UiState;
use super::store::TypedArray;

/// A control with no behaviour of its own: the root, content wrappers and
/// tree-item child containers.
pub struct Container {
    pub base: BaseControl,
}

/// Per-kind storage for every control variant.
pub struct ControlArrays {
    pub bases: TypedArray<Container>,
    pub panels: TypedArray<Panel>,
    pub labels: TypedArray<Label>,
    pub buttons: TypedArray<Button>,
    pub textboxes: TypedArray<Textbox>,
    pub scrollables: TypedArray<Scrollable>,
    pub checkboxes: TypedArray<Checkbox>,
    pub image_boxes: TypedArray<ImageBox>,
    pub tree_items: TypedArray<TreeItem>,
}

impl ControlArrays {
    pub fn new() -> Self {
        Self {
            bases: TypedArray::new(ControlKind::Base),
            panels: TypedArray::new(ControlKind::Panel),
            labels: TypedArray::new(ControlKind::Label),
            buttons: TypedArray::new(ControlKind::Button),
            textboxes: TypedArray::new(ControlKind::Textbox),
            scrollables: TypedArray::new(ControlKind::Scrollable),
            checkboxes: TypedArray::new(ControlKind::Checkbox),
            image_boxes: TypedArray::new(ControlKind::ImageBox),
            tree_items: TypedArray::new(ControlKind::TreeItem),
        }
    }

    /// Frees the slot behind `handle`. Returns false if it was not live.
    pub fn remove(&mut self, handle: ControlHandle) -> bool {
        match handle.kind() {
            Some(ControlKind::Base) => self.bases.remove(handle).is_some(),
            Some(ControlKind::Panel) => self.panels.remove(handle).is_some(),
            Some(ControlKind::Label) => self.labels.remove(handle).is_some(),
            Some(ControlKind::Button) => self.buttons.remove(handle).is_some(),
            Some(ControlKind::Textbox) => self.textboxes.remove(handle).is_some(),
            Some(ControlKind::Scrollable) => self.scrollables.remove(handle).is_some(),
            Some(ControlKind::Checkbox) => self.checkboxes.remove(handle).is_some(),
            Some(ControlKind::ImageBox) => self.image_boxes.remove(handle).is_some(),
            Some(ControlKind::TreeItem) => self.tree_items.remove(handle).is_some(),
            None => false,
        }
    }

    pub fn all_handles(&self) -> Vec<ControlHandle> {
        let mut handles = self.bases.handles();
        handles.extend(self.panels.handles());
        handles.extend(self.labels.handles());
        handles.extend(self.buttons.handles());
        handles.extend(self.textboxes.handles());
        handles.extend(self.scrollables.handles());
        handles.extend(self.checkboxes.handles());
        handles.extend(self.image_boxes.handles());
        handles.extend(self.tree_items.handles());
        handles
    }
}

impl Default for ControlArrays {
    fn default() -> Self {
        Self::new()
    }
}

/// CPU-side quad geometry of a control plus its place in the shared buffers.
///
/// Geometry edits only touch `data` and set `dirty`; the upload happens on
/// the next render.
pub struct ControlMesh {
    pub data: GeometryData<Vertex2D>,
    pub range: Option<GeometryRange>,
    pub binding_id: Option<u32>,
    pub dirty: bool,
}

impl ControlMesh {
    pub fn new(data: GeometryData<Vertex2D>) -> Self {
        Self {
            data,
            range: None,
            binding_id: None,
            dirty: true,
        }
    }

    pub fn set_data(&mut self, data: GeometryData<Vertex2D>) {
        self.data = data;
        self.dirty = true;
    }

    /// Makes sure the binding instance and buffer ranges exist and hold the
    /// current geometry. Reallocates only when the geometry outgrew its ranges.
    pub(crate) fn prepare(&mut self, backend: &mut dyn RenderBackend, shader: ShaderId) -> bool {
        if self.binding_id.is_none() {
            self.binding_id = backend.shader_acquire_binding_set_instance(shader, UI_INSTANCE_SET);
            if self.binding_id.is_none() {
                warn!("ui: no binding set instance available for control geometry");
                return false;
            }
        }
        if !self.dirty {
            return self.range.is_some();
        }
        let fits = self.range.as_ref().is_some_and(|range| {
            self.data.vertex_bytes().len() as u64 <= range.vertex_size
                && self.data.index_bytes().len() as u64 <= range.index_size
        });
        if fits {
            if let Some(range) = self.range.as_mut() {
                if !self.data.load_into(backend, range) {
                    warn!("ui: control geometry upload failed");
                    return false;
                }
            }
        } else {
            if let Some(old) = self.range.take() {
                old.free(backend);
            }
            self.range = self.data.upload(backend);
            if self.range.is_none() {
                warn!("ui: could not allocate control geometry");
                return false;
            }
        }
        self.dirty = false;
        true
    }

    pub(crate) fn release(&mut self, backend: &mut dyn RenderBackend, shader: ShaderId) {
        if let Some(range) = self.range.take() {
            range.free(backend);
        }
        if let Some(id) = self.binding_id.take() {
            backend.shader_release_binding_set_instance(shader, UI_INSTANCE_SET, id);
        }
    }

    pub(crate) fn renderable(
        &self,
        model: Matrix4<f32>,
        texture: Option<TextureHandle>,
        colour: [f32; 4],
        clip_reference: Option<u32>,
    ) -> Option<Renderable> {
        let geometry = self.range?;
        Some(Renderable::Ui(UiRenderable {
            model,
            geometry,
            binding_id: self.binding_id,
            texture,
            colour,
            clip_reference,
        }))
    }
}

/// Model matrix for a control's visuals: its world matrix, offset to the bounds origin.
pub(crate) fn visual_model(ui: &UiState, handle: ControlHandle) -> Option<Matrix4<f32>> {
    let bounds = ui.base(handle)?.bounds;
    let world = ui.world_matrix(handle)?;
    Some(world * Matrix4::from_translation(Vector3::new(bounds.x, bounds.y, 0.0)))
}

/// Parents `child` under `owner` as part of the owner itself.
pub(crate) fn adopt_owned(
    ui: &mut UiState,
    owner: ControlHandle,
    child: ControlHandle,
    interactive: bool,
) -> Result<()> {
    ui.add_child(owner, child)?;
    let base = ui.base_mut_or_err(child)?;
    base.owner = Some(owner);
    base.flags.mouse_interactive = interactive;
    Ok(())
}

/// Destroys a half-built control after one of its parts failed to build.
pub(crate) fn abandon<T>(ui: &mut UiState, handle: ControlHandle, err: crate::error::UiError) -> Result<T> {
    warn!("ui: abandoning {:?}: {}", handle, err);
    if let Err(destroy_err) = ui.destroy(handle) {
        warn!("ui: cleanup of {:?} failed: {}", handle, destroy_err);
    }
    Err(err)
}

pub(crate) fn release_font(ui: &UiState, font: FontHandle) {
    ui.services.fonts.borrow_mut().release(font);
}

/// Internal mouse handler. `false` stops propagation.
pub(crate) fn internal_mouse(
    ui: &mut UiState,
    handle: ControlHandle,
    kind: MouseEventKind,
    event: MouseEvent,
) -> bool {
    match handle.kind() {
        Some(ControlKind::Button) => button::internal_mouse(ui, handle, kind, event),
        Some(ControlKind::Checkbox) => checkbox::internal_mouse(ui, handle, kind, event),
        Some(ControlKind::Label) => label::internal_mouse(ui, handle, kind, event),
        _ => ui.fire_mouse_callback(handle, kind, event),
    }
}

/// A press that ended outside the control.
pub(crate) fn released_outside_hook(ui: &mut UiState, handle: ControlHandle) {
    if handle.kind() == Some(ControlKind::Button) {
        button::set_skin(ui, handle, ButtonSkin::Normal);
    }
}

pub(crate) fn internal_key(ui: &mut UiState, handle: ControlHandle, event: KeyEvent) -> bool {
    match handle.kind() {
        Some(ControlKind::Textbox) => textbox::internal_key(ui, handle, event),
        _ => ui.fire_key_callback(handle, event),
    }
}

pub(crate) fn internal_focus_changed(ui: &mut UiState, handle: ControlHandle, gained: bool) {
    if handle.kind() == Some(ControlKind::Textbox) {
        textbox::focus_changed(ui, handle, gained);
    }
}

/// Releases variant resources. The slot itself is freed by the caller.
pub(crate) fn destroy_hook(ui: &mut UiState, handle: ControlHandle) {
    match handle.kind() {
        Some(ControlKind::Panel) => panel::destroy(ui, handle),
        Some(ControlKind::Label) => label::destroy(ui, handle),
        Some(ControlKind::Button) => button::destroy(ui, handle),
        Some(ControlKind::Textbox) => textbox::destroy(ui, handle),
        Some(ControlKind::ImageBox) => image_box::destroy(ui, handle),
        _ => {}
    }
    let mask_geometry = ui
        .base_mut(handle)
        .and_then(|base| base.clip_mask.as_mut())
        .and_then(|mask| mask.geometry.take());
    if let Some(geometry) = mask_geometry {
        geometry.free(&mut *ui.services.renderer.borrow_mut());
    }
}

pub(crate) fn update_hook(ui: &mut UiState, handle: ControlHandle) -> bool {
    match handle.kind() {
        Some(ControlKind::Label) => label::update(ui, handle),
        _ => true,
    }
}

/// Appends the control's own visuals. `clip` is the stencil reference of the
/// innermost enclosing clip mask.
pub(crate) fn render_hook(
    ui: &mut UiState,
    handle: ControlHandle,
    list: &mut RenderList,
    clip: Option<u32>,
) -> bool {
    match handle.kind() {
        Some(ControlKind::Panel) => panel::render(ui, handle, list, clip),
        Some(ControlKind::Label) => label::render(ui, handle, list, clip),
        Some(ControlKind::Button) => button::render(ui, handle, list, clip),
        Some(ControlKind::Textbox) => textbox::render(ui, handle, list, clip),
        Some(ControlKind::ImageBox) => image_box::render(ui, handle, list, clip),
        _ => true,
    }
}

pub(crate) fn resize_hook(ui: &mut UiState, handle: ControlHandle) {
    match handle.kind() {
        Some(ControlKind::Panel) => panel::resize(ui, handle),
        Some(ControlKind::Button) => button::resize(ui, handle),
        Some(ControlKind::Textbox) => textbox::resize(ui, handle),
        Some(ControlKind::Scrollable) => scrollable::resize(ui, handle),
        Some(ControlKind::ImageBox) => image_box::resize(ui, handle),
        _ => {}
    }
}

/// Activity changed on `handle`; checkboxes below it repaint their state.
pub(crate) fn active_changed_hook(ui: &mut UiState, handle: ControlHandle) {
    let mut affected = ui.descendants(handle);
    affected.push(handle);
    for control in affected {
        if control.kind() == Some(ControlKind::Checkbox) {
            checkbox::refresh_state(ui, control);
        }
    }
}
