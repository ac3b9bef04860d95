//! # Button
//!
//! A nine-slice frame that swaps atlas regions as the pointer hovers and
//! presses it. Text buttons own a caption label centred in the frame; text
//! too wide for the frame is left-aligned instead.

use crate::error::{Result, UiError};
use crate::gfx::geometry::{generate_nine_slice, GeometryData, NineSliceRegion};
use crate::gfx::renderer::RenderList;
use crate::gfx::vertex::Vertex2D;

use super::{abandon, adopt_owned, tree_item, visual_model, ControlMesh};
use crate::ui::callbacks::{MouseEvent, MouseEventKind};
use crate::ui::control::{BaseControl, Rect};
use crate::ui::handle::{ControlHandle, ControlKind};
use crate::ui::state::UiState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonKind {
    Plain,
    Text,
}

/// Which atlas frame the button currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonSkin {
    #[default]
    Normal,
    Hover,
    Pressed,
}

pub struct Button {
    pub base: BaseControl,
    pub kind: ButtonKind,
    pub colour: [f32; 4],
    pub skin: ButtonSkin,
    pub mesh: ControlMesh,
    pub label: Option<ControlHandle>,
}

fn skin_region(ui: &UiState, skin: ButtonSkin) -> NineSliceRegion {
    let atlas = &ui.config.atlas;
    match skin {
        ButtonSkin::Normal => atlas.button_normal,
        ButtonSkin::Hover => atlas.button_hover,
        ButtonSkin::Pressed => atlas.button_pressed,
    }
}

fn frame_geometry(ui: &UiState, width: f32, height: f32, skin: ButtonSkin) -> GeometryData<Vertex2D> {
    let atlas = &ui.config.atlas;
    generate_nine_slice(width, height, atlas.corner_size, atlas.size, &skin_region(ui, skin))
}

impl UiState {
    /// Frame-only button.
    pub fn button_create(&mut self, name: &str, size: [f32; 2]) -> Result<ControlHandle> {
        if size[0] < 0.0 || size[1] < 0.0 {
            return Err(UiError::InvalidInput(format!("negative button size {:?}", size)));
        }
        let mut base = self.new_base(ControlKind::Button, name);
        base.bounds = Rect::sized(size[0], size[1]);
        let transform = base.transform;
        let mesh = ControlMesh::new(frame_geometry(self, size[0], size[1], ButtonSkin::Normal));
        let colour = [1.0, 1.0, 1.0, 1.0];
        let inserted = self.controls.buttons.insert_with(|handle| {
            base.handle = handle;
            Button {
                base,
                kind: ButtonKind::Plain,
                colour,
                skin: ButtonSkin::Normal,
                mesh,
                label: None,
            }
        });
        self.finish_create(inserted, ControlKind::Button, transform)
    }

    /// Button with a centred caption.
    pub fn button_create_text(&mut self, name: &str, text: &str, size: [f32; 2]) -> Result<ControlHandle> {
        let handle = self.button_create(name, size)?;
        let label = match self.label_create("", text) {
            Ok(label) => label,
            Err(err) => return abandon(self, handle, err),
        };
        if let Err(err) = adopt_owned(self, handle, label, false) {
            if let Err(cleanup) = self.destroy(label) {
                log::warn!("ui: could not remove orphaned caption {:?}: {}", label, cleanup);
            }
            return abandon(self, handle, err);
        }
        if let Some(button) = self.controls.buttons.get_mut(handle) {
            button.kind = ButtonKind::Text;
            button.label = Some(label);
        }
        centre_label(self, handle);
        Ok(handle)
    }

    pub fn button_set_text(&mut self, handle: ControlHandle, text: &str) -> Result<()> {
        self.expect_kind(handle, ControlKind::Button)?;
        let label = self
            .controls
            .buttons
            .get(handle)
            .and_then(|b| b.label)
            .ok_or_else(|| UiError::InvalidInput(format!("{:?} is not a text button", handle)))?;
        self.label_set_text(label, text)?;
        centre_label(self, handle);
        Ok(())
    }

    pub fn button_text(&self, handle: ControlHandle) -> Option<&str> {
        let label = self.controls.buttons.get(handle)?.label?;
        self.label_text(label)
    }

    pub fn button_label(&self, handle: ControlHandle) -> Option<ControlHandle> {
        self.controls.buttons.get(handle)?.label
    }

    pub fn button_skin(&self, handle: ControlHandle) -> Option<ButtonSkin> {
        self.controls.buttons.get(handle).map(|b| b.skin)
    }

    pub fn button_set_colour(&mut self, handle: ControlHandle, colour: [f32; 4]) -> Result<()> {
        self.expect_kind(handle, ControlKind::Button)?;
        if let Some(button) = self.controls.buttons.get_mut(handle) {
            button.colour = colour;
        }
        Ok(())
    }
}

fn centre_label(ui: &mut UiState, handle: ControlHandle) {
    let Some(button) = ui.controls.buttons.get(handle) else {
        return;
    };
    let (bounds, Some(label)) = (button.base.bounds, button.label) else {
        return;
    };
    let Some((text_w, text_h)) = ui.label_text_size(label) else {
        return;
    };
    let x = bounds.x + ((bounds.width - text_w) * 0.5).max(0.0);
    let y = bounds.y + ((bounds.height - text_h) * 0.5).max(0.0);
    if let Err(err) = ui.set_position(label, x, y) {
        log::warn!("ui: could not centre caption of {:?}: {}", handle, err);
    }
}

pub(crate) fn set_skin(ui: &mut UiState, handle: ControlHandle, skin: ButtonSkin) {
    let Some(button) = ui.controls.buttons.get(handle) else {
        return;
    };
    if button.skin == skin {
        return;
    }
    let bounds = button.base.bounds;
    let geometry = frame_geometry(ui, bounds.width, bounds.height, skin);
    if let Some(button) = ui.controls.buttons.get_mut(handle) {
        button.skin = skin;
        button.mesh.set_data(geometry);
    }
}

pub(crate) fn internal_mouse(ui: &mut UiState, handle: ControlHandle, kind: MouseEventKind, event: MouseEvent) -> bool {
    let pressed = ui.is_pressed(handle);
    match kind {
        MouseEventKind::Over | MouseEventKind::Up => {
            let skin = if pressed { ButtonSkin::Pressed } else { ButtonSkin::Hover };
            set_skin(ui, handle, skin);
        }
        MouseEventKind::Down => set_skin(ui, handle, ButtonSkin::Pressed),
        MouseEventKind::Out => set_skin(ui, handle, ButtonSkin::Normal),
        _ => {}
    }
    let owner = ui.base(handle).and_then(|b| b.owner);
    if kind == MouseEventKind::Click {
        if let Some(item) = owner.filter(|o| o.kind() == Some(ControlKind::TreeItem)) {
            tree_item::toggle(ui, item);
            return false;
        }
    }
    ui.fire_mouse_callback(handle, kind, event)
}

pub(crate) fn resize(ui: &mut UiState, handle: ControlHandle) {
    let Some(button) = ui.controls.buttons.get(handle) else {
        return;
    };
    let (bounds, skin) = (button.base.bounds, button.skin);
    let geometry = frame_geometry(ui, bounds.width, bounds.height, skin);
    if let Some(button) = ui.controls.buttons.get_mut(handle) {
        button.mesh.set_data(geometry);
    }
    centre_label(ui, handle);
}

pub(crate) fn render(ui: &mut UiState, handle: ControlHandle, list: &mut RenderList, clip: Option<u32>) -> bool {
    let Some(model) = visual_model(ui, handle) else {
        return false;
    };
    let shader = ui.config.ui_shader;
    let texture = ui.config.atlas.texture;
    let renderer = ui.services.renderer.clone();
    let Some(button) = ui.controls.buttons.get_mut(handle) else {
        return false;
    };
    if !button.mesh.prepare(&mut *renderer.borrow_mut(), shader) {
        return false;
    }
    if let Some(renderable) = button.mesh.renderable(model, Some(texture), button.colour, clip) {
        list.push(renderable);
    }
    true
}

pub(crate) fn destroy(ui: &mut UiState, handle: ControlHandle) {
    let shader = ui.config.ui_shader;
    let renderer = ui.services.renderer.clone();
    if let Some(button) = ui.controls.buttons.get_mut(handle) {
        button.mesh.release(&mut *renderer.borrow_mut(), shader);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UiConfig;
    use crate::input::{MouseButton, UiEvent};
    use crate::ui::state::UiServices;

    fn ui() -> UiState {
        let _ = env_logger::builder().is_test(true).try_init();
        let config = UiConfig::default();
        let services = UiServices::headless(&config);
        UiState::new(config, services, 800.0, 600.0).unwrap()
    }

    #[test]
    fn test_skin_follows_pointer() {
        let mut ui = ui();
        let button = ui.button_create("b", [100.0, 30.0]).unwrap();
        ui.handle_event(&UiEvent::MouseMoved { x: 10.0, y: 10.0 });
        assert_eq!(ui.button_skin(button), Some(ButtonSkin::Hover));
        ui.handle_event(&UiEvent::ButtonPressed {
            button: MouseButton::Left,
            x: 10.0,
            y: 10.0,
        });
        assert_eq!(ui.button_skin(button), Some(ButtonSkin::Pressed));
        ui.handle_event(&UiEvent::ButtonReleased {
            button: MouseButton::Left,
            x: 300.0,
            y: 300.0,
        });
        assert_eq!(ui.button_skin(button), Some(ButtonSkin::Normal));
        assert!(!ui.is_pressed(button));
    }

    #[test]
    fn test_caption_is_centred_then_left_aligned() {
        let mut ui = ui();
        // 16px font: 8px per glyph, "ok" is 16x16.
        let button = ui.button_create_text("b", "ok", [100.0, 30.0]).unwrap();
        let label = ui.button_label(button).unwrap();
        assert_eq!(ui.position(label), Some((42.0, 7.0)));
        assert!(!ui.base(label).unwrap().flags.mouse_interactive);

        ui.button_set_text(button, "a caption far too wide").unwrap();
        assert_eq!(ui.position(label), Some((0.0, 7.0)));
        assert_eq!(ui.button_text(button), Some("a caption far too wide"));
    }

    #[test]
    fn test_destroy_takes_caption() {
        let mut ui = ui();
        let button = ui.button_create_text("b", "ok", [100.0, 30.0]).unwrap();
        let label = ui.button_label(button).unwrap();
        ui.destroy(button).unwrap();
        assert!(!ui.is_valid(label));
        assert_eq!(ui.control_count(), 1);
    }
}
