//! # Checkbox
//!
//! An image box showing one of four atlas states next to a caption label.
//! The state is always derived from the checked bit and whether the
//! checkbox is effectively active:
//!
//! | active | checked | state               |
//! |--------|---------|---------------------|
//! | yes    | no      | `EnabledUnchecked`  |
//! | yes    | yes     | `EnabledChecked`    |
//! | no     | no      | `DisabledUnchecked` |
//! | no     | yes     | `DisabledChecked`   |

use log::warn;

use crate::error::{Result, UiError};
use crate::gfx::geometry::AtlasRegion;

use super::{abandon, adopt_owned};
use crate::ui::callbacks::{CheckedCallback, MouseEvent, MouseEventKind};
use crate::ui::control::{BaseControl, Rect};
use crate::ui::handle::{ControlHandle, ControlKind};
use crate::ui::state::UiState;

/// Gap between the box and the caption, in pixels.
const CAPTION_GAP: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckboxState {
    EnabledUnchecked,
    EnabledChecked,
    DisabledUnchecked,
    DisabledChecked,
}

impl CheckboxState {
    pub fn from_flags(active: bool, checked: bool) -> Self {
        match (active, checked) {
            (true, false) => CheckboxState::EnabledUnchecked,
            (true, true) => CheckboxState::EnabledChecked,
            (false, false) => CheckboxState::DisabledUnchecked,
            (false, true) => CheckboxState::DisabledChecked,
        }
    }

    pub fn is_checked(self) -> bool {
        matches!(self, CheckboxState::EnabledChecked | CheckboxState::DisabledChecked)
    }

    /// Index into the atlas layout's checkbox regions.
    pub fn index(self) -> usize {
        self as usize
    }
}

pub struct Checkbox {
    pub base: BaseControl,
    pub checked: bool,
    pub state: CheckboxState,
    pub image: ControlHandle,
    pub label: ControlHandle,
    pub on_checked_changed: Option<CheckedCallback>,
}

impl UiState {
    /// Unchecked checkbox with a caption.
    pub fn checkbox_create(&mut self, name: &str, text: &str) -> Result<ControlHandle> {
        let mut base = self.new_base(ControlKind::Checkbox, name);
        let transform = base.transform;
        base.bounds = Rect::sized(0.0, 0.0);
        let inserted = self.controls.checkboxes.insert_with(|handle| {
            base.handle = handle;
            Checkbox {
                base,
                checked: false,
                state: CheckboxState::EnabledUnchecked,
                image: ControlHandle::INVALID,
                label: ControlHandle::INVALID,
                on_checked_changed: None,
            }
        });
        let handle = self.finish_create(inserted, ControlKind::Checkbox, transform)?;
        if let Err(err) = build_parts(self, handle, text) {
            return abandon(self, handle, err);
        }
        refresh_state(self, handle);
        Ok(handle)
    }

    pub fn checkbox_is_checked(&self, handle: ControlHandle) -> Option<bool> {
        self.controls.checkboxes.get(handle).map(|c| c.checked)
    }

    pub fn checkbox_state(&self, handle: ControlHandle) -> Option<CheckboxState> {
        self.controls.checkboxes.get(handle).map(|c| c.state)
    }

    /// Sets the checked bit without firing `on_checked_changed`.
    pub fn checkbox_set_checked(&mut self, handle: ControlHandle, checked: bool) -> Result<()> {
        self.expect_kind(handle, ControlKind::Checkbox)?;
        if let Some(checkbox) = self.controls.checkboxes.get_mut(handle) {
            checkbox.checked = checked;
        }
        refresh_state(self, handle);
        Ok(())
    }

    pub fn checkbox_image(&self, handle: ControlHandle) -> Option<ControlHandle> {
        self.controls.checkboxes.get(handle).map(|c| c.image)
    }

    pub fn set_on_checked_changed(
        &mut self,
        handle: ControlHandle,
        callback: impl FnMut(&mut UiState, ControlHandle, bool) + 'static,
    ) -> bool {
        match self.controls.checkboxes.get_mut(handle) {
            Some(checkbox) => {
                checkbox.on_checked_changed = Some(Box::new(callback));
                true
            }
            None => false,
        }
    }
}

fn build_parts(ui: &mut UiState, handle: ControlHandle, text: &str) -> Result<()> {
    let box_size = ui.services.fonts.borrow().line_height(ui.default_font);
    let texture = ui.config.atlas.texture;
    let region = ui.config.atlas.checkbox[CheckboxState::EnabledUnchecked.index()];

    let image = ui.image_box_create("", texture, region, [box_size, box_size])?;
    adopt_owned(ui, handle, image, false)?;
    let label = ui.label_create("", text)?;
    adopt_owned(ui, handle, label, false)?;
    ui.set_position(label, box_size + CAPTION_GAP, 0.0)?;

    let (text_w, text_h) = ui.label_text_size(label).unwrap_or((0.0, 0.0));
    let checkbox = ui
        .controls
        .checkboxes
        .get_mut(handle)
        .ok_or(UiError::InvalidHandle(handle))?;
    checkbox.image = image;
    checkbox.label = label;
    checkbox.base.bounds = Rect::sized(box_size + CAPTION_GAP + text_w, box_size.max(text_h));
    Ok(())
}

/// Recomputes the state from the checked bit and effective activity.
/// Applying it repeatedly does not change the result.
pub(crate) fn refresh_state(ui: &mut UiState, handle: ControlHandle) {
    let active = ui.is_effectively_active(handle);
    let Some(checkbox) = ui.controls.checkboxes.get_mut(handle) else {
        return;
    };
    checkbox.state = CheckboxState::from_flags(active, checkbox.checked);
    let (image, state) = (checkbox.image, checkbox.state);
    let region: AtlasRegion = ui.config.atlas.checkbox[state.index()];
    if ui.is_valid(image) {
        if let Err(err) = ui.image_box_set_region(image, region) {
            warn!("ui: checkbox {:?} could not update its image: {}", handle, err);
        }
    }
}

fn fire_checked_changed(ui: &mut UiState, handle: ControlHandle, checked: bool) {
    let Some(mut callback) = ui
        .controls
        .checkboxes
        .get_mut(handle)
        .and_then(|c| c.on_checked_changed.take())
    else {
        return;
    };
    callback(ui, handle, checked);
    if let Some(checkbox) = ui.controls.checkboxes.get_mut(handle) {
        if checkbox.on_checked_changed.is_none() {
            checkbox.on_checked_changed = Some(callback);
        }
    }
}

pub(crate) fn internal_mouse(ui: &mut UiState, handle: ControlHandle, kind: MouseEventKind, event: MouseEvent) -> bool {
    if kind == MouseEventKind::Click && ui.is_effectively_active(handle) {
        let checked = match ui.controls.checkboxes.get_mut(handle) {
            Some(checkbox) => {
                checkbox.checked = !checkbox.checked;
                checkbox.checked
            }
            None => return true,
        };
        refresh_state(ui, handle);
        fire_checked_changed(ui, handle, checked);
    }
    ui.fire_mouse_callback(handle, kind, event)
}
