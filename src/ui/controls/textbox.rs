//! # Textbox
//!
//! Single-line text entry built from owned parts: a highlight panel, the
//! content label and a cursor panel, all clipped by the textbox's mask over
//! its padded interior. Editing itself is [`TextEditState`]; this module
//! keeps the parts in sync with it.
//!
//! ## View offset
//!
//! `view_offset >= 0` is how far the content is scrolled left. The content
//! label sits at `padding - view_offset`; the offset changes only as much as
//! needed to keep the cursor inside the clip rect.

use log::{debug, warn};

use crate::error::{Result, UiError};
use crate::gfx::geometry::{generate_nine_slice, GeometryData, NineSliceRegion};
use crate::gfx::renderer::RenderList;
use crate::gfx::vertex::Vertex2D;
use crate::input::ClipboardContent;

use super::{abandon, adopt_owned, visual_model, ControlMesh};
use crate::ui::callbacks::KeyEvent;
use crate::ui::control::{BaseControl, ClipMask, Rect};
use crate::ui::handle::{ControlHandle, ControlKind};
use crate::ui::state::UiState;
use crate::ui::text_edit::{EditOutcome, HighlightRange, InputKind, TextEditState};

pub struct Textbox {
    pub base: BaseControl,
    pub edit: TextEditState,
    pub colour: [f32; 4],
    pub normal: ControlMesh,
    pub focused: ControlMesh,
    pub view_offset: f32,
    pub line_height: f32,
    pub content_label: ControlHandle,
    pub cursor: ControlHandle,
    pub highlight: ControlHandle,
}

fn frame(ui: &UiState, width: f32, height: f32, region: &NineSliceRegion) -> GeometryData<Vertex2D> {
    let atlas = &ui.config.atlas;
    generate_nine_slice(width, height, atlas.corner_size, atlas.size, region)
}

fn clip_rect(ui: &UiState, bounds: Rect) -> Rect {
    let padding = ui.config.textbox_padding;
    Rect::new(
        bounds.x + padding,
        bounds.y,
        (bounds.width - 2.0 * padding).max(0.0),
        bounds.height,
    )
}

impl UiState {
    /// Creates an empty, focusable textbox of `size` pixels.
    pub fn textbox_create(&mut self, name: &str, kind: InputKind, size: [f32; 2]) -> Result<ControlHandle> {
        if size[0] < 0.0 || size[1] < 0.0 {
            return Err(UiError::InvalidInput(format!("negative textbox size {:?}", size)));
        }
        let mut base = self.new_base(ControlKind::Textbox, name);
        base.bounds = Rect::sized(size[0], size[1]);
        base.flags.focusable = true;
        base.clip_mask = Some(ClipMask::new(clip_rect(self, base.bounds)));
        let transform = base.transform;
        let normal = ControlMesh::new(frame(self, size[0], size[1], &self.config.atlas.textbox_normal));
        let focused = ControlMesh::new(frame(self, size[0], size[1], &self.config.atlas.textbox_focused));
        let line_height = self.services.fonts.borrow().line_height(self.default_font);
        let inserted = self.controls.textboxes.insert_with(|handle| {
            base.handle = handle;
            Textbox {
                base,
                edit: TextEditState::new(kind),
                colour: [1.0, 1.0, 1.0, 1.0],
                normal,
                focused,
                view_offset: 0.0,
                line_height,
                content_label: ControlHandle::INVALID,
                cursor: ControlHandle::INVALID,
                highlight: ControlHandle::INVALID,
            }
        });
        let handle = self.finish_create(inserted, ControlKind::Textbox, transform)?;
        if let Err(err) = build_parts(self, handle, line_height) {
            return abandon(self, handle, err);
        }
        sync(self, handle);
        Ok(handle)
    }

    pub fn textbox_text(&self, handle: ControlHandle) -> Option<&str> {
        self.controls.textboxes.get(handle).map(|t| t.edit.text())
    }

    /// Replaces the text. Int/float boxes clear themselves on unparseable input.
    pub fn textbox_set_text(&mut self, handle: ControlHandle, text: &str) -> Result<()> {
        self.expect_kind(handle, ControlKind::Textbox)?;
        if let Some(textbox) = self.controls.textboxes.get_mut(handle) {
            textbox.edit.set_text(text);
        }
        sync(self, handle);
        Ok(())
    }

    pub fn textbox_kind(&self, handle: ControlHandle) -> Option<InputKind> {
        self.controls.textboxes.get(handle).map(|t| t.edit.kind())
    }

    pub fn textbox_cursor(&self, handle: ControlHandle) -> Option<usize> {
        self.controls.textboxes.get(handle).map(|t| t.edit.cursor())
    }

    pub fn textbox_highlight(&self, handle: ControlHandle) -> Option<HighlightRange> {
        self.controls.textboxes.get(handle).map(|t| t.edit.highlight())
    }

    pub fn textbox_view_offset(&self, handle: ControlHandle) -> Option<f32> {
        self.controls.textboxes.get(handle).map(|t| t.view_offset)
    }

    /// Handles of the content label, cursor and highlight parts.
    pub fn textbox_parts(&self, handle: ControlHandle) -> Option<(ControlHandle, ControlHandle, ControlHandle)> {
        let textbox = self.controls.textboxes.get(handle)?;
        Some((textbox.content_label, textbox.cursor, textbox.highlight))
    }
}

/// Highlight first so the text and cursor draw over it.
fn build_parts(ui: &mut UiState, handle: ControlHandle, line_height: f32) -> Result<()> {
    let cursor_width = ui.config.cursor_width;
    let highlight_colour = ui.config.highlight_colour;
    let cursor_colour = ui.config.cursor_colour;

    let highlight = ui.panel_create("", [0.0, line_height], highlight_colour)?;
    adopt_owned(ui, handle, highlight, false)?;
    ui.set_visible(highlight, false)?;

    let label = ui.label_create("", "")?;
    adopt_owned(ui, handle, label, false)?;

    let cursor = ui.panel_create("", [cursor_width, line_height], cursor_colour)?;
    adopt_owned(ui, handle, cursor, false)?;
    ui.set_visible(cursor, false)?;

    let textbox = ui
        .controls
        .textboxes
        .get_mut(handle)
        .ok_or(UiError::InvalidHandle(handle))?;
    textbox.highlight = highlight;
    textbox.content_label = label;
    textbox.cursor = cursor;
    Ok(())
}

/// Brings the parts and the view offset in line with the edit state.
fn sync(ui: &mut UiState, handle: ControlHandle) {
    let focused = ui.focused == Some(handle);
    let Some(textbox) = ui.controls.textboxes.get(handle) else {
        return;
    };
    let font = ui.default_font;
    let bounds = textbox.base.bounds;
    let padding = ui.config.textbox_padding;
    let inner = clip_rect(ui, bounds);
    let cursor_width = ui.config.cursor_width;
    let line_height = textbox.line_height;
    let (label, cursor, highlight) = (textbox.content_label, textbox.cursor, textbox.highlight);

    let (text_width, cursor_px, span_px) = {
        let fonts = ui.services.fonts.borrow();
        let edit = &textbox.edit;
        let measure = |chars: usize| fonts.measure(font, edit.prefix(chars)).0;
        let (start, end) = edit.highlight().span();
        (
            measure(edit.len()),
            measure(edit.cursor()),
            (measure(start), measure(end)),
        )
    };
    let text = textbox.edit.text().to_string();
    let has_selection = !textbox.edit.highlight().is_empty();

    let visible_width = (inner.width - cursor_width).max(0.0);
    let mut view_offset = textbox.view_offset;
    if cursor_px - view_offset > visible_width {
        view_offset = cursor_px - visible_width;
    }
    if cursor_px - view_offset < 0.0 {
        view_offset = cursor_px;
    }
    // Do not leave empty space on the right once the text shrinks.
    view_offset = view_offset.min((text_width - visible_width).max(0.0)).max(0.0);
    if let Some(textbox) = ui.controls.textboxes.get_mut(handle) {
        textbox.view_offset = view_offset;
    }

    let origin_x = bounds.x + padding - view_offset;
    let y = bounds.y + ((bounds.height - line_height) * 0.5).max(0.0);
    let results = [
        ui.label_set_text(label, &text),
        ui.set_position(label, origin_x, y),
        ui.set_position(cursor, origin_x + cursor_px, y),
        ui.set_visible(cursor, focused),
        ui.set_position(highlight, origin_x + span_px.0, y),
        ui.set_bounds(highlight, Rect::sized(span_px.1 - span_px.0, line_height)),
        ui.set_visible(highlight, focused && has_selection),
    ];
    for result in results {
        if let Err(err) = result {
            warn!("ui: textbox {:?} part update failed: {}", handle, err);
        }
    }
}

pub(crate) fn internal_key(ui: &mut UiState, handle: ControlHandle, event: KeyEvent) -> bool {
    if event.pressed {
        let super_as_control = ui.config.super_acts_as_control;
        let outcome = match ui.controls.textboxes.get_mut(handle) {
            Some(textbox) => textbox.edit.handle_key(event.key, event.modifiers, super_as_control),
            None => return true,
        };
        match outcome {
            EditOutcome::Ignored => {}
            EditOutcome::Changed | EditOutcome::Moved => sync(ui, handle),
            EditOutcome::Copy(text) => ui.services.clipboard.borrow_mut().write(&text),
            EditOutcome::Cut(text) => {
                ui.services.clipboard.borrow_mut().write(&text);
                sync(ui, handle);
            }
            EditOutcome::PasteRequested => {
                if ui.services.clipboard.borrow_mut().request() {
                    ui.pending_paste = Some(handle);
                } else {
                    debug!("ui: clipboard request refused for {:?}", handle);
                }
            }
        }
    }
    ui.fire_key_callback(handle, event)
}

/// Applies clipboard content answering an earlier paste request.
pub(crate) fn apply_paste(ui: &mut UiState, handle: ControlHandle, content: &ClipboardContent) -> bool {
    let Some(text) = content.as_text() else {
        debug!("ui: ignoring non-text clipboard content");
        return false;
    };
    let Some(textbox) = ui.controls.textboxes.get_mut(handle) else {
        return false;
    };
    if !textbox.edit.paste(text) {
        debug!("ui: paste of {} bytes rejected by {:?}", content.len(), handle);
        return false;
    }
    sync(ui, handle);
    true
}

pub(crate) fn focus_changed(ui: &mut UiState, handle: ControlHandle, gained: bool) {
    if let Some(textbox) = ui.controls.textboxes.get_mut(handle) {
        if gained {
            textbox.edit.select_all();
        } else {
            textbox.edit.select_none();
        }
    }
    sync(ui, handle);
}

pub(crate) fn resize(ui: &mut UiState, handle: ControlHandle) {
    let Some(textbox) = ui.controls.textboxes.get(handle) else {
        return;
    };
    let bounds = textbox.base.bounds;
    let normal = frame(ui, bounds.width, bounds.height, &ui.config.atlas.textbox_normal);
    let focused = frame(ui, bounds.width, bounds.height, &ui.config.atlas.textbox_focused);
    let rect = clip_rect(ui, bounds);
    if let Some(textbox) = ui.controls.textboxes.get_mut(handle) {
        textbox.normal.set_data(normal);
        textbox.focused.set_data(focused);
        if let Some(mask) = textbox.base.clip_mask.as_mut() {
            mask.rect = rect;
            mask.dirty = true;
        }
    }
    sync(ui, handle);
}

pub(crate) fn render(ui: &mut UiState, handle: ControlHandle, list: &mut RenderList, clip: Option<u32>) -> bool {
    let Some(model) = visual_model(ui, handle) else {
        return false;
    };
    let focused = ui.focused == Some(handle);
    let shader = ui.config.ui_shader;
    let texture = ui.config.atlas.texture;
    let renderer = ui.services.renderer.clone();
    let Some(textbox) = ui.controls.textboxes.get_mut(handle) else {
        return false;
    };
    let colour = textbox.colour;
    let mesh = if focused { &mut textbox.focused } else { &mut textbox.normal };
    if !mesh.prepare(&mut *renderer.borrow_mut(), shader) {
        return false;
    }
    if let Some(renderable) = mesh.renderable(model, Some(texture), colour, clip) {
        list.push(renderable);
    }
    true
}

pub(crate) fn destroy(ui: &mut UiState, handle: ControlHandle) {
    let shader = ui.config.ui_shader;
    let renderer = ui.services.renderer.clone();
    if let Some(textbox) = ui.controls.textboxes.get_mut(handle) {
        let mut backend = renderer.borrow_mut();
        textbox.normal.release(&mut *backend, shader);
        textbox.focused.release(&mut *backend, shader);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UiConfig;
    use crate::input::{KeyCode, Modifiers, MouseButton, UiEvent};
    use crate::ui::state::UiServices;

    fn ui() -> UiState {
        let _ = env_logger::builder().is_test(true).try_init();
        let config = UiConfig::default();
        let services = UiServices::headless(&config);
        UiState::new(config, services, 800.0, 600.0).unwrap()
    }

    fn type_text(ui: &mut UiState, text: &str) {
        for c in text.chars() {
            let key = KeyCode::from_letter(c).or_else(|| c.to_digit(10).and_then(KeyCode::from_digit));
            let key = key.unwrap_or(KeyCode::Space);
            ui.handle_event(&UiEvent::KeyPressed {
                key,
                modifiers: Modifiers::NONE,
            });
        }
    }

    #[test]
    fn test_view_offset_keeps_cursor_visible() {
        let mut ui = ui();
        // Inner width 40 - 2*4 = 32, minus a 2px cursor: 30px of text (3 glyphs + change).
        let t = ui.textbox_create("t", InputKind::String, [40.0, 24.0]).unwrap();
        ui.set_focus(Some(t));
        type_text(&mut ui, "abcdef");
        // Cursor at 48px; 48 - 30 = 18.
        assert_eq!(ui.textbox_view_offset(t), Some(18.0));
        let (label, cursor, _) = ui.textbox_parts(t).unwrap();
        assert_eq!(ui.position(label).unwrap().0, 4.0 - 18.0);
        assert_eq!(ui.position(cursor).unwrap().0, 4.0 + 48.0 - 18.0);

        ui.handle_event(&UiEvent::KeyPressed {
            key: KeyCode::Home,
            modifiers: Modifiers::NONE,
        });
        assert_eq!(ui.textbox_view_offset(t), Some(0.0));
        assert_eq!(ui.label_text(label), Some("abcdef"));
    }

    #[test]
    fn test_focus_selects_all_and_unfocus_clears() {
        let mut ui = ui();
        let t = ui.textbox_create("t", InputKind::String, [200.0, 24.0]).unwrap();
        ui.textbox_set_text(t, "hello").unwrap();
        ui.handle_event(&UiEvent::ButtonClicked {
            button: MouseButton::Left,
            x: 10.0,
            y: 10.0,
        });
        assert_eq!(ui.focused(), Some(t));
        assert_eq!(ui.textbox_highlight(t).unwrap().span(), (0, 5));
        let (_, cursor, highlight) = ui.textbox_parts(t).unwrap();
        assert!(ui.is_visible(cursor));
        assert!(ui.is_visible(highlight));

        ui.handle_event(&UiEvent::ButtonClicked {
            button: MouseButton::Left,
            x: 500.0,
            y: 500.0,
        });
        assert_eq!(ui.focused(), None);
        assert!(ui.textbox_highlight(t).unwrap().is_empty());
        assert!(!ui.is_visible(cursor));
    }

    #[test]
    fn test_copy_and_cut_reach_clipboard() {
        let config = UiConfig::default();
        let mut services = UiServices::headless(&config);
        let clipboard = std::rc::Rc::new(std::cell::RefCell::new(crate::input::MemoryClipboard::new()));
        services.clipboard = clipboard.clone();
        let mut ui = UiState::new(config, services, 800.0, 600.0).unwrap();
        let t = ui.textbox_create("t", InputKind::String, [200.0, 24.0]).unwrap();
        ui.textbox_set_text(t, "snip").unwrap();
        ui.set_focus(Some(t));
        ui.handle_event(&UiEvent::KeyPressed {
            key: KeyCode::X,
            modifiers: Modifiers::CONTROL,
        });
        assert_eq!(clipboard.borrow().contents(), "snip");
        assert_eq!(ui.textbox_text(t), Some(""));
    }

    #[test]
    fn test_parts_are_owned_and_inert() {
        let mut ui = ui();
        let t = ui.textbox_create("t", InputKind::Float, [100.0, 24.0]).unwrap();
        let (label, cursor, highlight) = ui.textbox_parts(t).unwrap();
        assert_eq!(ui.children(t), &[highlight, label, cursor]);
        for part in [label, cursor, highlight] {
            assert!(ui.base(part).unwrap().is_owned_by(t));
            assert!(!ui.base(part).unwrap().flags.mouse_interactive);
        }
        ui.destroy(t).unwrap();
        assert_eq!(ui.control_count(), 1);
    }
}
