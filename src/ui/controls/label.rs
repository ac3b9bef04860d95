//! # Label
//!
//! Text drawn with one quad per visible glyph. Geometry is regenerated on
//! render when the text changed. The buffer ranges are sized for the largest
//! quad count seen so far (the watermark) and only reallocated when the text
//! needs more quads than that; shorter text reuses them.
//!
//! System fonts rasterise glyphs on demand, so the label asks the font system
//! to verify its atlas before generating geometry. Until verification
//! succeeds the label stays dirty and draws nothing.

use log::warn;

use crate::error::{Result, UiError};
use crate::gfx::font::{FontHandle, FontKind, GlyphGeometry};
use crate::gfx::geometry::GeometryData;
use crate::gfx::renderer::pass::UI_INSTANCE_SET;
use crate::gfx::renderer::{GeometryRange, RenderList, Renderable, UiRenderable};
use crate::gfx::vertex::{Vertex2D, INDEX_SIZE};

use super::visual_model;
use crate::ui::callbacks::{MouseEvent, MouseEventKind};
use crate::ui::control::{BaseControl, Rect};
use crate::ui::handle::{ControlHandle, ControlKind};
use crate::ui::state::UiState;

const VERTICES_PER_QUAD: u64 = 4;
const INDICES_PER_QUAD: u64 = 6;

pub struct Label {
    pub base: BaseControl,
    pub font: FontHandle,
    pub text: String,
    pub colour: [f32; 4],
    /// Quads drawn last time geometry was generated (0 disables drawing).
    pub quad_count: u32,
    /// Largest quad count the current ranges can hold.
    pub max_quads: u32,
    pub range: Option<GeometryRange>,
    pub binding_id: Option<u32>,
    pub dirty: bool,
    /// The font system confirmed the atlas holds the current text.
    pub atlas_verified: bool,
}

impl UiState {
    /// Label using the configured default font.
    pub fn label_create(&mut self, name: &str, text: &str) -> Result<ControlHandle> {
        let name_owned = self.config.default_font_name.clone();
        let size = self.config.default_font_size;
        let kind = self.config.default_font_kind;
        self.label_create_with_font(name, text, kind, &name_owned, size)
    }

    /// Label using a specific font. `size` only applies to system fonts.
    pub fn label_create_with_font(
        &mut self,
        name: &str,
        text: &str,
        font_kind: FontKind,
        font_name: &str,
        size: u16,
    ) -> Result<ControlHandle> {
        let font = {
            let mut fonts = self.services.fonts.borrow_mut();
            match font_kind {
                FontKind::Bitmap => fonts.acquire_bitmap(font_name),
                FontKind::System => fonts.acquire_system(font_name, size),
            }
        };
        let Some(font) = font else {
            warn!("ui: could not acquire font '{}' for label '{}'", font_name, name);
            return Err(UiError::ResourceAcquisition(format!("font '{}'", font_name)));
        };
        let (width, height) = self.services.fonts.borrow().measure(font, text);

        let mut base = self.new_base(ControlKind::Label, name);
        base.bounds = Rect::sized(width, height);
        let transform = base.transform;
        let colour = self.config.text_colour;
        let inserted = self.controls.labels.insert_with(|handle| {
            base.handle = handle;
            Label {
                base,
                font,
                text: text.to_string(),
                colour,
                quad_count: 0,
                max_quads: 0,
                range: None,
                binding_id: None,
                dirty: true,
                atlas_verified: false,
            }
        });
        if inserted.is_none() {
            self.services.fonts.borrow_mut().release(font);
        }
        self.finish_create(inserted, ControlKind::Label, transform)
    }

    /// Replaces the text; geometry is rebuilt on the next render.
    pub fn label_set_text(&mut self, handle: ControlHandle, text: &str) -> Result<()> {
        self.expect_kind(handle, ControlKind::Label)?;
        let font = self.controls.labels.get(handle).map(|l| l.font).ok_or(UiError::InvalidHandle(handle))?;
        let (width, height) = self.services.fonts.borrow().measure(font, text);
        let label = self.controls.labels.get_mut(handle).ok_or(UiError::InvalidHandle(handle))?;
        if label.text != text {
            label.text = text.to_string();
            label.dirty = true;
            label.atlas_verified = false;
        }
        label.base.bounds.width = width;
        label.base.bounds.height = height;
        Ok(())
    }

    pub fn label_text(&self, handle: ControlHandle) -> Option<&str> {
        self.controls.labels.get(handle).map(|l| l.text.as_str())
    }

    pub fn label_set_colour(&mut self, handle: ControlHandle, colour: [f32; 4]) -> Result<()> {
        self.expect_kind(handle, ControlKind::Label)?;
        if let Some(label) = self.controls.labels.get_mut(handle) {
            label.colour = colour;
        }
        Ok(())
    }

    pub fn label_font(&self, handle: ControlHandle) -> Option<FontHandle> {
        self.controls.labels.get(handle).map(|l| l.font)
    }

    pub fn label_quad_count(&self, handle: ControlHandle) -> Option<u32> {
        self.controls.labels.get(handle).map(|l| l.quad_count)
    }

    /// Quad capacity of the label's buffer ranges.
    pub fn label_max_quads(&self, handle: ControlHandle) -> Option<u32> {
        self.controls.labels.get(handle).map(|l| l.max_quads)
    }

    /// Pixel size of the label's text.
    pub fn label_text_size(&self, handle: ControlHandle) -> Option<(f32, f32)> {
        let label = self.controls.labels.get(handle)?;
        Some(self.services.fonts.borrow().measure(label.font, &label.text))
    }
}

/// A tree item's label forwards clicks to the tree item's own click callback.
pub(crate) fn internal_mouse(ui: &mut UiState, handle: ControlHandle, kind: MouseEventKind, event: MouseEvent) -> bool {
    let owner = ui.base(handle).and_then(|b| b.owner);
    match owner {
        Some(item) if kind == MouseEventKind::Click && item.kind() == Some(ControlKind::TreeItem) => {
            ui.fire_mouse_callback(item, MouseEventKind::Click, event);
            false
        }
        _ => ui.fire_mouse_callback(handle, kind, event),
    }
}

/// Verifies the system-font atlas ahead of rendering.
pub(crate) fn update(ui: &mut UiState, handle: ControlHandle) -> bool {
    let Some(label) = ui.controls.labels.get(handle) else {
        return false;
    };
    if !label.dirty || label.atlas_verified || label.font.kind != FontKind::System {
        return true;
    }
    let (font, text) = (label.font, label.text.clone());
    let verified = ui.services.fonts.borrow_mut().verify_atlas(font, &text);
    if let Some(label) = ui.controls.labels.get_mut(handle) {
        label.atlas_verified = verified;
    }
    verified
}

/// Regenerates geometry if dirty. Resource failures disable drawing and leave
/// the label dirty so the next frame retries.
fn rebuild(ui: &mut UiState, handle: ControlHandle) -> bool {
    let Some(label) = ui.controls.labels.get(handle) else {
        return false;
    };
    let (font, text) = (label.font, label.text.clone());
    let needs_verify = font.kind == FontKind::System && !label.atlas_verified;
    let fonts = ui.services.fonts.clone();
    let renderer = ui.services.renderer.clone();
    let shader = ui.config.ui_shader;
    let Some(label) = ui.controls.labels.get_mut(handle) else {
        return false;
    };

    if needs_verify {
        if !fonts.borrow_mut().verify_atlas(font, &text) {
            warn!("ui: atlas verification failed for label {:?}", handle);
            label.quad_count = 0;
            return false;
        }
        label.atlas_verified = true;
    }

    let mut glyphs = GlyphGeometry::default();
    if !fonts.borrow_mut().generate_geometry(font, &text, &mut glyphs) {
        warn!("ui: glyph generation failed for label {:?}", handle);
        label.quad_count = 0;
        return false;
    }

    let mut backend = renderer.borrow_mut();
    if label.binding_id.is_none() {
        label.binding_id = backend.shader_acquire_binding_set_instance(shader, UI_INSTANCE_SET);
        if label.binding_id.is_none() {
            warn!("ui: no binding set instance for label {:?}", handle);
            label.quad_count = 0;
            return false;
        }
    }

    if glyphs.quad_count == 0 {
        label.quad_count = 0;
        label.dirty = false;
        return true;
    }

    if label.range.is_none() || glyphs.quad_count > label.max_quads {
        if let Some(old) = label.range.take() {
            old.free(&mut *backend);
        }
        let quads = u64::from(glyphs.quad_count);
        match GeometryRange::allocate(
            &mut *backend,
            quads * VERTICES_PER_QUAD * Vertex2D::SIZE,
            quads * INDICES_PER_QUAD * INDEX_SIZE,
        ) {
            Some(range) => {
                label.range = Some(range);
                label.max_quads = glyphs.quad_count;
            }
            None => {
                warn!("ui: could not allocate geometry for {} glyphs", glyphs.quad_count);
                label.max_quads = 0;
                label.quad_count = 0;
                return false;
            }
        }
    }

    let data = GeometryData {
        vertices: glyphs.vertices,
        indices: glyphs.indices,
    };
    let Some(range) = label.range.as_mut() else {
        return false;
    };
    if !data.load_into(&mut *backend, range) {
        warn!("ui: glyph upload failed for label {:?}", handle);
        label.quad_count = 0;
        return false;
    }
    label.quad_count = glyphs.quad_count;
    label.dirty = false;
    true
}

pub(crate) fn render(ui: &mut UiState, handle: ControlHandle, list: &mut RenderList, clip: Option<u32>) -> bool {
    let dirty = ui.controls.labels.get(handle).is_some_and(|l| l.dirty);
    let ok = !dirty || rebuild(ui, handle);
    let Some(model) = visual_model(ui, handle) else {
        return false;
    };
    let Some(label) = ui.controls.labels.get(handle) else {
        return false;
    };
    if label.quad_count == 0 {
        return ok;
    }
    let Some(geometry) = label.range else {
        return ok;
    };
    let texture = ui.services.fonts.borrow().atlas(label.font);
    list.push(Renderable::Ui(UiRenderable {
        model,
        geometry,
        binding_id: label.binding_id,
        texture,
        colour: label.colour,
        clip_reference: clip,
    }));
    ok
}

pub(crate) fn destroy(ui: &mut UiState, handle: ControlHandle) {
    let shader = ui.config.ui_shader;
    let renderer = ui.services.renderer.clone();
    let Some(label) = ui.controls.labels.get_mut(handle) else {
        return;
    };
    {
        let mut backend = renderer.borrow_mut();
        if let Some(range) = label.range.take() {
            range.free(&mut *backend);
        }
        if let Some(id) = label.binding_id.take() {
            backend.shader_release_binding_set_instance(shader, UI_INSTANCE_SET, id);
        }
    }
    let font = label.font;
    super::release_font(ui, font);
}

#[cfg(test)]
mod tests {
    use crate::config::UiConfig;
    use crate::gfx::renderer::{HeadlessRenderer, RenderBuffer, RenderList};
    use crate::ui::state::{UiServices, UiState};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ui_with(renderer: HeadlessRenderer) -> (UiState, Rc<RefCell<HeadlessRenderer>>) {
        let _ = env_logger::builder().is_test(true).try_init();
        let config = UiConfig::default();
        let mut services = UiServices::headless(&config);
        let renderer = Rc::new(RefCell::new(renderer));
        services.renderer = renderer.clone();
        (UiState::new(config, services, 800.0, 600.0).unwrap(), renderer)
    }

    #[test]
    fn test_watermark_only_grows() {
        let (mut ui, renderer) = ui_with(HeadlessRenderer::new());
        let label = ui.label_create("l", "hello").unwrap();
        let mut list = RenderList::new();
        assert!(ui.render(&mut list));
        assert_eq!(ui.label_quad_count(label), Some(5));
        assert_eq!(ui.label_max_quads(label), Some(5));
        let bytes_after_first = renderer.borrow().live_bytes(RenderBuffer::Vertex);

        ui.label_set_text(label, "hi").unwrap();
        list.clear();
        ui.render(&mut list);
        assert_eq!(ui.label_quad_count(label), Some(2));
        assert_eq!(ui.label_max_quads(label), Some(5));
        assert_eq!(renderer.borrow().live_bytes(RenderBuffer::Vertex), bytes_after_first);

        ui.label_set_text(label, "hello world").unwrap();
        list.clear();
        ui.render(&mut list);
        assert_eq!(ui.label_quad_count(label), Some(10));
        assert_eq!(ui.label_max_quads(label), Some(10));
    }

    #[test]
    fn test_allocation_failure_disables_drawing() {
        let (mut ui, _renderer) = ui_with(HeadlessRenderer::new().with_buffer_capacity(RenderBuffer::Vertex, 64));
        let label = ui.label_create("l", "too long for the pool").unwrap();
        let mut list = RenderList::new();
        assert!(!ui.render(&mut list));
        assert_eq!(ui.label_quad_count(label), Some(0));
        assert_eq!(list.ui_entries().count(), 0);
    }

    #[test]
    fn test_destroy_returns_ranges() {
        let (mut ui, renderer) = ui_with(HeadlessRenderer::new());
        let label = ui.label_create("l", "abc").unwrap();
        let mut list = RenderList::new();
        ui.render(&mut list);
        assert!(renderer.borrow().live_allocations(RenderBuffer::Vertex) > 0);
        ui.destroy(label).unwrap();
        assert_eq!(renderer.borrow().live_allocations(RenderBuffer::Vertex), 0);
        assert_eq!(renderer.borrow().live_binding_instances(), 0);
    }
}
