//! # UI State Container
//!
//! [`UiState`] owns every control, the active/inactive lists, the name
//! lookup and the focus, and holds shared references to the services it
//! paints and positions with (transforms, fonts, renderer, clipboard).
//!
//! ## Usage
//!
//! ```rust
//! use haggis_ui::config::UiConfig;
//! use haggis_ui::ui::{UiServices, UiState};
//!
//! let config = UiConfig::default();
//! let services = UiServices::headless(&config);
//! let mut ui = UiState::new(config, services, 800.0, 600.0).unwrap();
//!
//! let panel = ui.panel_create("background", [200.0, 100.0], [0.1, 0.1, 0.1, 1.0]).unwrap();
//! assert_eq!(ui.find_by_name("background"), Some(panel));
//! ```

use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use cgmath::{Matrix4, Vector3};
use log::{debug, info, trace, warn};

use crate::config::UiConfig;
use crate::error::{Result, UiError};
use crate::gfx::font::{FixedWidthFont, FontHandle, FontKind, FontSystem};
use crate::gfx::renderer::{HeadlessRenderer, RenderBackend};
use crate::gfx::transform::{TransformHandle, TransformStore};
use crate::input::{Clipboard, MemoryClipboard};

use super::callbacks::{MouseEvent, MouseEventKind};
use super::control::{BaseControl, Rect};
use super::controls::{self, Container, ControlArrays};
use super::handle::{ControlHandle, ControlKind};

/// Shared services the UI consumes.
#[derive(Clone)]
pub struct UiServices {
    pub transforms: Rc<RefCell<TransformStore>>,
    pub fonts: Rc<RefCell<dyn FontSystem>>,
    pub renderer: Rc<RefCell<dyn RenderBackend>>,
    pub clipboard: Rc<RefCell<dyn Clipboard>>,
}

impl UiServices {
    /// Services backed by the in-memory implementations shipped with the crate.
    pub fn headless(config: &UiConfig) -> Self {
        Self {
            transforms: Rc::new(RefCell::new(TransformStore::new())),
            fonts: Rc::new(RefCell::new(FixedWidthFont::new(config.default_font_size))),
            renderer: Rc::new(RefCell::new(HeadlessRenderer::new())),
            clipboard: Rc::new(RefCell::new(MemoryClipboard::new())),
        }
    }
}

/// Owner of every control in the UI.
pub struct UiState {
    pub(crate) config: UiConfig,
    pub(crate) services: UiServices,
    pub(crate) controls: ControlArrays,
    pub(crate) root: ControlHandle,
    pub(crate) active: Vec<ControlHandle>,
    pub(crate) inactive: Vec<ControlHandle>,
    names: BTreeMap<String, Vec<ControlHandle>>,
    pub(crate) focused: Option<ControlHandle>,
    /// Textbox waiting for the answer to a clipboard request.
    pub(crate) pending_paste: Option<ControlHandle>,
    pub(crate) default_font: FontHandle,
    next_serial: u64,
    pub(crate) viewport: (f32, f32),
    /// Last pointer position seen by `handle_event`.
    pub(crate) pointer: (f32, f32),
    pub(crate) shutting_down: bool,
    /// Next stencil reference handed out during the current render.
    pub(crate) next_clip_id: u32,
}

impl UiState {
    /// Creates the UI with a root control covering the viewport.
    pub fn new(config: UiConfig, services: UiServices, width: f32, height: f32) -> Result<Self> {
        let default_font = {
            let mut fonts = services.fonts.borrow_mut();
            match config.default_font_kind {
                FontKind::Bitmap => fonts.acquire_bitmap(&config.default_font_name),
                FontKind::System => {
                    fonts.acquire_system(&config.default_font_name, config.default_font_size)
                }
            }
        }
        .ok_or_else(|| {
            UiError::ResourceAcquisition(format!("default font '{}'", config.default_font_name))
        })?;

        let mut ui = Self {
            config,
            services,
            controls: ControlArrays::new(),
            root: ControlHandle::INVALID,
            active: Vec::new(),
            inactive: Vec::new(),
            names: BTreeMap::new(),
            focused: None,
            pending_paste: None,
            default_font,
            next_serial: 0,
            viewport: (width, height),
            pointer: (0.0, 0.0),
            shutting_down: false,
            next_clip_id: 1,
        };

        let mut base = ui.new_base(ControlKind::Base, "root");
        base.bounds = Rect::sized(width, height);
        base.flags.mouse_interactive = false;
        let transform = base.transform;
        let root = ui.controls.bases.insert_with(|handle| {
            base.handle = handle;
            Container { base }
        });
        let root = root.ok_or(UiError::CapacityExhausted(ControlKind::Base))?;
        ui.services
            .transforms
            .borrow_mut()
            .user_set(transform, u64::from(root.raw()));
        ui.root = root;
        ui.active.push(root);
        ui.name_insert("root", root);
        info!("ui initialised with a {}x{} viewport", width, height);
        Ok(ui)
    }

    pub fn config(&self) -> &UiConfig {
        &self.config
    }

    pub fn services(&self) -> &UiServices {
        &self.services
    }

    pub fn root(&self) -> ControlHandle {
        self.root
    }

    pub fn viewport(&self) -> (f32, f32) {
        self.viewport
    }

    pub fn default_font(&self) -> FontHandle {
        self.default_font
    }

    /// Number of live controls, the root included.
    pub fn control_count(&self) -> usize {
        self.active.len() + self.inactive.len()
    }

    pub fn active_controls(&self) -> &[ControlHandle] {
        &self.active
    }

    pub fn inactive_controls(&self) -> &[ControlHandle] {
        &self.inactive
    }

    pub fn is_valid(&self, handle: ControlHandle) -> bool {
        self.base(handle).is_some()
    }

    /// Resolves a handle to the base record of its control.
    pub fn base(&self, handle: ControlHandle) -> Option<&BaseControl> {
        match handle.kind()? {
            ControlKind::Base => self.controls.bases.get(handle).map(|c| &c.base),
            ControlKind::Panel => self.controls.panels.get(handle).map(|c| &c.base),
            ControlKind::Label => self.controls.labels.get(handle).map(|c| &c.base),
            ControlKind::Button => self.controls.buttons.get(handle).map(|c| &c.base),
            ControlKind::Textbox => self.controls.textboxes.get(handle).map(|c| &c.base),
            ControlKind::Scrollable => self.controls.scrollables.get(handle).map(|c| &c.base),
            ControlKind::Checkbox => self.controls.checkboxes.get(handle).map(|c| &c.base),
            ControlKind::ImageBox => self.controls.image_boxes.get(handle).map(|c| &c.base),
            ControlKind::TreeItem => self.controls.tree_items.get(handle).map(|c| &c.base),
        }
    }

    pub(crate) fn base_mut(&mut self, handle: ControlHandle) -> Option<&mut BaseControl> {
        match handle.kind()? {
            ControlKind::Base => self.controls.bases.get_mut(handle).map(|c| &mut c.base),
            ControlKind::Panel => self.controls.panels.get_mut(handle).map(|c| &mut c.base),
            ControlKind::Label => self.controls.labels.get_mut(handle).map(|c| &mut c.base),
            ControlKind::Button => self.controls.buttons.get_mut(handle).map(|c| &mut c.base),
            ControlKind::Textbox => self.controls.textboxes.get_mut(handle).map(|c| &mut c.base),
            ControlKind::Scrollable => self.controls.scrollables.get_mut(handle).map(|c| &mut c.base),
            ControlKind::Checkbox => self.controls.checkboxes.get_mut(handle).map(|c| &mut c.base),
            ControlKind::ImageBox => self.controls.image_boxes.get_mut(handle).map(|c| &mut c.base),
            ControlKind::TreeItem => self.controls.tree_items.get_mut(handle).map(|c| &mut c.base),
        }
    }

    pub(crate) fn base_or_err(&self, handle: ControlHandle) -> Result<&BaseControl> {
        self.base(handle).ok_or(UiError::InvalidHandle(handle))
    }

    pub(crate) fn base_mut_or_err(&mut self, handle: ControlHandle) -> Result<&mut BaseControl> {
        self.base_mut(handle).ok_or(UiError::InvalidHandle(handle))
    }

    /// Checks that `handle` is live and of the expected kind.
    pub(crate) fn expect_kind(&self, handle: ControlHandle, expected: ControlKind) -> Result<()> {
        let found = handle.kind().ok_or(UiError::InvalidHandle(handle))?;
        if found != expected {
            return Err(UiError::WrongKind { expected, found });
        }
        if !self.is_valid(handle) {
            return Err(UiError::InvalidHandle(handle));
        }
        Ok(())
    }

    /// Base record for a new control, with a fresh transform and serial.
    pub(crate) fn new_base(&mut self, kind: ControlKind, name: &str) -> BaseControl {
        let transform = self.services.transforms.borrow_mut().create(0);
        let serial = self.next_serial;
        self.next_serial += 1;
        BaseControl::new(kind, name, transform, serial)
    }

    /// Completes a creation started with [`new_base`](Self::new_base): attaches
    /// the control to the root and registers it in the lists and name lookup.
    pub(crate) fn finish_create(
        &mut self,
        inserted: Option<ControlHandle>,
        kind: ControlKind,
        transform: TransformHandle,
    ) -> Result<ControlHandle> {
        let Some(handle) = inserted else {
            self.services.transforms.borrow_mut().destroy(transform);
            warn!("ui: no free {} slots", kind);
            return Err(UiError::CapacityExhausted(kind));
        };
        self.services
            .transforms
            .borrow_mut()
            .user_set(transform, u64::from(handle.raw()));
        self.active.push(handle);
        let name = self.base(handle).map(|b| b.name.clone()).unwrap_or_default();
        self.name_insert(&name, handle);
        self.add_child(self.root, handle)?;
        debug!("ui: created {} '{}' as {:?}", kind, name, handle);
        Ok(handle)
    }

    fn name_insert(&mut self, name: &str, handle: ControlHandle) {
        if name.is_empty() {
            return;
        }
        self.names.entry(name.to_string()).or_default().push(handle);
    }

    pub(crate) fn name_remove(&mut self, name: &str, handle: ControlHandle) {
        if let Some(handles) = self.names.get_mut(name) {
            handles.retain(|h| *h != handle);
            if handles.is_empty() {
                self.names.remove(name);
            }
        }
    }

    pub(crate) fn lists_remove(&mut self, handle: ControlHandle) {
        self.active.retain(|h| *h != handle);
        self.inactive.retain(|h| *h != handle);
    }

    pub(crate) fn clear_name_lookup(&mut self) {
        self.names.clear();
    }

    pub fn name(&self, handle: ControlHandle) -> Option<&str> {
        self.base(handle).map(|b| b.name.as_str())
    }

    /// Renames a control, moving its name-lookup entry.
    pub fn set_name(&mut self, handle: ControlHandle, name: &str) -> Result<()> {
        let old = std::mem::replace(&mut self.base_mut_or_err(handle)?.name, name.to_string());
        self.name_remove(&old, handle);
        self.name_insert(name, handle);
        Ok(())
    }

    /// A control carrying `name`. With duplicate names, which one is unspecified.
    pub fn find_by_name(&self, name: &str) -> Option<ControlHandle> {
        self.names.get(name)?.first().copied()
    }

    pub fn add_tag(&mut self, handle: ControlHandle, tag: &str) -> Result<()> {
        self.base_mut_or_err(handle)?.tags.insert(tag.to_string());
        Ok(())
    }

    pub fn remove_tag(&mut self, handle: ControlHandle, tag: &str) -> Result<bool> {
        Ok(self.base_mut_or_err(handle)?.tags.remove(tag))
    }

    pub fn has_tag(&self, handle: ControlHandle, tag: &str) -> bool {
        self.base(handle).is_some_and(|b| b.tags.contains(tag))
    }

    /// Every live control tagged `tag` (case-sensitive), in creation order.
    pub fn find_by_tag(&self, tag: &str) -> Vec<ControlHandle> {
        let mut found: Vec<&BaseControl> = self
            .active
            .iter()
            .chain(self.inactive.iter())
            .filter_map(|h| self.base(*h))
            .filter(|b| b.tags.contains(tag))
            .collect();
        found.sort_by_key(|b| b.serial);
        found.into_iter().map(|b| b.handle).collect()
    }

    /// Attaches host data to a control, replacing any previous value.
    pub fn set_user_data<T: Any>(&mut self, handle: ControlHandle, data: T) -> Result<()> {
        self.base_mut_or_err(handle)?.user_data = Some(Box::new(data));
        Ok(())
    }

    pub fn user_data<T: Any>(&self, handle: ControlHandle) -> Option<&T> {
        self.base(handle)?.user_data.as_ref()?.downcast_ref()
    }

    pub fn user_data_mut<T: Any>(&mut self, handle: ControlHandle) -> Option<&mut T> {
        self.base_mut(handle)?.user_data.as_mut()?.downcast_mut()
    }

    pub fn take_user_data(&mut self, handle: ControlHandle) -> Option<Box<dyn Any>> {
        self.base_mut(handle)?.user_data.take()
    }

    pub fn parent(&self, handle: ControlHandle) -> Option<ControlHandle> {
        self.base(handle)?.parent
    }

    pub fn children(&self, handle: ControlHandle) -> &[ControlHandle] {
        self.base(handle).map_or(&[], |b| b.children.as_slice())
    }

    pub fn depth(&self, handle: ControlHandle) -> Option<u32> {
        self.base(handle).map(|b| b.depth)
    }

    pub fn transform(&self, handle: ControlHandle) -> Option<TransformHandle> {
        self.base(handle).map(|b| b.transform)
    }

    /// Moves the control relative to its parent.
    pub fn set_position(&mut self, handle: ControlHandle, x: f32, y: f32) -> Result<()> {
        let transform = self.base_or_err(handle)?.transform;
        self.services
            .transforms
            .borrow_mut()
            .position_set(transform, Vector3::new(x, y, 0.0));
        Ok(())
    }

    pub fn position(&self, handle: ControlHandle) -> Option<(f32, f32)> {
        let transform = self.base(handle)?.transform;
        let p = self.services.transforms.borrow().position_get(transform);
        Some((p.x, p.y))
    }

    pub fn world_matrix(&self, handle: ControlHandle) -> Option<Matrix4<f32>> {
        let transform = self.base(handle)?.transform;
        Some(self.services.transforms.borrow().world_get(transform))
    }

    pub fn bounds(&self, handle: ControlHandle) -> Option<Rect> {
        self.base(handle).map(|b| b.bounds)
    }

    /// Changes the local bounds and lets the variant rebuild its geometry.
    pub fn set_bounds(&mut self, handle: ControlHandle, bounds: Rect) -> Result<()> {
        if bounds.width < 0.0 || bounds.height < 0.0 {
            return Err(UiError::InvalidInput(format!(
                "negative size {}x{}",
                bounds.width, bounds.height
            )));
        }
        self.base_mut_or_err(handle)?.bounds = bounds;
        controls::resize_hook(self, handle);
        Ok(())
    }

    pub fn set_visible(&mut self, handle: ControlHandle, visible: bool) -> Result<()> {
        self.base_mut_or_err(handle)?.flags.visible = visible;
        if !visible {
            self.revalidate_focus();
        }
        Ok(())
    }

    pub fn is_visible(&self, handle: ControlHandle) -> bool {
        self.base(handle).is_some_and(|b| b.flags.visible)
    }

    /// Moves the control between the active and inactive lists. A hovered
    /// control hears mouse-out as it is deactivated.
    pub fn set_active(&mut self, handle: ControlHandle, active: bool) -> Result<()> {
        let base = self.base_mut_or_err(handle)?;
        if base.flags.active == active {
            return Ok(());
        }
        base.flags.active = active;
        let was_hovered = base.flags.hovered;
        if !active {
            base.flags.hovered = false;
            base.flags.pressed = false;
            base.flags.dragging = false;
        }
        if active {
            self.inactive.retain(|h| *h != handle);
            self.active.push(handle);
        } else {
            self.active.retain(|h| *h != handle);
            self.inactive.push(handle);
        }
        trace!("ui: {:?} active = {}", handle, active);
        controls::active_changed_hook(self, handle);
        self.revalidate_focus();
        if was_hovered && !active && self.is_valid(handle) {
            let (x, y) = self.pointer;
            let event = MouseEvent { button: None, x, y };
            controls::internal_mouse(self, handle, MouseEventKind::Out, event);
        }
        Ok(())
    }

    pub fn is_active(&self, handle: ControlHandle) -> bool {
        self.base(handle).is_some_and(|b| b.flags.active)
    }

    pub fn set_focusable(&mut self, handle: ControlHandle, focusable: bool) -> Result<()> {
        self.base_mut_or_err(handle)?.flags.focusable = focusable;
        self.revalidate_focus();
        Ok(())
    }

    pub fn set_mouse_interactive(&mut self, handle: ControlHandle, interactive: bool) -> Result<()> {
        self.base_mut_or_err(handle)?.flags.mouse_interactive = interactive;
        Ok(())
    }

    pub fn is_hovered(&self, handle: ControlHandle) -> bool {
        self.base(handle).is_some_and(|b| b.flags.hovered)
    }

    pub fn is_pressed(&self, handle: ControlHandle) -> bool {
        self.base(handle).is_some_and(|b| b.flags.pressed)
    }

    pub fn is_dragging(&self, handle: ControlHandle) -> bool {
        self.base(handle).is_some_and(|b| b.flags.dragging)
    }

    /// Walks to the root requiring `check` on every node. Detached subtrees fail.
    fn holds_to_root(&self, handle: ControlHandle, check: impl Fn(&BaseControl) -> bool) -> bool {
        let mut cursor = Some(handle);
        while let Some(current) = cursor {
            let Some(base) = self.base(current) else {
                return false;
            };
            if !check(base) {
                return false;
            }
            if current == self.root {
                return true;
            }
            cursor = base.parent;
        }
        false
    }

    pub fn is_effectively_visible(&self, handle: ControlHandle) -> bool {
        self.holds_to_root(handle, |b| b.flags.visible)
    }

    pub fn is_effectively_active(&self, handle: ControlHandle) -> bool {
        self.holds_to_root(handle, |b| b.flags.active)
    }

    /// Updates the viewport and the root bounds.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = (width, height);
        let root = self.root;
        if let Some(base) = self.base_mut(root) {
            base.bounds = Rect::sized(width, height);
        }
        debug!("ui: viewport resized to {}x{}", width, height);
    }
}
