//! # Tree Item
//!
//! A row in a collapsible tree: a toggle button (`+`/`-`), a caption label
//! and a child container indented below the row. The toggle stays hidden
//! until the item has children, and the container is hidden while the item
//! is collapsed.
//!
//! Clicking the toggle expands or collapses the item. Clicking the caption
//! runs the tree item's own `on_click`, which is where hosts hang selection.

use log::{debug, warn};

use crate::error::{Result, UiError};

use super::{abandon, adopt_owned, Container};
use crate::ui::control::{BaseControl, Rect};
use crate::ui::handle::{ControlHandle, ControlKind};
use crate::ui::state::UiState;

/// Horizontal indent of child rows, in pixels.
const INDENT: f32 = 16.0;
const CAPTION_GAP: f32 = 4.0;

pub type ExpandCallback = Box<dyn FnMut(&mut UiState, ControlHandle)>;

pub struct TreeItem {
    pub base: BaseControl,
    pub context: u64,
    pub expanded: bool,
    pub label: ControlHandle,
    pub toggle: ControlHandle,
    pub container: ControlHandle,
    pub on_expanded: Option<ExpandCallback>,
    pub on_collapsed: Option<ExpandCallback>,
}

impl UiState {
    /// Collapsed tree item with a caption and an opaque host `context`.
    pub fn tree_item_create(&mut self, name: &str, text: &str, context: u64) -> Result<ControlHandle> {
        let mut base = self.new_base(ControlKind::TreeItem, name);
        // The item itself only hosts parts; the caption and toggle take the pointer.
        base.flags.mouse_interactive = false;
        let transform = base.transform;
        let inserted = self.controls.tree_items.insert_with(|handle| {
            base.handle = handle;
            TreeItem {
                base,
                context,
                expanded: false,
                label: ControlHandle::INVALID,
                toggle: ControlHandle::INVALID,
                container: ControlHandle::INVALID,
                on_expanded: None,
                on_collapsed: None,
            }
        });
        let handle = self.finish_create(inserted, ControlKind::TreeItem, transform)?;
        if let Err(err) = build_parts(self, handle, text) {
            return abandon(self, handle, err);
        }
        Ok(handle)
    }

    pub fn tree_item_context(&self, handle: ControlHandle) -> Option<u64> {
        self.controls.tree_items.get(handle).map(|t| t.context)
    }

    pub fn tree_item_is_expanded(&self, handle: ControlHandle) -> Option<bool> {
        self.controls.tree_items.get(handle).map(|t| t.expanded)
    }

    /// `(label, toggle, container)` parts of the item.
    pub fn tree_item_parts(&self, handle: ControlHandle) -> Option<(ControlHandle, ControlHandle, ControlHandle)> {
        let item = self.controls.tree_items.get(handle)?;
        Some((item.label, item.toggle, item.container))
    }

    /// Appends `child` as the next row under the item and reveals the toggle.
    pub fn tree_item_add_child(&mut self, handle: ControlHandle, child: ControlHandle) -> Result<()> {
        self.expect_kind(handle, ControlKind::TreeItem)?;
        let (_, toggle, container) = self.tree_item_parts(handle).ok_or(UiError::InvalidHandle(handle))?;
        let row = self.children(container).len() as f32;
        let row_height = self.services.fonts.borrow().line_height(self.default_font);
        self.add_child(container, child)?;
        self.set_position(child, 0.0, row * row_height)?;
        self.set_visible(toggle, true)?;
        Ok(())
    }

    pub fn tree_item_expand(&mut self, handle: ControlHandle) -> Result<()> {
        self.expect_kind(handle, ControlKind::TreeItem)?;
        set_expanded(self, handle, true);
        Ok(())
    }

    pub fn tree_item_collapse(&mut self, handle: ControlHandle) -> Result<()> {
        self.expect_kind(handle, ControlKind::TreeItem)?;
        set_expanded(self, handle, false);
        Ok(())
    }

    pub fn set_on_expanded(&mut self, handle: ControlHandle, callback: impl FnMut(&mut UiState, ControlHandle) + 'static) -> bool {
        match self.controls.tree_items.get_mut(handle) {
            Some(item) => {
                item.on_expanded = Some(Box::new(callback));
                true
            }
            None => false,
        }
    }

    pub fn set_on_collapsed(&mut self, handle: ControlHandle, callback: impl FnMut(&mut UiState, ControlHandle) + 'static) -> bool {
        match self.controls.tree_items.get_mut(handle) {
            Some(item) => {
                item.on_collapsed = Some(Box::new(callback));
                true
            }
            None => false,
        }
    }
}

fn build_parts(ui: &mut UiState, handle: ControlHandle, text: &str) -> Result<()> {
    let row_height = ui.services.fonts.borrow().line_height(ui.default_font);

    let toggle = ui.button_create_text("", "+", [row_height, row_height])?;
    adopt_owned(ui, handle, toggle, true)?;
    ui.set_visible(toggle, false)?;

    let label = ui.label_create("", text)?;
    adopt_owned(ui, handle, label, true)?;
    ui.set_position(label, row_height + CAPTION_GAP, 0.0)?;

    let mut container = ui.new_base(ControlKind::Base, "");
    let container_transform = container.transform;
    let inserted = ui.controls.bases.insert_with(|container_handle| {
        container.handle = container_handle;
        Container { base: container }
    });
    let container = ui.finish_create(inserted, ControlKind::Base, container_transform)?;
    adopt_owned(ui, handle, container, false)?;
    ui.set_position(container, INDENT, row_height)?;
    ui.set_visible(container, false)?;

    let text_width = ui.label_text_size(label).map_or(0.0, |(w, _)| w);
    let item = ui
        .controls
        .tree_items
        .get_mut(handle)
        .ok_or(UiError::InvalidHandle(handle))?;
    item.label = label;
    item.toggle = toggle;
    item.container = container;
    item.base.bounds = Rect::sized(row_height + CAPTION_GAP + text_width, row_height);
    Ok(())
}

pub(crate) fn toggle(ui: &mut UiState, handle: ControlHandle) {
    let Some(expanded) = ui.tree_item_is_expanded(handle) else {
        return;
    };
    set_expanded(ui, handle, !expanded);
}

fn set_expanded(ui: &mut UiState, handle: ControlHandle, expanded: bool) {
    let Some(item) = ui.controls.tree_items.get_mut(handle) else {
        return;
    };
    if item.expanded == expanded {
        return;
    }
    item.expanded = expanded;
    let (toggle, container) = (item.toggle, item.container);
    let results = [
        ui.set_visible(container, expanded),
        ui.button_set_text(toggle, if expanded { "-" } else { "+" }),
    ];
    for result in results {
        if let Err(err) = result {
            warn!("ui: tree item {:?} could not update its parts: {}", handle, err);
        }
    }
    debug!("ui: tree item {:?} expanded = {}", handle, expanded);
    fire_expand_callback(ui, handle, expanded);
}

fn expand_slot(item: &mut TreeItem, expanded: bool) -> &mut Option<ExpandCallback> {
    if expanded {
        &mut item.on_expanded
    } else {
        &mut item.on_collapsed
    }
}

fn fire_expand_callback(ui: &mut UiState, handle: ControlHandle, expanded: bool) {
    let Some(mut callback) = ui
        .controls
        .tree_items
        .get_mut(handle)
        .and_then(|item| expand_slot(item, expanded).take())
    else {
        return;
    };
    callback(ui, handle);
    if let Some(item) = ui.controls.tree_items.get_mut(handle) {
        let current = expand_slot(item, expanded);
        if current.is_none() {
            *current = Some(callback);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UiConfig;
    use crate::input::{MouseButton, UiEvent};
    use crate::ui::state::UiServices;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ui() -> UiState {
        let _ = env_logger::builder().is_test(true).try_init();
        let config = UiConfig::default();
        let services = UiServices::headless(&config);
        UiState::new(config, services, 800.0, 600.0).unwrap()
    }

    fn click(ui: &mut UiState, x: f32, y: f32) {
        ui.handle_event(&UiEvent::ButtonClicked {
            button: MouseButton::Left,
            x,
            y,
        });
    }

    #[test]
    fn test_toggle_expands_and_collapses() {
        let mut ui = ui();
        let item = ui.tree_item_create("root item", "scene", 7).unwrap();
        let child = ui.tree_item_create("child", "light", 8).unwrap();
        let (_, toggle, container) = ui.tree_item_parts(item).unwrap();
        assert!(!ui.is_visible(toggle));
        ui.tree_item_add_child(item, child).unwrap();
        assert!(ui.is_visible(toggle));
        assert!(!ui.is_effectively_visible(child));

        let log = Rc::new(RefCell::new(Vec::new()));
        let (on_expand, on_collapse) = (log.clone(), log.clone());
        ui.set_on_expanded(item, move |_, _| on_expand.borrow_mut().push("expanded"));
        ui.set_on_collapsed(item, move |_, _| on_collapse.borrow_mut().push("collapsed"));

        // Toggle occupies the first 16x16 pixels of the row.
        click(&mut ui, 4.0, 4.0);
        assert_eq!(ui.tree_item_is_expanded(item), Some(true));
        assert!(ui.is_visible(container));
        assert_eq!(ui.button_text(toggle), Some("-"));
        assert!(ui.is_effectively_visible(child));
        click(&mut ui, 4.0, 4.0);
        assert_eq!(ui.tree_item_is_expanded(item), Some(false));
        assert_eq!(*log.borrow(), vec!["expanded", "collapsed"]);
    }

    #[test]
    fn test_label_click_reaches_item_callback() {
        let mut ui = ui();
        let item = ui.tree_item_create("item", "mesh", 42).unwrap();
        let seen = Rc::new(RefCell::new(None));
        let sink = seen.clone();
        ui.set_on_click(item, move |ui, handle, _| {
            *sink.borrow_mut() = ui.tree_item_context(handle);
            true
        });
        click(&mut ui, 24.0, 4.0);
        assert_eq!(*seen.borrow(), Some(42));
        assert_eq!(ui.tree_item_is_expanded(item), Some(false));
    }

    #[test]
    fn test_destroy_removes_parts_and_reparents_rows() {
        let mut ui = ui();
        let item = ui.tree_item_create("item", "a", 0).unwrap();
        let child = ui.tree_item_create("child", "b", 0).unwrap();
        ui.tree_item_add_child(item, child).unwrap();
        ui.destroy(item).unwrap();
        assert!(ui.is_valid(child));
        assert_eq!(ui.parent(child), Some(ui.root()));
        ui.validate_tree().unwrap();
    }
}
