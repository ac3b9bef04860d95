//! Clipped viewport over a content wrapper that scrolls by translation.

use cgmath::Vector3;

use crate::error::{Result, UiError};

use super::{abandon, adopt_owned, Container};
use crate::ui::control::{BaseControl, ClipMask, Rect};
use crate::ui::handle::{ControlHandle, ControlKind};
use crate::ui::state::UiState;

/// Which directions a scrollable moves in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollAxes {
    pub horizontal: bool,
    pub vertical: bool,
}

impl ScrollAxes {
    pub const BOTH: ScrollAxes = ScrollAxes {
        horizontal: true,
        vertical: true,
    };
    pub const VERTICAL: ScrollAxes = ScrollAxes {
        horizontal: false,
        vertical: true,
    };
}

pub struct Scrollable {
    pub base: BaseControl,
    pub axes: ScrollAxes,
    pub content: ControlHandle,
}

impl UiState {
    pub fn scrollable_create(&mut self, name: &str, size: [f32; 2], axes: ScrollAxes) -> Result<ControlHandle> {
        if size[0] < 0.0 || size[1] < 0.0 {
            return Err(UiError::InvalidInput(format!("negative scrollable size {:?}", size)));
        }
        let mut base = self.new_base(ControlKind::Scrollable, name);
        base.bounds = Rect::sized(size[0], size[1]);
        base.clip_mask = Some(ClipMask::new(base.bounds));
        let transform = base.transform;
        let inserted = self.controls.scrollables.insert_with(|handle| {
            base.handle = handle;
            Scrollable {
                base,
                axes,
                content: ControlHandle::INVALID,
            }
        });
        let handle = self.finish_create(inserted, ControlKind::Scrollable, transform)?;

        let mut wrapper = self.new_base(ControlKind::Base, "");
        wrapper.bounds = Rect::sized(size[0], size[1]);
        let wrapper_transform = wrapper.transform;
        let inserted = self.controls.bases.insert_with(|wrapper_handle| {
            wrapper.handle = wrapper_handle;
            Container { base: wrapper }
        });
        let content = match self.finish_create(inserted, ControlKind::Base, wrapper_transform) {
            Ok(content) => content,
            Err(err) => return abandon(self, handle, err),
        };
        if let Err(err) = adopt_owned(self, handle, content, false) {
            return abandon(self, handle, err);
        }
        if let Some(scrollable) = self.controls.scrollables.get_mut(handle) {
            scrollable.content = content;
        }
        Ok(handle)
    }

    /// The wrapper that scrolled children live under.
    pub fn scrollable_content(&self, handle: ControlHandle) -> Option<ControlHandle> {
        self.controls.scrollables.get(handle).map(|s| s.content)
    }

    /// Adds `child` to the scrolled content.
    pub fn scrollable_add_child(&mut self, handle: ControlHandle, child: ControlHandle) -> Result<()> {
        self.expect_kind(handle, ControlKind::Scrollable)?;
        let content = self.scrollable_content(handle).ok_or(UiError::InvalidHandle(handle))?;
        self.add_child(content, child)
    }

    /// Scrolls horizontally by `amount` pixels (positive moves content left).
    pub fn scroll_x(&mut self, handle: ControlHandle, amount: f32) -> Result<()> {
        self.scroll(handle, Vector3::new(-amount, 0.0, 0.0), |axes| axes.horizontal)
    }

    /// Scrolls vertically by `amount` pixels (positive moves content up).
    pub fn scroll_y(&mut self, handle: ControlHandle, amount: f32) -> Result<()> {
        self.scroll(handle, Vector3::new(0.0, -amount, 0.0), |axes| axes.vertical)
    }

    fn scroll(&mut self, handle: ControlHandle, delta: Vector3<f32>, enabled: impl Fn(ScrollAxes) -> bool) -> Result<()> {
        self.expect_kind(handle, ControlKind::Scrollable)?;
        let scrollable = self
            .controls
            .scrollables
            .get(handle)
            .ok_or(UiError::InvalidHandle(handle))?;
        if !enabled(scrollable.axes) {
            return Ok(());
        }
        let transform = self.base_or_err(scrollable.content)?.transform;
        self.services.transforms.borrow_mut().translate(transform, delta);
        Ok(())
    }

    /// How far the content has been scrolled, as `(x, y)` pixels.
    pub fn scroll_offset(&self, handle: ControlHandle) -> Option<(f32, f32)> {
        let content = self.scrollable_content(handle)?;
        let (x, y) = self.position(content)?;
        Some((-x, -y))
    }
}

pub(crate) fn resize(ui: &mut UiState, handle: ControlHandle) {
    let Some(scrollable) = ui.controls.scrollables.get_mut(handle) else {
        return;
    };
    let bounds = scrollable.base.bounds;
    if let Some(mask) = scrollable.base.clip_mask.as_mut() {
        mask.rect = bounds;
        mask.dirty = true;
    }
    let content = scrollable.content;
    if let Some(base) = ui.base_mut(content) {
        base.bounds.width = bounds.width;
        base.bounds.height = bounds.height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UiConfig;
    use crate::input::{MouseButton, UiEvent};
    use crate::ui::state::UiServices;
    use std::cell::Cell;
    use std::rc::Rc;

    fn ui() -> UiState {
        let _ = env_logger::builder().is_test(true).try_init();
        let config = UiConfig::default();
        let services = UiServices::headless(&config);
        UiState::new(config, services, 800.0, 600.0).unwrap()
    }

    #[test]
    fn test_scrolling_moves_content() {
        let mut ui = ui();
        let s = ui.scrollable_create("s", [100.0, 100.0], ScrollAxes::VERTICAL).unwrap();
        let p = ui.panel_create("p", [50.0, 20.0], [1.0; 4]).unwrap();
        ui.scrollable_add_child(s, p).unwrap();
        assert_eq!(ui.parent(p), ui.scrollable_content(s));
        ui.scroll_y(s, 30.0).unwrap();
        ui.scroll_x(s, 30.0).unwrap();
        assert_eq!(ui.scroll_offset(s), Some((0.0, 30.0)));
        let world = ui.world_matrix(p).unwrap();
        assert_eq!(world.w.y, -30.0);
    }

    #[test]
    fn test_clipped_children_miss_outside_the_mask() {
        let mut ui = ui();
        let s = ui.scrollable_create("s", [100.0, 100.0], ScrollAxes::BOTH).unwrap();
        let p = ui.panel_create("p", [100.0, 300.0], [1.0; 4]).unwrap();
        ui.scrollable_add_child(s, p).unwrap();
        let clicks = Rc::new(Cell::new(0));
        let counter = clicks.clone();
        ui.set_on_click(p, move |_, _, _| {
            counter.set(counter.get() + 1);
            true
        });
        let click = |y| UiEvent::ButtonClicked {
            button: MouseButton::Left,
            x: 10.0,
            y,
        };
        ui.handle_event(&click(50.0));
        ui.handle_event(&click(250.0));
        assert_eq!(clicks.get(), 1);
        ui.scroll_y(s, 200.0).unwrap();
        ui.handle_event(&click(40.0));
        assert_eq!(clicks.get(), 2);
    }
}
