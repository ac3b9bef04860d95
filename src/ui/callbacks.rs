//! # Control Callbacks
//!
//! User callbacks are closures receiving the [`UiState`] they belong to, so
//! they can freely query and mutate other controls (or destroy their own).
//! Mouse and key callbacks return `true` to let the event continue to the
//! next control and `false` to mark it handled.

use crate::input::{KeyCode, Modifiers, MouseButton};

use super::handle::ControlHandle;
use super::state::UiState;

/// Pointer event data passed to mouse callbacks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    /// Button involved; `None` for motion without a button.
    pub button: Option<MouseButton>,
    pub x: f32,
    pub y: f32,
}

/// Key event data passed to key callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: KeyCode,
    pub modifiers: Modifiers,
    pub pressed: bool,
}

/// Which mouse callback slot an event targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    Click,
    Down,
    Up,
    Over,
    Out,
    Move,
    DragBegin,
    Drag,
    DragEnd,
}

pub type MouseCallback = Box<dyn FnMut(&mut UiState, ControlHandle, MouseEvent) -> bool>;
pub type KeyCallback = Box<dyn FnMut(&mut UiState, ControlHandle, KeyEvent) -> bool>;
pub type FocusCallback = Box<dyn FnMut(&mut UiState, ControlHandle)>;
pub type CheckedCallback = Box<dyn FnMut(&mut UiState, ControlHandle, bool)>;

#[derive(Default)]
pub struct Callbacks {
    pub on_click: Option<MouseCallback>,
    pub on_mouse_down: Option<MouseCallback>,
    pub on_mouse_up: Option<MouseCallback>,
    pub on_mouse_over: Option<MouseCallback>,
    pub on_mouse_out: Option<MouseCallback>,
    pub on_mouse_move: Option<MouseCallback>,
    pub on_drag_begin: Option<MouseCallback>,
    pub on_drag: Option<MouseCallback>,
    pub on_drag_end: Option<MouseCallback>,
    pub on_key: Option<KeyCallback>,
    pub on_focus: Option<FocusCallback>,
    pub on_unfocus: Option<FocusCallback>,
}

impl Callbacks {
    pub fn mouse_slot(&mut self, kind: MouseEventKind) -> &mut Option<MouseCallback> {
        match kind {
            MouseEventKind::Click => &mut self.on_click,
            MouseEventKind::Down => &mut self.on_mouse_down,
            MouseEventKind::Up => &mut self.on_mouse_up,
            MouseEventKind::Over => &mut self.on_mouse_over,
            MouseEventKind::Out => &mut self.on_mouse_out,
            MouseEventKind::Move => &mut self.on_mouse_move,
            MouseEventKind::DragBegin => &mut self.on_drag_begin,
            MouseEventKind::Drag => &mut self.on_drag,
            MouseEventKind::DragEnd => &mut self.on_drag_end,
        }
    }
}

/// Focus transitions share one callback type, so the slot is picked by flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FocusSlot {
    Focus,
    Unfocus,
}

impl UiState {
    /// Runs the user mouse callback of `handle`, if any. Returns `true`
    /// (continue propagation) when there is none.
    ///
    /// The closure is taken out of the control for the duration of the call
    /// and put back only if the control survived and the slot was not
    /// reassigned meanwhile.
    pub(crate) fn fire_mouse_callback(
        &mut self,
        handle: ControlHandle,
        kind: MouseEventKind,
        event: MouseEvent,
    ) -> bool {
        let Some(mut callback) = self
            .base_mut(handle)
            .and_then(|base| base.callbacks.mouse_slot(kind).take())
        else {
            return true;
        };
        let result = callback(self, handle, event);
        if let Some(base) = self.base_mut(handle) {
            let slot = base.callbacks.mouse_slot(kind);
            if slot.is_none() {
                *slot = Some(callback);
            }
        }
        result
    }

    pub(crate) fn fire_key_callback(&mut self, handle: ControlHandle, event: KeyEvent) -> bool {
        let Some(mut callback) = self.base_mut(handle).and_then(|base| base.callbacks.on_key.take())
        else {
            return true;
        };
        let result = callback(self, handle, event);
        if let Some(base) = self.base_mut(handle) {
            if base.callbacks.on_key.is_none() {
                base.callbacks.on_key = Some(callback);
            }
        }
        result
    }

    pub(crate) fn fire_focus_callback(&mut self, handle: ControlHandle, slot: FocusSlot) {
        let take = |callbacks: &mut Callbacks| match slot {
            FocusSlot::Focus => callbacks.on_focus.take(),
            FocusSlot::Unfocus => callbacks.on_unfocus.take(),
        };
        let Some(mut callback) = self.base_mut(handle).and_then(|base| take(&mut base.callbacks))
        else {
            return;
        };
        callback(self, handle);
        if let Some(base) = self.base_mut(handle) {
            let current = match slot {
                FocusSlot::Focus => &mut base.callbacks.on_focus,
                FocusSlot::Unfocus => &mut base.callbacks.on_unfocus,
            };
            if current.is_none() {
                *current = Some(callback);
            }
        }
    }

    pub fn set_on_click(&mut self, handle: ControlHandle, callback: impl FnMut(&mut UiState, ControlHandle, MouseEvent) -> bool + 'static) -> bool {
        self.set_mouse_callback(handle, MouseEventKind::Click, Box::new(callback))
    }

    /// Installs (or replaces) the user callback for a mouse event.
    pub fn set_mouse_callback(&mut self, handle: ControlHandle, kind: MouseEventKind, callback: MouseCallback) -> bool {
        match self.base_mut(handle) {
            Some(base) => {
                *base.callbacks.mouse_slot(kind) = Some(callback);
                true
            }
            None => false,
        }
    }

    pub fn clear_mouse_callback(&mut self, handle: ControlHandle, kind: MouseEventKind) -> bool {
        match self.base_mut(handle) {
            Some(base) => {
                *base.callbacks.mouse_slot(kind) = None;
                true
            }
            None => false,
        }
    }

    pub fn set_on_key(&mut self, handle: ControlHandle, callback: impl FnMut(&mut UiState, ControlHandle, KeyEvent) -> bool + 'static) -> bool {
        match self.base_mut(handle) {
            Some(base) => {
                base.callbacks.on_key = Some(Box::new(callback));
                true
            }
            None => false,
        }
    }

    pub fn set_on_focus(&mut self, handle: ControlHandle, callback: impl FnMut(&mut UiState, ControlHandle) + 'static) -> bool {
        match self.base_mut(handle) {
            Some(base) => {
                base.callbacks.on_focus = Some(Box::new(callback));
                true
            }
            None => false,
        }
    }

    pub fn set_on_unfocus(&mut self, handle: ControlHandle, callback: impl FnMut(&mut UiState, ControlHandle) + 'static) -> bool {
        match self.base_mut(handle) {
            Some(base) => {
                base.callbacks.on_unfocus = Some(Box::new(callback));
                true
            }
            None => false,
        }
    }
}
