//! # Event Dispatch
//!
//! Host events are delivered one at a time through [`UiState::handle_event`].
//! Pointer events are hit-tested against every interactive control on the
//! active list and delivered deepest first; ties go to the most recently
//! created control. A control's internal handler returning `false` stops
//! delivery to the remaining controls.
//!
//! ## Re-entrancy
//!
//! Candidates are collected and sorted before any callback runs. Each
//! handle is re-resolved right before delivery, so controls destroyed by an
//! earlier callback in the same dispatch are skipped; controls created
//! during the dispatch only see the next event.

use cgmath::{SquareMatrix, Vector4};
use log::{debug, trace};

use crate::input::{MouseButton, UiEvent};

use super::callbacks::{FocusSlot, KeyEvent, MouseEvent, MouseEventKind};
use super::controls;
use super::handle::ControlHandle;
use super::state::UiState;

/// Candidates for a pointer event, each sorted deepest first.
struct Candidates {
    intersecting: Vec<ControlHandle>,
    non_intersecting: Vec<ControlHandle>,
}

impl UiState {
    /// Delivers one host event. Returns `true` if a control consumed it.
    pub fn handle_event(&mut self, event: &UiEvent) -> bool {
        if self.shutting_down {
            return false;
        }
        match *event {
            UiEvent::ButtonPressed { x, y, .. }
            | UiEvent::ButtonReleased { x, y, .. }
            | UiEvent::ButtonClicked { x, y, .. }
            | UiEvent::MouseMoved { x, y }
            | UiEvent::MouseDragBegin { x, y, .. }
            | UiEvent::MouseDragged { x, y, .. }
            | UiEvent::MouseDragEnd { x, y, .. } => self.pointer = (x, y),
            _ => {}
        }
        match event {
            UiEvent::ButtonPressed { button, x, y } => self.mouse_down(*button, *x, *y),
            UiEvent::ButtonReleased { button, x, y } => self.mouse_up(*button, *x, *y),
            UiEvent::ButtonClicked { button, x, y } => self.click(*button, *x, *y),
            UiEvent::MouseMoved { x, y } => self.mouse_move(*x, *y),
            UiEvent::MouseDragBegin { button, x, y } => self.drag_begin(*button, *x, *y),
            UiEvent::MouseDragged { button, x, y } => self.drag(*button, *x, *y, MouseEventKind::Drag),
            UiEvent::MouseDragEnd { button, x, y } => self.drag(*button, *x, *y, MouseEventKind::DragEnd),
            UiEvent::KeyPressed { key, modifiers } => self.key(KeyEvent {
                key: *key,
                modifiers: *modifiers,
                pressed: true,
            }),
            UiEvent::KeyReleased { key, modifiers } => self.key(KeyEvent {
                key: *key,
                modifiers: *modifiers,
                pressed: false,
            }),
            UiEvent::ClipboardPaste(content) => {
                let Some(target) = self.pending_paste.take() else {
                    trace!("ui: clipboard content arrived with no pending request");
                    return false;
                };
                controls::textbox::apply_paste(self, target, content)
            }
            UiEvent::WindowResized { width, height } => {
                self.resize(*width as f32, *height as f32);
                false
            }
        }
    }

    /// True if the screen point lies inside the control's bounds and inside
    /// the clip mask of every ancestor that has one.
    pub fn hit_test(&self, handle: ControlHandle, x: f32, y: f32) -> bool {
        let Some(base) = self.base(handle) else {
            return false;
        };
        if !self.local_point(handle, x, y).is_some_and(|(lx, ly)| base.bounds.contains(lx, ly)) {
            return false;
        }
        let mut cursor = base.parent;
        while let Some(ancestor) = cursor {
            let Some(ancestor_base) = self.base(ancestor) else {
                break;
            };
            if let Some(mask) = &ancestor_base.clip_mask {
                let inside = self
                    .local_point(ancestor, x, y)
                    .is_some_and(|(lx, ly)| mask.rect.contains(lx, ly));
                if !inside {
                    return false;
                }
            }
            cursor = ancestor_base.parent;
        }
        true
    }

    /// Screen point in the control's local space.
    fn local_point(&self, handle: ControlHandle, x: f32, y: f32) -> Option<(f32, f32)> {
        let inverse = self.world_matrix(handle)?.invert()?;
        let local = inverse * Vector4::new(x, y, 0.0, 1.0);
        Some((local.x, local.y))
    }

    fn sort_deepest_first(&self, handles: &mut [ControlHandle]) {
        handles.sort_by_key(|h| {
            let base = self.base(*h);
            std::cmp::Reverse((base.map_or(0, |b| b.depth), base.map_or(0, |b| b.serial)))
        });
    }

    fn candidates(&self, x: f32, y: f32) -> Candidates {
        let mut intersecting = Vec::new();
        let mut non_intersecting = Vec::new();
        for &handle in &self.active {
            let Some(base) = self.base(handle) else {
                continue;
            };
            if !base.flags.mouse_interactive {
                continue;
            }
            let eligible = self.is_effectively_active(handle) && self.is_effectively_visible(handle);
            if eligible && self.hit_test(handle, x, y) {
                intersecting.push(handle);
            } else {
                non_intersecting.push(handle);
            }
        }
        self.sort_deepest_first(&mut intersecting);
        self.sort_deepest_first(&mut non_intersecting);
        Candidates {
            intersecting,
            non_intersecting,
        }
    }

    fn mouse_down(&mut self, button: MouseButton, x: f32, y: f32) -> bool {
        let event = MouseEvent { button: Some(button), x, y };
        for handle in self.candidates(x, y).intersecting {
            let Some(base) = self.base_mut(handle) else {
                continue;
            };
            base.flags.pressed = true;
            if !controls::internal_mouse(self, handle, MouseEventKind::Down, event) {
                return true;
            }
        }
        false
    }

    fn mouse_up(&mut self, button: MouseButton, x: f32, y: f32) -> bool {
        let event = MouseEvent { button: Some(button), x, y };
        let candidates = self.candidates(x, y);
        for handle in candidates.non_intersecting {
            if self.base(handle).is_some_and(|b| b.flags.pressed) {
                if let Some(base) = self.base_mut(handle) {
                    base.flags.pressed = false;
                }
                controls::released_outside_hook(self, handle);
            }
        }
        for handle in candidates.intersecting {
            let Some(base) = self.base_mut(handle) else {
                continue;
            };
            base.flags.pressed = false;
            if !controls::internal_mouse(self, handle, MouseEventKind::Up, event) {
                return true;
            }
        }
        false
    }

    fn click(&mut self, button: MouseButton, x: f32, y: f32) -> bool {
        let event = MouseEvent { button: Some(button), x, y };
        let intersecting = self.candidates(x, y).intersecting;
        match intersecting.first() {
            Some(&top) if self.base(top).is_some_and(|b| b.flags.focusable) => self.set_focus(Some(top)),
            _ => self.set_focus(None),
        }
        for handle in intersecting {
            if !self.is_valid(handle) {
                continue;
            }
            if !controls::internal_mouse(self, handle, MouseEventKind::Click, event) {
                return true;
            }
        }
        false
    }

    fn mouse_move(&mut self, x: f32, y: f32) -> bool {
        let event = MouseEvent { button: None, x, y };
        let candidates = self.candidates(x, y);
        let mut consumed = false;
        for handle in candidates.intersecting {
            let Some(base) = self.base_mut(handle) else {
                continue;
            };
            if !base.flags.hovered {
                base.flags.hovered = true;
                if !controls::internal_mouse(self, handle, MouseEventKind::Over, event) {
                    consumed = true;
                    break;
                }
            }
            if self.is_valid(handle) && !controls::internal_mouse(self, handle, MouseEventKind::Move, event) {
                consumed = true;
                break;
            }
        }
        // Mouse-out never blocks.
        for handle in candidates.non_intersecting {
            let Some(base) = self.base_mut(handle) else {
                continue;
            };
            if base.flags.hovered {
                base.flags.hovered = false;
                controls::internal_mouse(self, handle, MouseEventKind::Out, event);
            }
        }
        consumed
    }

    fn drag_begin(&mut self, button: MouseButton, x: f32, y: f32) -> bool {
        let event = MouseEvent { button: Some(button), x, y };
        for handle in self.candidates(x, y).intersecting {
            let Some(base) = self.base_mut(handle) else {
                continue;
            };
            base.flags.dragging = true;
            if !controls::internal_mouse(self, handle, MouseEventKind::DragBegin, event) {
                return true;
            }
        }
        false
    }

    /// Drag and drag-end go only to controls that accepted drag-begin
    /// (dragging bit set), whether or not the pointer still intersects them.
    /// Controls that never saw drag-begin get neither, even when hit.
    fn drag(&mut self, button: MouseButton, x: f32, y: f32, kind: MouseEventKind) -> bool {
        let event = MouseEvent { button: Some(button), x, y };
        let candidates = self.candidates(x, y);
        let dragging: Vec<ControlHandle> = candidates
            .intersecting
            .into_iter()
            .chain(candidates.non_intersecting)
            .filter(|h| self.base(*h).is_some_and(|b| b.flags.dragging))
            .collect();
        let mut consumed = false;
        for handle in dragging {
            if kind == MouseEventKind::DragEnd {
                let Some(base) = self.base_mut(handle) else {
                    continue;
                };
                base.flags.dragging = false;
            } else if !self.is_valid(handle) {
                continue;
            }
            if !consumed && !controls::internal_mouse(self, handle, kind, event) {
                consumed = true;
                if kind == MouseEventKind::Drag {
                    break;
                }
            }
        }
        consumed
    }

    fn key(&mut self, event: KeyEvent) -> bool {
        let Some(focused) = self.focused else {
            return false;
        };
        if !self.is_valid(focused) {
            self.focused = None;
            return false;
        }
        controls::internal_key(self, focused, event);
        true
    }

    pub fn focused(&self) -> Option<ControlHandle> {
        self.focused.filter(|h| self.is_valid(*h))
    }

    /// Moves keyboard focus. Focusing a control that is not focusable, or
    /// not effectively visible and active, clears focus instead.
    pub fn set_focus(&mut self, target: Option<ControlHandle>) {
        let target = target.filter(|h| self.can_focus(*h));
        if target == self.focused {
            return;
        }
        if let Some(previous) = self.focused.take() {
            if self.is_valid(previous) {
                debug!("ui: {:?} lost focus", previous);
                controls::internal_focus_changed(self, previous, false);
                self.fire_focus_callback(previous, FocusSlot::Unfocus);
            }
        }
        if let Some(next) = target {
            // A callback above may have destroyed or hidden the target.
            if !self.can_focus(next) {
                return;
            }
            self.focused = Some(next);
            debug!("ui: {:?} gained focus", next);
            controls::internal_focus_changed(self, next, true);
            self.fire_focus_callback(next, FocusSlot::Focus);
        }
    }

    pub fn clear_focus(&mut self) {
        self.set_focus(None);
    }

    fn can_focus(&self, handle: ControlHandle) -> bool {
        self.base(handle).is_some_and(|b| b.flags.focusable)
            && self.is_effectively_visible(handle)
            && self.is_effectively_active(handle)
    }

    /// Drops focus if the focused control no longer qualifies for it.
    pub(crate) fn revalidate_focus(&mut self) {
        if let Some(focused) = self.focused {
            if !self.can_focus(focused) {
                self.set_focus(None);
            }
        }
    }
}
