//! Translation of `winit` window events into [`UiEvent`]s.
//!
//! winit reports raw presses, releases and cursor motion. The UI also wants
//! clicks and drags, so the translator tracks the pressed button and the
//! press position: moving further than the drag threshold while pressed
//! begins a drag, and releasing without having dragged produces a click.

use log::trace;
use winit::{
    event::{ElementState, KeyEvent, MouseButton as WinitButton, WindowEvent},
    keyboard::{KeyCode as WinitKey, ModifiersState, PhysicalKey},
};

use super::{KeyCode, Modifiers, MouseButton, UiEvent};

pub struct WinitInputTranslator {
    cursor: (f32, f32),
    modifiers: Modifiers,
    pressed: Option<(MouseButton, (f32, f32))>,
    dragging: bool,
    drag_threshold: f32,
}

impl WinitInputTranslator {
    pub fn new(drag_threshold: f32) -> Self {
        Self {
            cursor: (0.0, 0.0),
            modifiers: Modifiers::NONE,
            pressed: None,
            dragging: false,
            drag_threshold,
        }
    }

    pub fn cursor(&self) -> (f32, f32) {
        self.cursor
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Converts one window event. Most events map to zero or one UI event;
    /// a release can produce a release plus a click or drag end.
    pub fn translate(&mut self, event: &WindowEvent) -> Vec<UiEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(position.x as f32, position.y as f32)
            }
            WindowEvent::MouseInput { state, button, .. } => match map_button(*button) {
                Some(button) => self.mouse_input(button, *state == ElementState::Pressed),
                None => Vec::new(),
            },
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers_changed(modifiers.state());
                Vec::new()
            }
            WindowEvent::KeyboardInput { event, .. } => self.keyboard_input(event),
            WindowEvent::Resized(size) => vec![UiEvent::WindowResized {
                width: size.width,
                height: size.height,
            }],
            _ => Vec::new(),
        }
    }

    pub fn cursor_moved(&mut self, x: f32, y: f32) -> Vec<UiEvent> {
        self.cursor = (x, y);
        let mut events = vec![UiEvent::MouseMoved { x, y }];
        if let Some((button, (px, py))) = self.pressed {
            if !self.dragging {
                let (dx, dy) = (x - px, y - py);
                if (dx * dx + dy * dy).sqrt() > self.drag_threshold {
                    trace!("input: drag begins at ({}, {})", px, py);
                    self.dragging = true;
                    events.push(UiEvent::MouseDragBegin { button, x: px, y: py });
                }
            }
            if self.dragging {
                events.push(UiEvent::MouseDragged { button, x, y });
            }
        }
        events
    }

    pub fn mouse_input(&mut self, button: MouseButton, pressed: bool) -> Vec<UiEvent> {
        let (x, y) = self.cursor;
        if pressed {
            if self.pressed.is_none() {
                self.pressed = Some((button, (x, y)));
                self.dragging = false;
            }
            return vec![UiEvent::ButtonPressed { button, x, y }];
        }

        let mut events = vec![UiEvent::ButtonReleased { button, x, y }];
        if let Some((held, _)) = self.pressed {
            if held == button {
                if self.dragging {
                    events.push(UiEvent::MouseDragEnd { button, x, y });
                } else {
                    events.push(UiEvent::ButtonClicked { button, x, y });
                }
                self.pressed = None;
                self.dragging = false;
            }
        }
        events
    }

    pub fn modifiers_changed(&mut self, state: ModifiersState) {
        self.modifiers = Modifiers {
            shift: state.shift_key(),
            control: state.control_key(),
            alt: state.alt_key(),
            super_key: state.super_key(),
        };
    }

    fn keyboard_input(&mut self, event: &KeyEvent) -> Vec<UiEvent> {
        let PhysicalKey::Code(code) = event.physical_key else {
            return Vec::new();
        };
        self.key_input(code, event.state == ElementState::Pressed)
    }

    pub fn key_input(&mut self, code: WinitKey, pressed: bool) -> Vec<UiEvent> {
        let Some(key) = map_key(code) else {
            return Vec::new();
        };
        let modifiers = self.modifiers;
        if pressed {
            vec![UiEvent::KeyPressed { key, modifiers }]
        } else {
            vec![UiEvent::KeyReleased { key, modifiers }]
        }
    }
}

impl Default for WinitInputTranslator {
    fn default() -> Self {
        Self::new(4.0)
    }
}

fn map_button(button: WinitButton) -> Option<MouseButton> {
    match button {
        WinitButton::Left => Some(MouseButton::Left),
        WinitButton::Right => Some(MouseButton::Right),
        WinitButton::Middle => Some(MouseButton::Middle),
        _ => None,
    }
}

/// Maps a physical winit key to a UI key code.
pub fn map_key(code: WinitKey) -> Option<KeyCode> {
    let key = match code {
        WinitKey::KeyA => KeyCode::A,
        WinitKey::KeyB => KeyCode::B,
        WinitKey::KeyC => KeyCode::C,
        WinitKey::KeyD => KeyCode::D,
        WinitKey::KeyE => KeyCode::E,
        WinitKey::KeyF => KeyCode::F,
        WinitKey::KeyG => KeyCode::G,
        WinitKey::KeyH => KeyCode::H,
        WinitKey::KeyI => KeyCode::I,
        WinitKey::KeyJ => KeyCode::J,
        WinitKey::KeyK => KeyCode::K,
        WinitKey::KeyL => KeyCode::L,
        WinitKey::KeyM => KeyCode::M,
        WinitKey::KeyN => KeyCode::N,
        WinitKey::KeyO => KeyCode::O,
        WinitKey::KeyP => KeyCode::P,
        WinitKey::KeyQ => KeyCode::Q,
        WinitKey::KeyR => KeyCode::R,
        WinitKey::KeyS => KeyCode::S,
        WinitKey::KeyT => KeyCode::T,
        WinitKey::KeyU => KeyCode::U,
        WinitKey::KeyV => KeyCode::V,
        WinitKey::KeyW => KeyCode::W,
        WinitKey::KeyX => KeyCode::X,
        WinitKey::KeyY => KeyCode::Y,
        WinitKey::KeyZ => KeyCode::Z,
        WinitKey::Digit0 | WinitKey::Numpad0 => KeyCode::Num0,
        WinitKey::Digit1 | WinitKey::Numpad1 => KeyCode::Num1,
        WinitKey::Digit2 | WinitKey::Numpad2 => KeyCode::Num2,
        WinitKey::Digit3 | WinitKey::Numpad3 => KeyCode::Num3,
        WinitKey::Digit4 | WinitKey::Numpad4 => KeyCode::Num4,
        WinitKey::Digit5 | WinitKey::Numpad5 => KeyCode::Num5,
        WinitKey::Digit6 | WinitKey::Numpad6 => KeyCode::Num6,
        WinitKey::Digit7 | WinitKey::Numpad7 => KeyCode::Num7,
        WinitKey::Digit8 | WinitKey::Numpad8 => KeyCode::Num8,
        WinitKey::Digit9 | WinitKey::Numpad9 => KeyCode::Num9,
        WinitKey::Space => KeyCode::Space,
        WinitKey::Backspace => KeyCode::Backspace,
        WinitKey::Delete => KeyCode::Delete,
        WinitKey::Enter | WinitKey::NumpadEnter => KeyCode::Enter,
        WinitKey::Tab => KeyCode::Tab,
        WinitKey::ArrowLeft => KeyCode::Left,
        WinitKey::ArrowRight => KeyCode::Right,
        WinitKey::ArrowUp => KeyCode::Up,
        WinitKey::ArrowDown => KeyCode::Down,
        WinitKey::Home => KeyCode::Home,
        WinitKey::End => KeyCode::End,
        WinitKey::PageUp => KeyCode::PageUp,
        WinitKey::PageDown => KeyCode::PageDown,
        WinitKey::Escape => KeyCode::Escape,
        WinitKey::ShiftLeft => KeyCode::LShift,
        WinitKey::ShiftRight => KeyCode::RShift,
        WinitKey::ControlLeft => KeyCode::LControl,
        WinitKey::ControlRight => KeyCode::RControl,
        WinitKey::SuperLeft => KeyCode::LSuper,
        WinitKey::SuperRight => KeyCode::RSuper,
        WinitKey::Minus | WinitKey::NumpadSubtract => KeyCode::Minus,
        WinitKey::Equal => KeyCode::Equal,
        WinitKey::Period | WinitKey::NumpadDecimal => KeyCode::Period,
        WinitKey::Comma => KeyCode::Comma,
        WinitKey::Slash => KeyCode::Slash,
        WinitKey::Quote => KeyCode::Quote,
        WinitKey::Semicolon => KeyCode::Semicolon,
        WinitKey::BracketLeft => KeyCode::LBracket,
        WinitKey::BracketRight => KeyCode::RBracket,
        WinitKey::Backslash => KeyCode::Backslash,
        _ => return None,
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_release_without_motion_clicks() {
        let mut translator = WinitInputTranslator::new(4.0);
        translator.cursor_moved(10.0, 10.0);
        translator.mouse_input(MouseButton::Left, true);
        let events = translator.mouse_input(MouseButton::Left, false);
        assert_eq!(
            events,
            vec![
                UiEvent::ButtonReleased { button: MouseButton::Left, x: 10.0, y: 10.0 },
                UiEvent::ButtonClicked { button: MouseButton::Left, x: 10.0, y: 10.0 },
            ]
        );
    }

    #[test]
    fn test_motion_past_threshold_drags() {
        let mut translator = WinitInputTranslator::new(4.0);
        translator.mouse_input(MouseButton::Left, true);
        assert_eq!(translator.cursor_moved(2.0, 0.0).len(), 1);
        let events = translator.cursor_moved(10.0, 0.0);
        assert_eq!(
            events[1],
            UiEvent::MouseDragBegin { button: MouseButton::Left, x: 0.0, y: 0.0 }
        );
        assert_eq!(
            events[2],
            UiEvent::MouseDragged { button: MouseButton::Left, x: 10.0, y: 0.0 }
        );
        let released = translator.mouse_input(MouseButton::Left, false);
        assert_eq!(
            released[1],
            UiEvent::MouseDragEnd { button: MouseButton::Left, x: 10.0, y: 0.0 }
        );
    }

    #[test]
    fn test_keys_carry_modifiers() {
        let mut translator = WinitInputTranslator::default();
        translator.modifiers_changed(ModifiersState::SHIFT);
        assert_eq!(
            translator.key_input(WinitKey::KeyH, true),
            vec![UiEvent::KeyPressed { key: KeyCode::H, modifiers: Modifiers::SHIFT }]
        );
        assert!(translator.key_input(WinitKey::F13, true).is_empty());
    }
}
