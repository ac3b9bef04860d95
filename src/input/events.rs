//! Host events delivered to the UI.

use super::keys::KeyCode;

/// Mouse buttons, with the host's numeric codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub fn code(self) -> u8 {
        match self {
            MouseButton::Left => 0,
            MouseButton::Right => 1,
            MouseButton::Middle => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(MouseButton::Left),
            1 => Some(MouseButton::Right),
            2 => Some(MouseButton::Middle),
            _ => None,
        }
    }
}

/// Modifier keys held while a key event fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
    pub super_key: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        control: false,
        alt: false,
        super_key: false,
    };
    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };
    pub const CONTROL: Modifiers = Modifiers {
        control: true,
        ..Modifiers::NONE
    };
    pub const SUPER: Modifiers = Modifiers {
        super_key: true,
        ..Modifiers::NONE
    };

    /// Control, or super when the platform treats it as control.
    pub fn command(self, super_acts_as_control: bool) -> bool {
        self.control || (super_acts_as_control && self.super_key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipboardKind {
    #[default]
    Text,
}

/// Content delivered by the host in answer to a clipboard request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClipboardContent {
    pub kind: ClipboardKind,
    pub bytes: Vec<u8>,
}

impl ClipboardContent {
    pub fn text(text: &str) -> Self {
        Self {
            kind: ClipboardKind::Text,
            bytes: text.as_bytes().to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The content as text; `None` if it is not valid UTF-8.
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }
}

/// Input and window events, coordinates in pixels from the top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    ButtonPressed { button: MouseButton, x: f32, y: f32 },
    ButtonReleased { button: MouseButton, x: f32, y: f32 },
    ButtonClicked { button: MouseButton, x: f32, y: f32 },
    MouseMoved { x: f32, y: f32 },
    MouseDragBegin { button: MouseButton, x: f32, y: f32 },
    MouseDragged { button: MouseButton, x: f32, y: f32 },
    MouseDragEnd { button: MouseButton, x: f32, y: f32 },
    KeyPressed { key: KeyCode, modifiers: Modifiers },
    KeyReleased { key: KeyCode, modifiers: Modifiers },
    ClipboardPaste(ClipboardContent),
    WindowResized { width: u32, height: u32 },
}
