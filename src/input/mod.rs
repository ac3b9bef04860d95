//! # Input Module
//!
//! Host-facing input types: the [`UiEvent`]s the UI consumes, key codes with
//! their US-layout text mapping, the clipboard interface, and an adapter
//! that turns `winit` window events into UI events.

pub mod clipboard;
pub mod events;
pub mod keys;
pub mod winit_adapter;

pub use clipboard::{Clipboard, MemoryClipboard};
pub use events::{ClipboardContent, ClipboardKind, Modifiers, MouseButton, UiEvent};
pub use keys::KeyCode;
pub use winit_adapter::WinitInputTranslator;
