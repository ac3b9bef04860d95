//! # Haggis UI Prelude
//!
//! Commonly used types of the UI and the editor gizmo in one import.
//!
//! ```rust
//! use haggis_ui::prelude::*;
//!
//! let mut ui = haggis_ui::headless(800.0, 600.0).unwrap();
//! let name = ui.textbox_create("name", InputKind::String, [160.0, 24.0]).unwrap();
//! ui.set_focus(Some(name));
//! assert!(ui.handle_event(&UiEvent::KeyPressed {
//!     key: KeyCode::A,
//!     modifiers: Modifiers::SHIFT,
//! }));
//! assert_eq!(ui.textbox_text(name), Some("A"));
//! ```

// Core UI types
pub use crate::ui::{
    ButtonKind, ButtonSkin, CheckboxState, ControlHandle, ControlKind, InputKind, MouseEvent,
    MouseEventKind, Rect, ScrollAxes, UiServices, UiState,
};

// Editor gizmo
pub use crate::editor::{EditorGizmo, GizmoInteraction, GizmoMode, GizmoOrientation};

// Configuration and errors
pub use crate::config::{GizmoConfig, UiAtlasLayout, UiConfig};
pub use crate::error::{Result, UiError};

// Graphics services
pub use crate::gfx::{
    FixedWidthFont, FontSystem, HeadlessRenderer, OrbitCamera, RenderBackend, RenderList,
    Renderable, TransformHandle, TransformStore,
};

// Host input
pub use crate::input::{Clipboard, KeyCode, MemoryClipboard, Modifiers, MouseButton, UiEvent};

// Common external math types
pub use cgmath::{InnerSpace, Quaternion, Vector3, Zero};
