// src/lib.rs
//! Haggis UI
//!
//! A retained-mode 2D UI and a 3D transform gizmo for the Haggis engine.
//! Controls live in typed slot arrays behind generational handles; rendering,
//! fonts, transforms and the clipboard are reached through narrow service
//! interfaces so the whole system runs headless as well as on a GPU.

pub mod config;
pub mod editor;
pub mod error;
pub mod gfx;
pub mod input;
pub mod prelude;
pub mod ui;

// Re-export main types for convenience
pub use config::{GizmoConfig, UiConfig};
pub use editor::EditorGizmo;
pub use error::{Result, UiError};
pub use ui::{ControlHandle, UiServices, UiState};

/// Creates a UI over the bundled headless services.
pub fn headless(width: f32, height: f32) -> Result<UiState> {
    let config = UiConfig::default();
    let services = UiServices::headless(&config);
    UiState::new(config, services, width, height)
}
