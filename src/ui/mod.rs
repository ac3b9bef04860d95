//! # User Interface Module
//!
//! A retained-mode 2D UI: a tree of typed controls owned by [`UiState`],
//! addressed through generational [`ControlHandle`]s, fed host events one at
//! a time and rendered into a [`RenderList`](crate::gfx::renderer::RenderList)
//! each frame.
//!
//! ## Architecture
//!
//! - [`handle`] / [`store`] - handle encoding and per-kind slot storage
//! - [`state`] - the UI container, shared services and generic control API
//! - [`tree`] - parenting, depth, destruction
//! - [`dispatch`] - hit testing, depth-ordered event delivery, focus
//! - [`controls`] - panel, label, button, textbox, scrollable, checkbox,
//!   image box and tree item
//! - [`text_edit`] - the textbox editing model
//! - [`frame`] - per-frame update and render traversal
//!
//! ## Usage
//!
//! ```rust
//! use haggis_ui::config::UiConfig;
//! use haggis_ui::gfx::renderer::RenderList;
//! use haggis_ui::input::{MouseButton, UiEvent};
//! use haggis_ui::ui::{UiServices, UiState};
//!
//! let config = UiConfig::default();
//! let services = UiServices::headless(&config);
//! let mut ui = UiState::new(config, services, 800.0, 600.0).unwrap();
//!
//! let ok = ui.button_create_text("ok", "OK", [80.0, 24.0]).unwrap();
//! ui.set_on_click(ok, |_, _, _| {
//!     println!("clicked");
//!     false
//! });
//! ui.handle_event(&UiEvent::ButtonClicked { button: MouseButton::Left, x: 10.0, y: 10.0 });
//!
//! let mut frame = RenderList::new();
//! ui.update();
//! ui.render(&mut frame);
//! ```

pub mod callbacks;
pub mod control;
pub mod controls;
pub mod dispatch;
pub mod frame;
pub mod handle;
pub mod state;
pub mod store;
pub mod text_edit;
pub mod tree;

#[cfg(test)]
mod scenario_tests;

pub use callbacks::{KeyEvent, MouseEvent, MouseEventKind};
pub use control::{BaseControl, ClipMask, ControlFlags, Rect};
pub use controls::{ButtonKind, ButtonSkin, CheckboxState, ScrollAxes};
pub use handle::{ControlHandle, ControlKind};
pub use state::{UiServices, UiState};
pub use text_edit::{EditOutcome, HighlightRange, InputKind, TextEditState};
