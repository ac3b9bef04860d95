//! # Editor Module
//!
//! Editor-side tooling that sits next to the UI: the transform gizmo used to
//! move, rotate and scale the selected object.
//!
//! ```rust
//! use haggis_ui::config::{GizmoConfig, UiConfig};
//! use haggis_ui::editor::{EditorGizmo, GizmoMode};
//! use haggis_ui::gfx::OrbitCamera;
//! use haggis_ui::ui::UiServices;
//! use cgmath::Vector3;
//!
//! let services = UiServices::headless(&UiConfig::default());
//! let selection = services.transforms.borrow_mut().create(0);
//! let camera = OrbitCamera::new(10.0, 0.3, 0.5, Vector3::new(0.0, 0.0, 0.0), 4.0 / 3.0);
//!
//! let mut gizmo = EditorGizmo::new(GizmoConfig::default(), &services);
//! gizmo.load().unwrap();
//! gizmo.set_mode(GizmoMode::Move);
//! gizmo.select(Some(selection));
//! gizmo.update(&camera, 600.0);
//! if let Some(ray) = camera.screen_ray(400.0, 300.0, 800.0, 600.0) {
//!     gizmo.handle_hover(&ray);
//! }
//! ```

pub mod gizmo;
pub mod gizmo_mesh;

pub use gizmo::{
    EditorGizmo, GizmoInteraction, GizmoMode, GizmoOrientation, AXIS_XY, AXIS_XYZ, AXIS_XZ, AXIS_YZ,
};
