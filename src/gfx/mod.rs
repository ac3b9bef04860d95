//! # Graphics Module
//!
//! Graphics-side collaborators of the UI and the editor gizmo.
//!
//! ## Architecture Overview
//!
//! - **Render backend** ([`renderer`]) - the narrow renderer interface, a
//!   headless implementation and the UI render pass
//! - **Transforms** ([`transform`]) - handle-based TRS hierarchy
//! - **Fonts** ([`font`]) - font acquisition, measurement and glyph geometry
//! - **Geometry** ([`geometry`]) - quads, nine-slices and gizmo line meshes
//! - **Camera and picking** ([`camera`], [`picking`]) - orbit camera, rays,
//!   boxes and planes
//!
//! Nothing in here talks to a graphics API directly; hosts plug a real GPU
//! renderer in by implementing [`RenderBackend`].

pub mod camera;
pub mod font;
pub mod geometry;
pub mod picking;
pub mod renderer;
pub mod transform;
pub mod vertex;

// Re-export commonly used types
pub use camera::OrbitCamera;
pub use font::{FixedWidthFont, FontHandle, FontKind, FontSystem};
pub use renderer::{HeadlessRenderer, RenderBackend, RenderList, Renderable};
pub use transform::{TransformHandle, TransformStore};
