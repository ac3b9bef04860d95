//! # Vertex Data Structures
//!
//! GPU-compatible vertex formats used by the UI and the editor gizmo. Both
//! are `#[repr(C)]` and `Pod`, so they can be uploaded into the shared
//! render buffers as raw bytes with [`bytemuck::cast_slice`].

/// A 2D UI vertex with position and texture coordinates.
///
/// Positions are in the control's local pixel space (top-left origin, y down).
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex2D {
    /// Local position [x, y] in pixels
    pub position: [f32; 2],
    /// Atlas texture coordinates [u, v]
    pub texcoord: [f32; 2],
}

impl Vertex2D {
    pub const SIZE: u64 = std::mem::size_of::<Vertex2D>() as u64;

    pub fn new(x: f32, y: f32, u: f32, v: f32) -> Self {
        Self {
            position: [x, y],
            texcoord: [u, v],
        }
    }
}

/// A 3D vertex carrying a colour, used for gizmo line geometry.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ColourVertex3D {
    /// Position [x, y, z, w]; w is always 1
    pub position: [f32; 4],
    /// Linear RGBA colour
    pub colour: [f32; 4],
}

impl ColourVertex3D {
    pub const SIZE: u64 = std::mem::size_of::<ColourVertex3D>() as u64;

    pub fn new(position: [f32; 3], colour: [f32; 4]) -> Self {
        Self {
            position: [position[0], position[1], position[2], 1.0],
            colour,
        }
    }
}

/// Size in bytes of one index in the shared index buffer.
pub const INDEX_SIZE: u64 = std::mem::size_of::<u32>() as u64;

/// Per-draw data pushed as immediate (push-constant) data before each UI draw.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct UiImmediateData {
    /// World matrix of the control, column-major
    pub model: [[f32; 4]; 4],
    /// Tint colour
    pub colour: [f32; 4],
}
