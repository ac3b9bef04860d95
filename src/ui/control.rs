//! # Base Control Record
//!
//! Every control variant embeds a [`BaseControl`]: identity, tree links,
//! flags, bounds, user data and user callbacks.

use std::any::Any;
use std::collections::BTreeSet;

use crate::gfx::renderer::GeometryRange;
use crate::gfx::transform::TransformHandle;

use super::callbacks::Callbacks;
use super::handle::{ControlHandle, ControlKind};

/// Axis-aligned rectangle in a control's local pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle at the origin.
    pub fn sized(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Half-open containment: the right and bottom edges are outside.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.width && y < self.y + self.height
    }
}

/// Per-control state bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlFlags {
    pub active: bool,
    pub visible: bool,
    pub hovered: bool,
    pub pressed: bool,
    pub focusable: bool,
    pub dragging: bool,
    pub mouse_interactive: bool,
}

impl Default for ControlFlags {
    fn default() -> Self {
        Self {
            active: true,
            visible: true,
            hovered: false,
            pressed: false,
            focusable: false,
            dragging: false,
            mouse_interactive: true,
        }
    }
}

/// Stencil mask restricting where a control's descendants draw.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipMask {
    /// Stencil reference assigned for the current frame (0 until first render).
    pub reference_id: u32,
    pub rect: Rect,
    pub geometry: Option<GeometryRange>,
    pub dirty: bool,
}

impl ClipMask {
    pub fn new(rect: Rect) -> Self {
        Self {
            reference_id: 0,
            rect,
            geometry: None,
            dirty: true,
        }
    }
}

/// Shared record embedded in every control variant.
pub struct BaseControl {
    pub kind: ControlKind,
    pub handle: ControlHandle,
    pub name: String,
    pub tags: BTreeSet<String>,
    pub transform: TransformHandle,
    pub flags: ControlFlags,
    pub depth: u32,
    pub bounds: Rect,
    pub clip_mask: Option<ClipMask>,
    pub parent: Option<ControlHandle>,
    pub children: Vec<ControlHandle>,
    /// Control that created this one as part of itself (a textbox's label, a
    /// button's caption). Owned children are destroyed with their owner.
    pub owner: Option<ControlHandle>,
    pub user_data: Option<Box<dyn Any>>,
    pub callbacks: Callbacks,
    /// Creation order, the tie-break for equal depths during dispatch.
    pub serial: u64,
}

impl BaseControl {
    pub(crate) fn new(kind: ControlKind, name: &str, transform: TransformHandle, serial: u64) -> Self {
        Self {
            kind,
            handle: ControlHandle::INVALID,
            name: name.to_string(),
            tags: BTreeSet::new(),
            transform,
            flags: ControlFlags::default(),
            depth: 0,
            bounds: Rect::default(),
            clip_mask: None,
            parent: None,
            children: Vec::new(),
            owner: None,
            user_data: None,
            callbacks: Callbacks::default(),
            serial,
        }
    }

    pub fn is_owned_by(&self, owner: ControlHandle) -> bool {
        self.owner == Some(owner)
    }
}

impl std::fmt::Debug for BaseControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaseControl")
            .field("handle", &self.handle)
            .field("name", &self.name)
            .field("depth", &self.depth)
            .field("bounds", &self.bounds)
            .field("flags", &self.flags)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_is_half_open() {
        let rect = Rect::new(10.0, 10.0, 20.0, 5.0);
        assert!(rect.contains(10.0, 10.0));
        assert!(rect.contains(29.9, 14.9));
        assert!(!rect.contains(30.0, 12.0));
        assert!(!rect.contains(15.0, 9.0));
    }
}
