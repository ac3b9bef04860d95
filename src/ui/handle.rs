//! # Control Handles
//!
//! Every live control is addressed by a [`ControlHandle`], an opaque 32-bit
//! value. The lower half stores the slot index inside the per-kind dense
//! array; the upper half stores the [`ControlKind`] tag together with the
//! generation of the slot at the time the handle was issued.
//!
//! ```text
//!  31    28 27          16 15                0
//! +--------+--------------+------------------+
//! |  kind  |  generation  |      index       |
//! +--------+--------------+------------------+
//! ```
//!
//! Freeing a slot bumps its generation, so a handle kept around after its
//! control was destroyed no longer resolves even if the slot is reused.

use std::fmt;

/// Number of bits reserved for the slot generation.
pub const GENERATION_BITS: u32 = 12;

/// Generations wrap at this value.
pub const GENERATION_LIMIT: u16 = 1 << GENERATION_BITS;

/// Largest number of live controls of a single kind.
///
/// Index `0xFFFF` is never issued and `0xFFFE` is kept back so that no valid
/// handle can ever collide with the invalid sentinel.
pub const MAX_CONTROLS_PER_KIND: usize = 65_534;

const INDEX_MASK: u32 = 0xFFFF;
const GENERATION_MASK: u32 = (1 << GENERATION_BITS) - 1;
const KIND_SHIFT: u32 = 16 + GENERATION_BITS;

/// Control variant tag stored in the upper bits of a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ControlKind {
    /// Plain container with no visuals (the root, scroll wrappers, tree containers).
    Base,
    Panel,
    Label,
    Button,
    Textbox,
    Scrollable,
    Checkbox,
    ImageBox,
    TreeItem,
}

impl ControlKind {
    /// All kinds, in tag order.
    pub const ALL: [ControlKind; 9] = [
        ControlKind::Base,
        ControlKind::Panel,
        ControlKind::Label,
        ControlKind::Button,
        ControlKind::Textbox,
        ControlKind::Scrollable,
        ControlKind::Checkbox,
        ControlKind::ImageBox,
        ControlKind::TreeItem,
    ];

    fn tag(self) -> u32 {
        self as u32
    }

    fn from_tag(tag: u32) -> Option<Self> {
        Self::ALL.get(tag as usize).copied()
    }

    /// Human readable name used in logs.
    pub fn name(self) -> &'static str {
        match self {
            ControlKind::Base => "base",
            ControlKind::Panel => "panel",
            ControlKind::Label => "label",
            ControlKind::Button => "button",
            ControlKind::Textbox => "textbox",
            ControlKind::Scrollable => "scrollable",
            ControlKind::Checkbox => "checkbox",
            ControlKind::ImageBox => "image_box",
            ControlKind::TreeItem => "tree_item",
        }
    }
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decoded contents of a valid handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleParts {
    pub kind: ControlKind,
    pub index: u16,
    pub generation: u16,
}

/// Opaque identifier for a control.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlHandle(u32);

impl ControlHandle {
    /// The invalid sentinel. Never resolves.
    pub const INVALID: ControlHandle = ControlHandle(u32::MAX);

    /// Packs a kind, slot index and generation into a handle.
    ///
    /// Returns `None` when the index is outside the range a kind may use.
    pub fn encode(kind: ControlKind, index: u16, generation: u16) -> Option<Self> {
        if index as usize >= MAX_CONTROLS_PER_KIND {
            return None;
        }
        let generation = u32::from(generation) & GENERATION_MASK;
        Some(Self(
            (kind.tag() << KIND_SHIFT) | (generation << 16) | u32::from(index),
        ))
    }

    /// Unpacks the handle, failing on the invalid sentinel or a corrupted tag.
    pub fn decode(self) -> Option<HandleParts> {
        if self == Self::INVALID {
            return None;
        }
        let index = (self.0 & INDEX_MASK) as u16;
        if index as usize >= MAX_CONTROLS_PER_KIND {
            return None;
        }
        let kind = ControlKind::from_tag(self.0 >> KIND_SHIFT)?;
        let generation = ((self.0 >> 16) & GENERATION_MASK) as u16;
        Some(HandleParts {
            kind,
            index,
            generation,
        })
    }

    pub fn is_valid(self) -> bool {
        self.decode().is_some()
    }

    /// Variant tag, if the handle decodes.
    pub fn kind(self) -> Option<ControlKind> {
        self.decode().map(|parts| parts.kind)
    }

    /// Raw 32-bit value, for hosts that need to stash handles in plain data.
    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }
}

impl Default for ControlHandle {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Debug for ControlHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.decode() {
            Some(parts) => write!(
                f,
                "ControlHandle({}#{}@g{})",
                parts.kind, parts.index, parts.generation
            ),
            None => f.write_str("ControlHandle(INVALID)"),
        }
    }
}

/// Next generation for a slot that is being freed.
pub(crate) fn next_generation(generation: u16) -> u16 {
    (generation + 1) % GENERATION_LIMIT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_all_kinds() {
        for kind in ControlKind::ALL {
            let handle = ControlHandle::encode(kind, 1234, 77).unwrap();
            let parts = handle.decode().unwrap();
            assert_eq!(parts.kind, kind);
            assert_eq!(parts.index, 1234);
            assert_eq!(parts.generation, 77);
        }
    }

    #[test]
    fn test_invalid_sentinel() {
        assert!(ControlHandle::INVALID.decode().is_none());
        assert!(!ControlHandle::default().is_valid());
    }

    #[test]
    fn test_index_range_is_enforced() {
        assert!(ControlHandle::encode(ControlKind::Panel, 65_533, 0).is_some());
        assert!(ControlHandle::encode(ControlKind::Panel, 65_534, 0).is_none());
        assert!(ControlHandle::encode(ControlKind::Panel, u16::MAX, 0).is_none());
    }

    #[test]
    fn test_generation_distinguishes_handles() {
        let a = ControlHandle::encode(ControlKind::Label, 3, 0).unwrap();
        let b = ControlHandle::encode(ControlKind::Label, 3, next_generation(0)).unwrap();
        assert_ne!(a, b);
        assert_eq!(next_generation(GENERATION_LIMIT - 1), 0);
    }
}
