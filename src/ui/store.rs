//! # Typed Control Arrays
//!
//! Each control kind lives in its own dense [`TypedArray`]. Arrays only grow;
//! destroying a control empties its slot and bumps the slot generation, and
//! the next creation of that kind reuses the lowest free slot before
//! appending a new one.

use super::handle::{next_generation, ControlHandle, ControlKind, MAX_CONTROLS_PER_KIND};

struct Slot<T> {
    generation: u16,
    value: Option<T>,
}

/// Dense per-kind storage addressed by [`ControlHandle`]s.
pub struct TypedArray<T> {
    kind: ControlKind,
    slots: Vec<Slot<T>>,
    live: usize,
}

impl<T> TypedArray<T> {
    pub fn new(kind: ControlKind) -> Self {
        Self {
            kind,
            slots: Vec::new(),
            live: 0,
        }
    }

    pub fn kind(&self) -> ControlKind {
        self.kind
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Total slots ever allocated, free or not.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Stores `value` in the first free slot (appending if none is free).
    ///
    /// The closure receives the handle the value will be reachable under, so
    /// records can embed their own handle. Returns `None` once the kind has
    /// no indices left.
    pub fn insert_with(&mut self, build: impl FnOnce(ControlHandle) -> T) -> Option<ControlHandle> {
        let index = match self.slots.iter().position(|slot| slot.value.is_none()) {
            Some(index) => index,
            None => {
                if self.slots.len() >= MAX_CONTROLS_PER_KIND {
                    return None;
                }
                self.slots.push(Slot {
                    generation: 0,
                    value: None,
                });
                self.slots.len() - 1
            }
        };
        let slot = &mut self.slots[index];
        let handle = ControlHandle::encode(self.kind, index as u16, slot.generation)?;
        slot.value = Some(build(handle));
        self.live += 1;
        Some(handle)
    }

    fn slot_index(&self, handle: ControlHandle) -> Option<usize> {
        let parts = handle.decode()?;
        if parts.kind != self.kind {
            return None;
        }
        let slot = self.slots.get(parts.index as usize)?;
        (slot.generation == parts.generation && slot.value.is_some()).then_some(parts.index as usize)
    }

    pub fn contains(&self, handle: ControlHandle) -> bool {
        self.slot_index(handle).is_some()
    }

    pub fn get(&self, handle: ControlHandle) -> Option<&T> {
        let index = self.slot_index(handle)?;
        self.slots[index].value.as_ref()
    }

    pub fn get_mut(&mut self, handle: ControlHandle) -> Option<&mut T> {
        let index = self.slot_index(handle)?;
        self.slots[index].value.as_mut()
    }

    /// Empties the slot and invalidates every outstanding handle to it.
    pub fn remove(&mut self, handle: ControlHandle) -> Option<T> {
        let index = self.slot_index(handle)?;
        let slot = &mut self.slots[index];
        slot.generation = next_generation(slot.generation);
        self.live -= 1;
        slot.value.take()
    }

    /// Handles of every occupied slot, in index order.
    pub fn handles(&self) -> Vec<ControlHandle> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.value.is_some())
            .filter_map(|(index, slot)| ControlHandle::encode(self.kind, index as u16, slot.generation))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_embeds_own_handle() {
        let mut array = TypedArray::new(ControlKind::Panel);
        let handle = array.insert_with(|h| h).unwrap();
        assert_eq!(*array.get(handle).unwrap(), handle);
        assert_eq!(array.len(), 1);
    }

    #[test]
    fn test_free_slot_is_reused_with_new_generation() {
        let mut array = TypedArray::new(ControlKind::Label);
        let a = array.insert_with(|_| "a").unwrap();
        let b = array.insert_with(|_| "b").unwrap();
        assert_eq!(array.remove(a), Some("a"));

        let c = array.insert_with(|_| "c").unwrap();
        assert_eq!(c.decode().unwrap().index, a.decode().unwrap().index);
        assert_ne!(a, c);
        assert!(array.get(a).is_none());
        assert_eq!(array.get(b), Some(&"b"));
        assert_eq!(array.get(c), Some(&"c"));
        assert_eq!(array.capacity(), 2);
    }

    #[test]
    fn test_wrong_kind_does_not_resolve() {
        let mut array = TypedArray::new(ControlKind::Button);
        let handle = array.insert_with(|_| 1u8).unwrap();
        let parts = handle.decode().unwrap();
        let foreign = ControlHandle::encode(ControlKind::Panel, parts.index, parts.generation).unwrap();
        assert!(array.get(foreign).is_none());
        assert!(array.get(ControlHandle::INVALID).is_none());
    }
}
