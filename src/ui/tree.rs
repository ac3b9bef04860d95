//! # Control Tree
//!
//! Parent/child links, depth propagation and control destruction.
//!
//! Destroying a control destroys the children it owns (a textbox's label,
//! a scrollable's content wrapper) and hands every other child to the
//! nearest ancestor that survives the destruction.

use log::{debug, info, warn};

use crate::error::{Result, UiError};

use super::controls::{self, ControlArrays};
use super::handle::ControlHandle;
use super::state::UiState;

impl UiState {
    /// Makes `child` the last child of `parent`, detaching it from its previous
    /// parent. An invalid `parent` means the root.
    pub fn add_child(&mut self, parent: ControlHandle, child: ControlHandle) -> Result<()> {
        if child == self.root {
            return Err(UiError::RootImmutable);
        }
        if !self.is_valid(child) {
            warn!("ui add_child: invalid child {:?}", child);
            return Err(UiError::InvalidHandle(child));
        }
        let parent = if self.is_valid(parent) { parent } else { self.root };
        if parent == child || self.is_ancestor(child, parent) {
            return Err(UiError::ContractViolation(format!(
                "attaching {:?} under {:?} would form a cycle",
                child, parent
            )));
        }

        self.detach(child);

        let (parent_depth, parent_transform) = {
            let base = self.base_mut_or_err(parent)?;
            base.children.push(child);
            (base.depth, base.transform)
        };
        let child_transform = {
            let base = self.base_mut_or_err(child)?;
            base.parent = Some(parent);
            base.transform
        };
        self.services
            .transforms
            .borrow_mut()
            .parent_set(child_transform, Some(parent_transform));
        self.set_depth_recursive(child, parent_depth + 1);
        self.revalidate_focus();
        Ok(())
    }

    /// Unlinks `child` from `parent` without destroying it. The child keeps
    /// its own subtree but no longer reaches the root until re-attached.
    pub fn remove_child(&mut self, parent: ControlHandle, child: ControlHandle) -> Result<()> {
        let listed = self.base_or_err(parent)?.children.contains(&child);
        if !listed || self.base_or_err(child)?.parent != Some(parent) {
            return Err(UiError::ContractViolation(format!(
                "{:?} is not a child of {:?}",
                child, parent
            )));
        }
        self.detach(child);
        self.set_depth_recursive(child, 0);
        self.revalidate_focus();
        Ok(())
    }

    /// True if `ancestor` is `handle`'s parent, grandparent, and so on.
    pub fn is_ancestor(&self, ancestor: ControlHandle, handle: ControlHandle) -> bool {
        let mut cursor = self.parent(handle);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Every control below `handle`, depth-first, children in order.
    pub fn descendants(&self, handle: ControlHandle) -> Vec<ControlHandle> {
        let mut out = Vec::new();
        let mut stack: Vec<ControlHandle> = self.children(handle).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev());
        }
        out
    }

    fn detach(&mut self, child: ControlHandle) {
        let Some(base) = self.base_mut(child) else {
            return;
        };
        let old_parent = base.parent.take();
        let transform = base.transform;
        if let Some(old_parent) = old_parent {
            if let Some(parent) = self.base_mut(old_parent) {
                parent.children.retain(|c| *c != child);
            }
        }
        self.services.transforms.borrow_mut().parent_set(transform, None);
    }

    fn set_depth_recursive(&mut self, handle: ControlHandle, depth: u32) {
        let mut stack = vec![(handle, depth)];
        while let Some((current, depth)) = stack.pop() {
            let Some(base) = self.base_mut(current) else {
                continue;
            };
            base.depth = depth;
            stack.extend(base.children.iter().map(|c| (*c, depth + 1)));
        }
    }

    /// Destroys a control. Owned children go with it; other children are
    /// reparented to the nearest surviving ancestor.
    pub fn destroy(&mut self, handle: ControlHandle) -> Result<()> {
        if handle == self.root {
            return Err(UiError::RootImmutable);
        }
        if !self.is_valid(handle) {
            warn!("ui destroy: invalid handle {:?}", handle);
            return Err(UiError::InvalidHandle(handle));
        }
        let mut dying = Vec::new();
        self.destroy_inner(handle, &mut dying);
        Ok(())
    }

    fn destroy_inner(&mut self, handle: ControlHandle, dying: &mut Vec<ControlHandle>) {
        dying.push(handle);
        let children = self.children(handle).to_vec();
        for child in children {
            let owned = self.base(child).is_some_and(|b| b.is_owned_by(handle));
            if owned {
                self.destroy_inner(child, dying);
                continue;
            }
            match self.surviving_ancestor(handle, dying) {
                Some(target) => {
                    if let Err(err) = self.add_child(target, child) {
                        warn!("ui destroy: could not reparent {:?}: {}", child, err);
                    }
                }
                None => {
                    self.detach(child);
                    self.set_depth_recursive(child, 0);
                }
            }
        }

        controls::destroy_hook(self, handle);

        self.detach(handle);
        if let Some(name) = self.base(handle).map(|b| b.name.clone()) {
            self.name_remove(&name, handle);
        }
        self.lists_remove(handle);
        if self.focused == Some(handle) {
            debug!("ui: focused control {:?} destroyed, focus cleared", handle);
            self.focused = None;
        }
        if self.pending_paste == Some(handle) {
            self.pending_paste = None;
        }
        if let Some(transform) = self.base(handle).map(|b| b.transform) {
            self.services.transforms.borrow_mut().destroy(transform);
        }
        self.controls.remove(handle);
        debug!("ui: destroyed {:?}", handle);
    }

    fn surviving_ancestor(&self, handle: ControlHandle, dying: &[ControlHandle]) -> Option<ControlHandle> {
        let mut cursor = self.parent(handle);
        while let Some(current) = cursor {
            if !dying.contains(&current) {
                return Some(current);
            }
            cursor = self.parent(current);
        }
        None
    }

    /// Releases every control's resources and empties the UI, root included.
    /// Children are not reparented; the state holds no controls afterwards.
    pub fn shutdown(&mut self) {
        if self.shutting_down {
            return;
        }
        self.shutting_down = true;
        let handles = self.controls.all_handles();
        info!("ui shutting down, releasing {} controls", handles.len());
        for handle in &handles {
            controls::destroy_hook(self, *handle);
            if let Some(transform) = self.base(*handle).map(|b| b.transform) {
                self.services.transforms.borrow_mut().destroy(transform);
            }
        }
        self.controls = ControlArrays::new();
        self.active.clear();
        self.inactive.clear();
        self.clear_name_lookup();
        self.focused = None;
        self.pending_paste = None;
        self.root = ControlHandle::INVALID;
        let font = self.default_font;
        self.services.fonts.borrow_mut().release(font);
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutting_down
    }

    /// Checks the structural invariants of the tree: every control reaches
    /// the root through parents that list it exactly once, depths count the
    /// hops to the root, and the active/inactive lists match the flags.
    pub fn validate_tree(&self) -> Result<()> {
        let violation = |msg: String| Err(UiError::ContractViolation(msg));
        for &handle in self.active.iter().chain(self.inactive.iter()) {
            let Some(base) = self.base(handle) else {
                return violation(format!("{:?} is listed but not live", handle));
            };
            if base.handle != handle {
                return violation(format!("{:?} resolves to {:?}", handle, base.handle));
            }
            if self.active.contains(&handle) != base.flags.active {
                return violation(format!("{:?} is in the wrong activity list", handle));
            }
            if handle == self.root {
                if base.parent.is_some() || base.depth != 0 {
                    return violation("root has a parent or non-zero depth".to_string());
                }
                continue;
            }
            let Some(parent) = base.parent else {
                // Detached by remove_child: depth restarts at zero.
                continue;
            };
            let Some(parent_base) = self.base(parent) else {
                return violation(format!("{:?} has a dead parent", handle));
            };
            let listed = parent_base.children.iter().filter(|c| **c == handle).count();
            if listed != 1 {
                return violation(format!("{:?} is listed {} times by its parent", handle, listed));
            }
            if base.depth != parent_base.depth + 1 {
                return violation(format!("{:?} has depth {} under depth {}", handle, base.depth, parent_base.depth));
            }
            if self.is_ancestor(handle, handle) {
                return violation(format!("{:?} is its own ancestor", handle));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::config::UiConfig;
    use crate::ui::state::UiServices;

    fn ui() -> UiState {
        let _ = env_logger::builder().is_test(true).try_init();
        let config = UiConfig::default();
        let services = UiServices::headless(&config);
        UiState::new(config, services, 800.0, 600.0).unwrap()
    }

    fn panel(ui: &mut UiState, name: &str) -> ControlHandle {
        ui.panel_create(name, [10.0, 10.0], [1.0; 4]).unwrap()
    }

    #[test]
    fn test_create_attaches_to_root() {
        let mut ui = ui();
        let a = panel(&mut ui, "a");
        assert_eq!(ui.parent(a), Some(ui.root()));
        assert_eq!(ui.depth(a), Some(1));
        assert_eq!(ui.base(a).unwrap().handle, a);
    }

    #[test]
    fn test_reparent_updates_subtree_depths() {
        let mut ui = ui();
        let a = panel(&mut ui, "a");
        let b = panel(&mut ui, "b");
        let c = panel(&mut ui, "c");
        ui.add_child(b, c).unwrap();
        ui.add_child(a, b).unwrap();
        assert_eq!(ui.depth(b), Some(2));
        assert_eq!(ui.depth(c), Some(3));
        assert_eq!(ui.children(ui.root()), &[a]);
        ui.validate_tree().unwrap();
    }

    #[test]
    fn test_cycles_are_rejected() {
        let mut ui = ui();
        let a = panel(&mut ui, "a");
        let b = panel(&mut ui, "b");
        ui.add_child(a, b).unwrap();
        assert!(matches!(ui.add_child(b, a), Err(UiError::ContractViolation(_))));
        assert!(matches!(ui.add_child(a, a), Err(UiError::ContractViolation(_))));
        assert_eq!(ui.add_child(a, ui.root()), Err(UiError::RootImmutable));
    }

    #[test]
    fn test_invalid_parent_means_root() {
        let mut ui = ui();
        let a = panel(&mut ui, "a");
        let b = panel(&mut ui, "b");
        ui.add_child(a, b).unwrap();
        ui.add_child(ControlHandle::INVALID, b).unwrap();
        assert_eq!(ui.parent(b), Some(ui.root()));
        assert_eq!(ui.depth(b), Some(1));
    }

    #[test]
    fn test_destroy_reparents_to_grandparent() {
        let mut ui = ui();
        let a = panel(&mut ui, "a");
        let b = panel(&mut ui, "b");
        let c = panel(&mut ui, "c");
        ui.add_child(a, b).unwrap();
        ui.add_child(b, c).unwrap();
        ui.destroy(b).unwrap();
        assert!(!ui.is_valid(b));
        assert_eq!(ui.parent(c), Some(a));
        assert_eq!(ui.depth(c), Some(2));
        assert_eq!(ui.find_by_name("b"), None);
        ui.validate_tree().unwrap();
    }

    #[test]
    fn test_stale_handle_after_slot_reuse() {
        let mut ui = ui();
        let a = panel(&mut ui, "a");
        ui.destroy(a).unwrap();
        let b = panel(&mut ui, "b");
        assert_eq!(a.decode().unwrap().index, b.decode().unwrap().index);
        assert!(!ui.is_valid(a));
        assert_eq!(ui.destroy(a), Err(UiError::InvalidHandle(a)));
        assert_eq!(ui.destroy(ui.root()), Err(UiError::RootImmutable));
    }

    #[test]
    fn test_remove_child_detaches() {
        let mut ui = ui();
        let a = panel(&mut ui, "a");
        let b = panel(&mut ui, "b");
        ui.add_child(a, b).unwrap();
        ui.remove_child(a, b).unwrap();
        assert_eq!(ui.parent(b), None);
        assert!(!ui.is_effectively_visible(b));
        assert!(matches!(ui.remove_child(a, b), Err(UiError::ContractViolation(_))));
        ui.add_child(a, b).unwrap();
        assert!(ui.is_effectively_visible(b));
    }

    #[test]
    fn test_shutdown_releases_everything() {
        let mut ui = ui();
        let a = panel(&mut ui, "a");
        let _ = ui.label_create("l", "hello").unwrap();
        ui.shutdown();
        assert!(!ui.is_valid(a));
        assert_eq!(ui.control_count(), 0);
        assert!(ui.services().transforms.borrow().is_empty());
    }

    #[test]
    fn test_random_reparenting_keeps_invariants() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut ui = ui();
        let mut handles: Vec<ControlHandle> = (0..40).map(|i| panel(&mut ui, &format!("p{}", i))).collect();

        for _ in 0..400 {
            let child = handles[rng.random_range(0..handles.len())];
            let parent = handles[rng.random_range(0..handles.len())];
            let old_parent = ui.parent(child).unwrap();
            let mut subtree: Vec<(ControlHandle, u32)> = ui
                .descendants(child)
                .into_iter()
                .map(|d| (d, ui.depth(d).unwrap()))
                .collect();
            subtree.push((child, ui.depth(child).unwrap()));

            match ui.add_child(parent, child) {
                Ok(()) => {
                    // Neither parent lies inside the moved subtree, so their depths are unchanged.
                    let shift = ui.depth(parent).unwrap() as i64 - ui.depth(old_parent).unwrap() as i64;
                    for (d, depth) in subtree {
                        assert_eq!(ui.depth(d).unwrap() as i64, depth as i64 + shift);
                    }
                }
                Err(UiError::ContractViolation(_)) => {
                    assert!(parent == child || ui.is_ancestor(child, parent));
                }
                Err(other) => panic!("unexpected error {other}"),
            }

            if rng.random_bool(0.05) && handles.len() > 5 {
                let victim = handles.swap_remove(rng.random_range(0..handles.len()));
                ui.destroy(victim).unwrap();
            }
            ui.validate_tree().unwrap();
        }
    }
}
