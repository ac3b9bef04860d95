//! # Frame Driver
//!
//! `update` walks the active list; `render` walks the tree from the root,
//! skipping invisible subtrees, and appends each control's visuals to the
//! frame's [`RenderList`]. A control with a clip mask brackets its children
//! with `ClipBegin`/`ClipEnd`, using a stencil reference unique within the
//! frame so nested masks do not collide.

use cgmath::{Matrix4, Vector3};
use log::{trace, warn};

use crate::gfx::geometry::{generate_quad, AtlasRegion};
use crate::gfx::renderer::{RenderList, Renderable};

use super::controls;
use super::handle::ControlHandle;
use super::state::UiState;

impl UiState {
    /// Runs every active control's update. Returns false if any failed.
    pub fn update(&mut self) -> bool {
        if self.shutting_down {
            return false;
        }
        let snapshot = self.active.clone();
        let mut ok = true;
        for handle in snapshot {
            if self.is_valid(handle) {
                ok &= controls::update_hook(self, handle);
            }
        }
        ok
    }

    /// Appends the visible tree to `list`. Returns false if any control
    /// failed to prepare its visuals; the rest of the frame is still emitted.
    pub fn render(&mut self, list: &mut RenderList) -> bool {
        if self.shutting_down {
            return false;
        }
        self.next_clip_id = 1;
        let root = self.root;
        let ok = self.render_node(root, list, None);
        trace!("ui: frame emitted {} renderables", list.len());
        ok
    }

    fn render_node(&mut self, handle: ControlHandle, list: &mut RenderList, clip: Option<u32>) -> bool {
        if !self.base(handle).is_some_and(|b| b.flags.visible) {
            return true;
        }
        let mut ok = controls::render_hook(self, handle, list, clip);
        let mask = self.begin_clip(handle, list);
        let inner_clip = mask.or(clip);
        for child in self.children(handle).to_vec() {
            ok &= self.render_node(child, list, inner_clip);
        }
        if let Some(reference_id) = mask {
            list.push(Renderable::ClipEnd {
                reference_id,
                restore: clip,
            });
        }
        ok
    }

    /// Emits the control's clip mask, if it has one, and returns its reference.
    fn begin_clip(&mut self, handle: ControlHandle, list: &mut RenderList) -> Option<u32> {
        let world = self.world_matrix(handle)?;
        let renderer = self.services.renderer.clone();
        let reference_id = self.next_clip_id;
        let mask = self.base_mut(handle)?.clip_mask.as_mut()?;

        if mask.dirty || mask.geometry.is_none() {
            let quad = generate_quad(mask.rect.width, mask.rect.height, AtlasRegion::FULL_UV);
            let mut backend = renderer.borrow_mut();
            let uploaded = match mask.geometry.as_mut() {
                Some(range) => quad.load_into(&mut *backend, range),
                None => {
                    mask.geometry = quad.upload(&mut *backend);
                    mask.geometry.is_some()
                }
            };
            if !uploaded {
                warn!("ui: clip mask of {:?} unavailable, children drawn unclipped", handle);
                return None;
            }
            mask.dirty = false;
        }

        let geometry = mask.geometry?;
        mask.reference_id = reference_id;
        let model = world * Matrix4::from_translation(Vector3::new(mask.rect.x, mask.rect.y, 0.0));
        self.next_clip_id += 1;
        list.push(Renderable::ClipBegin {
            reference_id,
            model,
            geometry,
        });
        Some(reference_id)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::UiConfig;
    use crate::gfx::renderer::{RenderList, Renderable};
    use crate::ui::controls::ScrollAxes;
    use crate::ui::state::{UiServices, UiState};
    use crate::ui::text_edit::InputKind;

    fn ui() -> UiState {
        let _ = env_logger::builder().is_test(true).try_init();
        let config = UiConfig::default();
        let services = UiServices::headless(&config);
        UiState::new(config, services, 800.0, 600.0).unwrap()
    }

    #[test]
    fn test_invisible_subtrees_are_skipped() {
        let mut ui = ui();
        let a = ui.panel_create("a", [10.0, 10.0], [1.0; 4]).unwrap();
        let b = ui.panel_create("b", [10.0, 10.0], [1.0; 4]).unwrap();
        ui.add_child(a, b).unwrap();
        let mut list = RenderList::new();
        assert!(ui.render(&mut list));
        assert_eq!(list.ui_entries().count(), 2);

        ui.set_visible(a, false).unwrap();
        list.clear();
        ui.render(&mut list);
        assert_eq!(list.ui_entries().count(), 0);
    }

    #[test]
    fn test_nested_masks_get_distinct_references() {
        let mut ui = ui();
        let outer = ui.scrollable_create("outer", [200.0, 200.0], ScrollAxes::BOTH).unwrap();
        let inner = ui.scrollable_create("inner", [100.0, 100.0], ScrollAxes::BOTH).unwrap();
        let p = ui.panel_create("p", [10.0, 10.0], [1.0; 4]).unwrap();
        ui.scrollable_add_child(outer, inner).unwrap();
        ui.scrollable_add_child(inner, p).unwrap();

        let mut list = RenderList::new();
        assert!(ui.render(&mut list));
        let entries = list.entries();
        let begins: Vec<u32> = entries
            .iter()
            .filter_map(|e| match e {
                Renderable::ClipBegin { reference_id, .. } => Some(*reference_id),
                _ => None,
            })
            .collect();
        assert_eq!(begins, vec![1, 2]);
        let panel = list.ui_entries().next().unwrap();
        assert_eq!(panel.clip_reference, Some(2));
        assert!(matches!(
            entries.last(),
            Some(Renderable::ClipEnd {
                reference_id: 1,
                restore: None
            })
        ));
        assert!(entries.contains(&Renderable::ClipEnd {
            reference_id: 2,
            restore: Some(1)
        }));

        // References restart every frame.
        list.clear();
        ui.render(&mut list);
        assert!(matches!(list.entries().first(), Some(Renderable::ClipBegin { reference_id: 1, .. })));
    }

    #[test]
    fn test_textbox_frame_draws_outside_its_own_mask() {
        let mut ui = ui();
        let t = ui.textbox_create("t", InputKind::String, [100.0, 24.0]).unwrap();
        ui.textbox_set_text(t, "hi").unwrap();
        let mut list = RenderList::new();
        assert!(ui.render(&mut list));
        let clips: Vec<Option<u32>> = list.ui_entries().map(|e| e.clip_reference).collect();
        // Frame, then the label inside the mask (cursor and highlight hidden).
        assert_eq!(clips, vec![None, Some(1)]);
    }
}
