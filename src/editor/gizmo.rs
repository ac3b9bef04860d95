//! # Editor Gizmo
//!
//! A 3D manipulator for the selected transform. The gizmo keeps a constant
//! on-screen size, highlights the axis, plane or ring under the pointer, and
//! turns pointer drags into axis-constrained translation, rotation or scale
//! by raycasting against an interaction plane through its origin.
//!
//! Pointer input arrives as world-space [`Ray`]s; hosts build them with
//! [`OrbitCamera::screen_ray`].

use std::cell::RefCell;
use std::rc::Rc;

use cgmath::{InnerSpace, Matrix4, One, Quaternion, Rad, Rotation, Rotation3, SquareMatrix, Vector3};
use log::{debug, trace, warn};

use crate::config::GizmoConfig;
use crate::error::{Result, UiError};
use crate::gfx::camera::OrbitCamera;
use crate::gfx::picking::{Plane, Ray};
use crate::gfx::renderer::{GizmoRenderable, RenderBackend, RenderList, Renderable};
use crate::gfx::transform::{TransformHandle, TransformStore};
use crate::ui::UiServices;

use super::gizmo_mesh::{pick_ring, unit, GizmoMesh};

/// Transform user tag marking the gizmo's own transform.
const GIZMO_TRANSFORM_TAG: u64 = u64::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GizmoMode {
    None,
    Move,
    Rotate,
    Scale,
}

impl GizmoMode {
    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GizmoOrientation {
    Global,
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GizmoInteraction {
    None,
    Hover,
    Drag,
}

/// Axis indices: 0-2 single axes (or rings), 3-5 the xy/xz/yz planes, 6 all axes.
pub const AXIS_XY: usize = 3;
pub const AXIS_XZ: usize = 4;
pub const AXIS_YZ: usize = 5;
pub const AXIS_XYZ: usize = 6;

pub struct EditorGizmo {
    config: GizmoConfig,
    transforms: Rc<RefCell<TransformStore>>,
    renderer: Rc<RefCell<dyn RenderBackend>>,
    transform: TransformHandle,
    selected: Option<TransformHandle>,
    mode: GizmoMode,
    orientation: GizmoOrientation,
    interaction: GizmoInteraction,
    current_axis: Option<usize>,
    /// Indexed by [`GizmoMode`].
    meshes: [GizmoMesh; 4],
    world_scale: f32,
    interaction_plane: Option<Plane>,
    interaction_start: Vector3<f32>,
    last_interaction: Vector3<f32>,
}

impl EditorGizmo {
    /// Builds every mode's geometry. Nothing is uploaded until [`load`](Self::load).
    pub fn new(config: GizmoConfig, services: &UiServices) -> Self {
        let transform = services.transforms.borrow_mut().create(GIZMO_TRANSFORM_TAG);
        let meshes = [
            GizmoMesh::idle(&config),
            GizmoMesh::translate(&config),
            GizmoMesh::rotate(&config),
            GizmoMesh::scale(&config),
        ];
        Self {
            config,
            transforms: services.transforms.clone(),
            renderer: services.renderer.clone(),
            transform,
            selected: None,
            mode: GizmoMode::None,
            orientation: GizmoOrientation::Global,
            interaction: GizmoInteraction::None,
            current_axis: None,
            meshes,
            world_scale: 1.0,
            interaction_plane: None,
            interaction_start: Vector3::new(0.0, 0.0, 0.0),
            last_interaction: Vector3::new(0.0, 0.0, 0.0),
        }
    }

    /// Uploads the geometry of every mode. On failure nothing stays allocated.
    pub fn load(&mut self) -> Result<()> {
        let renderer = self.renderer.clone();
        let mut backend = renderer.borrow_mut();
        for index in 0..self.meshes.len() {
            if !self.meshes[index].load(&mut *backend) {
                for mesh in &mut self.meshes {
                    mesh.unload(&mut *backend);
                }
                return Err(UiError::ResourceAcquisition(format!(
                    "gizmo geometry for mode {}",
                    index
                )));
            }
        }
        debug!("gizmo: geometry loaded");
        Ok(())
    }

    pub fn unload(&mut self) {
        let renderer = self.renderer.clone();
        let mut backend = renderer.borrow_mut();
        for mesh in &mut self.meshes {
            mesh.unload(&mut *backend);
        }
        debug!("gizmo: geometry unloaded");
    }

    pub fn mode(&self) -> GizmoMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: GizmoMode) {
        if self.mode == mode {
            return;
        }
        self.clear_interaction();
        self.mode = mode;
        let rotation = self.orientation_rotation();
        self.transforms.borrow_mut().rotation_set(self.transform, rotation);
    }

    pub fn orientation(&self) -> GizmoOrientation {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: GizmoOrientation) {
        if self.orientation == orientation {
            return;
        }
        self.clear_interaction();
        self.orientation = orientation;
        let rotation = self.orientation_rotation();
        self.transforms.borrow_mut().rotation_set(self.transform, rotation);
    }

    pub fn interaction(&self) -> GizmoInteraction {
        self.interaction
    }

    pub fn current_axis(&self) -> Option<usize> {
        self.current_axis
    }

    pub fn selected(&self) -> Option<TransformHandle> {
        self.selected
    }

    /// Attaches the gizmo to `selection`, or detaches it with `None`.
    pub fn select(&mut self, selection: Option<TransformHandle>) {
        self.clear_interaction();
        self.selected = selection;
        self.sync_to_selection();
    }

    pub fn world_scale(&self) -> f32 {
        self.world_scale
    }

    /// Gizmo transform handle, positioned at the selection each update.
    pub fn transform(&self) -> TransformHandle {
        self.transform
    }

    /// Follows the selection and recomputes the size that keeps the gizmo
    /// `size_px` tall on screen.
    pub fn update(&mut self, camera: &OrbitCamera, viewport_height: f32) {
        self.sync_to_selection();
        let position = self.transforms.borrow().position_get(self.transform);
        let distance = (camera.position() - position).magnitude();
        let focal = camera.projection()[1][1];
        if viewport_height > 0.0 && focal.abs() > f32::EPSILON {
            self.world_scale = (distance * self.config.size_px) / (focal * viewport_height);
        }
    }

    /// `T(position) * R(orientation) * S(world_scale)`.
    pub fn model(&self) -> Matrix4<f32> {
        let transforms = self.transforms.borrow();
        Matrix4::from_translation(transforms.position_get(self.transform))
            * Matrix4::from(transforms.rotation_get(self.transform))
            * Matrix4::from_scale(self.world_scale)
    }

    /// Appends the active mode's geometry. Nothing is drawn without a selection.
    pub fn render(&mut self, list: &mut RenderList) -> bool {
        if self.selected_handle().is_none() {
            return true;
        }
        let model = self.model();
        let renderer = self.renderer.clone();
        let mesh = &mut self.meshes[self.mode.index()];
        if !mesh.refresh(&mut *renderer.borrow_mut()) {
            warn!("gizmo: could not upload highlight colours");
        }
        let Some(geometry) = mesh.range else {
            return false;
        };
        list.push(Renderable::Gizmo(GizmoRenderable { model, geometry }));
        true
    }

    /// Updates the hovered axis from a pointer ray. Ignored while dragging.
    /// Returns whether anything is hovered.
    pub fn handle_hover(&mut self, ray: &Ray) -> bool {
        if self.selected_handle().is_none() || self.interaction == GizmoInteraction::Drag {
            return false;
        }
        let Some(inverse) = self.model().invert() else {
            return false;
        };
        let local = ray.transformed(&inverse);
        let hit = match self.mode {
            GizmoMode::None => None,
            GizmoMode::Rotate => pick_ring(&local, self.config.ring_radius, self.config.ring_tolerance),
            GizmoMode::Move | GizmoMode::Scale => self.meshes[self.mode.index()].pick_volume(&local),
        };
        if hit != self.current_axis {
            trace!("gizmo: hover axis {:?}", hit);
        }
        self.set_current_axis(hit);
        self.interaction = if hit.is_some() {
            GizmoInteraction::Hover
        } else {
            GizmoInteraction::None
        };
        hit.is_some()
    }

    /// Starts a drag on the hovered axis. Returns false when there is no
    /// selection, nothing is hovered, or the pointer misses the interaction plane.
    pub fn begin_drag(&mut self, ray: &Ray, camera: &OrbitCamera) -> bool {
        let Some(selected) = self.selected_handle() else {
            return false;
        };
        let Some(axis) = self.current_axis else {
            return false;
        };
        let (origin, normal) = {
            let transforms = self.transforms.borrow();
            let origin = transforms.position_get(self.transform);
            let normal = match self.mode {
                GizmoMode::Rotate => transforms.rotation_get(self.transform).rotate_vector(unit(axis)),
                GizmoMode::Move | GizmoMode::Scale => {
                    let normal = plane_normal(axis, camera);
                    match (self.orientation, axis) {
                        (GizmoOrientation::Local, 0 | 2..=5) => {
                            transforms.world_rotation_get(selected).rotate_vector(normal)
                        }
                        _ => normal,
                    }
                }
                GizmoMode::None => return false,
            };
            (origin, normal)
        };
        let plane = Plane::from_point_normal(origin, normal);
        let Some((hit, _)) = plane.raycast_either_side(ray) else {
            return false;
        };
        self.interaction_plane = Some(plane);
        self.interaction_start = hit;
        self.last_interaction = hit;
        self.interaction = GizmoInteraction::Drag;
        debug!("gizmo: {:?} drag on axis {} started", self.mode, axis);
        true
    }

    /// Applies pointer motion to the selection. Ticks whose ray misses the
    /// interaction plane are skipped.
    pub fn drag(&mut self, ray: &Ray) {
        if self.interaction != GizmoInteraction::Drag {
            return;
        }
        let (Some(selected), Some(axis), Some(plane)) =
            (self.selected_handle(), self.current_axis, self.interaction_plane)
        else {
            return;
        };
        let Some((hit, _)) = plane.raycast_either_side(ray) else {
            return;
        };
        match self.mode {
            GizmoMode::Move => self.drag_move(selected, axis, hit),
            GizmoMode::Rotate => self.drag_rotate(selected, axis, plane, hit),
            GizmoMode::Scale => self.drag_scale(selected, axis, hit),
            GizmoMode::None => {}
        }
    }

    pub fn end_drag(&mut self) {
        if self.interaction != GizmoInteraction::Drag {
            return;
        }
        if self.mode == GizmoMode::Rotate && self.orientation == GizmoOrientation::Global {
            self.transforms
                .borrow_mut()
                .rotation_set(self.transform, Quaternion::one());
        }
        self.interaction_plane = None;
        self.interaction = if self.current_axis.is_some() {
            GizmoInteraction::Hover
        } else {
            GizmoInteraction::None
        };
        debug!("gizmo: drag ended");
    }

    /// Start of the current drag on the interaction plane.
    pub fn interaction_start(&self) -> Option<Vector3<f32>> {
        (self.interaction == GizmoInteraction::Drag).then_some(self.interaction_start)
    }

    fn drag_move(&mut self, selected: TransformHandle, axis: usize, hit: Vector3<f32>) {
        let diff = hit - self.last_interaction;
        let mut transforms = self.transforms.borrow_mut();
        let delta = if axis < 3 {
            let direction = match self.orientation {
                GizmoOrientation::Global => unit(axis),
                GizmoOrientation::Local => transforms.world_rotation_get(selected).rotate_vector(unit(axis)),
            };
            direction * diff.dot(direction)
        } else {
            diff
        };

        // The selection's position lives in its parent's space.
        let local_delta = match transforms.parent_get(selected) {
            Some(parent) => transforms
                .world_get(parent)
                .invert()
                .map_or(delta, |inverse| (inverse * delta.extend(0.0)).truncate()),
            None => delta,
        };
        transforms.translate(selected, local_delta);
        transforms.translate(self.transform, delta);
        self.last_interaction = hit;
    }

    fn drag_rotate(&mut self, selected: TransformHandle, axis: usize, plane: Plane, hit: Vector3<f32>) {
        let mut transforms = self.transforms.borrow_mut();
        let origin = transforms.position_get(self.transform);
        let v0 = self.last_interaction - origin;
        let v1 = hit - origin;
        let mut angle = v0.normalize().dot(v1.normalize()).acos();
        if angle == 0.0 || angle.is_nan() {
            return;
        }
        if plane.normal.dot(v0.cross(v1)) < 0.0 {
            angle = -angle;
        }
        let turn = Quaternion::from_axis_angle(unit(axis), Rad(angle));
        let gizmo_rotation = transforms.rotation_get(self.transform);
        let selection_rotation = transforms.rotation_get(selected);
        match self.orientation {
            GizmoOrientation::Local => {
                transforms.rotation_set(self.transform, gizmo_rotation * turn);
                transforms.rotation_set(selected, selection_rotation * turn);
            }
            GizmoOrientation::Global => {
                // World-axis turn expressed in the selection's parent space.
                let parent_rotation = transforms
                    .parent_get(selected)
                    .map_or(Quaternion::one(), |parent| transforms.world_rotation_get(parent));
                let in_parent = parent_rotation.invert() * turn * parent_rotation;
                transforms.rotation_set(self.transform, turn * gizmo_rotation);
                transforms.rotation_set(selected, in_parent * selection_rotation);
            }
        }
        self.last_interaction = hit;
    }

    fn drag_scale(&mut self, selected: TransformHandle, axis: usize, hit: Vector3<f32>) {
        let mut transforms = self.transforms.borrow_mut();
        let origin = transforms.position_get(self.transform);
        let direction = scale_direction(axis);
        let towards = hit - origin;
        let dist = towards.magnitude();
        if dist <= f32::EPSILON {
            return;
        }
        let direction_world = transforms.rotation_get(self.transform).rotate_vector(direction);
        let sign = direction_world.dot(towards / dist).signum();
        let mut scale_delta = direction * sign * dist;
        if self.orientation == GizmoOrientation::Global {
            scale_delta = transforms.rotation_get(selected).invert().rotate_vector(scale_delta);
        }

        let mut scale = transforms.scale_get(selected);
        for component in 0..3 {
            if scale_delta[component].abs() > f32::EPSILON {
                scale[component] = scale_delta[component];
            }
        }
        transforms.scale_set(selected, scale);
        self.last_interaction = hit;
    }

    fn selected_handle(&self) -> Option<TransformHandle> {
        self.selected
            .filter(|&handle| self.transforms.borrow().is_valid(handle))
    }

    fn orientation_rotation(&self) -> Quaternion<f32> {
        match (self.orientation, self.selected_handle()) {
            (GizmoOrientation::Local, Some(selected)) => {
                self.transforms.borrow().world_rotation_get(selected)
            }
            _ => Quaternion::one(),
        }
    }

    /// Moves the gizmo onto the selection. In global orientation the
    /// rotation is left alone so a ring being dragged keeps following.
    fn sync_to_selection(&mut self) {
        let Some(selected) = self.selected_handle() else {
            return;
        };
        let mut transforms = self.transforms.borrow_mut();
        let position = transforms.world_position_get(selected);
        transforms.position_set(self.transform, position);
        if self.orientation == GizmoOrientation::Local {
            let rotation = transforms.world_rotation_get(selected);
            transforms.rotation_set(self.transform, rotation);
        }
    }

    fn set_current_axis(&mut self, axis: Option<usize>) {
        self.current_axis = axis;
        let colour = self.config.hover_colour;
        self.meshes[self.mode.index()].set_highlight(axis, colour);
    }

    fn clear_interaction(&mut self) {
        if self.interaction == GizmoInteraction::Drag {
            self.end_drag();
        }
        self.set_current_axis(None);
        self.interaction = GizmoInteraction::None;
        self.interaction_plane = None;
    }
}

impl Drop for EditorGizmo {
    fn drop(&mut self) {
        if let Ok(mut transforms) = self.transforms.try_borrow_mut() {
            transforms.destroy(self.transform);
        }
    }
}

/// Normal of the plane a move or scale drag slides along, before any
/// local rotation: x and xy use +z, z and xz use +y, yz uses +x, and y and
/// xyz face the camera.
fn plane_normal(axis: usize, camera: &OrbitCamera) -> Vector3<f32> {
    match axis {
        0 | AXIS_XY => Vector3::unit_z(),
        2 | AXIS_XZ => Vector3::unit_y(),
        AXIS_YZ => Vector3::unit_x(),
        _ => camera.backward(),
    }
}

/// Axes a scale drag on `axis` affects; all three for uniform scale.
fn scale_direction(axis: usize) -> Vector3<f32> {
    match axis {
        0..=2 => unit(axis),
        AXIS_XY => Vector3::new(1.0, 1.0, 0.0),
        AXIS_XZ => Vector3::new(1.0, 0.0, 1.0),
        AXIS_YZ => Vector3::new(0.0, 1.0, 1.0),
        _ => Vector3::new(1.0, 1.0, 1.0).normalize(),
    }
}
