//! # Gizmo Meshes
//!
//! Line geometry and pick volumes for each gizmo mode. Every vertex carries
//! an axis-group tag (a bitmask of x/y/z) so hovering a volume can recolour
//! exactly the lines that belong to it: a vertex lights up when its group is
//! a subset of the hovered volume's axes.

use cgmath::{InnerSpace, Vector3, Zero};

use crate::config::GizmoConfig;
use crate::gfx::geometry::{push_box_outline, push_line, push_ring, GeometryData};
use crate::gfx::picking::{Aabb, Plane, Ray};
use crate::gfx::renderer::{GeometryRange, RenderBackend};
use crate::gfx::vertex::ColourVertex3D;

pub const AXIS_X: u8 = 0b001;
pub const AXIS_Y: u8 = 0b010;
pub const AXIS_Z: u8 = 0b100;

/// Axis mask of every interaction volume, by axis index.
pub const VOLUME_AXES: [u8; 7] = [
    AXIS_X,
    AXIS_Y,
    AXIS_Z,
    AXIS_X | AXIS_Y,
    AXIS_X | AXIS_Z,
    AXIS_Y | AXIS_Z,
    AXIS_X | AXIS_Y | AXIS_Z,
];

const HEAD_LENGTH: f32 = 0.2;
const HEAD_WIDTH: f32 = 0.08;
const TIP_HALF_EXTENT: f32 = 0.08;

pub(crate) fn unit(axis: usize) -> Vector3<f32> {
    match axis {
        0 => Vector3::unit_x(),
        1 => Vector3::unit_y(),
        _ => Vector3::unit_z(),
    }
}

fn point(v: Vector3<f32>) -> [f32; 3] {
    v.into()
}

fn mix(a: [f32; 4], b: [f32; 4]) -> [f32; 4] {
    [
        (a[0] + b[0]) * 0.5,
        (a[1] + b[1]) * 0.5,
        (a[2] + b[2]) * 0.5,
        (a[3] + b[3]) * 0.5,
    ]
}

/// Line mesh of one gizmo mode plus its GPU residency.
pub struct GizmoMesh {
    pub data: GeometryData<ColourVertex3D>,
    groups: Vec<u8>,
    natural: Vec<[f32; 4]>,
    /// Pick volumes in gizmo space, indexed by axis index. Empty for rotate.
    pub volumes: Vec<Aabb>,
    pub range: Option<GeometryRange>,
    /// Vertex colours changed since the last upload.
    pub dirty: bool,
    highlighted: Option<usize>,
}

impl GizmoMesh {
    fn empty() -> Self {
        Self {
            data: GeometryData::new(),
            groups: Vec::new(),
            natural: Vec::new(),
            volumes: Vec::new(),
            range: None,
            dirty: false,
            highlighted: None,
        }
    }

    /// Appends whatever `build` pushes, tagging the new vertices with `group`.
    fn push(&mut self, group: u8, build: impl FnOnce(&mut GeometryData<ColourVertex3D>)) {
        build(&mut self.data);
        self.groups.resize(self.data.vertices.len(), group);
    }

    fn finish(mut self) -> Self {
        self.natural = self.data.vertices.iter().map(|v| v.colour).collect();
        self
    }

    /// Neutral axes shown while no manipulation mode is selected.
    pub fn idle(config: &GizmoConfig) -> Self {
        let mut mesh = Self::empty();
        for axis in 0..3 {
            mesh.push(0, |data| push_arrow(data, axis, config.axis_length, config.neutral_colour));
        }
        mesh.finish()
    }

    pub fn translate(config: &GizmoConfig) -> Self {
        let mut mesh = Self::empty();
        for axis in 0..3 {
            mesh.push(VOLUME_AXES[axis], |data| {
                push_arrow(data, axis, config.axis_length, config.axis_colours[axis])
            });
        }
        mesh.push_pair_boxes(config);
        mesh.volumes = axis_volumes(config);
        mesh.finish()
    }

    pub fn scale(config: &GizmoConfig) -> Self {
        let mut mesh = Self::empty();
        for axis in 0..3 {
            let colour = config.axis_colours[axis];
            mesh.push(VOLUME_AXES[axis], |data| {
                let tip = unit(axis) * config.axis_length;
                let half = Vector3::new(TIP_HALF_EXTENT, TIP_HALF_EXTENT, TIP_HALF_EXTENT);
                push_line(data, [0.0; 3], point(tip), colour);
                push_box_outline(data, point(tip - half), point(tip + half), colour);
            });
        }
        mesh.push_pair_boxes(config);
        mesh.volumes = axis_volumes(config);
        mesh.finish()
    }

    pub fn rotate(config: &GizmoConfig) -> Self {
        let mut mesh = Self::empty();
        for axis in 0..3 {
            mesh.push(VOLUME_AXES[axis], |data| {
                push_ring(
                    data,
                    unit(axis),
                    config.ring_radius,
                    config.ring_segments,
                    config.axis_colours[axis],
                )
            });
        }
        mesh.finish()
    }

    /// Corner squares spanning each pair of axes, and the origin box.
    fn push_pair_boxes(&mut self, config: &GizmoConfig) {
        let size = config.corner_box_size;
        for (volume, a, b) in [(3, 0, 1), (4, 0, 2), (5, 1, 2)] {
            let colour = mix(config.axis_colours[a], config.axis_colours[b]);
            let (ua, ub) = (unit(a) * size, unit(b) * size);
            self.push(VOLUME_AXES[volume], |data| {
                push_line(data, point(ua), point(ua + ub), colour);
                push_line(data, point(ub), point(ua + ub), colour);
            });
        }
        let half = origin_half_extent(config);
        self.push(VOLUME_AXES[6], |data| {
            push_box_outline(data, [-half; 3], [half; 3], config.neutral_colour)
        });
    }

    /// First volume hit by a gizmo-space ray, testing the small compound
    /// volumes before the axes.
    pub fn pick_volume(&self, ray: &Ray) -> Option<usize> {
        (0..self.volumes.len())
            .rev()
            .find(|&index| self.volumes[index].intersect_ray(ray).is_some())
    }

    /// Recolours the vertices belonging to `axis`, restoring the rest.
    pub fn set_highlight(&mut self, axis: Option<usize>, colour: [f32; 4]) {
        if self.highlighted == axis {
            return;
        }
        self.highlighted = axis;
        let mask = axis.and_then(|index| VOLUME_AXES.get(index)).copied().unwrap_or(0);
        for ((vertex, &group), &natural) in self
            .data
            .vertices
            .iter_mut()
            .zip(&self.groups)
            .zip(&self.natural)
        {
            let lit = mask != 0 && group != 0 && group & !mask == 0;
            vertex.colour = if lit { colour } else { natural };
        }
        self.dirty = true;
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn load(&mut self, backend: &mut dyn RenderBackend) -> bool {
        if self.range.is_none() {
            self.range = self.data.upload(backend);
            self.dirty = false;
        }
        self.range.is_some()
    }

    /// Re-uploads vertex colours if a highlight changed them.
    pub fn refresh(&mut self, backend: &mut dyn RenderBackend) -> bool {
        if !self.dirty {
            return true;
        }
        let Some(range) = self.range.as_ref() else {
            return false;
        };
        if !self.data.reload_vertices(backend, range) {
            return false;
        }
        self.dirty = false;
        true
    }

    pub fn unload(&mut self, backend: &mut dyn RenderBackend) {
        if let Some(range) = self.range.take() {
            range.free(backend);
        }
    }
}

fn push_arrow(data: &mut GeometryData<ColourVertex3D>, axis: usize, length: f32, colour: [f32; 4]) {
    let tip = unit(axis) * length;
    let back = unit(axis) * (length - HEAD_LENGTH);
    push_line(data, [0.0; 3], point(tip), colour);
    for other in (0..3).filter(|&o| o != axis) {
        let side = unit(other) * HEAD_WIDTH;
        push_line(data, point(tip), point(back + side), colour);
        push_line(data, point(tip), point(back - side), colour);
    }
}

fn origin_half_extent(config: &GizmoConfig) -> f32 {
    config.axis_pick_radius * 1.5
}

/// Axis, pair and origin volumes shared by the move and scale modes.
fn axis_volumes(config: &GizmoConfig) -> Vec<Aabb> {
    let r = config.axis_pick_radius;
    let thin = || (Vector3::new(-r, -r, -r), Vector3::new(r, r, r));

    let mut volumes = Vec::with_capacity(7);
    for axis in 0..3 {
        let (mut min, mut max) = thin();
        min[axis] = 0.0;
        max[axis] = config.axis_length;
        volumes.push(Aabb::new(min, max));
    }
    for (a, b) in [(0, 1), (0, 2), (1, 2)] {
        let (mut min, mut max) = thin();
        min[a] = 0.0;
        min[b] = 0.0;
        max[a] = config.corner_box_size;
        max[b] = config.corner_box_size;
        volumes.push(Aabb::new(min, max));
    }
    let half = origin_half_extent(config);
    volumes.push(Aabb::new(
        Vector3::new(-half, -half, -half),
        Vector3::new(half, half, half),
    ));
    volumes
}

/// Ring under a gizmo-space ray, accepting plane hits within `tolerance`
/// of the ring radius. The nearest qualifying ring wins.
pub fn pick_ring(ray: &Ray, radius: f32, tolerance: f32) -> Option<usize> {
    (0..3)
        .filter_map(|axis| {
            let plane = Plane::from_point_normal(Vector3::zero(), unit(axis));
            let (hit, t) = plane.raycast_either_side(ray)?;
            ((hit.magnitude() - radius).abs() <= tolerance).then_some((axis, t))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(axis, _)| axis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compound_volumes_win_near_origin() {
        let mesh = GizmoMesh::translate(&GizmoConfig::default());
        let down = |x: f32, y: f32| Ray::new(Vector3::new(x, y, 5.0), Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(mesh.pick_volume(&down(1.0, 0.0)), Some(0));
        assert_eq!(mesh.pick_volume(&down(0.0, 1.0)), Some(1));
        assert_eq!(mesh.pick_volume(&down(0.3, 0.3)), Some(3));
        assert_eq!(mesh.pick_volume(&down(0.0, 0.0)), Some(6));
        assert_eq!(mesh.pick_volume(&down(1.5, 1.5)), None);
    }

    #[test]
    fn test_highlight_uses_group_subsets() {
        let config = GizmoConfig::default();
        let mut mesh = GizmoMesh::translate(&config);
        let lit = |mesh: &GizmoMesh| {
            mesh.data
                .vertices
                .iter()
                .zip(&mesh.groups)
                .filter(|(v, _)| v.colour == config.hover_colour)
                .map(|(_, &g)| g)
                .collect::<Vec<u8>>()
        };

        mesh.set_highlight(Some(0), config.hover_colour);
        assert!(mesh.dirty);
        assert!(!lit(&mesh).is_empty());
        assert!(lit(&mesh).iter().all(|&g| g == AXIS_X));

        // A planar volume lights both of its axes and its own square.
        mesh.set_highlight(Some(3), config.hover_colour);
        let groups = lit(&mesh);
        assert!(groups.contains(&AXIS_X) && groups.contains(&AXIS_Y) && groups.contains(&(AXIS_X | AXIS_Y)));
        assert!(!groups.contains(&AXIS_Z));

        mesh.set_highlight(None, config.hover_colour);
        assert!(lit(&mesh).is_empty());
        assert_eq!(
            mesh.data.vertices.iter().map(|v| v.colour).collect::<Vec<_>>(),
            mesh.natural
        );
    }

    #[test]
    fn test_ring_pick_respects_tolerance() {
        let down = |x: f32, y: f32| Ray::new(Vector3::new(x, y, 5.0), Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(pick_ring(&down(1.0, 0.0), 1.0, 0.1), Some(2));
        assert_eq!(pick_ring(&down(0.0, 1.05), 1.0, 0.1), Some(2));
        assert_eq!(pick_ring(&down(0.5, 0.0), 1.0, 0.1), None);
    }

    #[test]
    fn test_rotate_mesh_has_no_volumes() {
        let config = GizmoConfig::default();
        let mesh = GizmoMesh::rotate(&config);
        assert!(mesh.volumes.is_empty());
        assert_eq!(mesh.data.vertex_count(), 3 * config.ring_segments as usize * 2);
    }
}
