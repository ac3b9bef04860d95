//! # Primitive Shape Generation
//!
//! Quads and nine-slices for UI controls (top-left origin, y down, pixel
//! units) and coloured line primitives for gizmo meshes.

use std::f32::consts::PI;

use cgmath::{InnerSpace, Vector3};

use super::GeometryData;
use crate::gfx::vertex::{ColourVertex3D, Vertex2D};

/// A normalised texture-coordinate rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasRegion {
    pub min: [f32; 2],
    pub max: [f32; 2],
}

impl AtlasRegion {
    pub const FULL_UV: AtlasRegion = AtlasRegion {
        min: [0.0, 0.0],
        max: [1.0, 1.0],
    };

    /// Region covering pixels `min..max` of an atlas of `atlas_size` pixels.
    pub fn from_pixels(min: [u32; 2], max: [u32; 2], atlas_size: [u32; 2]) -> Self {
        let w = atlas_size[0].max(1) as f32;
        let h = atlas_size[1].max(1) as f32;
        Self {
            min: [min[0] as f32 / w, min[1] as f32 / h],
            max: [max[0] as f32 / w, max[1] as f32 / h],
        }
    }
}

/// Where a nine-slice frame lives inside the UI atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NineSliceRegion {
    /// Top-left pixel of the frame in the atlas
    pub atlas_min: [u32; 2],
    /// Bottom-right pixel of the frame in the atlas
    pub atlas_max: [u32; 2],
    /// Size of one corner in atlas pixels
    pub corner_px: [u32; 2],
}

/// Quad `(0,0)..(width,height)`, two triangles.
pub fn generate_quad(width: f32, height: f32, uv: AtlasRegion) -> GeometryData<Vertex2D> {
    let mut data = GeometryData::new();
    data.vertices = quad_vertices(width, height, uv).to_vec();
    data.indices = vec![0, 1, 2, 0, 3, 1];
    data
}

/// The four corners of a quad, in the order `generate_quad` indexes them.
pub fn quad_vertices(width: f32, height: f32, uv: AtlasRegion) -> [Vertex2D; 4] {
    [
        Vertex2D::new(0.0, 0.0, uv.min[0], uv.min[1]),
        Vertex2D::new(width, height, uv.max[0], uv.max[1]),
        Vertex2D::new(0.0, height, uv.min[0], uv.max[1]),
        Vertex2D::new(width, 0.0, uv.max[0], uv.min[1]),
    ]
}

/// A 4x4 vertex grid whose corner cells keep `corner_size` pixels on screen.
///
/// Corners shrink to half the width/height when the frame is too small to fit them.
pub fn generate_nine_slice(
    width: f32,
    height: f32,
    corner_size: [f32; 2],
    atlas_size: [u32; 2],
    region: &NineSliceRegion,
) -> GeometryData<Vertex2D> {
    let mut data = GeometryData::new();
    data.vertices = nine_slice_vertices(width, height, corner_size, atlas_size, region).to_vec();
    for row in 0..3u32 {
        for col in 0..3u32 {
            let top_left = row * 4 + col;
            let bottom_left = top_left + 4;
            data.indices.extend_from_slice(&[
                top_left,
                bottom_left + 1,
                bottom_left,
                top_left,
                top_left + 1,
                bottom_left + 1,
            ]);
        }
    }
    data
}

/// Vertex positions/uvs of a nine-slice, for resizing or re-skinning in place.
pub fn nine_slice_vertices(
    width: f32,
    height: f32,
    corner_size: [f32; 2],
    atlas_size: [u32; 2],
    region: &NineSliceRegion,
) -> [Vertex2D; 16] {
    let cw = corner_size[0].min(width * 0.5).max(0.0);
    let ch = corner_size[1].min(height * 0.5).max(0.0);
    let xs = [0.0, cw, width - cw, width];
    let ys = [0.0, ch, height - ch, height];

    let aw = atlas_size[0].max(1) as f32;
    let ah = atlas_size[1].max(1) as f32;
    let us = [
        region.atlas_min[0] as f32 / aw,
        (region.atlas_min[0] + region.corner_px[0]) as f32 / aw,
        region.atlas_max[0].saturating_sub(region.corner_px[0]) as f32 / aw,
        region.atlas_max[0] as f32 / aw,
    ];
    let vs = [
        region.atlas_min[1] as f32 / ah,
        (region.atlas_min[1] + region.corner_px[1]) as f32 / ah,
        region.atlas_max[1].saturating_sub(region.corner_px[1]) as f32 / ah,
        region.atlas_max[1] as f32 / ah,
    ];

    let mut vertices = [Vertex2D::default(); 16];
    for row in 0..4 {
        for col in 0..4 {
            vertices[row * 4 + col] = Vertex2D::new(xs[col], ys[row], us[col], vs[row]);
        }
    }
    vertices
}

/// Appends a line segment to a line-list mesh.
pub fn push_line(data: &mut GeometryData<ColourVertex3D>, a: [f32; 3], b: [f32; 3], colour: [f32; 4]) {
    data.vertices.push(ColourVertex3D::new(a, colour));
    data.vertices.push(ColourVertex3D::new(b, colour));
}

/// Appends the twelve edges of an axis-aligned box.
pub fn push_box_outline(
    data: &mut GeometryData<ColourVertex3D>,
    min: [f32; 3],
    max: [f32; 3],
    colour: [f32; 4],
) {
    let corner = |x: bool, y: bool, z: bool| {
        [
            if x { max[0] } else { min[0] },
            if y { max[1] } else { min[1] },
            if z { max[2] } else { min[2] },
        ]
    };
    for &(a, b) in &[
        ((false, false, false), (true, false, false)),
        ((false, true, false), (true, true, false)),
        ((false, false, true), (true, false, true)),
        ((false, true, true), (true, true, true)),
        ((false, false, false), (false, true, false)),
        ((true, false, false), (true, true, false)),
        ((false, false, true), (false, true, true)),
        ((true, false, true), (true, true, true)),
        ((false, false, false), (false, false, true)),
        ((true, false, false), (true, false, true)),
        ((false, true, false), (false, true, true)),
        ((true, true, false), (true, true, true)),
    ] {
        push_line(data, corner(a.0, a.1, a.2), corner(b.0, b.1, b.2), colour);
    }
}

/// Appends a circle of `segments` lines around `axis` (unit x, y or z).
pub fn push_ring(
    data: &mut GeometryData<ColourVertex3D>,
    axis: Vector3<f32>,
    radius: f32,
    segments: u32,
    colour: [f32; 4],
) {
    let axis = axis.normalize();
    // Any vector not parallel to the axis gives a basis for the ring plane.
    let helper = if axis.x.abs() < 0.9 {
        Vector3::unit_x()
    } else {
        Vector3::unit_y()
    };
    let u = axis.cross(helper).normalize();
    let v = axis.cross(u);
    let segments = segments.max(3);
    let point = |i: u32| {
        let theta = i as f32 / segments as f32 * 2.0 * PI;
        let p = (u * theta.cos() + v * theta.sin()) * radius;
        [p.x, p.y, p.z]
    };
    for i in 0..segments {
        push_line(data, point(i), point(i + 1), colour);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nine_slice_layout() {
        let region = NineSliceRegion {
            atlas_min: [0, 0],
            atlas_max: [32, 32],
            corner_px: [8, 8],
        };
        let slice = generate_nine_slice(100.0, 40.0, [10.0, 10.0], [64, 64], &region);
        assert_eq!(slice.vertex_count(), 16);
        assert_eq!(slice.index_count(), 54);
        assert_eq!(slice.vertices[5].position, [10.0, 10.0]);
        assert_eq!(slice.vertices[15].position, [100.0, 40.0]);
        assert_eq!(slice.vertices[15].texcoord, [0.5, 0.5]);
        assert_eq!(slice.vertices[1].texcoord, [0.125, 0.0]);
    }

    #[test]
    fn test_nine_slice_corners_shrink_on_small_frames() {
        let region = NineSliceRegion {
            atlas_min: [0, 0],
            atlas_max: [32, 32],
            corner_px: [8, 8],
        };
        let vertices = nine_slice_vertices(10.0, 40.0, [10.0, 10.0], [64, 64], &region);
        assert_eq!(vertices[1].position[0], 5.0);
        assert_eq!(vertices[2].position[0], 5.0);
    }

    #[test]
    fn test_ring_is_closed() {
        let mut ring = GeometryData::new();
        push_ring(&mut ring, Vector3::unit_z(), 1.0, 32, [1.0; 4]);
        assert_eq!(ring.vertex_count(), 64);
        let first = ring.vertices[0].position;
        let last = ring.vertices[63].position;
        for i in 0..3 {
            assert!((first[i] - last[i]).abs() < 1e-5);
        }
        assert!(ring.vertices.iter().all(|v| v.position[2].abs() < 1e-6));
    }
}
