//! # Ray Casting Primitives
//!
//! Rays, axis-aligned boxes and planes used by the editor gizmo to find the
//! hovered handle and to turn pointer motion into world-space deltas.

use cgmath::{ElementWise, InnerSpace, Matrix4, SquareMatrix, Vector3, Vector4};

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Ray origin point
    pub origin: Vector3<f32>,
    /// Ray direction (normalized)
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Point along the ray at distance `t`
    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }

    /// The same ray expressed in the space `matrix` maps into.
    ///
    /// The direction is renormalised, so distances measured along the
    /// returned ray are in the target space's units.
    pub fn transformed(&self, matrix: &Matrix4<f32>) -> Ray {
        let origin = matrix * self.origin.extend(1.0);
        let direction = matrix * self.direction.extend(0.0);
        Ray::new(
            Vector3::new(origin.x, origin.y, origin.z) / origin.w,
            Vector3::new(direction.x, direction.y, direction.z),
        )
    }
}

/// Axis-aligned bounding box for intersection testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Aabb {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Distance along `ray` to the nearest face, or `None` on a miss.
    ///
    /// A ray starting inside the box reports the exit distance.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let inv_dir = Vector3::new(
            1.0 / ray.direction.x,
            1.0 / ray.direction.y,
            1.0 / ray.direction.z,
        );

        let t_min = (self.min - ray.origin).mul_element_wise(inv_dir);
        let t_max = (self.max - ray.origin).mul_element_wise(inv_dir);

        let t1 = Vector3::new(
            t_min.x.min(t_max.x),
            t_min.y.min(t_max.y),
            t_min.z.min(t_max.z),
        );
        let t2 = Vector3::new(
            t_min.x.max(t_max.x),
            t_min.y.max(t_max.y),
            t_min.z.max(t_max.z),
        );

        let t_near = t1.x.max(t1.y.max(t1.z));
        let t_far = t2.x.min(t2.y.min(t2.z));

        if t_near <= t_far && t_far >= 0.0 {
            Some(if t_near >= 0.0 { t_near } else { t_far })
        } else {
            None
        }
    }
}

/// An infinite plane `dot(normal, p) == distance`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vector3<f32>,
    pub distance: f32,
}

impl Plane {
    /// Plane through `point` facing `normal`.
    pub fn from_point_normal(point: Vector3<f32>, normal: Vector3<f32>) -> Self {
        let normal = normal.normalize();
        Self {
            normal,
            distance: normal.dot(point),
        }
    }

    /// The back-facing twin of this plane.
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            distance: -self.distance,
        }
    }

    /// Front-face raycast. Rays parallel to the plane or hitting its back miss.
    pub fn raycast(&self, ray: &Ray) -> Option<(Vector3<f32>, f32)> {
        let normal_dir = ray.direction.dot(self.normal);
        if normal_dir >= 0.0 {
            return None;
        }
        let t = (self.distance - ray.origin.dot(self.normal)) / normal_dir;
        (t >= 0.0).then(|| (ray.point_at(t), t))
    }

    /// Raycast against this plane, then against its back-facing twin.
    pub fn raycast_either_side(&self, ray: &Ray) -> Option<(Vector3<f32>, f32)> {
        self.raycast(ray).or_else(|| self.flipped().raycast(ray))
    }
}

/// Converts a pixel position (top-left origin) to a world-space ray.
///
/// `projection` must follow OpenGL depth conventions (near plane at NDC z = -1).
pub fn screen_to_ray(
    screen_pos: (f32, f32),
    screen_size: (f32, f32),
    view: Matrix4<f32>,
    projection: Matrix4<f32>,
) -> Option<Ray> {
    let (mouse_x, mouse_y) = screen_pos;
    let (screen_width, screen_height) = screen_size;
    if screen_width <= 0.0 || screen_height <= 0.0 {
        return None;
    }

    let ndc_x = (2.0 * mouse_x) / screen_width - 1.0;
    let ndc_y = 1.0 - (2.0 * mouse_y) / screen_height;

    let inv_view_proj = (projection * view).invert()?;
    let world_near = inv_view_proj * Vector4::new(ndc_x, ndc_y, -1.0, 1.0);
    let world_far = inv_view_proj * Vector4::new(ndc_x, ndc_y, 1.0, 1.0);

    let near_3d = world_near.truncate() / world_near.w;
    let far_3d = world_far.truncate() / world_far.w;
    Some(Ray::new(near_3d, far_3d - near_3d))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_aabb_intersection() {
        let aabb = Aabb::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));
        let hit = Ray::new(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(aabb.intersect_ray(&hit), Some(4.0));

        let miss = Ray::new(Vector3::new(5.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(aabb.intersect_ray(&miss).is_none());
    }

    #[test]
    fn test_plane_is_one_sided() {
        let plane = Plane::from_point_normal(Vector3::new(0.0, 0.0, 0.0), Vector3::unit_z());
        let from_front = Ray::new(Vector3::new(1.0, 2.0, 5.0), -Vector3::unit_z());
        let (point, t) = plane.raycast(&from_front).unwrap();
        assert_eq!(point, Vector3::new(1.0, 2.0, 0.0));
        assert_eq!(t, 5.0);

        let from_back = Ray::new(Vector3::new(1.0, 2.0, -5.0), Vector3::unit_z());
        assert!(plane.raycast(&from_back).is_none());
        assert!(plane.raycast_either_side(&from_back).is_some());
    }

    #[test]
    fn test_transformed_ray() {
        let ray = Ray::new(Vector3::new(0.0, 0.0, 0.0), Vector3::unit_x());
        let moved = ray.transformed(&Matrix4::from_translation(Vector3::new(0.0, 3.0, 0.0)));
        assert_eq!(moved.origin, Vector3::new(0.0, 3.0, 0.0));
        assert_eq!(moved.direction, Vector3::unit_x());
    }
}
