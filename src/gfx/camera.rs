//! Orbit camera used by the editor gizmo for sizing and pointer rays.

use cgmath::{perspective, EuclideanSpace, InnerSpace, Matrix4, Point3, Rad, Vector3, Zero};

use crate::gfx::picking::{screen_to_ray, Ray};

/// A camera orbiting `target` at `distance`, steered by `pitch` and `yaw`.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl OrbitCamera {
    pub fn new(distance: f32, pitch: f32, yaw: f32, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self {
            distance,
            pitch,
            yaw,
            eye: Vector3::zero(),
            target,
            up: Vector3::unit_y(),
            aspect,
            fovy: Rad(std::f32::consts::PI / 4.0),
            znear: 0.1,
            zfar: 1000.0,
        };
        camera.update();
        camera
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance.max(f32::EPSILON);
        self.update();
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        let limit = std::f32::consts::FRAC_PI_2 - f32::EPSILON;
        self.pitch = pitch.clamp(-limit, limit);
        self.update();
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw;
        self.update();
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    fn update(&mut self) {
        self.eye = Vector3::new(
            self.distance * self.yaw.sin() * self.pitch.cos(),
            self.distance * self.pitch.sin(),
            self.distance * self.yaw.cos() * self.pitch.cos(),
        ) + self.target;
    }

    pub fn view(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(
            Point3::from_vec(self.eye),
            Point3::from_vec(self.target),
            self.up,
        )
    }

    /// OpenGL-convention perspective projection.
    pub fn projection(&self) -> Matrix4<f32> {
        perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection() * self.view()
    }

    pub fn position(&self) -> Vector3<f32> {
        self.eye
    }

    /// Unit vector pointing from the target back towards the eye.
    pub fn backward(&self) -> Vector3<f32> {
        (self.eye - self.target).normalize()
    }

    /// World ray under a pixel of a `width` x `height` viewport.
    pub fn screen_ray(&self, x: f32, y: f32, width: f32, height: f32) -> Option<Ray> {
        screen_to_ray((x, y), (width, height), self.view(), self.projection())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centre_ray_points_at_target() {
        let camera = OrbitCamera::new(10.0, 0.0, 0.0, Vector3::zero(), 1.0);
        assert!((camera.eye - Vector3::new(0.0, 0.0, 10.0)).magnitude() < 1e-5);
        let ray = camera.screen_ray(50.0, 50.0, 100.0, 100.0).unwrap();
        assert!((ray.direction - Vector3::new(0.0, 0.0, -1.0)).magnitude() < 1e-4);
        assert!((camera.backward() - Vector3::unit_z()).magnitude() < 1e-5);
    }
}
