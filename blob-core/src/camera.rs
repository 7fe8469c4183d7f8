use crate::{config::CameraConfig, raycast::Ray};
use glam::{Mat4, Vec2, Vec3};

/// Fixed perspective camera looking at the structure.
///
/// Only the aspect ratio changes after construction (on resize).
#[derive(Clone, Debug, PartialEq)]
pub struct PerspectiveCamera {
    fov_y: f32,
    aspect: f32,
    near: f32,
    far: f32,
    position: Vec3,
    target: Vec3,
}

impl PerspectiveCamera {
    pub fn new(cfg: &CameraConfig, aspect: f32) -> Self {
        Self {
            fov_y: cfg.fov_y_degrees.to_radians(),
            aspect,
            near: cfg.near,
            far: cfg.far,
            position: cfg.position,
            target: cfg.target,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Projects a world-space point to normalized device coordinates.
    ///
    /// ### Returns
    /// `(x, y)` in `[-1, 1]` for visible points (y up) and the NDC depth.
    pub fn project(&self, world: Vec3) -> (Vec2, f32) {
        let ndc = self.view_projection().project_point3(world);
        (ndc.truncate(), ndc.z)
    }

    /// World-space ray from the camera through an NDC pointer position.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inv = self.view_projection().inverse();
        let through = inv.project_point3(Vec3::new(ndc.x, ndc.y, 0.5));
        Ray::new(self.position, through - self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::new(&CameraConfig::default(), 800.0 / 600.0)
    }

    #[test]
    fn center_ray_points_at_target() {
        let cam = camera();
        let ray = cam.ray_from_ndc(Vec2::ZERO);
        let expected = (Vec3::ZERO - cam.position()).normalize();
        assert!(ray.direction.distance(expected) < 1e-5);
        assert_eq!(ray.origin, cam.position());
    }

    #[test]
    fn project_then_cast_passes_through_point() {
        let cam = camera();
        let point = Vec3::new(2.0, -1.5, 3.0);
        let (ndc, _) = cam.project(point);
        let ray = cam.ray_from_ndc(ndc);

        let t = (point - ray.origin).dot(ray.direction);
        assert!(ray.at(t).distance(point) < 1e-3);
    }

    #[test]
    fn aspect_follows_resize() {
        let mut cam = camera();
        cam.set_aspect(1024.0 / 768.0);
        assert_eq!(cam.aspect(), 1024.0 / 768.0);
    }

    #[test]
    fn corner_rays_diverge() {
        let cam = camera();
        let left = cam.ray_from_ndc(Vec2::new(-1.0, 0.0));
        let right = cam.ray_from_ndc(Vec2::new(1.0, 0.0));
        assert!(left.direction.x < 0.0 && right.direction.x > 0.0);
    }
}
