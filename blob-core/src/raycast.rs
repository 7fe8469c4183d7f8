//! Rays, bounding boxes and ray/triangle intersection.

use glam::{Mat4, Vec3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Point at distance `t` along the ray.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// This ray expressed in the space mapped by `matrix`.
    pub fn transformed(&self, matrix: &Mat4) -> Ray {
        let origin = matrix.transform_point3(self.origin);
        let direction = matrix.transform_vector3(self.direction);
        Ray::new(origin, direction)
    }
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    pub fn from_points(points: &[Vec3]) -> Self {
        points.iter().fold(Self::EMPTY, |acc, &p| Aabb {
            min: acc.min.min(p),
            max: acc.max.max(p),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Slab test; `true` if the ray enters the box at or ahead of its origin.
    pub fn intersects(&self, ray: &Ray) -> bool {
        if self.is_empty() {
            return false;
        }

        let inv = ray.direction.recip();
        let t0 = (self.min - ray.origin) * inv;
        let t1 = (self.max - ray.origin) * inv;
        let t_near = t0.min(t1).max_element();
        let t_far = t0.max(t1).min_element();

        // NaN (0 * inf) compares false and rejects the box, so guard the
        // axis-parallel case explicitly.
        if t_near.is_nan() || t_far.is_nan() {
            return self.contains_projection(ray);
        }
        t_far >= t_near.max(0.0)
    }

    fn contains_projection(&self, ray: &Ray) -> bool {
        (0..3).all(|axis| {
            ray.direction[axis] != 0.0
                || (ray.origin[axis] >= self.min[axis] && ray.origin[axis] <= self.max[axis])
        })
    }
}

/// Double-sided Möller–Trumbore ray/triangle test.
///
/// ### Returns
/// The distance along the ray to the hit, if the ray hits the triangle at
/// or ahead of its origin.
pub fn intersect_triangle(ray: &Ray, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
    const EPS: f32 = 1e-8;

    let edge1 = b - a;
    let edge2 = c - a;
    let p = ray.direction.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < EPS {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = ray.origin - a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = ray.direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    (t >= 0.0).then_some(t)
}

/// Nearest hit of `ray` against an indexed triangle list.
pub fn intersect_mesh(ray: &Ray, positions: &[Vec3], indices: &[u32]) -> Option<f32> {
    indices
        .chunks_exact(3)
        .filter_map(|tri| {
            intersect_triangle(
                ray,
                positions[tri[0] as usize],
                positions[tri[1] as usize],
                positions[tri[2] as usize],
            )
        })
        .min_by(f32::total_cmp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> (Vec3, Vec3, Vec3) {
        (
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        )
    }

    #[test]
    fn ray_hits_triangle_from_either_side() {
        let (a, b, c) = unit_triangle();

        let front = Ray::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z);
        let back = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);

        assert_eq!(intersect_triangle(&front, a, b, c), Some(5.0));
        assert_eq!(intersect_triangle(&back, a, b, c), Some(5.0));
    }

    #[test]
    fn ray_misses_outside_or_behind() {
        let (a, b, c) = unit_triangle();

        let outside = Ray::new(Vec3::new(3.0, 0.0, 5.0), -Vec3::Z);
        let behind = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        let parallel = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::X);

        assert_eq!(intersect_triangle(&outside, a, b, c), None);
        assert_eq!(intersect_triangle(&behind, a, b, c), None);
        assert_eq!(intersect_triangle(&parallel, a, b, c), None);
    }

    #[test]
    fn ray_through_vertex_hits() {
        let (a, b, c) = unit_triangle();
        let ray = Ray::new(c + Vec3::Z * 2.0, -Vec3::Z);
        let t = intersect_triangle(&ray, a, b, c).unwrap();
        assert!((t - 2.0).abs() < 1e-6);
    }

    #[test]
    fn mesh_hit_returns_nearest() {
        let positions = vec![
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(-1.0, -1.0, 2.0),
            Vec3::new(1.0, -1.0, 2.0),
            Vec3::new(0.0, 1.0, 2.0),
        ];
        let indices = vec![0, 1, 2, 3, 4, 5];
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), -Vec3::Z);

        assert_eq!(intersect_mesh(&ray, &positions, &indices), Some(8.0));
    }

    #[test]
    fn aabb_slab_test() {
        let bounds = Aabb::from_points(&[Vec3::splat(-1.0), Vec3::splat(1.0)]);

        assert!(bounds.intersects(&Ray::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z)));
        assert!(!bounds.intersects(&Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z)));
        assert!(!bounds.intersects(&Ray::new(Vec3::new(3.0, 0.0, 5.0), -Vec3::Z)));
        // Origin inside the box.
        assert!(bounds.intersects(&Ray::new(Vec3::ZERO, Vec3::X)));
        assert!(!Aabb::EMPTY.intersects(&Ray::new(Vec3::ZERO, Vec3::X)));
    }

    #[test]
    fn transformed_ray_keeps_unit_direction() {
        let m = Mat4::from_rotation_y(0.7) * Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0)).transformed(&m);
        assert!((ray.direction.length() - 1.0).abs() < 1e-5);
    }
}
