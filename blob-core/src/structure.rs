use crate::{branch::Branch, config::EngineConfig, raycast::Ray, types::BranchId};
use glam::{EulerRot, Mat4, Vec3};

/// The "liquid" group: every branch plus the shared rotation applied to all
/// of them.
///
/// Branches live in the structure's local space; [`LiquidStructure::world`]
/// maps them into the scene.
#[derive(Debug)]
pub struct LiquidStructure {
    pub branches: Vec<Branch>,
    /// Euler angles in radians, applied in XYZ order.
    rotation: Vec3,
    world: Mat4,
}

impl LiquidStructure {
    /// Builds one branch per entry of `cfg.branches`.
    pub fn build(cfg: &EngineConfig) -> Self {
        let branches = cfg
            .branches
            .iter()
            .map(|spec| Branch::build(*spec, &cfg.tube, cfg.palette.base))
            .collect();

        Self {
            branches,
            rotation: Vec3::ZERO,
            world: Mat4::IDENTITY,
        }
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn world(&self) -> &Mat4 {
        &self.world
    }

    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.rotation = rotation;
        self.world = Mat4::from_euler(EulerRot::XYZ, rotation.x, rotation.y, rotation.z);
    }

    /// Slow drift: three low-frequency sinusoids, one per axis, plus a steady
    /// turn around Y.
    pub fn rotation_at(time: f32) -> Vec3 {
        Vec3::new(
            (time * 0.09).sin() * 0.03,
            time * 0.05 + (time * 0.12).sin() * 0.04,
            (time * 0.11).cos() * 0.025,
        )
    }

    pub fn vertex_count(&self) -> usize {
        self.branches.iter().map(Branch::vertex_count).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.branches.iter().map(Branch::triangle_count).sum()
    }

    /// Casts a world-space ray against the current branch positions.
    ///
    /// ### Returns
    /// The nearest world-space hit point and the branch it belongs to.
    pub fn raycast(&self, ray: &Ray) -> Option<(Vec3, BranchId)> {
        let local = ray.transformed(&self.world.inverse());

        self.branches
            .iter()
            .enumerate()
            .filter_map(|(id, branch)| branch.raycast(&local).map(|t| (t, id)))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(t, id)| (self.world.transform_point3(local.at(t)), id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TubeConfig;

    fn small_config() -> EngineConfig {
        EngineConfig {
            tube: TubeConfig {
                control_segments: 30,
                tubular_segments: 40,
                radial_segments: 12,
            },
            ..EngineConfig::default()
        }
    }

    #[test]
    fn default_structure_has_eight_branches_at_origin() {
        let s = LiquidStructure::build(&small_config());
        assert_eq!(s.branches.len(), 8);
        assert!(s.branches.iter().all(|b| b.spec.origin == Vec3::ZERO));
        assert_eq!(s.vertex_count(), 8 * 41 * 13);
        assert_eq!(s.triangle_count(), 8 * 40 * 12 * 2);
    }

    #[test]
    fn rotation_updates_world_matrix() {
        let mut s = LiquidStructure::build(&small_config());
        assert_eq!(*s.world(), Mat4::IDENTITY);

        s.set_rotation(Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0));
        let x = s.world().transform_point3(Vec3::X);
        assert!(x.distance(-Vec3::Z) < 1e-6);
    }

    #[test]
    fn rotation_at_is_slow() {
        let a = LiquidStructure::rotation_at(10.0);
        let b = LiquidStructure::rotation_at(10.016);
        assert!((a - b).length() < 0.01);
        assert_eq!(LiquidStructure::rotation_at(0.0), Vec3::new(0.0, 0.0, 0.025));
    }

    #[test]
    fn raycast_reports_world_hit_after_rotation() {
        let mut cfg = small_config();
        cfg.branches.truncate(1);
        let mut s = LiquidStructure::build(&cfg);
        s.set_rotation(Vec3::new(0.0, 0.4, 0.0));

        // Aim at the middle of branch 0 in world space.
        let local_target = s.branches[0].curve.point(0.5);
        let world_target = s.world().transform_point3(local_target);
        let origin = world_target + Vec3::new(0.0, 20.0, 0.0);
        let ray = Ray::new(origin, world_target - origin);

        let (hit, _) = s.raycast(&ray).expect("ray aimed at a branch hits");
        assert!(hit.distance(world_target) < 1.5, "hit = {hit:?}");
    }
}
