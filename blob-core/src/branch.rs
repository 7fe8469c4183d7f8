use crate::{
    config::{BranchSpec, TubeConfig},
    curve::{SplineCurve, control_points},
    raycast::{Aabb, Ray, intersect_mesh},
    tube::TubeGeometry,
    types::Rgb,
};
use glam::Vec3;

/// One procedurally generated tube of the structure.
///
/// Topology (`indices`) and `rest_positions` are fixed at construction.
/// `positions`, `normals` and `colors` have the same length as
/// `rest_positions` and are overwritten in place every frame.
#[derive(Debug)]
pub struct Branch {
    pub spec: BranchSpec,
    pub curve: SplineCurve,
    pub rest_positions: Vec<Vec3>,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub colors: Vec<Rgb>,
    pub indices: Vec<u32>,
    pub bounds: Aabb,
    pub tubular_segments: usize,
    pub radial_segments: usize,
}

impl Branch {
    pub fn build(spec: BranchSpec, tube: &TubeConfig, base_color: Rgb) -> Self {
        let curve = SplineCurve::through(&control_points(&spec, tube.control_segments));
        let geometry = TubeGeometry::build(&curve, tube.tubular_segments, tube.radial_segments);
        let vertex_count = geometry.vertex_count();

        let mut branch = Self {
            spec,
            curve,
            positions: geometry.positions.clone(),
            rest_positions: geometry.positions,
            normals: vec![Vec3::ZERO; vertex_count],
            colors: vec![base_color; vertex_count],
            indices: geometry.indices,
            bounds: Aabb::EMPTY,
            tubular_segments: geometry.tubular_segments,
            radial_segments: geometry.radial_segments,
        };
        branch.refresh_surface();
        branch
    }

    pub fn vertex_count(&self) -> usize {
        self.rest_positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Recomputes normals and bounds from the current positions.
    pub fn refresh_surface(&mut self) {
        compute_vertex_normals(&self.positions, &self.indices, &mut self.normals);
        self.bounds = Aabb::from_points(&self.positions);
    }

    /// Nearest hit of a local-space ray against the current positions.
    pub fn raycast(&self, ray: &Ray) -> Option<f32> {
        if !self.bounds.intersects(ray) {
            return None;
        }
        intersect_mesh(ray, &self.positions, &self.indices)
    }
}

/// Area-weighted vertex normals.
///
/// Each triangle's unnormalized face normal is added to its three corners
/// and the sums are normalized. `normals` is overwritten in place.
pub fn compute_vertex_normals(positions: &[Vec3], indices: &[u32], normals: &mut [Vec3]) {
    normals.fill(Vec3::ZERO);

    for tri in indices.chunks_exact(3) {
        let (ia, ib, ic) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let (a, b, c) = (positions[ia], positions[ib], positions[ic]);
        let face = (c - b).cross(a - b);
        normals[ia] += face;
        normals[ib] += face;
        normals[ic] += face;
    }

    for n in normals.iter_mut() {
        *n = n.normalize_or_zero();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_tube() -> TubeConfig {
        TubeConfig {
            control_segments: 30,
            tubular_segments: 40,
            radial_segments: 12,
        }
    }

    fn spec() -> BranchSpec {
        BranchSpec::new(Vec3::ZERO, Vec3::new(1.0, 0.5, 0.0), 8.0)
    }

    #[test]
    fn build_initializes_buffers_to_rest_state() {
        let base = Rgb::from_hex(0xff1a1a);
        let branch = Branch::build(spec(), &small_tube(), base);

        assert_eq!(branch.vertex_count(), 41 * 13);
        assert_eq!(branch.triangle_count(), 40 * 12 * 2);
        assert_eq!(branch.positions, branch.rest_positions);
        assert_eq!(branch.normals.len(), branch.vertex_count());
        assert!(branch.colors.iter().all(|&c| c == base));
        assert!(!branch.bounds.is_empty());
    }

    #[test]
    fn default_resolution_counts() {
        let branch = Branch::build(spec(), &TubeConfig::default(), Rgb::WHITE);
        assert_eq!(branch.vertex_count(), 401 * 49);
        assert_eq!(branch.triangle_count(), 400 * 48 * 2);
    }

    #[test]
    fn identical_specs_build_identical_branches() {
        let a = Branch::build(spec(), &TubeConfig::default(), Rgb::WHITE);
        let b = Branch::build(spec(), &TubeConfig::default(), Rgb::WHITE);
        assert_eq!(a.rest_positions, b.rest_positions);
        assert_eq!(a.indices, b.indices);
    }

    #[test]
    fn normals_point_away_from_centerline() {
        let branch = Branch::build(spec(), &small_tube(), Rgb::WHITE);
        let ring = branch.radial_segments + 1;

        // Middle ring, where the tube is thickest.
        let i = branch.tubular_segments / 2;
        let center = branch.curve.point(0.5);
        let mut outward = 0;
        for j in 0..branch.radial_segments {
            let idx = i * ring + j;
            let radial = branch.positions[idx] - center;
            if branch.normals[idx].dot(radial) > 0.0 {
                outward += 1;
            }
        }
        assert_eq!(outward, branch.radial_segments);
    }

    #[test]
    fn normals_of_flat_quad_are_unit_z() {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let indices = vec![0, 1, 2, 0, 2, 3];
        let mut normals = vec![Vec3::ONE; 4];
        compute_vertex_normals(&positions, &indices, &mut normals);
        for n in normals {
            assert!(n.distance(Vec3::Z) < 1e-6);
        }
    }

    #[test]
    fn raycast_hits_middle_of_tube() {
        let branch = Branch::build(
            BranchSpec::new(Vec3::ZERO, Vec3::X, 10.0),
            &small_tube(),
            Rgb::WHITE,
        );
        let target = branch.curve.point(0.5);
        let ray = Ray::new(target + Vec3::Z * 20.0, -Vec3::Z);
        let t = branch.raycast(&ray).expect("ray through the centerline hits");
        assert!(t < 20.0 && t > 18.0, "t = {t}");

        let miss = Ray::new(target + Vec3::new(0.0, 30.0, 20.0), -Vec3::Z);
        assert_eq!(branch.raycast(&miss), None);
    }
}
