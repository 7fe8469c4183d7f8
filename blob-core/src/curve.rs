//! Branch centerlines: the wobbly control polyline and the smooth spline
//! through it.

use crate::config::BranchSpec;
use glam::Vec3;
use std::f32::consts::PI;

/// Control points of a branch centerline.
///
/// Points advance linearly from `spec.origin` along
/// `spec.direction * spec.scale`, with a different-frequency sine offset on
/// each axis so the branch grows organically rather than straight.
///
/// ### Parameters
/// - `spec` - Origin, direction and length of the branch.
/// - `segments` - Number of polyline segments; `segments + 1` points are
///   returned.
pub fn control_points(spec: &BranchSpec, segments: usize) -> Vec<Vec3> {
    let segments = segments.max(1);
    (0..=segments)
        .map(|i| {
            let t = i as f32 / segments as f32;
            let wobble = Vec3::new(
                (t * PI * 2.0).sin() * 0.5,
                (t * PI * 3.0).cos() * 0.4,
                (t * PI * 4.0).sin() * 0.3,
            );
            spec.origin + spec.direction * t * spec.scale + wobble
        })
        .collect()
}

/// Cubic polynomial `c0 + c1 t + c2 t^2 + c3 t^3` on one spline segment.
#[derive(Clone, Copy, Debug)]
struct CubicSegment {
    c0: Vec3,
    c1: Vec3,
    c2: Vec3,
    c3: Vec3,
}

impl CubicSegment {
    /// Hermite segment from `p1` to `p2` with end tangents `m1`, `m2`.
    fn hermite(p1: Vec3, p2: Vec3, m1: Vec3, m2: Vec3) -> Self {
        Self {
            c0: p1,
            c1: m1,
            c2: -3.0 * p1 + 3.0 * p2 - 2.0 * m1 - m2,
            c3: 2.0 * p1 - 2.0 * p2 + m1 + m2,
        }
    }

    /// Centripetal Catmull-Rom segment between `p1` and `p2`.
    fn centripetal(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3) -> Self {
        let mut dt0 = p0.distance_squared(p1).powf(0.25);
        let mut dt1 = p1.distance_squared(p2).powf(0.25);
        let mut dt2 = p2.distance_squared(p3).powf(0.25);

        // Coincident points.
        if dt1 < 1e-4 {
            dt1 = 1.0;
        }
        if dt0 < 1e-4 {
            dt0 = dt1;
        }
        if dt2 < 1e-4 {
            dt2 = dt1;
        }

        let m1 = ((p1 - p0) / dt0 - (p2 - p0) / (dt0 + dt1) + (p2 - p1) / dt1) * dt1;
        let m2 = ((p2 - p1) / dt1 - (p3 - p1) / (dt1 + dt2) + (p3 - p2) / dt2) * dt1;
        Self::hermite(p1, p2, m1, m2)
    }

    fn point(&self, t: f32) -> Vec3 {
        ((self.c3 * t + self.c2) * t + self.c1) * t + self.c0
    }

    fn derivative(&self, t: f32) -> Vec3 {
        (self.c3 * (3.0 * t) + self.c2 * 2.0) * t + self.c1
    }
}

/// An open centripetal Catmull-Rom spline through a list of points.
///
/// The curve parameter `t` in `[0, 1]` is split evenly between segments;
/// the first and last segments use mirrored phantom points so the curve
/// passes through both end points.
#[derive(Clone, Debug)]
pub struct SplineCurve {
    segments: Vec<CubicSegment>,
}

impl SplineCurve {
    /// Fits a spline through `points`.
    ///
    /// ### Panics
    /// Panics if fewer than two points are given.
    pub fn through(points: &[Vec3]) -> Self {
        assert!(points.len() >= 2, "a spline needs at least two points");

        let n = points.len();
        let segments = (0..n - 1)
            .map(|i| {
                let p1 = points[i];
                let p2 = points[i + 1];
                let p0 = if i > 0 { points[i - 1] } else { 2.0 * p1 - p2 };
                let p3 = if i + 2 < n {
                    points[i + 2]
                } else {
                    2.0 * p2 - p1
                };
                CubicSegment::centripetal(p0, p1, p2, p3)
            })
            .collect();

        Self { segments }
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Position at curve parameter `t`, clamped to `[0, 1]`.
    pub fn point(&self, t: f32) -> Vec3 {
        let (segment, local) = self.locate(t);
        self.segments[segment].point(local)
    }

    /// Unit tangent at curve parameter `t`.
    pub fn tangent(&self, t: f32) -> Vec3 {
        let (segment, local) = self.locate(t);
        self.segments[segment].derivative(local).normalize_or_zero()
    }

    /// Samples `divisions + 1` evenly spaced parameter values.
    pub fn sample(&self, divisions: usize) -> Vec<(Vec3, Vec3)> {
        let divisions = divisions.max(1);
        (0..=divisions)
            .map(|i| {
                let t = i as f32 / divisions as f32;
                (self.point(t), self.tangent(t))
            })
            .collect()
    }

    fn locate(&self, t: f32) -> (usize, f32) {
        let last = self.segments.len() - 1;
        let scaled = t.clamp(0.0, 1.0) * self.segments.len() as f32;
        let index = (scaled.floor() as usize).min(last);
        (index, scaled - index as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> BranchSpec {
        BranchSpec::new(Vec3::ZERO, Vec3::new(1.0, 0.5, 0.0), 8.0)
    }

    #[test]
    fn control_points_follow_direction_with_wobble() {
        let pts = control_points(&spec(), 30);
        assert_eq!(pts.len(), 31);

        // t = 0: only the cosine term contributes.
        assert!(pts[0].distance(Vec3::new(0.0, 0.4, 0.0)) < 1e-6);

        // t = 1: sin(2π) ≈ 0, cos(3π) = -1, sin(4π) ≈ 0.
        let end = Vec3::new(8.0, 4.0 - 0.4, 0.0);
        assert!(pts[30].distance(end) < 1e-4, "end = {:?}", pts[30]);
    }

    #[test]
    fn spline_passes_through_control_points() {
        let pts = control_points(&spec(), 30);
        let curve = SplineCurve::through(&pts);
        assert_eq!(curve.segment_count(), 30);

        for (i, p) in pts.iter().enumerate() {
            let t = i as f32 / 30.0;
            assert!(
                curve.point(t).distance(*p) < 1e-4,
                "point {i}: {:?} vs {:?}",
                curve.point(t),
                p
            );
        }
    }

    #[test]
    fn straight_line_has_constant_tangent() {
        let pts: Vec<Vec3> = (0..5).map(|i| Vec3::X * i as f32).collect();
        let curve = SplineCurve::through(&pts);

        for (p, tangent) in curve.sample(40) {
            assert!(p.y.abs() < 1e-5 && p.z.abs() < 1e-5);
            assert!(tangent.distance(Vec3::X) < 1e-4, "tangent = {tangent:?}");
        }
    }

    #[test]
    fn sampling_returns_divisions_plus_one() {
        let curve = SplineCurve::through(&control_points(&spec(), 30));
        let samples = curve.sample(400);
        assert_eq!(samples.len(), 401);
        for (_, tangent) in samples {
            assert!((tangent.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn spline_is_continuous_across_segment_boundaries() {
        let curve = SplineCurve::through(&control_points(&spec(), 30));
        for i in 1..30 {
            let t = i as f32 / 30.0;
            let before = curve.point(t - 1e-4);
            let after = curve.point(t + 1e-4);
            assert!(before.distance(after) < 1e-2);
        }
    }
}
