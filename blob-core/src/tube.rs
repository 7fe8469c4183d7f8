//! Skinning a centerline into a closed, twisted, ridged tube.

use crate::curve::SplineCurve;
use glam::Vec3;
use std::f32::consts::{PI, TAU};

/// Tube radius at curve parameter `t` in `[0, 1]`.
///
/// A central bulge with a three-lobed detail wave, multiplied by a taper
/// that pulls the radius to zero at both ends so open tube ends close to a
/// point.
pub fn radius(t: f32) -> f32 {
    // sin(π) is slightly negative in f32; fractional powers need >= 0.
    let s = (t * PI).sin().max(0.0);
    let bulge = s.powf(1.5) * 0.6;
    let detail = (t * PI * 3.0).sin() * 0.2;
    let taper = s.powf(0.3);
    ((0.3 + bulge + detail) * taper).max(0.0)
}

/// Orthonormal `(normal, binormal)` pair perpendicular to `tangent`.
///
/// The normal is derived from the tangent's XY components; when the tangent
/// runs (almost) along Z that projection degenerates, so a fixed X axis is
/// used instead.
pub fn ring_frame(tangent: Vec3) -> (Vec3, Vec3) {
    let mut normal = if tangent.z.abs() < 0.999 {
        Vec3::new(-tangent.y, tangent.x, 0.0).normalize_or_zero()
    } else {
        Vec3::X
    };
    if normal == Vec3::ZERO {
        normal = Vec3::X;
    }
    let binormal = tangent.cross(normal).normalize_or_zero();
    let normal = binormal.cross(tangent).normalize_or_zero();
    (normal, binormal)
}

/// Vertex positions and triangle indices of one tube.
#[derive(Clone, Debug, PartialEq)]
pub struct TubeGeometry {
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub tubular_segments: usize,
    pub radial_segments: usize,
}

impl TubeGeometry {
    /// Skins `curve` with `tubular_segments + 1` rings of
    /// `radial_segments + 1` vertices.
    ///
    /// Each ring is rotated by a twist that grows to 1.5π along the tube and
    /// carries four radial ridges, so the ridges spiral. The last vertex of
    /// every ring duplicates the first to close the seam.
    pub fn build(curve: &SplineCurve, tubular_segments: usize, radial_segments: usize) -> Self {
        let tubular_segments = tubular_segments.max(1);
        let radial_segments = radial_segments.max(3);
        let ring = radial_segments + 1;

        let mut positions = Vec::with_capacity((tubular_segments + 1) * ring);
        for (i, (center, tangent)) in curve.sample(tubular_segments).into_iter().enumerate() {
            let t = i as f32 / tubular_segments as f32;
            let (normal, binormal) = ring_frame(tangent);
            let r = radius(t);
            let twist = t * PI * 1.5;

            for j in 0..=radial_segments {
                // Reuse the exact angle of j = 0 for the seam.
                let j = if j == radial_segments { 0 } else { j };
                let v = j as f32 / radial_segments as f32 * TAU;
                let (sin, cos) = (v + twist).sin_cos();
                let local_radius = r * (1.0 + (v * 4.0).sin() * 0.1);
                positions.push(center + local_radius * (cos * normal + sin * binormal));
            }
        }

        // Two triangles per quad, wound so face normals point away from the
        // centerline.
        let mut indices = Vec::with_capacity(tubular_segments * radial_segments * 6);
        for i in 0..tubular_segments {
            for j in 0..radial_segments {
                let a = (i * ring + j) as u32;
                let b = a + ring as u32;
                let c = b + 1;
                let d = a + 1;
                indices.extend_from_slice(&[a, d, b, b, d, c]);
            }
        }

        Self {
            positions,
            indices,
            tubular_segments,
            radial_segments,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}
