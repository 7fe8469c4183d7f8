//! Per-frame deformation and pointer coloring of branches.
//!
//! Every frame is computed from the immutable rest shape, so the result for
//! a given elapsed time does not depend on earlier frames:
//! 1. [`growth_envelope`] ramps the whole structure from a point to full size.
//! 2. [`displacement`] sums noise octaves, travelling waves, pulses, a global
//!    breath and fine ripples into one scalar per vertex.
//! 3. [`deform_branch`] scales every rest vertex about the branch origin by
//!    `growth * (1 + displacement)`.
//! 4. [`recolor_branch`] blends each vertex through the [`Palette`] by its
//!    proximity to the pointer's world-space interaction point.

use crate::{
    branch::Branch,
    config::{DeformConfig, Palette},
    noise::NoiseField,
    types::Rgb,
};
use glam::{Mat4, Vec3};

/// Cubic Hermite smoothstep on `[0, 1]`; input is clamped.
#[inline]
pub fn smoothstep(x: f32) -> f32 {
    let x = x.clamp(0.0, 1.0);
    x * x * (3.0 - 2.0 * x)
}

/// Growth of the structure at `elapsed` seconds.
///
/// Monotonic, 0 at start and exactly 1 from `duration` onwards.
pub fn growth_envelope(elapsed: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        return 1.0;
    }
    smoothstep((elapsed / duration).min(1.0))
}

/// Noise octaves as `(frequency factor, per-axis time speed, amplitude)`.
const OCTAVES: [(f32, [f32; 3], f32); 3] = [
    (0.5, [1.0, 0.8, 0.6], 0.25),
    (1.5, [1.2, 0.9, 1.1], 0.15),
    (3.0, [1.5, 1.3, 1.4], 0.08),
];

/// Scalar displacement of a rest vertex at `time`.
///
/// The octaves run at different time speeds per axis so they never stay
/// phase locked. The remaining terms are plain trigonometric waves in
/// position, radial distance and polar angle.
pub fn displacement(noise: &NoiseField, v: Vec3, time: f32, cfg: &DeformConfig) -> f32 {
    let scale = cfg.noise_scale;
    let speed = cfg.noise_speed;

    let octaves: f32 = OCTAVES
        .iter()
        .map(|&(freq, [sx, sy, sz], amp)| {
            let f = scale * freq;
            noise.noise(
                v.x * f + time * speed * sx,
                v.y * f + time * speed * sy,
                v.z * f + time * speed * sz,
            ) * amp
        })
        .sum();

    let distance = v.length();
    let angle = v.y.atan2(v.x);

    let waves = (time * 0.5 + v.x * 0.4 + v.y * 0.3).sin() * 0.12
        + (time * 0.6 + v.z * 0.5 - v.x * 0.2).cos() * 0.10
        + (time * 0.7 + distance * 0.6 + angle * 2.0).sin() * 0.09;

    let pulses =
        (time * 0.4 + distance * 0.8).sin() * 0.08 + (time * 0.45 + angle * 3.0).cos() * 0.07;

    let breath = (time * 0.35).sin() * 0.1;

    let ripples = (time * 0.8 + v.x * 0.7 - v.y * 0.4).sin() * 0.06
        + (time * 0.9 + v.z * 0.8 + v.x * 0.3).cos() * 0.05;

    (octaves + waves + pulses + breath + ripples) * cfg.displacement_gain
}

/// Pointer influence for a vertex `distance` world units from the
/// interaction point: 1 on top of it, fading smoothly to 0 at `radius`.
pub fn influence(distance: f32, radius: f32) -> f32 {
    if radius <= 0.0 {
        return 0.0;
    }
    smoothstep((1.0 - distance / radius).max(0.0))
}

/// Influence thresholds between consecutive palette stops.
const RAMP: [f32; 4] = [0.1, 0.4, 0.7, 1.0];

/// Maps an influence in `[0, 1]` onto the palette.
///
/// Up to 0.1 the color stays at `base`; from there it blends linearly
/// base → bright → accent → highlight, reaching each stop at 0.4, 0.7 and 1.
pub fn ramp_color(palette: &Palette, influence: f32) -> Rgb {
    let stops = [palette.base, palette.bright, palette.accent, palette.highlight];
    let x = influence.clamp(0.0, 1.0);

    if x <= RAMP[0] {
        return palette.base;
    }
    for k in 0..3 {
        let (lo, hi) = (RAMP[k], RAMP[k + 1]);
        if x <= hi {
            return stops[k].lerp(stops[k + 1], (x - lo) / (hi - lo));
        }
    }
    palette.highlight
}

/// Rewrites `branch.positions` from its rest shape for this frame, then
/// refreshes normals and bounds.
pub fn deform_branch(
    branch: &mut Branch,
    noise: &NoiseField,
    time: f32,
    growth: f32,
    cfg: &DeformConfig,
) {
    let origin = branch.spec.origin;
    for (rest, out) in branch.rest_positions.iter().zip(branch.positions.iter_mut()) {
        let effective = growth * (1.0 + displacement(noise, *rest, time, cfg));
        *out = origin + (*rest - origin) * effective;
    }
    branch.refresh_surface();
}

/// Rewrites `branch.colors` from the distance between each rest vertex,
/// placed in world space by `world`, and the interaction point.
pub fn recolor_branch(
    branch: &mut Branch,
    world: &Mat4,
    interaction_point: Vec3,
    reaction_radius: f32,
    palette: &Palette,
) {
    for (rest, color) in branch.rest_positions.iter().zip(branch.colors.iter_mut()) {
        let d = world.transform_point3(*rest).distance(interaction_point);
        *color = ramp_color(palette, influence(d, reaction_radius));
    }
}
