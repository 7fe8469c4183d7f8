//! Coherent 3-D gradient noise.
//!
//! [`NoiseField`] is the classic improved gradient noise: a shuffled
//! permutation of `0..=255`, duplicated so corner lookups never wrap, a
//! quintic fade curve, and twelve edge gradients picked from the low four
//! bits of each corner hash.

use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

const TABLE_SIZE: usize = 256;

/// A seedable, deterministic coherent-noise field.
///
/// All randomness is spent at construction; [`NoiseField::noise`] is a pure
/// function of its input and the table.
#[derive(Clone, Debug)]
pub struct NoiseField {
    /// Permutation of `0..=255` stored twice.
    perm: [u8; TABLE_SIZE * 2],
}

impl NoiseField {
    /// Builds a field from a random shuffle drawn from `rng`.
    pub fn new(rng: &mut impl Rng) -> Self {
        let mut base: [u8; TABLE_SIZE] = std::array::from_fn(|i| i as u8);
        base.shuffle(rng);

        let mut perm = [0u8; TABLE_SIZE * 2];
        perm[..TABLE_SIZE].copy_from_slice(&base);
        perm[TABLE_SIZE..].copy_from_slice(&base);
        Self { perm }
    }

    /// Builds a reproducible field from a seed.
    pub fn from_seed(seed: u64) -> Self {
        Self::new(&mut StdRng::seed_from_u64(seed))
    }

    /// Evaluates the field at `(x, y, z)`.
    ///
    /// ### Returns
    /// A value in `[-1, 1]`, continuous in all three coordinates.
    pub fn noise(&self, x: f32, y: f32, z: f32) -> f32 {
        let (xf, yf, zf) = (x.floor(), y.floor(), z.floor());

        // Lattice cell, wrapped into the table.
        let xi = (xf as i32 & 255) as usize;
        let yi = (yf as i32 & 255) as usize;
        let zi = (zf as i32 & 255) as usize;

        // Position inside the cell.
        let (x, y, z) = (x - xf, y - yf, z - zf);
        let (u, v, w) = (fade(x), fade(y), fade(z));

        let p = &self.perm;
        let a = p[xi] as usize + yi;
        let aa = p[a] as usize + zi;
        let ab = p[a + 1] as usize + zi;
        let b = p[xi + 1] as usize + yi;
        let ba = p[b] as usize + zi;
        let bb = p[b + 1] as usize + zi;

        let value = lerp(
            w,
            lerp(
                v,
                lerp(u, grad(p[aa], x, y, z), grad(p[ba], x - 1.0, y, z)),
                lerp(
                    u,
                    grad(p[ab], x, y - 1.0, z),
                    grad(p[bb], x - 1.0, y - 1.0, z),
                ),
            ),
            lerp(
                v,
                lerp(
                    u,
                    grad(p[aa + 1], x, y, z - 1.0),
                    grad(p[ba + 1], x - 1.0, y, z - 1.0),
                ),
                lerp(
                    u,
                    grad(p[ab + 1], x, y - 1.0, z - 1.0),
                    grad(p[bb + 1], x - 1.0, y - 1.0, z - 1.0),
                ),
            ),
        );

        value.clamp(-1.0, 1.0)
    }
}

#[inline]
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(t: f32, a: f32, b: f32) -> f32 {
    a + t * (b - a)
}

/// Dot product of `(x, y, z)` with one of the twelve cube-edge gradients.
#[inline]
fn grad(hash: u8, x: f32, y: f32, z: f32) -> f32 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    let u = if h & 1 == 0 { u } else { -u };
    let v = if h & 2 == 0 { v } else { -v };
    u + v
}
