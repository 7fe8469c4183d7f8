use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Identifier for a branch in a [`crate::structure::LiquidStructure`].
///
/// This is an index into `LiquidStructure::branches`, and is only
/// meaningful within the lifetime of a given structure.
pub type BranchId = usize;

/// Linear RGB color with channels in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Builds a color from a packed `0xRRGGBB` value.
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let s = 1.0 - t;
        Rgb {
            r: self.r * s + other.r * t,
            g: self.g * s + other.g * t,
            b: self.b * s + other.b * t,
        }
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }
}

/// Size of a drawing surface in physical pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_hex_unpacks_channels() {
        let c = Rgb::from_hex(0xff00ff);
        assert_eq!(c, Rgb::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn lerp_hits_both_endpoints() {
        let a = Rgb::from_hex(0xff1a1a);
        let b = Rgb::WHITE;
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
    }

    #[test]
    fn empty_surface_has_a_zero_dimension() {
        assert!(SurfaceSize::new(0, 600).is_empty());
        assert!(SurfaceSize::new(800, 0).is_empty());
        assert!(!SurfaceSize::new(800, 600).is_empty());
    }
}
