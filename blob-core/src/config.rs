//! Engine configuration.
//!
//! Every section falls back to its defaults when missing, so an empty TOML
//! document yields [`EngineConfig::default`]. The defaults reproduce the
//! stock look of the effect: 8 branches, 400 x 48 tube resolution, a five
//! second growth phase and a red-to-white pointer highlight.

use crate::error::ConfigError;
use crate::types::Rgb;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration for [`crate::engine::Engine`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seed for the noise permutation table; `None` picks a random one.
    pub noise_seed: Option<u64>,
    /// Seconds the structure takes to grow from a point to full size.
    pub growth_duration: f32,
    /// Slow whole-structure rotation.
    pub rotate: bool,
    pub tube: TubeConfig,
    pub deform: DeformConfig,
    pub interaction: InteractionConfig,
    pub camera: CameraConfig,
    pub palette: Palette,
    pub branches: Vec<BranchSpec>,
}

/// Tube mesh resolution.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TubeConfig {
    /// Segments of the coarse control polyline.
    pub control_segments: usize,
    /// Longitudinal samples along the spline (rings = segments + 1).
    pub tubular_segments: usize,
    /// Vertices per ring, not counting the seam duplicate.
    pub radial_segments: usize,
}

/// Tuning of the per-frame displacement field.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeformConfig {
    /// Base spatial frequency of the noise octaves.
    pub noise_scale: f32,
    /// Base time speed of the noise octaves.
    pub noise_speed: f32,
    /// Multiplier on the summed displacement; 0 disables breathing.
    pub displacement_gain: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// World-space distance at which pointer influence fades to zero.
    pub reaction_radius: f32,
    /// Distance along the pointer ray used when nothing is hit.
    pub fallback_distance: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
}

/// The four color stops of the pointer highlight, from no influence to full.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub base: Rgb,
    pub bright: Rgb,
    pub accent: Rgb,
    pub highlight: Rgb,
}

/// Construction parameters of one branch.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BranchSpec {
    pub origin: Vec3,
    /// Growth axis. Not normalized; its length stretches the branch.
    pub direction: Vec3,
    pub scale: f32,
}

impl BranchSpec {
    pub const fn new(origin: Vec3, direction: Vec3, scale: f32) -> Self {
        Self {
            origin,
            direction,
            scale,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            noise_seed: None,
            growth_duration: 5.0,
            rotate: true,
            tube: TubeConfig::default(),
            deform: DeformConfig::default(),
            interaction: InteractionConfig::default(),
            camera: CameraConfig::default(),
            palette: Palette::default(),
            branches: default_branches(),
        }
    }
}

impl Default for TubeConfig {
    fn default() -> Self {
        Self {
            control_segments: 30,
            tubular_segments: 400,
            radial_segments: 48,
        }
    }
}

impl Default for DeformConfig {
    fn default() -> Self {
        Self {
            noise_scale: 0.8,
            noise_speed: 0.3,
            displacement_gain: 1.0,
        }
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            reaction_radius: 8.0,
            fallback_distance: 15.0,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            position: Vec3::new(0.0, 3.0, 15.0),
            target: Vec3::ZERO,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            base: Rgb::from_hex(0xff1a1a),
            bright: Rgb::from_hex(0xff6666),
            accent: Rgb::from_hex(0xff00ff),
            highlight: Rgb::WHITE,
        }
    }
}

/// The stock eight-branch layout, all rooted at the origin.
pub fn default_branches() -> Vec<BranchSpec> {
    [
        (Vec3::new(1.0, 0.5, 0.0), 8.0),
        (Vec3::new(-1.0, 0.3, 0.5), 7.0),
        (Vec3::new(0.5, 1.0, 0.2), 8.0),
        (Vec3::new(-0.3, -0.8, 0.4), 7.0),
        (Vec3::new(0.2, 0.4, 1.0), 7.0),
        (Vec3::new(-0.5, 0.2, -0.8), 7.0),
        (Vec3::new(0.8, -0.4, 0.3), 6.0),
        (Vec3::new(-0.7, 0.6, -0.2), 6.0),
    ]
    .into_iter()
    .map(|(direction, scale)| BranchSpec::new(Vec3::ZERO, direction, scale))
    .collect()
}

impl EngineConfig {
    /// Parses a TOML document; missing sections keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, EngineConfig::default());
        assert_eq!(cfg.branches.len(), 8);
    }

    #[test]
    fn partial_document_overrides_only_named_fields() {
        let cfg = EngineConfig::from_toml_str(
            r#"
            noise_seed = 7

            [interaction]
            reaction_radius = 4.0
            "#,
        )
        .unwrap();

        assert_eq!(cfg.noise_seed, Some(7));
        assert_eq!(cfg.interaction.reaction_radius, 4.0);
        // Untouched field in the same section.
        assert_eq!(cfg.interaction.fallback_distance, 15.0);
        assert_eq!(cfg.tube, TubeConfig::default());
    }

    #[test]
    fn branches_can_be_replaced() {
        let cfg = EngineConfig::from_toml_str(
            r#"
            [[branches]]
            origin = [0.0, 0.0, 0.0]
            direction = [1.0, 0.0, 0.0]
            scale = 3.0
            "#,
        )
        .unwrap();

        assert_eq!(cfg.branches.len(), 1);
        assert_eq!(cfg.branches[0].direction, Vec3::X);
        assert_eq!(cfg.branches[0].scale, 3.0);
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        let err = EngineConfig::from_toml_str("growth_duration = \"slow\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = EngineConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn default_config_roundtrips_through_toml() {
        let text = toml::to_string(&EngineConfig::default()).unwrap();
        let back = EngineConfig::from_toml_str(&text).unwrap();
        assert_eq!(back, EngineConfig::default());
    }
}
