//! Runtime cell configuration loaded from `assets/cell.toml`.
//!
//! [`CellConfig`] is a Bevy [`Resource`] that mirrors the runtime-relevant
//! constants in [`crate::constants`].  At startup, [`load_cell_config`] reads
//! `assets/cell.toml` and overwrites the defaults with any values present in
//! the file.  Missing keys fall back to the compile-time defaults, so a minimal
//! TOML can override just the values you care about.
//!
//! ## Usage in systems
//!
//! Add `config: Res<CellConfig>` to any system parameter list and read values
//! with `config.bubble_step`, `config.targets()`, etc.
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `CellConfig::default()`.

use crate::bubbles::{ElectrodeTargets, SpawnVolume};
use crate::constants::*;
use crate::error::{CellError, CellResult};
use crate::indicator::{IndicatorLook, IndicatorLooks};
use bevy::prelude::*;
use serde::Deserialize;

/// Path of the optional override file, relative to the working directory.
pub const CONFIG_PATH: &str = "assets/cell.toml";

/// Runtime-tunable animation, indicator, and camera configuration.
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CellConfig {
    // ── Bubble Migration ─────────────────────────────────────────────────────
    pub bubble_step: f32,
    pub arrival_threshold: f32,
    pub manganese_bubble_count: u32,
    pub iron_bubble_count: u32,
    pub bubble_radius: f32,
    pub bubble_opacity: f32,
    /// Fixes the spawn layout when set; otherwise every run differs.
    pub seed: Option<u64>,

    // ── Geometry ─────────────────────────────────────────────────────────────
    pub electrolyte_size: [f32; 3],
    pub manganese_target: [f32; 3],
    pub iron_target: [f32; 3],

    // ── Indicator ────────────────────────────────────────────────────────────
    pub led_dim_color: [f32; 3],
    pub led_dim_emissive: f32,
    pub led_dim_intensity: f32,
    pub led_glow_color: [f32; 3],
    pub led_glow_emissive: f32,
    pub led_glow_intensity: f32,

    // ── Camera ───────────────────────────────────────────────────────────────
    pub min_orbit_radius: f32,
    pub max_orbit_radius: f32,
    pub zoom_speed: f32,
    pub orbit_sensitivity: f32,
}

impl Default for CellConfig {
    fn default() -> Self {
        Self {
            // Bubble Migration
            bubble_step: BUBBLE_STEP,
            arrival_threshold: ARRIVAL_THRESHOLD,
            manganese_bubble_count: MANGANESE_BUBBLE_COUNT,
            iron_bubble_count: IRON_BUBBLE_COUNT,
            bubble_radius: BUBBLE_RADIUS,
            bubble_opacity: BUBBLE_OPACITY,
            seed: None,
            // Geometry
            electrolyte_size: ELECTROLYTE_SIZE,
            manganese_target: MANGANESE_PLATE_POS,
            iron_target: IRON_PLATE_POS,
            // Indicator
            led_dim_color: LED_DIM_COLOR,
            led_dim_emissive: LED_DIM_EMISSIVE,
            led_dim_intensity: LED_DIM_INTENSITY,
            led_glow_color: LED_GLOW_COLOR,
            led_glow_emissive: LED_GLOW_EMISSIVE,
            led_glow_intensity: LED_GLOW_INTENSITY,
            // Camera
            min_orbit_radius: MIN_ORBIT_RADIUS,
            max_orbit_radius: MAX_ORBIT_RADIUS,
            zoom_speed: ZOOM_SPEED,
            orbit_sensitivity: ORBIT_SENSITIVITY,
        }
    }
}

impl CellConfig {
    /// Parse a (possibly partial) TOML document and validate the result.
    pub fn from_toml_str(contents: &str) -> CellResult<Self> {
        let config: CellConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the migration engine cannot honour.
    pub fn validate(&self) -> CellResult<()> {
        positive("bubble_step", self.bubble_step)?;
        positive("arrival_threshold", self.arrival_threshold)?;
        if self.bubble_step > self.arrival_threshold {
            return Err(CellError::InvalidConstant {
                name: "bubble_step",
                value: self.bubble_step,
                safe_range: "(0.0, arrival_threshold]",
            });
        }
        positive("bubble_radius", self.bubble_radius)?;
        if self.min_orbit_radius <= 0.0 || self.min_orbit_radius > self.max_orbit_radius {
            return Err(CellError::InvalidConstant {
                name: "min_orbit_radius",
                value: self.min_orbit_radius,
                safe_range: "(0.0, max_orbit_radius]",
            });
        }
        self.spawn_volume()?;
        Ok(())
    }

    pub fn targets(&self) -> ElectrodeTargets {
        ElectrodeTargets {
            manganese: Vec3::from_array(self.manganese_target),
            iron: Vec3::from_array(self.iron_target),
        }
    }

    /// The electrolyte box, centred on the origin.
    pub fn spawn_volume(&self) -> CellResult<SpawnVolume> {
        SpawnVolume::centered(Vec3::ZERO, Vec3::from_array(self.electrolyte_size))
    }

    pub fn indicator_looks(&self) -> IndicatorLooks {
        IndicatorLooks {
            dim: IndicatorLook {
                color: rgb(self.led_dim_color),
                emissive_intensity: self.led_dim_emissive,
                light_intensity: self.led_dim_intensity,
            },
            glowing: IndicatorLook {
                color: rgb(self.led_glow_color),
                emissive_intensity: self.led_glow_emissive,
                light_intensity: self.led_glow_intensity,
            },
        }
    }
}

/// sRGB colour from a `[r, g, b]` triple in 0–1.
#[inline]
pub fn rgb([r, g, b]: [f32; 3]) -> Color {
    Color::srgb(r, g, b)
}

fn positive(name: &'static str, value: f32) -> CellResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(CellError::InvalidConstant {
            name,
            value,
            safe_range: "(0.0, ∞)",
        })
    }
}

/// Startup system: attempt to load `assets/cell.toml` and overwrite the
/// `CellConfig` resource with any values present in the file.
///
/// Missing keys retain their compiled defaults.  Parse and validation errors
/// are logged but do not abort the app.  A missing file is not an error.
pub fn load_cell_config(mut config: ResMut<CellConfig>) {
    match std::fs::read_to_string(CONFIG_PATH) {
        Ok(contents) => match CellConfig::from_toml_str(&contents) {
            Ok(loaded) => {
                *config = loaded;
                info!("Loaded cell config from {CONFIG_PATH}");
            }
            Err(e) => {
                warn!("Rejected {CONFIG_PATH}: {e}; using defaults");
            }
        },
        Err(_) => {
            info!("No {CONFIG_PATH} found; using compiled defaults");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        CellConfig::default().validate().expect("defaults must validate");
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config = CellConfig::from_toml_str("").unwrap();
        assert_eq!(config, CellConfig::default());
    }

    #[test]
    fn partial_document_overrides_only_named_keys() {
        let config = CellConfig::from_toml_str(
            "manganese_bubble_count = 5\nseed = 99\niron_target = [0.0, 0.0, 3.0]\n",
        )
        .unwrap();
        assert_eq!(config.manganese_bubble_count, 5);
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.targets().iron, Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(config.iron_bubble_count, IRON_BUBBLE_COUNT);
        assert_eq!(config.bubble_step, BUBBLE_STEP);
    }

    #[test]
    fn step_larger_than_threshold_is_rejected() {
        let err = CellConfig::from_toml_str("bubble_step = 0.5").unwrap_err();
        assert!(matches!(
            err,
            CellError::InvalidConstant {
                name: "bubble_step",
                ..
            }
        ));
    }

    #[test]
    fn flat_electrolyte_is_rejected() {
        let err = CellConfig::from_toml_str("electrolyte_size = [1.8, 0.0, 4.8]").unwrap_err();
        assert!(matches!(err, CellError::DegenerateVolume { axis: "y", .. }));
    }

    #[test]
    fn negative_count_fails_to_parse() {
        let err = CellConfig::from_toml_str("iron_bubble_count = -3").unwrap_err();
        assert!(matches!(err, CellError::ConfigParse(_)));
    }

    #[test]
    fn indicator_looks_follow_config() {
        let looks = CellConfig::default().indicator_looks();
        assert_eq!(looks.dim.color, Color::srgb(1.0, 1.0, 0.0));
        assert_eq!(looks.glowing.color, Color::srgb(1.0, 0.0, 0.0));
        assert!(looks.glowing.light_intensity > looks.dim.light_intensity);
    }
}
