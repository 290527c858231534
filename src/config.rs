use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One row of the inclination table: if the roll is at or above `threshold`,
/// the inclination is drawn uniformly from `0..max_degrees`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InclinationTier {
    pub threshold: f64,
    pub max_degrees: i64,
}

/// Every tunable of the per-body randomizers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Chance that a non-star body orbits the star instead of trying to become a moon.
    pub solar_orbit_chance: f64,
    /// Candidate draws before a would-be moon falls back to a solar orbit.
    pub max_reference_attempts: u32,
    /// Gravity multiplier range for star-orbiting bodies, relative to the home world.
    pub planet_gravity_range: (f64, f64),
    pub gas_giant_chance: f64,
    pub gas_giant_multiplier: f64,
    /// Raw draw range fed through the moon skew quadratic.
    pub moon_gravity_range: (f64, f64),
    /// SOI cap as a multiple of the home world's SOI.
    pub soi_cap_multiple: f64,
    /// A parent's SOI must be at least this multiple of each moon's SOI.
    pub parent_min_soi_ratio: f64,
    /// Multiplier range used when a parent's SOI has to be raised for a moon.
    pub parent_soi_ratio_range: (f64, f64),
    /// Share of the parent's SOI a clamped moon SOI is drawn from.
    pub moon_soi_share_range: (f64, f64),
    /// Multiples of the reference moon SOI added to a fallback moon SOI.
    pub moon_soi_jitter_range: (f64, f64),
    /// Checked from the first row down; a roll below every threshold gives 0°.
    pub inclination_tiers: Vec<InclinationTier>,
    /// Star-orbiting semi-major axis range in astronomical units.
    pub planet_sma_range_au: (f64, f64),
    /// Lowest fraction of the parent's hill sphere a moon starts from.
    pub moon_sma_floor: f64,
    /// Perturbation added to the hill-sphere fraction on each rejected placement.
    pub moon_sma_step_range: (f64, f64),
    pub max_placement_iterations: u32,
    pub planet_atmosphere_chance: f64,
    pub moon_atmosphere_chance: f64,
    pub oxygen_chance: f64,
    pub scale_height_range_km: (f64, f64),
    pub pressure_range: (f64, f64),
    pub ambient_tint_max: f64,
    pub temperature_scale: f64,
    pub rotation_hours_range: (f64, f64),
    pub slow_rotator_chance: f64,
    pub slow_rotator_multiplier: f64,
    pub display_scale_per_gravity: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            solar_orbit_chance: 0.25,
            max_reference_attempts: 100,
            planet_gravity_range: (0.15, 2.0),
            gas_giant_chance: 0.05,
            gas_giant_multiplier: 20.0,
            moon_gravity_range: (7.25, 9.0),
            soi_cap_multiple: 30.0,
            parent_min_soi_ratio: 2.0,
            parent_soi_ratio_range: (2.0, 3.0),
            moon_soi_share_range: (0.1, 0.5),
            moon_soi_jitter_range: (0.0, 1.5),
            inclination_tiers: vec![
                InclinationTier { threshold: 0.975, max_degrees: 180 },
                InclinationTier { threshold: 0.95, max_degrees: 60 },
                InclinationTier { threshold: 0.925, max_degrees: 45 },
                InclinationTier { threshold: 0.9, max_degrees: 25 },
                InclinationTier { threshold: 0.6, max_degrees: 10 },
                InclinationTier { threshold: 0.1, max_degrees: 5 },
            ],
            planet_sma_range_au: (0.02, 6.0),
            moon_sma_floor: 0.0001,
            moon_sma_step_range: (0.001, 0.1),
            max_placement_iterations: 10_000,
            planet_atmosphere_chance: 0.75,
            moon_atmosphere_chance: 0.10,
            oxygen_chance: 0.10,
            scale_height_range_km: (0.5, 15.0),
            pressure_range: (0.1, 15.0),
            ambient_tint_max: 0.25,
            temperature_scale: 5.0,
            rotation_hours_range: (0.0, 30.0),
            slow_rotator_chance: 0.10,
            slow_rotator_multiplier: 30.0,
            display_scale_per_gravity: 0.1,
        }
    }
}

/// Top-level configuration for the warp drive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarpConfig {
    /// Seed of the host's own system. Never randomized.
    pub home_seed: String,
    /// Display name of the home system when its star is literally called "Sun".
    pub home_system_name: String,
    pub generation: GenerationConfig,
}

impl Default for WarpConfig {
    fn default() -> Self {
        Self {
            home_seed: "Kerbol".to_string(),
            home_system_name: "Kerbol".to_string(),
            generation: GenerationConfig::default(),
        }
    }
}

impl WarpConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = WarpConfig::from_json_str(
            r#"{"home_seed": "Sol", "generation": {"gas_giant_chance": 0.5}}"#,
        )
        .unwrap();
        assert_eq!(config.home_seed, "Sol");
        assert_eq!(config.home_system_name, "Kerbol");
        assert_eq!(config.generation.gas_giant_chance, 0.5);
        assert_eq!(config.generation.max_reference_attempts, 100);
        assert_eq!(config.generation.moon_gravity_range, (7.25, 9.0));
    }

    #[test]
    fn inclination_tiers_descend() {
        let tiers = GenerationConfig::default().inclination_tiers;
        assert!(tiers.windows(2).all(|w| w[0].threshold > w[1].threshold));
    }

    #[test]
    fn round_trips_through_json() {
        let config = WarpConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(WarpConfig::from_json_str(&json).unwrap(), config);
    }
}
