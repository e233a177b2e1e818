//! Tunable constants of the fire model
//!
//! Every empirical coefficient that calibration experiments have varied is
//! exposed here instead of being hard-coded in the physics. Defaults
//! reproduce the standard LPJ-LMfire parameterisation.
//!
//! Configuration is read from TOML; every table and field is optional and
//! falls back to its default:
//!
//! ```toml
//! [area]
//! patch_area_m2 = 1000.0
//!
//! [crown_fire]
//! enabled = true
//!
//! [ignition]
//! draw_override = 0.9
//! ```

use crate::core_types::fuel::FuelClasses;
use crate::error::{FireError, FireResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Fuel moisture recursion constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoistureConfig {
    /// Drying coefficient α per dead fuel class (°C-2)
    pub drying_coefficients: FuelClasses<f64>,
    /// Moisture of extinction per dead fuel class
    pub extinction_moisture: FuelClasses<f64>,
    /// Moisture of extinction of live grass
    pub live_grass_extinction: f64,
    /// Daily precipitation that fully saturates the fuel (mm)
    pub rain_saturation_mm: f64,
    /// Slope of live grass moisture on upper soil water
    pub live_grass_slope: f64,
    /// Intercept subtracted in the live grass moisture regression
    pub live_grass_intercept: f64,
}

impl Default for MoistureConfig {
    fn default() -> Self {
        MoistureConfig {
            drying_coefficients: FuelClasses([1.0e-3, 5.424e-5, 1.485e-5, 1.0e-6]),
            extinction_moisture: FuelClasses::splat(0.2),
            live_grass_extinction: 0.2,
            rain_saturation_mm: 50.0,
            live_grass_slope: 10.0 / 9.0,
            live_grass_intercept: 1.0 / 9.0,
        }
    }
}

/// Surface spread constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpreadConfig {
    /// Oven-dry particle density (kg m-3)
    pub particle_density: f64,
    /// Mineral damping coefficient η_s
    pub mineral_damping: f64,
    /// Surface-area-to-volume ratio of the fuel bed (cm2 cm-3)
    pub surface_to_volume: f64,
    /// Heat content of fuel (kJ g-1)
    pub heat_content: f64,
    /// Wind speed above which spread is doubled (m s-1)
    pub high_wind_threshold: f64,
    /// Decay of backward spread with wind speed (per m min-1)
    pub backward_decay: f64,
    /// Grass cover above which the patch is treated as grass dominated
    pub grass_dominance: f64,
    /// Upper bound on tree cover
    pub max_tree_cover: f64,
}

impl Default for SpreadConfig {
    fn default() -> Self {
        SpreadConfig {
            particle_density: 513.0,
            mineral_damping: 0.41739,
            surface_to_volume: 5.0,
            heat_content: 18.0,
            high_wind_threshold: 10.0,
            backward_decay: 0.012,
            grass_dominance: 0.6,
            max_tree_cover: 0.95,
        }
    }
}

/// Burned area constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaConfig {
    /// Patch area (m2)
    pub patch_area_m2: f64,
    /// Floor on the average contiguous burnable area (ha)
    pub min_contiguous_area_ha: f64,
    /// Upper bound on the burn-ellipse length-to-breadth ratio
    pub max_length_to_breadth: f64,
    /// Wind speed below which the ellipse is a circle (m min-1)
    pub ellipse_wind_threshold: f64,
    /// Burned fraction below which the day's fires die out
    pub min_burned_fraction: f64,
}

impl Default for AreaConfig {
    fn default() -> Self {
        AreaConfig {
            patch_area_m2: 1000.0,
            min_contiguous_area_ha: 10.0,
            max_length_to_breadth: 8.0,
            ellipse_wind_threshold: 16.67,
            min_burned_fraction: 0.01,
        }
    }
}

impl AreaConfig {
    #[inline]
    pub fn patch_area_ha(&self) -> f64 {
        self.patch_area_m2 * 1.0e-4
    }
}

/// Conditions that extinguish the day's fires
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtinctionConfig {
    /// Cumulative precipitation that extinguishes fires under tree-dominated cover (mm)
    pub precip_threshold_open: f64,
    /// Cumulative precipitation that extinguishes fires under grass-dominated cover (mm)
    pub precip_threshold_grass: f64,
    /// Minimum total fuel that carries a fire (g m-2)
    pub min_total_fuel: f64,
    /// Minimum fire-line intensity that sustains a fire (kW m-1)
    pub min_intensity: f64,
}

impl Default for ExtinctionConfig {
    fn default() -> Self {
        ExtinctionConfig {
            precip_threshold_open: 10.0,
            precip_threshold_grass: 3.0,
            min_total_fuel: 1000.0,
            min_intensity: 100.0,
        }
    }
}

/// Crown fire initiation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrownFireConfig {
    pub enabled: bool,
    /// Canopy bulk density marking a level as part of the canopy (kg m-3)
    pub level_bulk_density: f64,
    /// Mean canopy bulk density required for crown fire (kg m-3)
    pub mean_bulk_density: f64,
    /// Canopy foliar moisture at or below which crowns ignite
    pub foliar_moisture: f64,
    /// Number of 1 m canopy levels profiled
    pub canopy_levels: usize,
}

impl Default for CrownFireConfig {
    fn default() -> Self {
        CrownFireConfig {
            enabled: false,
            level_bulk_density: 0.012,
            mean_bulk_density: 0.10,
            foliar_moisture: 0.8,
            canopy_levels: 81,
        }
    }
}

/// Tree mortality and live-fuel combustion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MortalityConfig {
    /// Resistance to crown kill
    pub rck: f64,
    /// Crown kill exponent
    pub crown_kill_exponent: f64,
    pub cambial_slope: f64,
    pub cambial_intercept: f64,
    /// Critical cambial damage time coefficient (min cm-2)
    pub critical_time_coefficient: f64,
    /// Residence time per unit consumed fuel (min m2 g-1)
    pub residence_time_coefficient: f64,
    /// Upper bound on fire residence time (min)
    pub max_residence_time: f64,
    /// Cohorts below this height are removed by a fire that scorches them (m)
    pub min_establishment_height: f64,
    /// Scorch-height to cohort-height ratio that removes young cohorts
    pub scorch_kill_ratio: f64,
    /// Combustion completeness of the 1-, 10- and 100-h live crown fuel
    pub live_crown_combustion: [f64; 3],
}

impl Default for MortalityConfig {
    fn default() -> Self {
        MortalityConfig {
            rck: 1.0,
            crown_kill_exponent: 3.0,
            cambial_slope: 0.563,
            cambial_intercept: 0.125,
            critical_time_coefficient: 2.9,
            residence_time_coefficient: 19.7e-4,
            max_residence_time: 8.0,
            min_establishment_height: 1.3,
            scorch_kill_ratio: 2.0,
            live_crown_combustion: [0.9, 0.8, 0.5],
        }
    }
}

/// Lightning ignition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnitionConfig {
    /// Suppression of ignition efficiency by the burned fraction of the year
    pub burned_suppression: f64,
    /// Replaces the random draw with a fixed value; the stream still advances
    pub draw_override: Option<f64>,
}

impl Default for IgnitionConfig {
    fn default() -> Self {
        IgnitionConfig {
            burned_suppression: 25.0,
            draw_override: None,
        }
    }
}

/// All constants of the fire model
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FireConfig {
    pub moisture: MoistureConfig,
    pub spread: SpreadConfig,
    pub area: AreaConfig,
    pub extinction: ExtinctionConfig,
    pub crown_fire: CrownFireConfig,
    pub mortality: MortalityConfig,
    pub ignition: IgnitionConfig,
}

impl FireConfig {
    pub fn from_toml_str(source: &str) -> FireResult<Self> {
        let config: FireConfig = toml::from_str(source).map_err(|e| FireError::ParameterParse {
            path: "<inline>".into(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> FireResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| FireError::ParameterFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: FireConfig =
            toml::from_str(&source).map_err(|e| FireError::ParameterParse {
                path: path.to_path_buf(),
                source: e,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Check physical preconditions of every constant
    pub fn validate(&self) -> FireResult<()> {
        fn positive(name: &str, value: f64) -> FireResult<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(FireError::invalid(
                    name,
                    format!("must be finite and positive, got {value}"),
                ))
            }
        }
        fn unit(name: &str, value: f64) -> FireResult<()> {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(FireError::invalid(name, format!("must be in [0, 1], got {value}")))
            }
        }

        for (class, me) in self.moisture.extinction_moisture.iter() {
            positive(&format!("moisture.extinction_moisture[{}]", class.name()), me)?;
        }
        for (class, alpha) in self.moisture.drying_coefficients.iter() {
            if !(alpha.is_finite() && alpha >= 0.0) {
                return Err(FireError::invalid(
                    format!("moisture.drying_coefficients[{}]", class.name()),
                    format!("must be finite and non-negative, got {alpha}"),
                ));
            }
        }
        positive("moisture.live_grass_extinction", self.moisture.live_grass_extinction)?;
        positive("moisture.rain_saturation_mm", self.moisture.rain_saturation_mm)?;

        positive("spread.particle_density", self.spread.particle_density)?;
        positive("spread.surface_to_volume", self.spread.surface_to_volume)?;
        positive("spread.heat_content", self.spread.heat_content)?;
        unit("spread.grass_dominance", self.spread.grass_dominance)?;
        unit("spread.max_tree_cover", self.spread.max_tree_cover)?;

        positive("area.patch_area_m2", self.area.patch_area_m2)?;
        positive("area.min_contiguous_area_ha", self.area.min_contiguous_area_ha)?;
        let lb_max = self.area.max_length_to_breadth;
        if lb_max.is_nan() || lb_max < 1.0 {
            return Err(FireError::invalid(
                "area.max_length_to_breadth",
                format!("must be at least 1, got {lb_max}"),
            ));
        }
        unit("area.min_burned_fraction", self.area.min_burned_fraction)?;

        positive("crown_fire.mean_bulk_density", self.crown_fire.mean_bulk_density)?;
        if self.crown_fire.canopy_levels < 2 {
            return Err(FireError::invalid(
                "crown_fire.canopy_levels",
                format!("must be at least 2, got {}", self.crown_fire.canopy_levels),
            ));
        }

        positive(
            "mortality.critical_time_coefficient",
            self.mortality.critical_time_coefficient,
        )?;
        for (i, cf) in self.mortality.live_crown_combustion.iter().enumerate() {
            unit(&format!("mortality.live_crown_combustion[{i}]"), *cf)?;
        }

        if !(self.ignition.burned_suppression.is_finite() && self.ignition.burned_suppression >= 0.0) {
            return Err(FireError::invalid(
                "ignition.burned_suppression",
                format!("must be finite and non-negative, got {}", self.ignition.burned_suppression),
            ));
        }
        if let Some(draw) = self.ignition.draw_override {
            unit("ignition.draw_override", draw)?;
        }
        Ok(())
    }
}
