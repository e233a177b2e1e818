//! Physical sub-models of the daily patch fire

pub(crate) mod area_burned;
pub(crate) mod combustion;
pub(crate) mod crown_fire;
pub(crate) mod emissions;
pub(crate) mod fuel_load;
pub(crate) mod fuel_moisture;
pub(crate) mod ignition;
pub(crate) mod mortality;
pub(crate) mod rothermel;

// Types that appear in patch state and daily reports
pub use area_burned::{BurnedArea, SpreadState};
pub use combustion::ConsumedFractions;
pub use crown_fire::{CanopyProfile, CrownFireType};
pub use emissions::{Emissions, TraceGas};
pub use fuel_load::{FuelBed, FuelInventory, PftFuel};
pub use fuel_moisture::{FuelMoistureState, MoistureForcing, MoistureWeights};
pub use mortality::KillTotals;

// ============================================================================
// PUBLIC RE-EXPORTS FOR VALIDATION TESTING
// ============================================================================
// Integration tests check the empirical formulas directly, so each sub-model
// exposes its free functions through a validation module.

/// Public re-exports of validation test functions from `fuel_moisture` module
pub mod fuel_moisture_validation {
    pub use super::fuel_moisture::{dry_and_wet, live_grass_drying, live_grass_moisture};
}

/// Public re-exports of validation test functions from `fuel_load` module
pub mod fuel_load_validation {
    pub use super::fuel_load::grass_bulk_density;
}

/// Public re-exports of validation test functions from `ignition` module
pub mod ignition_validation {
    pub use super::ignition::{fire_danger_index, ignition_efficiency, try_ignite};
}

/// Public re-exports of validation test functions from `rothermel` module
pub mod rothermel_validation {
    pub use super::rothermel::{
        backward_ros, combined_ros, grass_ros, high_wind_factor, optimum_packing_ratio,
        surface_ros, SurfaceSpread,
    };
}

/// Public re-exports of validation test functions from `crown_fire` module
pub mod crown_fire_validation {
    pub use super::crown_fire::{
        calculate_critical_crown_spread_rate, canopy_foliar_moisture, crown_fire_potential,
        determine_crown_fire_type,
    };
}

/// Public re-exports of validation test functions from `area_burned` module
pub mod area_burned_validation {
    pub use super::area_burned::{
        continuing_fires, estimate_burned_area, fire_duration, fire_ellipse_area,
        length_to_breadth,
    };
}

/// Public re-exports of validation test functions from `combustion` module
pub mod combustion_validation {
    pub use super::combustion::{
        burn_dead_fuel, consumed_fraction, consumed_fractions, fuel_consumed, residence_time,
        surface_intensity, DeadFuelBurn,
    };
}

/// Public re-exports of validation test functions from `mortality` module
pub mod mortality_validation {
    pub use super::mortality::{
        apply_kill, assess_cohort, bark_thickness, cambial_kill_probability,
        crown_kill_probability, crown_scorch, scorch_height, CohortKill,
    };
}
