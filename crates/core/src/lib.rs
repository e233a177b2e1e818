//! Daily Fire Disturbance Core
//!
//! A patch-scale lightning fire model for dynamic vegetation models, after
//! SPITFIRE and LPJ-LMfire. Each simulated day the model:
//! - updates dead and live fuel moisture from daily weather
//! - decides from a seeded per-patch stream whether lightning starts a fire
//! - computes Rothermel surface spread in woody and grass fuel, with optional
//!   Van Wagner crown fire initiation
//! - converts spread into burned area with carry-over of smouldering fires
//! - burns litter and surface soil-organic pools by fuel residence class
//! - kills trees by crown scorch and cambial damage and moves killed biomass
//!   to litter
//!
//! # Scientific References
//! - Thonicke, K. et al. (2010). "The influence of vegetation, fire spread and fire behaviour
//!   on biomass burning and trace gas emissions." Biogeosciences 7, 1991-2011
//! - Pfeiffer, M., Spessa, A., Kaplan, J.O. (2013). "A model for global biomass burning in
//!   preindustrial time: LPJ-LMfire (v1.0)." Geoscientific Model Development 6, 643-685
//! - Rothermel, R.C. (1972). "A mathematical model for predicting fire spread in wildland fuels."
//!   USDA Forest Service Research Paper INT-115

// Plain data: fuel classes, PFTs, cohorts, soil pools, climate, random stream
pub mod core_types;

pub mod config;
pub mod error;

// One module per physical sub-model
pub mod physics;

// Patch container and the daily state machine
pub mod simulation;

// Re-export core types
pub use core_types::{
    DailyClimate, DeadFuelClass, Fraction, FuelClasses, IgnitionRng, Individual, Lifeform,
    PatchPft, PatchRng, Pft, PftId, PftTable, SimDate, SoilState, SurfacePools, Vegetation,
};

pub use config::FireConfig;
pub use error::{FireError, FireResult};

// Re-export simulation types
pub use simulation::{
    advance_patches, BurnSummary, DailyFireReport, ExtinguishCause, FireAnnualState, FireDay,
    FireFluxes, FireState, FluxAccounting, FluxLedger, MonthlyFireStats, Patch,
};
