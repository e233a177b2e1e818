//! Shared fixtures for the integration tests
//!
//! A temperate conifer stand with a grass understorey, the dry windy summer
//! day it burns on, and a deterministic ignition source.

#![allow(dead_code)]

use ctor::ctor;
use lmfire_core::core_types::vegetation::{CarbonPools, CohortFireState};
use lmfire_core::{
    DailyClimate, FireConfig, Fraction, IgnitionRng, Individual, Patch, PatchPft, Pft, PftId,
    PftTable, SoilState, SurfacePools, Vegetation,
};
use rustc_hash::FxHashMap;
use tracing_subscriber::EnvFilter;

/// Route model logs through the test harness; filter with `RUST_LOG`
#[ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub const CONIFER: PftId = PftId(0);
pub const C3_GRASS: PftId = PftId(1);

/// Ignition source returning the same draw forever
pub struct FixedDraw(pub f64);

impl IgnitionRng for FixedDraw {
    fn next_uniform(&mut self) -> f64 {
        self.0
    }
}

pub fn pft_table() -> PftTable {
    PftTable::new(vec![
        Pft::conifer(0, "temperate_conifer"),
        Pft::c3_grass(1, "c3_grass"),
        Pft::c4_grass(2, "c4_grass"),
    ])
    .unwrap()
}

pub fn conifer_cohort(id: u32) -> Individual {
    Individual {
        id,
        pft: CONIFER,
        density: 0.05,
        fpc: 0.8,
        age: 40,
        height: 12.0,
        crown_length: 8.0,
        phenology: Fraction::ONE,
        cmass: CarbonPools {
            leaf: 0.4,
            sap: 1.6,
            heart: 3.0,
            root: 0.8,
            debt: 0.0,
        },
        fire: CohortFireState::default(),
    }
}

pub fn grass_cohort(id: u32, fpc: f64) -> Individual {
    Individual {
        id,
        pft: C3_GRASS,
        density: 1.0,
        fpc,
        age: 0,
        height: 0.0,
        crown_length: 0.0,
        phenology: Fraction::ONE,
        cmass: CarbonPools {
            leaf: 0.15,
            root: 0.3,
            ..CarbonPools::default()
        },
        fire: CohortFireState::default(),
    }
}

pub fn conifer_litter() -> FxHashMap<PftId, PatchPft> {
    let mut pfts = FxHashMap::default();
    pfts.insert(
        CONIFER,
        PatchPft {
            litter_leaf: 0.3,
            litter_sap: 0.4,
            litter_heart: 0.6,
            litter_repr: 0.0,
            water_stress: 0.5,
        },
    );
    pfts
}

pub fn dry_soil() -> SoilState {
    SoilState {
        upper_water: vec![0.1; 366],
        lower_water: vec![0.3; 366],
        surface: SurfacePools {
            metabolic: 0.05,
            structural: 0.1,
            fine_woody: 0.2,
            coarse_woody: 0.3,
        },
        ..SoilState::default()
    }
}

/// Closed conifer stand, 80% tree cover, no grass
pub fn conifer_stand() -> Patch<FixedDraw> {
    Patch::with_rng(
        1,
        Vegetation::new(vec![conifer_cohort(1)]),
        conifer_litter(),
        dry_soil(),
        FixedDraw(0.0),
    )
}

/// Hot, dry, windy summer day with heavy lightning
pub fn dry_windy_day() -> DailyClimate {
    DailyClimate {
        tmax: 32.0,
        tmin: 14.0,
        precip: 0.0,
        wind_speed: 5.0,
        lightning: 10.0,
        esat_tmin: 1600.0,
        nesterov: 3000.0,
        gdd20: 2500.0,
    }
}

/// Default constants with every lightning strike igniting
pub fn igniting_config() -> FireConfig {
    let mut config = FireConfig::default();
    config.ignition.draw_override = Some(0.0);
    config
}

/// Carbon in litter, surface pools and live vegetation (kgC m-2)
pub fn patch_carbon<R>(patch: &Patch<R>) -> f64 {
    let litter: f64 = patch.pfts.values().map(PatchPft::total_litter).sum();
    let live: f64 = patch.vegetation.iter().map(|c| c.cmass.total()).sum();
    litter + patch.soil.surface.total() + live
}
