//! Invariants of the daily fire model
//!
//! # Test Categories
//! 1. Fuel moisture stays physical and its update is a pure function
//! 2. Consumed fractions and dead fuel combustion conserve carbon
//! 3. Spread responds monotonically to moisture and wind
//! 4. Early extinction leaves the patch pools untouched
//! 5. Whole-day carbon balance and the fatal burned-fraction check
//! 6. Calendar resets and flux reporting
//!
//! # References
//! - Thonicke, K. et al. (2010). Biogeosciences 7, 1991-2011
//! - Rothermel, R.C. (1972). USDA Forest Service Research Paper INT-115
//!
//! Run tests with: `cargo test --test properties`

mod common;

use approx::assert_relative_eq;
use common::{
    conifer_stand, dry_windy_day, grass_cohort, igniting_config, patch_carbon, pft_table,
};
use lmfire_core::{
    config::{AreaConfig, IgnitionConfig, MoistureConfig, SpreadConfig},
    physics::{
        area_burned_validation::length_to_breadth,
        combustion_validation::{burn_dead_fuel, consumed_fraction, consumed_fractions},
        ignition_validation::{fire_danger_index, try_ignite},
        rothermel_validation::{high_wind_factor, surface_ros},
        ConsumedFractions, FuelMoistureState, MoistureForcing, MoistureWeights,
    },
    DailyClimate, DeadFuelClass, ExtinguishCause, FireDay, FireError, FluxLedger, Fraction,
    FuelClasses, IgnitionRng, PatchPft, PftId, SimDate, SurfacePools,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;

// ═══════════════════════════════════════════════════════════════════════
// FUEL MOISTURE
// ═══════════════════════════════════════════════════════════════════════

fn random_forcing(rng: &mut StdRng) -> MoistureForcing {
    let tmax = rng.random_range(-15.0..45.0);
    MoistureForcing {
        tmax,
        tdew: tmax - rng.random_range(0.0..25.0),
        precip: if rng.random::<f64>() < 0.3 {
            rng.random_range(0.0..60.0)
        } else {
            0.0
        },
        upper_soil_water: rng.random::<f64>(),
        nesterov: rng.random_range(0.0..5000.0),
    }
}

fn random_weights(rng: &mut StdRng) -> MoistureWeights {
    MoistureWeights {
        dead: FuelClasses([
            rng.random_range(0.0..2000.0),
            rng.random_range(0.0..1000.0),
            rng.random_range(0.0..1000.0),
            rng.random_range(0.0..4000.0),
        ]),
        live_grass: rng.random_range(0.0..500.0),
    }
}

/// Two years of random weather never push moisture outside [0, 1]
#[test]
fn test_moisture_stays_in_unit_interval() {
    let mut rng = StdRng::seed_from_u64(42);
    let config = MoistureConfig::default();
    let mut state = FuelMoistureState::reset();
    for day in 0..730 {
        state = state.update(&random_forcing(&mut rng), &random_weights(&mut rng), &config);
        for (class, moisture) in state.dead.iter() {
            assert!(
                (0.0..=1.0).contains(&*moisture),
                "day {}: {} moisture {}",
                day,
                class.name(),
                moisture
            );
        }
        for value in [state.aggregate, state.live_grass, state.fine_fuel, state.fine_relative()] {
            assert!((0.0..=1.0).contains(&*value), "day {}: {}", day, value);
        }
        assert!(state.extinction_aggregate.is_finite() && state.extinction_aggregate >= 0.0);
        assert!(state.extinction_fine.is_finite() && state.extinction_fine >= 0.0);
        let fdi = fire_danger_index(&state, 0.5, 0.6);
        assert!((0.0..=1.0).contains(&*fdi));
    }
}

/// Updating from the same prior with the same inputs gives the same state
#[test]
fn test_moisture_update_is_pure() {
    let mut rng = StdRng::seed_from_u64(7);
    let config = MoistureConfig::default();
    let mut prior = FuelMoistureState::reset();
    for _ in 0..50 {
        let forcing = random_forcing(&mut rng);
        let weights = random_weights(&mut rng);
        let once = prior.update(&forcing, &weights, &config);
        let twice = prior.update(&forcing, &weights, &config);
        assert_eq!(once, twice);
        prior = once;
    }
}

/// Saturating rain wets every class to 1, and drying lowers moisture again
#[test]
fn test_rain_wets_and_sun_dries() {
    let config = MoistureConfig::default();
    let weights = MoistureWeights {
        dead: FuelClasses([500.0, 300.0, 300.0, 1000.0]),
        live_grass: 0.0,
    };
    let storm = MoistureForcing {
        tmax: 15.0,
        tdew: 14.0,
        precip: 100.0,
        upper_soil_water: 1.0,
        nesterov: 0.0,
    };
    let wet = FuelMoistureState::reset().update(&storm, &weights, &config);
    assert!(wet.dead.iter().all(|(_, m)| m == Fraction::ONE));

    let sunny = MoistureForcing {
        tmax: 30.0,
        tdew: 5.0,
        precip: 0.0,
        ..storm
    };
    let dried = wet.update(&sunny, &weights, &config);
    for class in DeadFuelClass::ALL {
        assert!(dried.dead[class] <= wet.dead[class]);
    }
    assert!(dried.dead[DeadFuelClass::OneHour] < Fraction::ONE);
}

// ═══════════════════════════════════════════════════════════════════════
// COMBUSTION
// ═══════════════════════════════════════════════════════════════════════

/// Consumed fractions lie in [0, 1] and vanish at the moisture of extinction
#[test]
fn test_consumed_fraction_bounds() {
    for class in DeadFuelClass::ALL {
        for step in 0..=100 {
            let rm = f64::from(step) / 100.0;
            let cf = consumed_fraction(class, rm);
            assert!((0.0..=1.0).contains(&*cf), "{} at rm {}: {}", class.name(), rm, cf);
        }
        assert_relative_eq!(*consumed_fraction(class, 1.0), 0.0, epsilon = 1e-12);
    }
    assert_eq!(consumed_fraction(DeadFuelClass::OneHour, 0.0), Fraction::ONE);
    assert_relative_eq!(*consumed_fraction(DeadFuelClass::ThousandHour, 0.0), 0.8);
}

/// Moisture above the moisture of extinction burns nothing
#[test]
fn test_saturated_fuel_not_consumed() {
    let config = MoistureConfig::default();
    let fractions = consumed_fractions(&FuelClasses::splat(Fraction::ONE), Fraction::ONE, &config);
    assert!(fractions.dead.iter().all(|(_, cf)| cf == Fraction::ZERO));
    assert_eq!(fractions.live_grass, Fraction::ZERO);
}

/// Carbon leaving litter and surface pools is exactly the reported carbon
#[test]
fn test_dead_fuel_burn_conserves_carbon() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..100 {
        let mut pfts = FxHashMap::default();
        for id in 0..rng.random_range(1..4u16) {
            pfts.insert(
                PftId(id),
                PatchPft {
                    litter_leaf: rng.random_range(0.0..0.5),
                    litter_sap: rng.random_range(0.0..0.5),
                    litter_heart: rng.random_range(0.0..1.0),
                    litter_repr: rng.random_range(0.0..0.1),
                    water_stress: 1.0,
                },
            );
        }
        let mut surface = SurfacePools {
            metabolic: rng.random_range(0.0..0.2),
            structural: rng.random_range(0.0..0.2),
            fine_woody: rng.random_range(0.0..0.4),
            coarse_woody: rng.random_range(0.0..0.8),
        };
        let fractions = ConsumedFractions {
            dead: FuelClasses::from_fn(|_| Fraction::new(rng.random::<f64>())),
            live_grass: Fraction::new(rng.random::<f64>()),
        };
        let burned = Fraction::new(rng.random::<f64>());

        let before: f64 =
            pfts.values().map(PatchPft::total_litter).sum::<f64>() + surface.total();
        let burn = burn_dead_fuel(&mut pfts, &mut surface, &fractions, burned);
        let after: f64 = pfts.values().map(PatchPft::total_litter).sum::<f64>() + surface.total();

        assert!(burn.carbon >= 0.0);
        assert_relative_eq!(before - after, burn.carbon, epsilon = 1e-12);
        let dry_matter: f64 = burn.dry_matter.iter().map(|&(_, dm)| dm).sum();
        assert_relative_eq!(dry_matter, burn.carbon / 0.45, epsilon = 1e-9);
        assert!(pfts.values().all(|s| s.total_litter() >= 0.0));
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SPREAD
// ═══════════════════════════════════════════════════════════════════════

/// Wetter fuel never spreads faster, and fuel at extinction does not spread
#[test]
fn test_surface_ros_decreases_with_moisture() {
    let config = SpreadConfig::default();
    let mut previous = f64::INFINITY;
    for step in 0..=20 {
        let rm = f64::from(step) / 20.0;
        let ros = surface_ros(2000.0, 15.0, rm, 0.2 * rm, 300.0, &config).rate_of_spread;
        assert!(ros <= previous, "ROS rose to {} at rm {}", ros, rm);
        previous = ros;
    }
    assert_eq!(previous, 0.0);
    assert_eq!(surface_ros(2000.0, 15.0, 1.5, 0.3, 300.0, &config).rate_of_spread, 0.0);
}

/// Stronger wind never spreads slower
#[test]
fn test_surface_ros_increases_with_wind() {
    let config = SpreadConfig::default();
    let mut previous = 0.0;
    for step in 0..=30 {
        let wind = 20.0 * f64::from(step);
        let ros = surface_ros(2000.0, 15.0, 0.3, 0.06, wind, &config).rate_of_spread;
        assert!(ros >= previous, "ROS fell to {} at {} m/min", ros, wind);
        previous = ros;
    }
}

/// Calm air gives circular fires and no high-wind boost
#[test]
fn test_calm_wind_shape() {
    let config = AreaConfig::default();
    for (tree, grass) in [(0.0, 0.0), (0.8, 0.0), (0.3, 0.6), (0.0, 1.0)] {
        assert_eq!(length_to_breadth(0.0, tree, grass, tree + grass, &config), 1.0);
    }
    assert_relative_eq!(high_wind_factor(0.0, 10.0), 1.0, epsilon = 1e-8);
}

// ═══════════════════════════════════════════════════════════════════════
// IGNITION
// ═══════════════════════════════════════════════════════════════════════

struct CountingDraw {
    calls: usize,
}

impl IgnitionRng for CountingDraw {
    fn next_uniform(&mut self) -> f64 {
        self.calls += 1;
        0.0
    }
}

/// The stream advances once per day with lightning and never without
#[test]
fn test_ignition_draws_only_with_lightning() {
    let config = IgnitionConfig::default();
    let mut rng = CountingDraw { calls: 0 };
    assert!(!try_ignite(0.0, Fraction::ONE, Fraction::ZERO, 0.5, &mut rng, &config));
    assert_eq!(rng.calls, 0);
    assert!(try_ignite(5.0, Fraction::ONE, Fraction::ZERO, 0.5, &mut rng, &config));
    assert_eq!(rng.calls, 1);
    // A fully burned patch cannot ignite, but the draw is still taken
    assert!(!try_ignite(5.0, Fraction::ONE, Fraction::ONE, 0.5, &mut rng, &config));
    assert_eq!(rng.calls, 2);
}

// ═══════════════════════════════════════════════════════════════════════
// EARLY EXTINCTION
// ═══════════════════════════════════════════════════════════════════════

/// Snow cover puts fires out without touching any pool
#[test]
fn test_snow_cover_leaves_pools_untouched() {
    let mut patch = conifer_stand();
    patch.soil.snowpack = 12.0;
    patch.fire.annual.active_fires = 5;
    let vegetation = patch.vegetation.clone();
    let pfts = patch.pfts.clone();
    let surface = patch.soil.surface;

    let report = patch
        .advance_day(SimDate::new(1, 20), &dry_windy_day(), &pft_table(), &igniting_config())
        .unwrap();

    assert_eq!(report.outcome, FireDay::Extinguished(ExtinguishCause::Snow));
    assert_eq!(report.active_fires, 0);
    assert_eq!(patch.fire.annual.burned_area_ha, 0.0);
    assert_eq!(patch.vegetation, vegetation);
    assert_eq!(patch.pfts, pfts);
    assert_eq!(patch.soil.surface, surface);
}

/// A single fire in a very large patch burns a negligible share of it
#[test]
fn test_negligible_area_extinguishes() {
    let mut patch = conifer_stand();
    let mut config = igniting_config();
    config.area.patch_area_m2 = 1.0e9;
    let carbon = patch_carbon(&patch);

    let report = patch
        .advance_day(SimDate::new(1, 180), &dry_windy_day(), &pft_table(), &config)
        .unwrap();

    assert!(report.ignited);
    assert_eq!(report.outcome, FireDay::Extinguished(ExtinguishCause::NegligibleArea));
    assert_eq!(patch.fire.annual.active_fires, 0);
    assert_eq!(patch_carbon(&patch), carbon);
}

/// A cohort of an unknown PFT is a configuration error
#[test]
fn test_unknown_pft_is_an_error() {
    let mut patch = conifer_stand();
    for cohort in patch.vegetation.iter_mut() {
        cohort.pft = PftId(9);
    }
    let err = patch
        .advance_day(SimDate::new(1, 180), &dry_windy_day(), &pft_table(), &igniting_config())
        .unwrap_err();
    assert!(matches!(err, FireError::UnknownPft(PftId(9))), "got {:?}", err);
}

// ═══════════════════════════════════════════════════════════════════════
// CARBON BALANCE
// ═══════════════════════════════════════════════════════════════════════

/// Pools lose exactly the combusted carbon; killed biomass stays in the patch
#[test]
fn test_burning_day_conserves_carbon() {
    let mut patch = conifer_stand();
    patch.vegetation.push(grass_cohort(2, 0.1));
    let before = patch_carbon(&patch);

    let report = patch
        .advance_day(SimDate::new(1, 200), &dry_windy_day(), &pft_table(), &igniting_config())
        .unwrap();

    assert!(report.outcome.is_burning(), "got {:?}", report.outcome);
    assert!(report.flux.fuel > 0.0);
    assert!(report.flux.live_vegetation > 0.0);
    assert!(report.flux.killed_vegetation >= 0.0);
    assert_relative_eq!(before - patch_carbon(&patch), report.flux.combusted(), epsilon = 1e-9);
    assert!(patch.fire.annual.emissions.total() > 0.0);
}

/// Crown fire initiation can only add to live fuel combustion
#[test]
fn test_crown_fire_burns_at_least_surface_damage() {
    let table = pft_table();
    let surface_only = igniting_config();
    let mut with_crown = igniting_config();
    with_crown.crown_fire.enabled = true;

    let mut a = conifer_stand();
    let mut b = conifer_stand();
    let ra = a.advance_day(SimDate::new(1, 200), &dry_windy_day(), &table, &surface_only).unwrap();
    let rb = b.advance_day(SimDate::new(1, 200), &dry_windy_day(), &table, &with_crown).unwrap();

    assert!(ra.outcome.is_burning() && rb.outcome.is_burning());
    assert!(rb.flux.live_vegetation >= ra.flux.live_vegetation - 1e-12);
    assert_relative_eq!(rb.flux.fuel, ra.flux.fuel, epsilon = 1e-12);
}

/// A burned area beyond the patch halts the run
#[test]
fn test_burned_fraction_out_of_range_is_fatal() {
    let mut patch = conifer_stand();
    // Upstream state corruption: more unburned area than the patch holds
    patch.fire.annual.burned_area_ha = -1.0;
    let err = patch
        .advance_day(SimDate::new(1, 180), &dry_windy_day(), &pft_table(), &igniting_config())
        .unwrap_err();
    match err {
        FireError::BurnedFractionOutOfRange { patch, fraction } => {
            assert_eq!(patch, 1);
            assert!(fraction > 1.0);
        }
        other => panic!("expected a burned fraction error, got {:?}", other),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CALENDAR
// ═══════════════════════════════════════════════════════════════════════

/// The first day of a year hands back last year's totals and starts afresh
#[test]
fn test_year_boundary_resets_accumulators() {
    let table = pft_table();
    let config = igniting_config();
    let mut patch = conifer_stand();

    let last_day = SimDate::new(1, 364);
    let burn = patch.advance_day(last_day, &dry_windy_day(), &table, &config).unwrap();
    assert!(burn.outcome.is_burning());
    assert_eq!(patch.fire.month(last_day).burn_days, 1);
    assert!(patch.fire.month(last_day).mean_intensity() > 100.0);

    let mut ledger = FluxLedger::default();
    patch.report_annual_flux(1, &mut ledger);
    assert_eq!(ledger.get(1, 1), Some(&burn.flux));

    let showers = DailyClimate {
        precip: 2.0,
        ..dry_windy_day()
    };
    let new_year = last_day.next();
    assert_eq!(new_year, SimDate::new(2, 0));
    let report = patch.advance_day(new_year, &showers, &table, &config).unwrap();

    let finished = report.completed_year.expect("year 1 should be handed back");
    assert_eq!(finished.burn_days, 1);
    assert_eq!(finished.flux, burn.flux);
    assert!(finished.burned_area_ha > 0.0);

    let annual = &patch.fire.annual;
    assert_eq!(report.outcome, FireDay::Extinguished(ExtinguishCause::Rain));
    assert_eq!(annual.burn_days, 0);
    assert_eq!(annual.burned_area_ha, 0.0);
    assert_eq!(annual.burned_fraction, Fraction::ZERO);
    assert!(annual.kills.is_empty());
    assert_eq!(annual.emissions.total(), 0.0);
    assert_relative_eq!(annual.precip_sum, 2.0);
}
