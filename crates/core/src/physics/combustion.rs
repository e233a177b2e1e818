//! Fractional combustion of surface fuel
//!
//! The fraction of each fuel class consumed in the burned area is a
//! piecewise-linear function of its relative moisture `rm = min(ω / m_e, 1)`.
//! Consumed mass leaves the per-PFT litter and the shared surface
//! soil-organic pools in proportion to the pool's share of each class, so no
//! pool ever loses more than `CF × A_f` of its mass.
//!
//! # Formula
//! ```text
//! live grass, 1-h    rm ≤ 0.18: 1      rm > 0.73: 2.45 (1 - rm)     else 1.10 - 0.62 rm
//! 10-h               rm ≤ 0.12: 1      rm > 0.51: 1.47 (1 - rm)     else 1.09 - 0.72 rm
//! 100-h              rm ≤ 0.38: 0.98 - 0.85 rm                      else 1.06 (1 - rm)
//! 1000-h             0.8 (1 - rm)
//!
//! FC_i = CF_i × w_i × (1 - S_T)
//! I    = h × (FC_1 + FC_10 + FC_100) × ROS_f / 60                     (kW m-1)
//! τ_l  = min(19.7e-4 × Σ w_i (1 - √(1 - CF_i)), 8)                    (min)
//! ```
//!
//! # References
//! - Thonicke, K. et al. (2010). Biogeosciences 7, 1991-2011, eqns. 15 and 18
//! - Peterson, D.L., Ryan, K.C. (1986). "Modeling postfire conifer mortality for
//!   long-range planning." Environmental Management 10(6), 797-808

use crate::config::{MoistureConfig, MortalityConfig};
use crate::core_types::fuel::{
    DeadFuelClass, FuelClasses, CARBON_TO_DRY_MATTER, MINERAL_FRACTION,
};
use crate::core_types::pft::PftId;
use crate::core_types::soil::{PatchPft, SurfacePools};
use crate::core_types::units::{sanitize_finite, sanitize_mass, Fraction};
use crate::core_types::vegetation::Individual;
use rustc_hash::FxHashMap;

/// Consumed fraction of each fuel class in the burned area
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConsumedFractions {
    pub dead: FuelClasses<Fraction>,
    pub live_grass: Fraction,
}

/// Dead fuel removed from the patch pools
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeadFuelBurn {
    /// Carbon removed from litter and surface pools (kgC m-2)
    pub carbon: f64,
    /// Dry matter burned per PFT, ordered by PFT id (kg DM m-2)
    pub dry_matter: Vec<(PftId, f64)>,
}

/// Relative moisture `min(ω / m_e, 1)`, or 1 without a moisture of extinction
#[inline]
fn relative_moisture(moisture: Fraction, extinction: f64) -> f64 {
    if extinction > 0.0 {
        sanitize_finite(*moisture / extinction, "relative_moisture").min(1.0)
    } else {
        1.0
    }
}

/// Consumed fraction of live grass or 1-h fuel
fn fine_consumed_fraction(rm: f64) -> f64 {
    if rm <= 0.18 {
        1.0
    } else if rm > 0.73 {
        2.45 - 2.45 * rm
    } else {
        1.10 - 0.62 * rm
    }
}

/// Consumed fraction of a dead fuel class at relative moisture `rm`
pub fn consumed_fraction(class: DeadFuelClass, rm: f64) -> Fraction {
    let cf = match class {
        DeadFuelClass::OneHour => fine_consumed_fraction(rm),
        DeadFuelClass::TenHour => {
            if rm <= 0.12 {
                1.0
            } else if rm > 0.51 {
                1.47 - 1.47 * rm
            } else {
                1.09 - 0.72 * rm
            }
        }
        DeadFuelClass::HundredHour => {
            if rm <= 0.38 {
                0.98 - 0.85 * rm
            } else {
                1.06 - 1.06 * rm
            }
        }
        DeadFuelClass::ThousandHour => 0.8 - 0.8 * rm,
    };
    Fraction::clamped(cf, "consumed_fraction")
}

/// Consumed fractions for today's moisture state
pub fn consumed_fractions(
    dead_moisture: &FuelClasses<Fraction>,
    live_grass_moisture: Fraction,
    config: &MoistureConfig,
) -> ConsumedFractions {
    let dead = FuelClasses::from_fn(|class| {
        consumed_fraction(
            class,
            relative_moisture(dead_moisture[class], config.extinction_moisture[class]),
        )
    });
    let live_grass = Fraction::clamped(
        fine_consumed_fraction(relative_moisture(
            live_grass_moisture,
            config.live_grass_extinction,
        )),
        "live_grass_consumed_fraction",
    );
    ConsumedFractions { dead, live_grass }
}

/// Fuel consumed per class, mineral fraction excluded (g DM m-2)
pub fn fuel_consumed(fractions: &ConsumedFractions, loads: &FuelClasses<f64>) -> FuelClasses<f64> {
    FuelClasses::from_fn(|class| *fractions.dead[class] * loads[class] * (1.0 - MINERAL_FRACTION))
}

/// Surface fire-line intensity (kW m-1)
///
/// # Arguments
/// * `consumed` - Fuel consumed per class (g DM m-2)
/// * `forward_ros` - Forward rate of spread (m min-1)
/// * `heat_content` - Fuel heat content (kJ g-1)
pub fn surface_intensity(consumed: &FuelClasses<f64>, forward_ros: f64, heat_content: f64) -> f64 {
    sanitize_finite(
        heat_content * consumed.spreading_total() * forward_ros / 60.0,
        "surface_intensity",
    )
}

/// Fire residence time at the stem base (min)
pub fn residence_time(
    fractions: &ConsumedFractions,
    loads: &FuelClasses<f64>,
    config: &MortalityConfig,
) -> f64 {
    let weighted: f64 = DeadFuelClass::ALL
        .iter()
        .map(|&c| loads[c] * (1.0 - (1.0 - *fractions.dead[c]).sqrt()))
        .sum();
    sanitize_finite(config.residence_time_coefficient * weighted, "residence_time")
        .clamp(0.0, config.max_residence_time)
}

/// Fraction of woody material consumed, weighted by its class shares
#[inline]
fn woody_consumed(fractions: &ConsumedFractions) -> f64 {
    DeadFuelClass::ALL
        .iter()
        .map(|&c| c.dead_wood_share() * *fractions.dead[c])
        .sum()
}

/// Remove `fraction` of `pool`, returning the mass removed
#[inline]
fn take(pool: &mut f64, fraction: f64, quantity: &str) -> f64 {
    let before = sanitize_mass(*pool, quantity);
    let removed = (before * fraction).clamp(0.0, before);
    *pool = sanitize_mass(before - removed, quantity);
    removed
}

/// Burn dead fuel in the burned fraction of the patch
///
/// # Arguments
/// * `pft_states` - Per-PFT litter, reduced in place
/// * `surface` - Shared surface pools, reduced in place
/// * `fractions` - Consumed fraction per class
/// * `burned_fraction` - Fraction of the patch burned today
///
/// # Returns
/// Carbon removed and the dry matter burned per PFT. Surface pool losses are
/// attributed equally to all PFTs.
pub fn burn_dead_fuel(
    pft_states: &mut FxHashMap<PftId, PatchPft>,
    surface: &mut SurfacePools,
    fractions: &ConsumedFractions,
    burned_fraction: Fraction,
) -> DeadFuelBurn {
    let a = *burned_fraction;
    let fine = a * *fractions.dead[DeadFuelClass::OneHour];
    let woody = a * woody_consumed(fractions);
    let repr = a * DeadFuelClass::OneHour.dead_wood_share() * *fractions.dead[DeadFuelClass::OneHour];

    let surface_carbon = take(&mut surface.metabolic, fine, "metabolic_pool")
        + take(&mut surface.structural, fine, "structural_pool")
        + take(&mut surface.fine_woody, woody, "fine_woody_pool")
        + take(&mut surface.coarse_woody, woody, "coarse_woody_pool");
    let shared = surface_carbon / pft_states.len().max(1) as f64;

    let mut burn = DeadFuelBurn {
        carbon: surface_carbon,
        dry_matter: Vec::with_capacity(pft_states.len()),
    };
    for (&id, state) in &mut *pft_states {
        let carbon = take(&mut state.litter_leaf, fine, "litter_leaf")
            + take(&mut state.litter_sap, woody, "litter_sap")
            + take(&mut state.litter_heart, woody, "litter_heart")
            + take(&mut state.litter_repr, repr, "litter_repr");
        burn.carbon += carbon;
        burn.dry_matter
            .push((id, (carbon + shared) * CARBON_TO_DRY_MATTER));
    }
    burn.dry_matter.sort_by_key(|&(id, _)| id);
    burn
}

/// Burn the leaves of a grass cohort, returning the carbon removed (kgC m-2)
pub fn burn_live_grass(cohort: &mut Individual, fractions: &ConsumedFractions, burned_fraction: Fraction) -> f64 {
    take(
        &mut cohort.cmass.leaf,
        *burned_fraction * *fractions.live_grass,
        "grass_leaf",
    )
}
