//! Fire damage to tree and grass cohorts
//!
//! A surface fire kills trees by scorching their crowns and by heating the
//! cambium through the bark. Both probabilities are combined as independent
//! events and realised over the burned fraction of the patch. Killed but
//! unconsumed biomass moves to the surface litter pools.
//!
//! # Formula
//! ```text
//! SH    = F × I^0.667                                   scorch height (m)
//! CK    = clamp((SH - H + CL) / CL, 0, 1)                crown scorch fraction
//! P_CK  = RCK × CK^p × phenology
//! BT    = BT_s × D[cm] + BT_i                            bark thickness (cm)
//! τ_c   = 2.9 × BT²                                      critical cambial time (min)
//! P_τ   = 1 if τ_l / τ_c ≥ 2, else max(0, 0.563 τ_l / τ_c - 0.125)
//! P_m   = P_τ + P_CK - P_τ × P_CK
//! kill  = P_m × A_f
//! ```
//!
//! # Scientific References
//! - Van Wagner, C.E. (1973). "Height of crown scorch in forest fires."
//!   Canadian Journal of Forest Research 3, 373-378
//! - Peterson, D.L., Ryan, K.C. (1986). Environmental Management 10(6), 797-808
//! - Thonicke, K. et al. (2010). Biogeosciences 7, 1991-2011, eqns. 17-22

use crate::config::MortalityConfig;
use crate::core_types::fuel::DeadFuelClass;
use crate::core_types::pft::Pft;
use crate::core_types::soil::SurfacePools;
use crate::core_types::units::{sanitize_finite, sanitize_mass, Fraction};
use crate::core_types::vegetation::{CarbonPools, Individual};
use crate::physics::combustion::ConsumedFractions;
use crate::physics::crown_fire::{determine_crown_fire_type, CanopyProfile, CrownFireType};
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;
use tracing::trace;

/// Biomass killed but not consumed (kgC m-2)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct KillTotals {
    pub total: f64,
    /// Share attributed to crown damage
    pub crown: f64,
    /// Share attributed to cambial damage
    pub cambial: f64,
}

impl AddAssign for KillTotals {
    fn add_assign(&mut self, rhs: KillTotals) {
        self.total += rhs.total;
        self.crown += rhs.crown;
        self.cambial += rhs.cambial;
    }
}

/// Outcome of applying today's kill to a cohort
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CohortKill {
    pub killed: KillTotals,
    /// The cohort no longer exists and must be removed from the population
    pub removed: bool,
}

/// Crown fire conditions of the patch today
#[derive(Debug, Clone, Copy)]
pub struct CrownFireContext<'a> {
    pub profile: &'a CanopyProfile,
    pub potential: bool,
    pub forward_ros: f64,
}

/// Scorch height of a surface fire (m)
#[inline]
pub fn scorch_height(coefficient: f64, intensity: f64) -> f64 {
    sanitize_finite(coefficient * intensity.max(0.0).powf(0.667), "scorch_height")
}

/// Fraction of the crown within the scorch height
pub fn crown_scorch(scorch_height: f64, height: f64, crown_length: f64) -> Fraction {
    if crown_length <= 0.0 {
        return Fraction::ZERO;
    }
    Fraction::clamped(
        (scorch_height - height + crown_length) / crown_length,
        "crown_scorch",
    )
}

/// Probability of death from crown damage
pub fn crown_kill_probability(
    crown_scorch: Fraction,
    phenology: Fraction,
    config: &MortalityConfig,
) -> Fraction {
    Fraction::clamped(
        config.rck * crown_scorch.powf(config.crown_kill_exponent) * *phenology,
        "p_crown",
    )
}

/// Bark thickness from stem diameter (cm)
///
/// # Arguments
/// * `diameter` - Stem diameter (m)
pub fn bark_thickness(diameter: f64, pft: &Pft) -> f64 {
    sanitize_finite(
        pft.fuel.bark_thickness_slope * diameter * 100.0 + pft.fuel.bark_thickness_intercept,
        "bark_thickness",
    )
}

/// Probability of death from cambial damage
///
/// # Arguments
/// * `residence_time` - Fire residence time (min)
/// * `bark_thickness` - Bark thickness (cm)
pub fn cambial_kill_probability(
    residence_time: f64,
    bark_thickness: f64,
    config: &MortalityConfig,
) -> Fraction {
    let critical = config.critical_time_coefficient * bark_thickness * bark_thickness;
    let ratio = if critical > 0.0 {
        residence_time / critical
    } else {
        0.0
    };
    if ratio >= 2.0 {
        Fraction::ONE
    } else {
        Fraction::clamped(
            config.cambial_slope * ratio - config.cambial_intercept,
            "p_cambial",
        )
    }
}

/// Evaluate the fire damage of a tree cohort
///
/// Records the diagnostics in `cohort.fire`. A crown fire scorches the whole
/// crown.
///
/// # Arguments
/// * `cohort` - Tree cohort
/// * `pft` - Parameters of the cohort's PFT
/// * `intensity` - Surface fire-line intensity (kW m-1)
/// * `residence_time` - Fire residence time (min)
/// * `crown_fire` - Crown fire conditions, `None` when crown fire is disabled
/// * `burned_fraction` - Fraction of the patch burned today
/// * `config` - Mortality constants
pub fn assess_cohort(
    cohort: &mut Individual,
    pft: &Pft,
    intensity: f64,
    residence_time: f64,
    crown_fire: Option<CrownFireContext<'_>>,
    burned_fraction: Fraction,
    config: &MortalityConfig,
) -> CrownFireType {
    let sh = scorch_height(pft.fuel.scorch_height_coefficient, intensity);

    let fire_type = crown_fire.map_or(CrownFireType::Surface, |ctx| {
        determine_crown_fire_type(sh, ctx.profile, ctx.potential, ctx.forward_ros)
    });
    let ck = match fire_type {
        CrownFireType::Surface => crown_scorch(sh, cohort.height, cohort.crown_length),
        CrownFireType::Passive | CrownFireType::Active => Fraction::ONE,
    };
    let p_crown = crown_kill_probability(ck, cohort.phenology, config);

    let (_, diameter) = cohort.allometric_height_diameter(&pft.allometry);
    let bt = bark_thickness(diameter, pft);
    let p_cambial = cambial_kill_probability(residence_time, bt, config);
    let p_total = p_cambial.union(p_crown);

    trace!(
        "cohort {} scorch {:.2} m, CK {}, P_crown {}, P_cambial {}",
        cohort.id,
        sh,
        ck,
        p_crown,
        p_cambial
    );

    cohort.fire.scorch_height = sh;
    cohort.fire.crown_scorch = ck;
    cohort.fire.bark_thickness = bt;
    cohort.fire.p_crown = p_crown;
    cohort.fire.p_cambial = p_cambial;
    cohort.fire.p_total = p_total;
    cohort.fire.day_kill = p_total * burned_fraction;
    fire_type
}

/// Burn the scorched crown of a tree cohort
///
/// Foliage and the 1-, 10- and 100-h live wood of the scorched crown burn with
/// the configured combustion completeness.
///
/// # Returns
/// Carbon removed (kgC m-2)
pub fn burn_crown(cohort: &mut Individual, burned_fraction: Fraction, config: &MortalityConfig) -> f64 {
    let scorched = *burned_fraction * *cohort.fire.crown_scorch;
    if scorched <= 0.0 {
        return 0.0;
    }
    let [c1, c10, c100] = config.live_crown_combustion;
    let wood = DeadFuelClass::OneHour.live_wood_share() * c1
        + DeadFuelClass::TenHour.live_wood_share() * c10
        + DeadFuelClass::HundredHour.live_wood_share() * c100;

    let mut removed = 0.0;
    for (pool, fraction, name) in [
        (&mut cohort.cmass.leaf, scorched * c1, "leaf"),
        (&mut cohort.cmass.sap, scorched * wood, "sapwood"),
        (&mut cohort.cmass.heart, scorched * wood, "heartwood"),
    ] {
        let before = sanitize_mass(*pool, name);
        let burned = (before * fraction).clamp(0.0, before);
        *pool = before - burned;
        removed += burned;
    }
    removed
}

/// Apply today's kill to a tree cohort
///
/// Density and every live pool shrink by `day_kill`; the killed leaves go to
/// the structural pool, sapwood to fine woody debris, heartwood and roots to
/// coarse woody debris. A cohort with fewer than one individual left in the
/// patch, or a young cohort scorched well above its height, is removed and
/// all of its biomass goes to litter.
///
/// # Arguments
/// * `cohort` - Tree cohort assessed by [`assess_cohort`]
/// * `pft` - Parameters of the cohort's PFT
/// * `surface` - Surface pools receiving the killed biomass
/// * `burned_fraction` - Fraction of the patch burned today
/// * `patch_area_m2` - Patch area (m2)
/// * `config` - Mortality constants
pub fn apply_kill(
    cohort: &mut Individual,
    pft: &Pft,
    surface: &mut SurfacePools,
    burned_fraction: Fraction,
    patch_area_m2: f64,
    config: &MortalityConfig,
) -> CohortKill {
    let kill = *cohort.fire.day_kill;
    let pools = cohort.cmass;
    let live = pools.total();
    let mut killed = KillTotals {
        total: kill * live,
        crown: *cohort.fire.p_crown * *burned_fraction * live,
        cambial: *cohort.fire.p_cambial * *burned_fraction * live,
    };

    surface.structural += kill * pools.leaf;
    surface.fine_woody += kill * pools.sap;
    surface.coarse_woody += kill * (pools.heart + pools.root);
    cohort.density = sanitize_mass(cohort.density * (1.0 - kill), "density");
    cohort.cmass.scale(1.0 - kill);

    let negligible = cohort.cmass.sap <= f64::EPSILON || cohort.cmass.leaf <= f64::EPSILON;
    cohort.height = if negligible {
        0.0
    } else {
        cohort.allometric_height_diameter(&pft.allometry).0
    };
    cohort.crown_length = pft.crown_length(cohort.height);

    let too_sparse = cohort.density * patch_area_m2 < 1.0;
    let scorched_sapling = cohort.height < config.min_establishment_height
        && cohort.age > 0
        && cohort.fire.scorch_height >= config.scorch_kill_ratio * cohort.height;
    if !(too_sparse || scorched_sapling) {
        return CohortKill {
            killed,
            removed: false,
        };
    }

    let remaining = cohort.cmass;
    let rest = remaining.total();
    surface.structural += remaining.leaf;
    surface.fine_woody += remaining.sap;
    surface.coarse_woody += remaining.heart + remaining.root;
    killed.total += rest;
    if cohort.fire.p_cambial > cohort.fire.p_crown {
        killed.cambial += rest;
    } else {
        killed.crown += rest;
    }
    cohort.cmass = CarbonPools::default();
    cohort.density = 0.0;
    CohortKill {
        killed,
        removed: true,
    }
}

/// Move burned grass roots to coarse woody debris
///
/// # Returns
/// Carbon transferred (kgC m-2)
pub fn kill_grass_roots(
    cohort: &mut Individual,
    surface: &mut SurfacePools,
    fractions: &ConsumedFractions,
    burned_fraction: Fraction,
) -> f64 {
    let root = sanitize_mass(cohort.cmass.root, "grass_root");
    let killed = (root * *burned_fraction * *fractions.live_grass).clamp(0.0, root);
    cohort.cmass.root = root - killed;
    surface.coarse_woody += killed;
    killed
}
