//! Van Wagner Crown Fire Initiation (1977) on a vertical canopy fuel profile
//!
//! Canopy bulk density is profiled in 1 m levels from the live 1-h foliar
//! fuel of every tree cohort, spread evenly over its crown. A crown fire
//! starts when:
//! - the mean canopy bulk density between canopy base and top exceeds a threshold
//! - the canopy is dry (mean water stress scalar at or below a threshold)
//! - the surface fire's scorch height reaches the canopy base
//!
//! A started crown fire is active when the surface spread rate reaches Van
//! Wagner's critical crown spread rate, and passive otherwise.
//!
//! # Scientific References
//! - Van Wagner, C.E. (1977). "Conditions for the start and spread of crown fire"
//!   Canadian Journal of Forest Research, 7(1), 23-34
//! - Van Wagner, C.E. (1993). "Prediction of crown fire behavior in two stands of jack pine"
//!   Canadian Journal of Forest Research, 23(3), 442-449
//! - Cruz, M.G., Alexander, M.E. (2010). "Assessing crown fire potential in coniferous forests"
//!   Forest Ecology and Management, 259(3), 562-570

use crate::config::CrownFireConfig;
use crate::core_types::fuel::{DeadFuelClass, CARBON_TO_DRY_MATTER};
use crate::core_types::vegetation::Individual;
use serde::{Deserialize, Serialize};

/// Crown fire type classification
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum CrownFireType {
    /// No crown fire - surface fire only
    #[default]
    Surface,
    /// Passive crown fire - intermittent torching of individual trees
    Passive,
    /// Active crown fire - continuous crown fire spread
    Active,
}

/// Canopy bulk density by 1 m height level
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CanopyProfile {
    /// Bulk density per level (kg DM m-3)
    pub levels: Vec<f64>,
    /// Lowest level above the canopy threshold
    pub base: Option<usize>,
    /// Top of the canopy, one below the highest level above the threshold
    pub top: Option<usize>,
    /// Mean bulk density between base and top (kg DM m-3)
    pub mean_bulk_density: f64,
}

impl CanopyProfile {
    /// Profile the canopy of the given tree cohorts
    pub fn from_trees<'a>(
        trees: impl IntoIterator<Item = &'a Individual>,
        config: &CrownFireConfig,
    ) -> Self {
        let n = config.canopy_levels;
        let mut levels = vec![0.0; n];
        for tree in trees {
            if tree.crown_length <= 0.0 {
                continue;
            }
            let foliar = CARBON_TO_DRY_MATTER
                * (DeadFuelClass::OneHour.live_wood_share()
                    * (tree.cmass.heart + tree.cmass.sap)
                    + tree.cmass.leaf);
            let per_level = foliar / tree.crown_length;
            let bole = tree.bole_height();
            for (i, level) in levels.iter_mut().enumerate() {
                let z = i as f64;
                if z >= tree.height + 1.0 {
                    break;
                }
                if z >= bole {
                    *level += per_level;
                }
            }
        }

        let threshold = config.level_bulk_density;
        let base = levels.iter().position(|&cbd| cbd > threshold);
        let top = levels
            .iter()
            .rposition(|&cbd| cbd > threshold)
            .map(|i| i.saturating_sub(1));

        let mean_bulk_density = match (base, top) {
            (Some(b), Some(t)) if t > b => levels[b..=t].iter().sum::<f64>() / (t - b) as f64,
            _ => 0.0,
        };

        CanopyProfile {
            levels,
            base,
            top,
            mean_bulk_density,
        }
    }

    /// Canopy base height (m), infinite for an empty canopy
    pub fn base_height(&self) -> f64 {
        self.base.map_or(f64::INFINITY, |b| b as f64)
    }
}

/// Cover-weighted canopy water status of the tree cohorts
///
/// # Arguments
/// * `trees` - `(water_stress, fpc)` of each tree cohort
/// * `tree_cover` - Total tree cover of the patch
pub fn canopy_foliar_moisture(trees: impl IntoIterator<Item = (f64, f64)>, tree_cover: f64) -> f64 {
    if tree_cover <= 0.0 {
        return 0.0;
    }
    trees
        .into_iter()
        .map(|(water_stress, fpc)| water_stress * fpc / tree_cover)
        .sum()
}

/// Whether the canopy can carry a crown fire today
pub fn crown_fire_potential(
    profile: &CanopyProfile,
    foliar_moisture: f64,
    config: &CrownFireConfig,
) -> bool {
    profile.mean_bulk_density > config.mean_bulk_density && foliar_moisture <= config.foliar_moisture
}

/// Calculate critical crown fire spread rate
///
/// Van Wagner (1977) formula:
/// R_critical = 3.0 / CBD
///
/// # Arguments
/// * `crown_bulk_density` - Crown bulk density (kg/m³)
///
/// # Returns
/// Critical crown fire spread rate in m/min
///
/// # References
/// Van Wagner (1977), Equation 9
pub fn calculate_critical_crown_spread_rate(crown_bulk_density: f64) -> f64 {
    if crown_bulk_density <= 0.0 {
        return f64::INFINITY;
    }
    3.0 / crown_bulk_density
}

/// Determine crown fire type for a cohort
///
/// Classification:
/// - Surface: no crown fire potential, or scorch height below canopy base
/// - Passive: crown fire started and R < R_critical
/// - Active: crown fire started and R >= R_critical
///
/// # References
/// Van Wagner (1977, 1993)
pub fn determine_crown_fire_type(
    scorch_height: f64,
    profile: &CanopyProfile,
    potential: bool,
    surface_ros: f64,
) -> CrownFireType {
    if !potential || scorch_height <= profile.base_height() {
        CrownFireType::Surface
    } else if surface_ros < calculate_critical_crown_spread_rate(profile.mean_bulk_density) {
        CrownFireType::Passive
    } else {
        CrownFireType::Active
    }
}
