//! Vegetation cohorts as seen by the fire model
//!
//! Growth, allocation and phenology live outside this crate. The fire model
//! reads cohort geometry and carbon pools, writes back reduced densities and
//! pools, and records the per-day mortality diagnostics in [`CohortFireState`].

use crate::core_types::pft::{Allometry, PftId};
use crate::core_types::units::{sanitize_finite, Fraction};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Live carbon pools of a cohort (kgC m-2 of patch)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CarbonPools {
    pub leaf: f64,
    pub sap: f64,
    pub heart: f64,
    pub root: f64,
    /// Carbon borrowed from future allocation
    pub debt: f64,
}

impl CarbonPools {
    /// Total live biomass, excluding debt
    pub fn total(&self) -> f64 {
        self.leaf + self.sap + self.heart + self.root
    }

    /// Scale every pool (debt included) by `factor`
    pub fn scale(&mut self, factor: f64) {
        self.leaf *= factor;
        self.sap *= factor;
        self.heart *= factor;
        self.root *= factor;
        self.debt *= factor;
    }
}

/// Fire diagnostics of a cohort, recomputed on every day with fire
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CohortFireState {
    /// Fraction of the crown scorched
    pub crown_scorch: Fraction,
    /// Probability of death from crown damage
    pub p_crown: Fraction,
    /// Probability of death from cambial damage
    pub p_cambial: Fraction,
    /// Combined probability of death
    pub p_total: Fraction,
    /// Bark thickness (cm)
    pub bark_thickness: f64,
    /// Scorch height of today's fire (m)
    pub scorch_height: f64,
    /// Fraction of the cohort killed today
    pub day_kill: Fraction,
}

/// One average-individual cohort of a PFT
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    pub id: u32,
    pub pft: PftId,
    /// Stem density (individuals m-2)
    pub density: f64,
    /// Foliar projective cover (0-1)
    pub fpc: f64,
    /// Age (years)
    pub age: u32,
    /// Height (m)
    pub height: f64,
    /// Crown length (m)
    pub crown_length: f64,
    /// Phenological state, 1 when in full leaf
    pub phenology: Fraction,
    pub cmass: CarbonPools,
    #[serde(default)]
    pub fire: CohortFireState,
}

impl Individual {
    /// Height of the lowest live branches (m)
    #[inline]
    pub fn bole_height(&self) -> f64 {
        (self.height - self.crown_length).max(0.0)
    }

    /// Stem diameter (m) from the sapwood-to-leaf ratio
    ///
    /// # Formula
    /// ```text
    /// h = C_sap / C_leaf / SLA × k_latosa / ρ_wood
    /// D = (h / k_allom2)^(1 / k_allom3)
    /// ```
    ///
    /// # Returns
    /// `(height, diameter)`; both are 0 for a leafless cohort or when the
    /// allometry degenerates
    pub fn allometric_height_diameter(&self, allometry: &Allometry) -> (f64, f64) {
        if self.cmass.leaf <= f64::EPSILON || allometry.wood_density <= f64::EPSILON {
            return (0.0, 0.0);
        }
        let height = self.cmass.sap / self.cmass.leaf / allometry.sla * allometry.k_latosa
            / allometry.wood_density;
        let diameter = (height / allometry.k_allom2).powf(1.0 / allometry.k_allom3);
        if !(height.is_finite() && diameter.is_finite()) {
            warn!(
                cohort = self.id,
                pft = %self.pft,
                height,
                diameter,
                "non-finite allometry, height and diameter set to 0"
            );
            return (0.0, 0.0);
        }
        (sanitize_finite(height, "height").max(0.0), diameter.max(0.0))
    }
}

/// The cohort population of one patch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vegetation {
    cohorts: Vec<Individual>,
}

impl Vegetation {
    pub fn new(cohorts: Vec<Individual>) -> Self {
        Vegetation { cohorts }
    }

    pub fn push(&mut self, cohort: Individual) {
        self.cohorts.push(cohort);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Individual> {
        self.cohorts.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Individual> {
        self.cohorts.iter_mut()
    }

    /// Keep only the cohorts for which `keep` returns true
    pub fn retain(&mut self, keep: impl FnMut(&Individual) -> bool) {
        self.cohorts.retain(keep);
    }

    pub fn get(&self, id: u32) -> Option<&Individual> {
        self.cohorts.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.cohorts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cohorts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cohort(leaf: f64, sap: f64) -> Individual {
        Individual {
            id: 1,
            pft: PftId(0),
            density: 0.05,
            fpc: 0.5,
            age: 20,
            height: 15.0,
            crown_length: 6.0,
            phenology: Fraction::ONE,
            cmass: CarbonPools {
                leaf,
                sap,
                heart: 2.0,
                root: 0.5,
                debt: 0.0,
            },
            fire: CohortFireState::default(),
        }
    }

    #[test]
    fn test_bole_height() {
        assert_eq!(cohort(1.0, 1.0).bole_height(), 9.0);
    }

    #[test]
    fn test_allometry() {
        let allometry = Allometry::default();
        let (h, d) = cohort(0.3, 3.0).allometric_height_diameter(&allometry);
        let expected_h = 3.0 / 0.3 / 9.3 * 6000.0 / 200.0;
        assert!((h - expected_h).abs() < 1e-9, "height {h}");
        assert!((d - (expected_h / 60.0).powf(1.0 / 0.67)).abs() < 1e-9);
    }

    #[test]
    fn test_leafless_cohort_has_zero_geometry() {
        let (h, d) = cohort(0.0, 3.0).allometric_height_diameter(&Allometry::default());
        assert_eq!((h, d), (0.0, 0.0));
    }

    #[test]
    fn test_scale_pools() {
        let mut c = cohort(1.0, 2.0);
        c.cmass.scale(0.5);
        assert_eq!(c.cmass.leaf, 0.5);
        assert_eq!(c.cmass.sap, 1.0);
        assert_eq!(c.cmass.heart, 1.0);
        assert_eq!(c.cmass.root, 0.25);
    }
}
