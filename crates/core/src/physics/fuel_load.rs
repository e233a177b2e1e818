//! Fuel inventory of a patch
//!
//! Converts litter, surface soil-organic pools and live cohort biomass (kgC m-2)
//! into fuel loads per residence class (g dry matter m-2), tracked per PFT for
//! mass balance and summed across PFTs for fire behaviour.
//!
//! # Formula
//! ```text
//! wood_litter = litter_sap + litter_heart + (fwd + cwd) / n_pft
//! leaf_litter = litter_leaf + (metabolic + structural) / n_pft
//!
//! dead_1h   = c2om × (0.0495 × (wood_litter + litter_repr) + leaf_litter) × 1000
//! dead_k    = c2om × share_k × wood_litter × 1000            (k = 10, 100, 1000 h)
//!
//! live_1h   = c2om × (0.04725 × (C_sap + C_heart) + C_leaf) × 1000
//! live_k    = c2om × share_k × (C_sap + C_heart) × 1000
//! ```
//!
//! # References
//! Pfeiffer, M., Spessa, A., Kaplan, J.O. (2013). "A model for global biomass burning in
//! preindustrial time: LPJ-LMfire (v1.0)." Geoscientific Model Development 6, 643-685.

use crate::config::SpreadConfig;
use crate::core_types::fuel::{DeadFuelClass, FuelClasses, CARBON_TO_DRY_MATTER, KG_TO_G};
use crate::core_types::pft::{Lifeform, PftId, PftTable};
use crate::core_types::soil::{PatchPft, SurfacePools};
use crate::core_types::vegetation::Vegetation;
use crate::error::FireResult;
use rustc_hash::FxHashMap;

/// Fuel of one PFT (g DM m-2)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PftFuel {
    pub pft: PftId,
    pub lifeform: Lifeform,
    pub dead: FuelClasses<f64>,
    pub live: FuelClasses<f64>,
    /// Bulk density parameter of the PFT (kg m-3)
    pub bulk_density: f64,
}

impl PftFuel {
    /// Bulk density of the PFT's dead fuel, weighted towards coarser classes
    ///
    /// ```text
    /// ρ_pft = ρ × (w1 + 1.2 w10 + 1.4 w100) / (w1 + w10 + w100)
    /// ```
    pub fn weighted_bulk_density(&self, bulk_density: f64) -> f64 {
        let d = &self.dead;
        let spreading = d.spreading_total();
        if spreading <= 0.0 {
            return 0.0;
        }
        bulk_density
            * (d[DeadFuelClass::OneHour]
                + 1.2 * d[DeadFuelClass::TenHour]
                + 1.4 * d[DeadFuelClass::HundredHour])
            / spreading
    }
}

/// Mass and packing of the fuel bed that carries surface spread
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FuelBed {
    /// Spreading fuel load (kg DM m-2)
    pub load_kg: f64,
    /// Mass-weighted bulk density (kg m-3)
    pub bulk_density: f64,
}

/// Fuel loads and vegetation cover of a patch on one day
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FuelInventory {
    /// Per-PFT fuel, ordered by PFT id
    pub pfts: Vec<PftFuel>,
    /// Dead fuel summed across PFTs (g DM m-2)
    pub dead: FuelClasses<f64>,
    /// Live grass leaf fuel (g DM m-2)
    pub live_grass: f64,
    pub tree_cover: f64,
    pub grass_cover: f64,
    /// Sum of all cohort FPC, uncapped
    pub total_cover: f64,
    /// FPC-weighted ignition efficiency of the vegetation
    pub ignition_efficiency: f64,
    /// Number of PFTs sharing the surface soil-organic pools
    pub pft_count: usize,
}

impl FuelInventory {
    /// Take stock of the fuel of a patch
    ///
    /// # Arguments
    /// * `vegetation` - Cohorts of the patch
    /// * `pft_states` - Per-PFT litter of the patch
    /// * `surface` - Surface soil-organic pools, shared equally by all PFTs
    /// * `table` - PFT parameters
    /// * `spread` - Spread constants (tree cover cap)
    pub fn assess(
        vegetation: &Vegetation,
        pft_states: &FxHashMap<PftId, PatchPft>,
        surface: &SurfacePools,
        table: &PftTable,
        spread: &SpreadConfig,
    ) -> FireResult<Self> {
        let pft_count = pft_states.len().max(1);
        let shared = pft_count as f64;
        let mut by_pft: FxHashMap<PftId, PftFuel> = FxHashMap::default();

        for (&id, state) in pft_states {
            let pft = table.get(id)?;
            let wood = state.litter_sap
                + state.litter_heart
                + (surface.fine_woody + surface.coarse_woody) / shared;
            let leaf = state.litter_leaf + (surface.metabolic + surface.structural) / shared;
            let dead = FuelClasses::from_fn(|class| {
                let mut carbon = class.dead_wood_share() * wood;
                if class == DeadFuelClass::OneHour {
                    carbon += class.dead_wood_share() * state.litter_repr + leaf;
                }
                CARBON_TO_DRY_MATTER * carbon * KG_TO_G
            });
            by_pft.insert(
                id,
                PftFuel {
                    pft: id,
                    lifeform: pft.lifeform,
                    dead,
                    live: FuelClasses::default(),
                    bulk_density: pft.fuel.bulk_density,
                },
            );
        }

        let mut inventory = FuelInventory {
            pft_count,
            ..FuelInventory::default()
        };
        let mut weighted_ieff = 0.0;

        for cohort in vegetation.iter() {
            let pft = table.get(cohort.pft)?;
            let entry = by_pft.entry(cohort.pft).or_insert(PftFuel {
                pft: cohort.pft,
                lifeform: pft.lifeform,
                dead: FuelClasses::default(),
                live: FuelClasses::default(),
                bulk_density: pft.fuel.bulk_density,
            });
            let stem = cohort.cmass.sap + cohort.cmass.heart;
            for class in DeadFuelClass::ALL {
                let mut carbon = class.live_wood_share() * stem;
                if class == DeadFuelClass::OneHour {
                    carbon += cohort.cmass.leaf;
                }
                entry.live[class] += CARBON_TO_DRY_MATTER * carbon * KG_TO_G;
            }
            if pft.lifeform == Lifeform::Grass {
                inventory.live_grass += CARBON_TO_DRY_MATTER * cohort.cmass.leaf * KG_TO_G;
            }

            inventory.total_cover += cohort.fpc;
            weighted_ieff += cohort.fpc * pft.fuel.ignition_efficiency;
            match pft.lifeform {
                Lifeform::Tree => inventory.tree_cover += cohort.fpc,
                Lifeform::Grass | Lifeform::Crop => inventory.grass_cover += cohort.fpc,
            }
        }

        inventory.tree_cover = inventory.tree_cover.min(spread.max_tree_cover);
        inventory.grass_cover = inventory.grass_cover.min(1.0);
        inventory.ignition_efficiency = if inventory.total_cover > 0.0 {
            weighted_ieff / inventory.total_cover
        } else {
            0.0
        };

        let mut pfts: Vec<PftFuel> = by_pft.into_values().collect();
        pfts.sort_by_key(|f| f.pft);
        for fuel in &pfts {
            inventory.dead.add_assign(&fuel.dead);
        }
        inventory.pfts = pfts;
        Ok(inventory)
    }

    /// Live fuel of tree PFTs over all classes (g DM m-2)
    pub fn live_tree_total(&self) -> f64 {
        self.pfts
            .iter()
            .filter(|f| f.lifeform == Lifeform::Tree)
            .map(|f| f.live.total())
            .sum()
    }

    /// Fuel counted against the minimum load: dead fuel of grass and crop
    /// PFTs plus tree live fuel plus live grass (g DM m-2)
    ///
    /// Tree litter feeds the spreading bed but not this total.
    pub fn total_fuel(&self) -> f64 {
        let herbaceous_dead: f64 = self
            .pfts
            .iter()
            .filter(|f| f.lifeform != Lifeform::Tree)
            .map(|f| f.dead.total())
            .sum();
        herbaceous_dead + self.live_tree_total() + self.live_grass
    }

    /// Dead fuel of one PFT
    pub fn pft(&self, id: PftId) -> Option<&PftFuel> {
        self.pfts.iter().find(|f| f.pft == id)
    }

    /// Spreading fuel bed of live herbaceous and dead fuel
    ///
    /// # Formula
    /// ```text
    /// w_n = Σ_herb live_{1,10,100} + Σ_pft dead_{1,10,100}          (kg m-2)
    /// ρ_b = (ρ_lg × live_herb + Σ_pft ρ_pft × dead_pft) / w_n
    /// ```
    /// Grass PFTs use the live grass bulk density for their litter too.
    pub fn fuel_bed(&self, grass_bulk_density: f64) -> FuelBed {
        let mut live_mass = 0.0;
        let mut dead_mass = 0.0;
        let mut weighted = 0.0;
        for fuel in &self.pfts {
            let dead_kg = fuel.dead.spreading_total() / KG_TO_G;
            if dead_kg > 0.0 {
                let rho = if fuel.lifeform == Lifeform::Grass {
                    grass_bulk_density
                } else {
                    fuel.bulk_density
                };
                dead_mass += dead_kg;
                weighted += fuel.weighted_bulk_density(rho) * dead_kg;
            }
            if fuel.lifeform != Lifeform::Tree {
                live_mass += fuel.live.spreading_total() / KG_TO_G;
            }
        }
        let load_kg = live_mass + dead_mass;
        let bulk_density = if load_kg > 0.0 {
            (grass_bulk_density * live_mass + weighted) / load_kg
        } else {
            0.0
        };
        FuelBed {
            load_kg,
            bulk_density,
        }
    }
}

/// Bulk density of standing grass from the 20-year mean GDD (kg m-3)
///
/// Ranges from about 12 at tundra GDDs to 1 in the tropics. Zero in the first
/// simulation year, before a GDD climatology exists.
pub fn grass_bulk_density(gdd20: f64, year: u32) -> f64 {
    if year == 0 {
        return 0.0;
    }
    (2.0e4 / (gdd20 + 1000.0) - 1.0).max(0.0)
}
