//! Litter and surface soil-organic pools, snow and soil water
//!
//! All carbon pools are in kgC m-2 of patch. Per-PFT litter is owned by the
//! patch and keyed by PFT; the four surface soil-organic pools are shared by
//! all PFTs of the patch.

use serde::{Deserialize, Serialize};

/// Per-PFT state of a patch read and written by the fire model
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PatchPft {
    pub litter_leaf: f64,
    pub litter_sap: f64,
    pub litter_heart: f64,
    /// Reproductive litter
    pub litter_repr: f64,
    /// Leaf-area weighted water stress scalar (1 = no stress)
    pub water_stress: f64,
}

impl PatchPft {
    pub fn total_litter(&self) -> f64 {
        self.litter_leaf + self.litter_sap + self.litter_heart + self.litter_repr
    }
}

/// Surface soil-organic matter pools
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SurfacePools {
    pub metabolic: f64,
    pub structural: f64,
    pub fine_woody: f64,
    pub coarse_woody: f64,
}

impl SurfacePools {
    pub fn total(&self) -> f64 {
        self.metabolic + self.structural + self.fine_woody + self.coarse_woody
    }
}

/// Soil state of a patch
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SoilState {
    /// Snow water equivalent (mm)
    pub snowpack: f64,
    /// Upper-layer relative water content by day of year (0-1)
    pub upper_water: Vec<f64>,
    /// Lower-layer relative water content by day of year (0-1)
    pub lower_water: Vec<f64>,
    pub surface: SurfacePools,
}

impl SoilState {
    /// Upper-layer water content on `day`, 0 when the series does not cover it
    pub fn upper_water_on(&self, day: usize) -> f64 {
        self.upper_water.get(day).copied().unwrap_or(0.0)
    }

    pub fn lower_water_on(&self, day: usize) -> f64 {
        self.lower_water.get(day).copied().unwrap_or(0.0)
    }

    pub fn has_snow(&self) -> bool {
        self.snowpack > 0.0
    }
}
