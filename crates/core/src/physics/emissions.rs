//! Trace gas and aerosol emissions from burned dry matter
//!
//! # References
//! Andreae, M.O., Merlet, P. (2001). "Emission of trace gases and aerosols from
//! biomass burning." Global Biogeochemical Cycles 15(4), 955-966

use crate::core_types::pft::EmissionFactors;
use serde::{Deserialize, Serialize};
use std::ops::{AddAssign, Index};

/// Emitted species
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TraceGas {
    Co2,
    Co,
    Ch4,
    Voc,
    /// Total particulate matter
    Tpm,
    Nox,
}

impl TraceGas {
    pub const ALL: [TraceGas; 6] = [
        TraceGas::Co2,
        TraceGas::Co,
        TraceGas::Ch4,
        TraceGas::Voc,
        TraceGas::Tpm,
        TraceGas::Nox,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Emitted mass per species (g m-2)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Emissions(pub [f64; 6]);

impl Emissions {
    /// Emissions from burning `dry_matter` kg DM m-2 with the given factors
    pub fn from_dry_matter(dry_matter: f64, factors: &EmissionFactors) -> Self {
        let dm = dry_matter.max(0.0);
        Emissions(factors.as_array().map(|ef| ef * dm))
    }

    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }
}

impl Index<TraceGas> for Emissions {
    type Output = f64;
    fn index(&self, gas: TraceGas) -> &f64 {
        &self.0[gas.index()]
    }
}

impl AddAssign for Emissions {
    fn add_assign(&mut self, rhs: Emissions) {
        for (a, b) in self.0.iter_mut().zip(rhs.0) {
            *a += b;
        }
    }
}
