//! Dead fuel residence classes and the per-class vector used throughout the fire model
//!
//! Fuel is tracked in the four timelag classes of the National Fire Danger
//! Rating System. Woody litter and live wood are apportioned into the classes
//! by fixed diameter-distribution shares; foliage is entirely 1-hour fuel.
//!
//! # References
//! - Deeming, J.E., Burgan, R.E., Cohen, J.D. (1977). "The National Fire-Danger Rating
//!   System - 1978." USDA Forest Service General Technical Report INT-39.
//! - Thonicke, K. et al. (2010). "The influence of vegetation, fire spread and fire behaviour
//!   on biomass burning and trace gas emissions." Biogeosciences 7, 1991-2011.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Conversion factor between carbon and total dry matter of vegetation
pub const CARBON_TO_DRY_MATTER: f64 = 1.0 / 0.45;

/// Fraction of total vegetation mass that is mineral (non-flammable)
pub const MINERAL_FRACTION: f64 = 0.055;

/// kg to g
pub const KG_TO_G: f64 = 1000.0;

/// Dead fuel residence (timelag) class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeadFuelClass {
    /// Fine fuel: leaves, grass litter, twigs < 6 mm
    OneHour,
    /// Small branches 6-25 mm
    TenHour,
    /// Branches 25-75 mm
    HundredHour,
    /// Logs > 75 mm
    ThousandHour,
}

impl DeadFuelClass {
    /// All classes in order of increasing residence time
    pub const ALL: [DeadFuelClass; 4] = [
        DeadFuelClass::OneHour,
        DeadFuelClass::TenHour,
        DeadFuelClass::HundredHour,
        DeadFuelClass::ThousandHour,
    ];

    /// Classes that take part in surface spread (1-, 10- and 100-hour)
    pub const SPREADING: [DeadFuelClass; 3] = [
        DeadFuelClass::OneHour,
        DeadFuelClass::TenHour,
        DeadFuelClass::HundredHour,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Share of dead woody litter falling into this class
    ///
    /// The 1-hour share applies to the woody (and reproductive) litter only;
    /// leaf-type litter is added to the 1-hour class in full.
    pub const fn dead_wood_share(self) -> f64 {
        match self {
            DeadFuelClass::OneHour => 0.0495,
            DeadFuelClass::TenHour => 0.075,
            DeadFuelClass::HundredHour => 0.21,
            DeadFuelClass::ThousandHour => 0.6655,
        }
    }

    /// Share of living sapwood + heartwood falling into this class
    pub const fn live_wood_share(self) -> f64 {
        match self {
            DeadFuelClass::OneHour => 0.04725,
            DeadFuelClass::TenHour => 0.075,
            DeadFuelClass::HundredHour => 0.21,
            DeadFuelClass::ThousandHour => 0.66775,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            DeadFuelClass::OneHour => "1-h",
            DeadFuelClass::TenHour => "10-h",
            DeadFuelClass::HundredHour => "100-h",
            DeadFuelClass::ThousandHour => "1000-h",
        }
    }
}

/// One value per dead fuel class, indexed by [`DeadFuelClass`]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FuelClasses<T>(pub [T; 4]);

impl<T: Copy> FuelClasses<T> {
    pub const fn splat(value: T) -> Self {
        FuelClasses([value; 4])
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> FuelClasses<U> {
        FuelClasses(self.0.map(f))
    }

    /// Iterate `(class, value)` pairs in class order
    pub fn iter(&self) -> impl Iterator<Item = (DeadFuelClass, T)> + '_ {
        DeadFuelClass::ALL.iter().map(move |&c| (c, self.0[c.index()]))
    }

    pub fn from_fn(mut f: impl FnMut(DeadFuelClass) -> T) -> Self {
        FuelClasses(DeadFuelClass::ALL.map(&mut f))
    }
}

impl FuelClasses<f64> {
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Sum over the 1-, 10- and 100-hour classes
    pub fn spreading_total(&self) -> f64 {
        DeadFuelClass::SPREADING
            .iter()
            .map(|c| self.0[c.index()])
            .sum()
    }

    pub fn add_assign(&mut self, other: &FuelClasses<f64>) {
        for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
            *a += *b;
        }
    }
}

impl<T> Index<DeadFuelClass> for FuelClasses<T> {
    type Output = T;
    #[inline]
    fn index(&self, class: DeadFuelClass) -> &T {
        &self.0[class.index()]
    }
}

impl<T> IndexMut<DeadFuelClass> for FuelClasses<T> {
    #[inline]
    fn index_mut(&mut self, class: DeadFuelClass) -> &mut T {
        &mut self.0[class.index()]
    }
}
