//! Fire state carried by a patch between days
//!
//! Annual accumulators are zeroed on the first day of each year and monthly
//! statistics on the first day of each month. The fuel moisture memory is
//! reset with the annual state.

use crate::core_types::pft::PftId;
use crate::core_types::units::Fraction;
use crate::core_types::weather::SimDate;
use crate::physics::{Emissions, FuelMoistureState, KillTotals, SpreadState};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Fire carbon flux (kgC m-2)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FireFluxes {
    /// Combustion of litter and surface soil-organic pools
    pub fuel: f64,
    /// Combustion of live vegetation
    pub live_vegetation: f64,
    /// Killed vegetation moved to litter
    pub killed_vegetation: f64,
}

impl FireFluxes {
    /// Carbon released to the atmosphere
    pub fn combusted(&self) -> f64 {
        self.fuel + self.live_vegetation
    }
}

impl AddAssign for FireFluxes {
    fn add_assign(&mut self, rhs: FireFluxes) {
        self.fuel += rhs.fuel;
        self.live_vegetation += rhs.live_vegetation;
        self.killed_vegetation += rhs.killed_vegetation;
    }
}

/// Fire statistics of one month
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MonthlyFireStats {
    /// Area burned (ha)
    pub burned_area_ha: f64,
    /// Sum of the uncapped single-fire area over burn days (ha)
    pub raw_fire_area_ha: f64,
    /// Lightning fires started
    pub ignitions: u32,
    /// Sum of active fires over burn days
    pub fires: u32,
    /// Mean daily fire danger index
    pub fdi: f64,
    pub forward_ros_sum: f64,
    pub backward_ros_sum: f64,
    pub intensity_sum: f64,
    pub burn_days: u32,
}

impl MonthlyFireStats {
    fn mean(sum: f64, days: u32) -> f64 {
        if days == 0 {
            0.0
        } else {
            sum / f64::from(days)
        }
    }

    /// Mean forward rate of spread over burn days (m min-1)
    pub fn mean_forward_ros(&self) -> f64 {
        Self::mean(self.forward_ros_sum, self.burn_days)
    }

    /// Mean backward rate of spread over burn days (m min-1)
    pub fn mean_backward_ros(&self) -> f64 {
        Self::mean(self.backward_ros_sum, self.burn_days)
    }

    /// Mean fire-line intensity over burn days (kW m-1)
    pub fn mean_intensity(&self) -> f64 {
        Self::mean(self.intensity_sum, self.burn_days)
    }
}

/// Annual fire accumulators of a patch
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FireAnnualState {
    /// Fires burning or smouldering, carried to the next day
    pub active_fires: u32,
    /// Fraction of the patch burned so far this year
    pub burned_fraction: Fraction,
    /// Area burned so far this year (ha)
    pub burned_area_ha: f64,
    /// Precipitation summed over consecutive rain days (mm)
    pub precip_sum: f64,
    /// Lightning fires started this year
    pub fires_started: u32,
    pub burn_days: u32,
    /// Fire danger index summed over burn days
    pub fdi_sum: f64,
    pub flux: FireFluxes,
    pub emissions: Emissions,
    /// Biomass killed by fire, per PFT
    pub kills: FxHashMap<PftId, KillTotals>,
}

/// All fire state of a patch
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FireState {
    pub moisture: FuelMoistureState,
    pub annual: FireAnnualState,
    pub monthly: [MonthlyFireStats; 12],
    /// Spread state of the last day with fire spread
    pub spread: SpreadState,
}

impl FireState {
    /// Apply the calendar resets due on `date`
    ///
    /// # Returns
    /// The annual state of the year just finished, on the first day of a year
    pub(crate) fn begin_day(&mut self, date: SimDate) -> Option<FireAnnualState> {
        let finished = if date.is_first_day_of_year() {
            self.moisture = FuelMoistureState::reset();
            self.spread = SpreadState::default();
            Some(std::mem::take(&mut self.annual))
        } else {
            None
        };
        if date.is_first_day_of_month() {
            self.monthly[date.month as usize] = MonthlyFireStats::default();
        }
        finished
    }

    pub fn month(&self, date: SimDate) -> &MonthlyFireStats {
        &self.monthly[date.month as usize]
    }
}
