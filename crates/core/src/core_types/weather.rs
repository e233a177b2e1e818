//! Daily climate forcing and the simulation calendar
//!
//! Climate values arrive already interpolated to daily resolution from the
//! surrounding model driver. The calendar has no leap years.

use serde::{Deserialize, Serialize};

/// Days per month of the model calendar
pub const DAYS_IN_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Days per year of the model calendar
pub const DAYS_IN_YEAR: u32 = 365;

/// Climate of one day
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DailyClimate {
    /// Maximum air temperature (°C)
    pub tmax: f64,
    /// Minimum air temperature (°C)
    pub tmin: f64,
    /// Precipitation (mm)
    pub precip: f64,
    /// Wind speed (m/s)
    pub wind_speed: f64,
    /// Lightning flash density (flashes km-2 day-1)
    pub lightning: f64,
    /// Saturation vapour pressure at minimum temperature (Pa)
    pub esat_tmin: f64,
    /// Nesterov fire-danger index accumulated since the last rain (°C²)
    pub nesterov: f64,
    /// 20-year running mean of annual growing degree days (°C day)
    pub gdd20: f64,
}

impl DailyClimate {
    /// Dewpoint temperature (°C) from saturation vapour pressure at Tmin
    ///
    /// # Formula
    /// ```text
    /// e_s  = 0.01 × esat                       (hPa)
    /// Tdew = 34.07 + 4157 / ln(2.1718e8 / e_s) - 273.15
    /// ```
    ///
    /// Returns `tmin` when `esat` is not positive.
    ///
    /// # References
    /// Bolton, D. (1980). "The computation of equivalent potential temperature."
    /// Monthly Weather Review 108, 1046-1053.
    pub fn dewpoint(&self) -> f64 {
        let es = 0.01 * self.esat_tmin;
        if es <= 0.0 {
            return self.tmin;
        }
        34.07 + 4157.0 / (2.1718e8 / es).ln() - 273.15
    }

    /// Wind speed in m/min
    #[inline]
    pub fn wind_m_per_min(&self) -> f64 {
        60.0 * self.wind_speed.max(0.0)
    }
}

/// Position of the current day in the simulation calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimDate {
    /// Simulation year, 0 for the first simulated year
    pub year: u32,
    /// Day of year, 0-based
    pub day_of_year: u32,
    /// Month, 0-based
    pub month: u32,
    /// Day of month, 0-based
    pub day_of_month: u32,
}

impl SimDate {
    /// Build a date from a 0-based day of year (wrapped into one year)
    pub fn new(year: u32, day_of_year: u32) -> Self {
        let day_of_year = day_of_year % DAYS_IN_YEAR;
        let mut remaining = day_of_year;
        let mut month = 0;
        while remaining >= DAYS_IN_MONTH[month as usize] {
            remaining -= DAYS_IN_MONTH[month as usize];
            month += 1;
        }
        SimDate {
            year,
            day_of_year,
            month,
            day_of_month: remaining,
        }
    }

    pub fn days_in_month(&self) -> u32 {
        DAYS_IN_MONTH[self.month as usize]
    }

    pub fn is_first_day_of_year(&self) -> bool {
        self.day_of_year == 0
    }

    pub fn is_first_day_of_month(&self) -> bool {
        self.day_of_month == 0
    }

    /// The following day, rolling over into the next year
    pub fn next(&self) -> SimDate {
        if self.day_of_year + 1 >= DAYS_IN_YEAR {
            SimDate::new(self.year + 1, 0)
        } else {
            SimDate::new(self.year, self.day_of_year + 1)
        }
    }
}
