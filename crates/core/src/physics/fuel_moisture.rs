//! Daily fuel moisture recursion
//!
//! Dead fuel dries in proportion to the daily vapour pressure deficit proxy
//! `Tmax × (Tmax - Tdew)` and to its own moisture, and is rewetted by rain:
//!
//! ```text
//! dry_i = max(0, Tmax × (Tmax - Tdew) × α_i × ω_i(t-1))
//! wet   = min(P / 50, 1)
//! ω_i   = clamp(ω_i(t-1) - dry_i + wet, 0, 1)
//! ```
//!
//! Live grass moisture follows upper-layer soil water. Fine fuel moisture
//! blends 1-h dead fuel with live grass; the aggregate fuel complex uses the
//! same recursion with a mass-weighted drying coefficient.
//!
//! # Scientific References
//! - Thonicke, K. et al. (2010). "The influence of vegetation, fire spread and fire behaviour
//!   on biomass burning and trace gas emissions." Biogeosciences 7, 1991-2011
//! - Pfeiffer, M., Spessa, A., Kaplan, J.O. (2013). "A model for global biomass burning in
//!   preindustrial time: LPJ-LMfire (v1.0)." Geoscientific Model Development 6, 643-685

use crate::config::MoistureConfig;
use crate::core_types::fuel::{DeadFuelClass, FuelClasses};
use crate::core_types::units::{sanitize_finite, Fraction};
use serde::{Deserialize, Serialize};

/// Daily weather and soil inputs of the moisture recursion
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MoistureForcing {
    /// Maximum temperature (°C)
    pub tmax: f64,
    /// Dewpoint (°C)
    pub tdew: f64,
    /// Precipitation (mm)
    pub precip: f64,
    /// Upper-layer relative soil water content
    pub upper_soil_water: f64,
    /// Nesterov index (°C²)
    pub nesterov: f64,
}

/// Fuel loads that weight the combined moistures (g DM m-2)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MoistureWeights {
    pub dead: FuelClasses<f64>,
    pub live_grass: f64,
}

/// Fuel moisture state of a patch
///
/// `dead` and `aggregate` carry over between days; the other fields are
/// derived from today's loads.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FuelMoistureState {
    /// Moisture per dead fuel class
    pub dead: FuelClasses<Fraction>,
    /// Moisture of the aggregate fuel complex (ω_o)
    pub aggregate: Fraction,
    /// Live grass moisture (ω_lg)
    pub live_grass: Fraction,
    /// Combined 1-h dead and live grass moisture (ω_nl)
    pub fine_fuel: Fraction,
    /// Drying coefficient of live grass (α_lg)
    pub live_grass_drying: f64,
    /// Mass-weighted moisture of extinction of all fuel
    pub extinction_aggregate: f64,
    /// Mass-weighted moisture of extinction of fine fuel
    pub extinction_fine: f64,
}

/// Advance one dead fuel moisture by one day
#[inline]
pub fn dry_and_wet(prior: Fraction, alpha: f64, tmax: f64, tdew: f64, wet: f64) -> Fraction {
    let dry = (tmax * (tmax - tdew) * alpha * *prior).max(0.0);
    Fraction::clamped(*prior - dry + wet, "fuel_moisture")
}

/// Live grass moisture from upper soil water
///
/// ```text
/// ω_lg = clamp(b × w_upper - c, 0, 1)      b = 10/9, c = 1/9
/// ```
pub fn live_grass_moisture(upper_soil_water: f64, config: &MoistureConfig) -> Fraction {
    Fraction::clamped(
        config.live_grass_slope * upper_soil_water - config.live_grass_intercept,
        "live_grass_moisture",
    )
}

/// Drying coefficient of live grass, `-ln(ω_lg) / NI`
pub fn live_grass_drying(live_grass: Fraction, nesterov: f64) -> f64 {
    if *live_grass > 0.0 && nesterov > 0.0 {
        sanitize_finite(-live_grass.ln() / nesterov, "live_grass_drying")
    } else {
        0.0
    }
}

/// `num / den`, or 0 when the weights vanish
#[inline]
fn weighted(num: f64, den: f64, quantity: &str) -> f64 {
    if den > 0.0 {
        sanitize_finite(num / den, quantity)
    } else {
        0.0
    }
}

impl FuelMoistureState {
    /// The state at the start of a year: all fuel bone dry
    pub fn reset() -> Self {
        FuelMoistureState::default()
    }

    /// Advance the moisture state by one day
    ///
    /// Pure in `self`: calling it twice with the same inputs gives the same
    /// result.
    ///
    /// # Arguments
    /// * `forcing` - Today's weather and upper soil water
    /// * `weights` - Today's dead fuel and live grass loads
    /// * `config` - Drying coefficients and moistures of extinction
    ///
    /// # Returns
    /// Tomorrow's prior state
    pub fn update(
        &self,
        forcing: &MoistureForcing,
        weights: &MoistureWeights,
        config: &MoistureConfig,
    ) -> FuelMoistureState {
        let tmax = sanitize_finite(forcing.tmax, "tmax");
        let tdew = sanitize_finite(forcing.tdew, "tdew");
        let precip = sanitize_finite(forcing.precip, "precip").max(0.0);
        let wet = (precip / config.rain_saturation_mm).min(1.0);

        let dead = FuelClasses::from_fn(|class| {
            dry_and_wet(
                Fraction::clamped(*self.dead[class], "prior_fuel_moisture"),
                config.drying_coefficients[class],
                tmax,
                tdew,
                wet,
            )
        });

        let live_grass = live_grass_moisture(forcing.upper_soil_water, config);
        let live_grass_drying = live_grass_drying(live_grass, forcing.nesterov);

        let woi = &weights.dead;
        let wlg = weights.live_grass.max(0.0);
        let one_hour = woi[DeadFuelClass::OneHour];
        let fine_total = one_hour + wlg;
        let fine_fuel = Fraction::clamped(
            weighted(
                *dead[DeadFuelClass::OneHour] * one_hour + *live_grass * wlg,
                fine_total,
                "fine_fuel_moisture",
            ),
            "fine_fuel_moisture",
        );

        let wo = woi.spreading_total();
        let wtot = wo + wlg;
        let dead_ratio = weighted(wo, wtot, "dead_fuel_ratio");
        let live_ratio = weighted(wlg, wtot, "live_fuel_ratio");

        let alpha_dead = weighted(
            DeadFuelClass::SPREADING
                .iter()
                .map(|&c| config.drying_coefficients[c] * woi[c])
                .sum(),
            wo,
            "dead_drying",
        );
        let alpha_combined = alpha_dead * dead_ratio + live_grass_drying * live_ratio;
        let aggregate = dry_and_wet(
            Fraction::clamped(*self.aggregate, "prior_aggregate_moisture"),
            alpha_combined,
            tmax,
            tdew,
            wet,
        );

        let me_dead = weighted(
            woi.iter()
                .map(|(c, w)| w * config.extinction_moisture[c])
                .sum(),
            woi.total(),
            "dead_extinction",
        );
        let extinction_aggregate =
            me_dead * dead_ratio + config.live_grass_extinction * live_ratio;
        let extinction_fine = weighted(
            config.extinction_moisture[DeadFuelClass::OneHour] * one_hour
                + config.live_grass_extinction * wlg,
            fine_total,
            "fine_extinction",
        );

        FuelMoistureState {
            dead,
            aggregate,
            live_grass,
            fine_fuel,
            live_grass_drying,
            extinction_aggregate,
            extinction_fine,
        }
    }

    /// Aggregate moisture relative to its moisture of extinction
    pub fn aggregate_relative(&self) -> f64 {
        weighted(*self.aggregate, self.extinction_aggregate, "relative_moisture")
    }

    /// Fine fuel moisture relative to its moisture of extinction, in [0, 1]
    pub fn fine_relative(&self) -> Fraction {
        Fraction::clamped(
            weighted(*self.fine_fuel, self.extinction_fine, "relative_fine_moisture"),
            "relative_fine_moisture",
        )
    }
}
