//! Rothermel Surface Fire Spread Model (1972) with the LPJ-LMfire grass spread formula
//!
//! Woody fuel spread follows the Rothermel energy balance with the fuel-bed
//! coefficients of Wilson (1980) in cm units. Herbaceous fuel uses the
//! empirical grass-fire relation of Mell et al. (2008). The patch rate of
//! spread is the cover-weighted mean of both.
//!
//! # References
//! - Rothermel, R.C. (1972). "A mathematical model for predicting fire spread in wildland fuels."
//!   USDA Forest Service Research Paper INT-115.
//! - Wilson, R.A. (1980). "Reformulation of forest fire spread equations in SI units."
//!   USDA Forest Service Research Note INT-292.
//! - Mell, W. et al. (2008). "A physics-based approach to modelling grassland fires."
//!   International Journal of Wildland Fire 16, 1-22.
//! - Pfeiffer, M. et al. (2013). Geosci. Model Dev. 6, 643-685, appendix A.

use crate::config::SpreadConfig;
use crate::core_types::units::sanitize_finite;
use tracing::trace;

/// Intermediate and final quantities of a woody-fuel spread calculation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceSpread {
    /// Forward rate of spread (m/min)
    pub rate_of_spread: f64,
    /// Reaction intensity I_R (kJ m-2 min-1)
    pub reaction_intensity: f64,
    /// Propagating flux ratio ξ
    pub propagating_flux: f64,
    /// Wind coefficient Φ_w
    pub wind_coefficient: f64,
    /// High-wind multiplier
    pub wind_factor: f64,
}

/// Calculate Rothermel fire spread rate in woody fuel (m/min)
///
/// # Formula
/// ```text
/// R = I_R × ξ × (1 + Φ_w) × f_wind / (ρ_b × ε × Q_ig)
/// ```
///
/// Where:
/// - **I_R** = Reaction intensity (kJ m-2 min-1)
/// - **ξ** = Propagating flux ratio
/// - **Φ_w** = Wind coefficient
/// - **f_wind** = High-wind multiplier, 2 above the wind threshold
/// - **ρ_b** = Fuel bed bulk density (kg m-3)
/// - **ε** = Effective heating number `exp(-4.528 / σ)`
/// - **Q_ig** = Heat of pre-ignition `581 + 2594 × ω_o` (kJ kg-1)
///
/// # Arguments
/// * `fuel_load` - Spreading fuel load (g DM m-2)
/// * `bulk_density` - Fuel bed bulk density (kg m-3)
/// * `relative_moisture` - Fuel moisture relative to moisture of extinction
/// * `moisture` - Absolute moisture of the fuel complex (fraction)
/// * `wind_speed` - Wind speed (m/min)
/// * `config` - Fuel bed constants
///
/// # Returns
/// Zero spread when the fuel is at or above its moisture of extinction or
/// the bed has no bulk density
pub fn surface_ros(
    fuel_load: f64,
    bulk_density: f64,
    relative_moisture: f64,
    moisture: f64,
    wind_speed: f64,
    config: &SpreadConfig,
) -> SurfaceSpread {
    if relative_moisture.is_nan()
        || relative_moisture >= 1.0
        || bulk_density == 0.0
        || fuel_load <= 0.0
    {
        return SurfaceSpread::default();
    }
    let relative_moisture = relative_moisture.max(0.0);
    let sigma = config.surface_to_volume;
    let beta = bulk_density / config.particle_density;
    let beta_op = optimum_packing_ratio(sigma);

    let reaction_intensity = calculate_reaction_intensity(
        fuel_load,
        beta / beta_op,
        relative_moisture,
        sigma,
        config,
    );
    let propagating_flux = calculate_propagating_flux(sigma, beta);
    let wind_coefficient = calculate_wind_coefficient(sigma, wind_speed, beta / beta_op);
    let wind_factor = high_wind_factor(wind_speed / 60.0, config.high_wind_threshold);

    let effective_heating = (-4.528 / sigma).exp();
    let heat_preignition = 581.0 + 2594.0 * moisture;

    let rate_of_spread = sanitize_finite(
        reaction_intensity * propagating_flux * (1.0 + wind_coefficient) * wind_factor
            / (bulk_density * effective_heating * heat_preignition),
        "woody_rate_of_spread",
    )
    .max(0.0);

    trace!(
        "woody spread: IR={:.1} xi={:.4} phi_w={:.3} ROS={:.3} m/min",
        reaction_intensity,
        propagating_flux,
        wind_coefficient,
        rate_of_spread
    );

    SurfaceSpread {
        rate_of_spread,
        reaction_intensity,
        propagating_flux,
        wind_coefficient,
        wind_factor,
    }
}

/// Optimum packing ratio `β_op = 0.200395 × σ^-0.8189`
#[inline]
pub fn optimum_packing_ratio(sigma: f64) -> f64 {
    0.200395 * sigma.powf(-0.8189)
}

/// Calculate reaction intensity (kJ m-2 min-1)
///
/// # Formula
/// ```text
/// Γ'_max = 1 / (0.0591 + 2.926 × σ^-1.5)
/// A      = 8.9033 × σ^-0.7913
/// Γ'     = Γ'_max × (β/β_op)^A × exp(A × (1 - β/β_op))
/// I_R    = Γ' × w_n × h × η_M × η_s
/// ```
fn calculate_reaction_intensity(
    fuel_load: f64,
    packing_ratio: f64,
    relative_moisture: f64,
    sigma: f64,
    config: &SpreadConfig,
) -> f64 {
    let gamma_max = 1.0 / (0.0591 + 2.926 * sigma.powf(-1.5));
    let a = 8.9033 * sigma.powf(-0.7913);
    let gamma = gamma_max * packing_ratio.powf(a) * (a * (1.0 - packing_ratio)).exp();
    let moisture_damping = calculate_moisture_damping(relative_moisture);
    gamma * fuel_load * config.heat_content * moisture_damping * config.mineral_damping
}

/// Calculate moisture damping coefficient (η_M)
///
/// # Formula
/// ```text
/// η_M = 1 - 2.59 r + 5.11 r² - 3.52 r³
/// ```
fn calculate_moisture_damping(relative_moisture: f64) -> f64 {
    let r = relative_moisture.min(1.0);
    (1.0 - 2.59 * r + 5.11 * r.powi(2) - 3.52 * r.powi(3)).clamp(0.0, 1.0)
}

/// Calculate propagating flux ratio (ξ)
///
/// # Formula
/// ```text
/// ξ = exp(0.792 + 3.7597 × σ^0.5 × (β + 0.1)) / (192 + 7.9095 × σ)
/// ```
fn calculate_propagating_flux(sigma: f64, beta: f64) -> f64 {
    (0.792 + 3.7597 * sigma.sqrt() * (beta + 0.1)).exp() / (192.0 + 7.9095 * sigma)
}

/// Calculate wind coefficient (Φ_w)
///
/// # Formula
/// ```text
/// C   = 7.47 × exp(-0.8711 × σ^0.55)
/// B   = 0.15988 × σ^0.54
/// E   = 0.715 × exp(-0.01094 × σ)
/// Φ_w = C × (3.281 U)^B × (β/β_op)^-E
/// ```
/// where U is in m/min and the 3.281 factor converts it to ft/min.
fn calculate_wind_coefficient(sigma: f64, wind_speed: f64, packing_ratio: f64) -> f64 {
    if wind_speed <= 0.0 {
        return 0.0;
    }
    let c = 7.47 * (-0.8711 * sigma.powf(0.55)).exp();
    let b = 0.15988 * sigma.powf(0.54);
    let e = 0.715 * (-0.01094 * sigma).exp();
    c * (3.281 * wind_speed).powf(b) * packing_ratio.powf(-e)
}

/// Multiplier for strong winds, rising smoothly to 2 at the threshold
///
/// ```text
/// f = 1 + exp(2 U - 20)   for U ≤ U_max (m/s)
/// f = 2                   otherwise
/// ```
pub fn high_wind_factor(wind_speed_ms: f64, threshold: f64) -> f64 {
    if wind_speed_ms <= threshold {
        1.0 + (2.0 * wind_speed_ms - 2.0 * threshold).exp()
    } else {
        2.0
    }
}

/// Forward rate of spread in herbaceous fuel (m/min)
///
/// # Formula
/// ```text
/// g   = 1.0848 - 0.0848 × min(ρ_lg, 12)
/// ROS = (0.165 + 0.534 × U / 60) × exp(-10.8 × r) × g × 60
/// ```
///
/// Dense (tundra) grass spreads more slowly through the bulk density scaling.
pub fn grass_ros(relative_moisture: f64, wind_speed: f64, grass_bulk_density: f64) -> f64 {
    if relative_moisture.is_nan() || relative_moisture >= 1.0 {
        return 0.0;
    }
    let scale = 1.0848 - 0.0848 * grass_bulk_density.min(12.0);
    let ros = (0.165 + 0.534 * wind_speed.max(0.0) / 60.0)
        * (-10.8 * relative_moisture.max(0.0)).exp()
        * scale
        * 60.0;
    sanitize_finite(ros, "grass_rate_of_spread").max(0.0)
}

/// Cover-weighted forward rate of spread of the patch (m/min)
pub fn combined_ros(woody: f64, grass: f64, tree_cover: f64, grass_cover: f64) -> f64 {
    let cover = tree_cover + grass_cover;
    if cover <= 0.0 {
        return 0.0;
    }
    sanitize_finite((woody * tree_cover + grass * grass_cover) / cover, "rate_of_spread").max(0.0)
}

/// Backward rate of spread, decaying with wind (m/min)
#[inline]
pub fn backward_ros(forward: f64, wind_speed: f64, decay: f64) -> f64 {
    forward * (-decay * wind_speed).exp()
}
