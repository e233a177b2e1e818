//! Burn ellipse geometry and daily area burned
//!
//! Each active fire burns an ellipse whose length follows the distance the
//! front travels in a day and whose eccentricity follows the wind. Active
//! fires carry over between days and are extinguished in proportion to the
//! fraction of the patch already burned.
//!
//! # Formula
//! ```text
//! t_fire = 241 / (1 + 240 × exp(-11.06 × FDI))              (min)
//! DT     = t_fire × (ROS_f + ROS_b)                         (m)
//! a_fire = π / (4 × LB) × DT² × 1e-4                        (ha)
//! n_t    = n_{t-1} + n_new - round(bf × (n_{t-1} + n_new))
//! A_b    = min(n_t × min(a_fire, A_cont), A_patch - A_burned)
//! ```
//!
//! # References
//! - Thonicke, K. et al. (2010). Biogeosciences 7, 1991-2011, eqns. 11-14
//! - Canadian Forest Service (1992). "Development and structure of the Canadian
//!   Forest Fire Behavior Prediction System." Information Report ST-X-3

use crate::config::AreaConfig;
use crate::core_types::units::{sanitize_finite, Fraction};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Today's spread quantities of the patch fire
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpreadState {
    /// Forward rate of spread (m min-1)
    pub forward_ros: f64,
    /// Backward rate of spread (m min-1)
    pub backward_ros: f64,
    /// Surface fire-line intensity (kW m-1)
    pub intensity: f64,
    /// Fire residence time (min)
    pub residence_time: f64,
    /// Length-to-breadth ratio of the burn ellipse
    pub length_to_breadth: f64,
    /// Fire duration (min)
    pub duration: f64,
    /// Area burned by one fire, capped by the contiguous area (ha)
    pub fire_area: f64,
}

/// Outcome of the area-burned estimate
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BurnedArea {
    /// Area burned today (ha)
    pub area_ha: f64,
    /// Area burned today as a fraction of the patch, unchecked
    pub fraction: f64,
    /// Fires still active after today's extinctions
    pub active_fires: u32,
    /// Area of one fire before the contiguous area cap (ha)
    pub raw_fire_area: f64,
    /// Area of one fire after the cap (ha)
    pub fire_area: f64,
}

/// Length-to-breadth ratio of the burn ellipse
///
/// Wind below the threshold (1 km h-1 by default) gives a circle. Above it the
/// tree and grass ellipse shapes are blended by cover.
///
/// # Formula
/// ```text
/// LB_tree  = 1 + 8.729 × (1 - exp(-0.03 U))^2.155
/// LB_grass = 1.1 + U^0.0464                        (U in km h-1)
/// ```
///
/// Sparse cover can blend to a ratio below 1, which widens the ellipse.
///
/// # Returns
/// Ratio capped at `max_length_to_breadth`
pub fn length_to_breadth(
    wind_m_per_min: f64,
    tree_cover: f64,
    grass_cover: f64,
    total_cover: f64,
    config: &AreaConfig,
) -> f64 {
    if wind_m_per_min.is_nan() || wind_m_per_min < config.ellipse_wind_threshold {
        return 1.0;
    }
    let u_kmh = 0.06 * wind_m_per_min;
    let lb_tree = 1.0 + 8.729 * (1.0 - (-0.03 * u_kmh).exp()).powf(2.155);
    let lb_grass = 1.1 + u_kmh.powf(0.0464);
    let lb = if total_cover > 0.0 {
        lb_tree * tree_cover + lb_grass * grass_cover
    } else {
        lb_grass
    };
    sanitize_finite(lb, "length_to_breadth").min(config.max_length_to_breadth)
}

/// Daily fire duration from the fire danger index (min)
#[inline]
pub fn fire_duration(fdi: Fraction) -> f64 {
    241.0 / (1.0 + 240.0 * (-11.06 * *fdi).exp())
}

/// Area of one fire ellipse (ha)
pub fn fire_ellipse_area(forward_ros: f64, backward_ros: f64, length_to_breadth: f64, duration: f64) -> f64 {
    let distance = duration * (forward_ros + backward_ros);
    sanitize_finite(
        PI / (4.0 * length_to_breadth) * distance * distance * 1.0e-4,
        "fire_area",
    )
    .max(0.0)
}

/// Fires still burning after today's burned-area extinctions
///
/// # Arguments
/// * `carried` - Fires carried over from yesterday
/// * `started` - Fires started today
/// * `burned_fraction` - Fraction of the patch burned so far this year
pub fn continuing_fires(carried: u32, started: u32, burned_fraction: Fraction) -> u32 {
    let active = f64::from(carried) + f64::from(started);
    let extinguished = (*burned_fraction * active).round();
    (active - extinguished).max(0.0) as u32
}

/// Estimate today's area burned
///
/// # Arguments
/// * `spread` - Today's spread state with its capped fire area
/// * `config` - Patch area and cap constants
/// * `burned_ha` - Area burned so far this year (ha)
/// * `carried` - Fires carried over from yesterday
/// * `started` - Fires started today
/// * `burned_fraction` - Fraction of the patch burned so far this year
pub fn estimate_burned_area(
    spread: &SpreadState,
    config: &AreaConfig,
    burned_ha: f64,
    carried: u32,
    started: u32,
    burned_fraction: Fraction,
) -> BurnedArea {
    let patch_ha = config.patch_area_ha();
    let raw_fire_area = fire_ellipse_area(
        spread.forward_ros,
        spread.backward_ros,
        spread.length_to_breadth,
        spread.duration,
    );
    let fire_area = raw_fire_area.min(patch_ha.max(config.min_contiguous_area_ha));

    let active_fires = continuing_fires(carried, started, burned_fraction);
    let unburned = (patch_ha - burned_ha).max(0.0);
    let area_ha = (f64::from(active_fires) * fire_area).clamp(0.0, unburned);

    BurnedArea {
        area_ha,
        fraction: area_ha / patch_ha,
        active_fires,
        raw_fire_area,
        fire_area,
    }
}
