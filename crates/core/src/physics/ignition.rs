//! Fire danger and lightning ignition
//!
//! # References
//! - Thonicke, K. et al. (2010). Biogeosciences 7, 1991-2011, eqn. 8 (fire danger index)
//! - Pfeiffer, M. et al. (2013). Geosci. Model Dev. 6, 643-685, section 2.2.1 (ignitions)

use crate::config::IgnitionConfig;
use crate::core_types::rng::IgnitionRng;
use crate::core_types::units::{sanitize_finite, Fraction};
use crate::physics::fuel_moisture::FuelMoistureState;

/// Fire danger index in [0, 1]
///
/// Grass-dominated patches use the fine fuel moisture, all others the
/// aggregate fuel moisture. The index is squared to sharpen its response.
///
/// # Formula
/// ```text
/// FDI = max(0, 1 - ω / m_e)²
/// ```
pub fn fire_danger_index(
    moisture: &FuelMoistureState,
    grass_cover: f64,
    grass_dominance: f64,
) -> Fraction {
    let (omega, extinction) = if grass_cover >= grass_dominance {
        (*moisture.fine_fuel, moisture.extinction_fine)
    } else {
        (*moisture.aggregate, moisture.extinction_aggregate)
    };
    if extinction <= 0.0 {
        return Fraction::ZERO;
    }
    let fdi = (1.0 - omega / extinction).max(0.0);
    Fraction::clamped(fdi * fdi, "fire_danger_index")
}

/// Efficiency of a lightning strike in starting a fire
///
/// ```text
/// ieff = FDI × (1 - bf) / (1 + k × bf) × ieff_pft
/// ```
pub fn ignition_efficiency(
    fdi: Fraction,
    burned_fraction: Fraction,
    pft_efficiency: f64,
    suppression: f64,
) -> f64 {
    let bf = *burned_fraction;
    sanitize_finite(
        *fdi * (1.0 - bf) / (1.0 + suppression * bf) * pft_efficiency,
        "ignition_efficiency",
    )
}

/// Decide whether today's lightning starts a fire
///
/// Draws from `rng` exactly once when there is lightning and never
/// otherwise. A configured draw override replaces the value of the draw but
/// still advances the stream.
///
/// # Arguments
/// * `lightning` - Flash density (flashes km-2 day-1)
/// * `fdi` - Fire danger index
/// * `burned_fraction` - Fraction of the patch already burned this year
/// * `pft_efficiency` - FPC-weighted ignition efficiency of the vegetation
/// * `rng` - The patch's random stream
/// * `config` - Suppression factor and draw override
pub fn try_ignite<R: IgnitionRng + ?Sized>(
    lightning: f64,
    fdi: Fraction,
    burned_fraction: Fraction,
    pft_efficiency: f64,
    rng: &mut R,
    config: &IgnitionConfig,
) -> bool {
    // flashes km-2 to flashes ha-1
    let flashes_per_ha = sanitize_finite(lightning, "lightning") * 0.01;
    if flashes_per_ha <= 0.0 {
        return false;
    }
    let ieff = ignition_efficiency(fdi, burned_fraction, pft_efficiency, config.burned_suppression);
    let draw = rng.next_uniform();
    let draw = config.draw_override.unwrap_or(draw);
    ieff > draw
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        value: f64,
        calls: usize,
    }

    impl IgnitionRng for Fixed {
        fn next_uniform(&mut self) -> f64 {
            self.calls += 1;
            self.value
        }
    }

    fn moisture(aggregate: f64, fine: f64) -> FuelMoistureState {
        FuelMoistureState {
            aggregate: Fraction::new(aggregate),
            fine_fuel: Fraction::new(fine),
            extinction_aggregate: 0.2,
            extinction_fine: 0.2,
            ..FuelMoistureState::default()
        }
    }

    #[test]
    fn test_fdi_squared() {
        let fdi = fire_danger_index(&moisture(0.1, 0.0), 0.2, 0.6);
        assert!((*fdi - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_fdi_uses_fine_fuel_when_grass_dominated() {
        let fdi = fire_danger_index(&moisture(0.1, 0.0), 0.7, 0.6);
        assert_eq!(fdi, Fraction::ONE);
    }

    #[test]
    fn test_fdi_zero_above_extinction() {
        assert_eq!(fire_danger_index(&moisture(0.5, 0.5), 0.0, 0.6), Fraction::ZERO);
    }

    #[test]
    fn test_efficiency_suppressed_by_burned_area() {
        let fresh = ignition_efficiency(Fraction::ONE, Fraction::ZERO, 0.5, 25.0);
        let burned = ignition_efficiency(Fraction::ONE, Fraction::new(0.2), 0.5, 25.0);
        assert!((fresh - 0.5).abs() < 1e-12);
        assert!((burned - 0.8 / 6.0 * 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_no_lightning_no_draw() {
        let mut rng = Fixed { value: 0.0, calls: 0 };
        let lit = try_ignite(0.0, Fraction::ONE, Fraction::ZERO, 1.0, &mut rng, &IgnitionConfig::default());
        assert!(!lit);
        assert_eq!(rng.calls, 0);
    }

    #[test]
    fn test_ignites_when_efficiency_exceeds_draw() {
        let config = IgnitionConfig::default();
        let mut low = Fixed { value: 0.1, calls: 0 };
        assert!(try_ignite(5.0, Fraction::ONE, Fraction::ZERO, 0.5, &mut low, &config));
        let mut high = Fixed { value: 0.6, calls: 0 };
        assert!(!try_ignite(5.0, Fraction::ONE, Fraction::ZERO, 0.5, &mut high, &config));
        assert_eq!(low.calls + high.calls, 2);
    }

    #[test]
    fn test_override_replaces_draw_but_advances_stream() {
        let config = IgnitionConfig {
            draw_override: Some(0.9),
            ..IgnitionConfig::default()
        };
        let mut rng = Fixed { value: 0.0, calls: 0 };
        assert!(!try_ignite(5.0, Fraction::ONE, Fraction::ZERO, 0.5, &mut rng, &config));
        assert_eq!(rng.calls, 1);
    }
}
