//! Daily fire disturbance of vegetation patches
//!
//! `Patch::advance_day` runs one day of the fire model for one patch:
//! - calendar resets of the annual and monthly accumulators
//! - fuel inventory and fuel moisture update
//! - fire danger and lightning ignition
//! - extinction by snow, rain or lack of fuel
//! - surface spread, burn ellipse and area burned
//! - combustion of dead fuel, fire-line intensity and residence time
//! - crown fire, tree mortality and grass damage
//!
//! Each day ends in exactly one [`FireDay`] outcome. The early outcomes leave
//! the litter, soil and vegetation pools untouched.
//!
//! Patches share no mutable state, so [`advance_patches`] advances any number
//! of them in parallel with rayon.

mod state;

pub use state::{FireAnnualState, FireFluxes, FireState, MonthlyFireStats};

use crate::config::FireConfig;
use crate::core_types::fuel::{CARBON_TO_DRY_MATTER, KG_TO_G};
use crate::core_types::pft::{Lifeform, PftId, PftTable};
use crate::core_types::rng::{IgnitionRng, PatchRng};
use crate::core_types::soil::{PatchPft, SoilState};
use crate::core_types::units::Fraction;
use crate::core_types::vegetation::Vegetation;
use crate::core_types::weather::{DailyClimate, SimDate};
use crate::error::{FireError, FireResult};
use crate::physics::area_burned::{estimate_burned_area, fire_duration, length_to_breadth};
use crate::physics::combustion::{
    burn_dead_fuel, burn_live_grass, consumed_fractions, fuel_consumed, residence_time,
    surface_intensity,
};
use crate::physics::crown_fire::{canopy_foliar_moisture, crown_fire_potential};
use crate::physics::fuel_load::grass_bulk_density;
use crate::physics::ignition::{fire_danger_index, try_ignite};
use crate::physics::mortality::{
    apply_kill, assess_cohort, burn_crown, kill_grass_roots, CrownFireContext,
};
use crate::physics::rothermel::{backward_ros, combined_ros, grass_ros, surface_ros};
use crate::physics::{
    CanopyProfile, CrownFireType, Emissions, FuelInventory, MoistureForcing, MoistureWeights,
    SpreadState,
};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, trace};

// ============================================================================
// DAY OUTCOMES
// ============================================================================

/// Why no fire burned today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExtinguishCause {
    /// Snow on the ground
    Snow,
    /// Rain summed over consecutive wet days reached the cover-dependent threshold
    CumulativePrecipitation,
    /// Any rain today
    Rain,
    /// Fire-line intensity too low to sustain a fire; active fires smoulder on
    LowIntensity,
    /// Burned fraction below the minimum
    NegligibleArea,
}

/// Spread and damage of a day with fire
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BurnSummary {
    /// Area burned today (ha)
    pub burned_area_ha: f64,
    /// Fraction of the patch burned today
    pub burned_fraction: Fraction,
    pub spread: SpreadState,
    /// Most severe crown fire type of all tree cohorts
    pub crown_fire: CrownFireType,
    /// Cohorts removed from the population
    pub cohorts_removed: usize,
}

/// Outcome of one simulated day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FireDay {
    Extinguished(ExtinguishCause),
    /// Total fuel below the minimum load
    NoFuel,
    Burning(BurnSummary),
}

impl FireDay {
    pub fn is_burning(&self) -> bool {
        matches!(self, FireDay::Burning(_))
    }
}

/// Everything a driver needs to know about one day of one patch
#[derive(Debug, Clone, PartialEq)]
pub struct DailyFireReport {
    pub patch: u32,
    pub date: SimDate,
    pub outcome: FireDay,
    pub fdi: Fraction,
    /// A lightning strike started a fire today
    pub ignited: bool,
    /// Fires carried over to tomorrow
    pub active_fires: u32,
    /// Fire carbon flux of today (kgC m-2)
    pub flux: FireFluxes,
    /// Annual state of the previous year, on the first day of a year
    pub completed_year: Option<FireAnnualState>,
}

// ============================================================================
// FLUX ACCOUNTING
// ============================================================================

/// Receiver of the annual fire carbon flux of each patch
pub trait FluxAccounting {
    fn record_fire_flux(&mut self, patch: u32, year: u32, flux: &FireFluxes);
}

/// In-memory flux ledger keyed by patch and year
#[derive(Debug, Clone, Default)]
pub struct FluxLedger {
    entries: FxHashMap<(u32, u32), FireFluxes>,
}

impl FluxLedger {
    pub fn get(&self, patch: u32, year: u32) -> Option<&FireFluxes> {
        self.entries.get(&(patch, year))
    }

    /// Total flux of all patches in `year`
    pub fn year_total(&self, year: u32) -> FireFluxes {
        let mut total = FireFluxes::default();
        for (_, flux) in self.entries.iter().filter(|((_, y), _)| *y == year) {
            total += *flux;
        }
        total
    }
}

impl FluxAccounting for FluxLedger {
    fn record_fire_flux(&mut self, patch: u32, year: u32, flux: &FireFluxes) {
        *self.entries.entry((patch, year)).or_default() += *flux;
    }
}

// ============================================================================
// PATCH
// ============================================================================

/// One independent vegetation patch and its fire state
#[derive(Debug, Clone)]
pub struct Patch<R = PatchRng> {
    pub id: u32,
    pub vegetation: Vegetation,
    /// Litter and water status per PFT
    pub pfts: FxHashMap<PftId, PatchPft>,
    pub soil: SoilState,
    pub fire: FireState,
    rng: R,
}

impl Patch<PatchRng> {
    /// Create a patch with its ignition stream derived from a run-wide seed
    pub fn new(
        id: u32,
        seed: u64,
        vegetation: Vegetation,
        pfts: FxHashMap<PftId, PatchPft>,
        soil: SoilState,
    ) -> Self {
        Patch::with_rng(id, vegetation, pfts, soil, PatchRng::for_patch(seed, id))
    }
}

impl<R: IgnitionRng> Patch<R> {
    /// Create a patch drawing ignitions from `rng`
    pub fn with_rng(
        id: u32,
        vegetation: Vegetation,
        pfts: FxHashMap<PftId, PatchPft>,
        soil: SoilState,
        rng: R,
    ) -> Self {
        Patch {
            id,
            vegetation,
            pfts,
            soil,
            fire: FireState::default(),
            rng,
        }
    }

    pub fn rng(&self) -> &R {
        &self.rng
    }

    /// Report the fire flux accumulated so far in `year`
    pub fn report_annual_flux(&self, year: u32, sink: &mut impl FluxAccounting) {
        sink.record_fire_flux(self.id, year, &self.fire.annual.flux);
    }

    /// Advance the fire model of this patch by one day
    ///
    /// # Arguments
    /// * `date` - Today
    /// * `climate` - Today's climate
    /// * `table` - PFT parameters
    /// * `config` - Model constants
    ///
    /// # Errors
    /// [`FireError::UnknownPft`] if a cohort or litter entry references a PFT
    /// missing from `table`, and [`FireError::BurnedFractionOutOfRange`] if the
    /// burned area leaves [0, 1]. The run must halt on the latter.
    pub fn advance_day(
        &mut self,
        date: SimDate,
        climate: &DailyClimate,
        table: &PftTable,
        config: &FireConfig,
    ) -> FireResult<DailyFireReport> {
        let completed_year = self.fire.begin_day(date);
        if let Some(year) = &completed_year {
            if date.year > 0 {
                info!(
                    "patch {} year {}: {:.4} ha burned on {} days, {} fires, {:.5} kgC m-2 combusted",
                    self.id,
                    date.year - 1,
                    year.burned_area_ha,
                    year.burn_days,
                    year.fires_started,
                    year.flux.combusted()
                );
            }
        }

        // 1. Fuel and moisture
        let inventory = FuelInventory::assess(
            &self.vegetation,
            &self.pfts,
            &self.soil.surface,
            table,
            &config.spread,
        )?;
        let forcing = MoistureForcing {
            tmax: climate.tmax,
            tdew: climate.dewpoint(),
            precip: climate.precip,
            upper_soil_water: self.soil.upper_water_on(date.day_of_year as usize),
            nesterov: climate.nesterov,
        };
        let weights = MoistureWeights {
            dead: inventory.dead,
            live_grass: inventory.live_grass,
        };
        let moisture = self.fire.moisture.update(&forcing, &weights, &config.moisture);
        self.fire.moisture = moisture;

        // 2. Fire danger and ignition
        let fdi = fire_danger_index(&moisture, inventory.grass_cover, config.spread.grass_dominance);
        let ignited = try_ignite(
            climate.lightning,
            fdi,
            self.fire.annual.burned_fraction,
            inventory.ignition_efficiency,
            &mut self.rng,
            &config.ignition,
        );
        let started = u32::from(ignited);

        let mut report = DailyFireReport {
            patch: self.id,
            date,
            outcome: FireDay::NoFuel,
            fdi,
            ignited,
            active_fires: 0,
            flux: FireFluxes::default(),
            completed_year,
        };

        // 3. Extinction by weather and fuel
        if self.soil.has_snow() {
            return Ok(self.extinguish(report, FireDay::Extinguished(ExtinguishCause::Snow)));
        }
        let annual = &mut self.fire.annual;
        if climate.precip > 0.0 {
            annual.precip_sum += climate.precip;
        } else {
            annual.precip_sum = 0.0;
        }
        let precip_threshold = if inventory.grass_cover > config.spread.grass_dominance {
            config.extinction.precip_threshold_grass
        } else {
            config.extinction.precip_threshold_open
        };
        if annual.precip_sum >= precip_threshold {
            return Ok(self.extinguish(
                report,
                FireDay::Extinguished(ExtinguishCause::CumulativePrecipitation),
            ));
        }
        if climate.precip > 0.0 {
            return Ok(self.extinguish(report, FireDay::Extinguished(ExtinguishCause::Rain)));
        }
        if inventory.total_fuel() < config.extinction.min_total_fuel {
            return Ok(self.extinguish(report, FireDay::NoFuel));
        }

        let monthly = &mut self.fire.monthly[date.month as usize];
        monthly.fdi += *fdi / f64::from(date.days_in_month());
        monthly.ignitions += started;

        // 4. Surface spread
        let rho_grass = grass_bulk_density(climate.gdd20, date.year);
        let bed = inventory.fuel_bed(rho_grass);
        let wind = climate.wind_m_per_min();
        let grass = grass_ros(*moisture.fine_relative(), wind, rho_grass);
        let woody = surface_ros(
            bed.load_kg * KG_TO_G,
            bed.bulk_density,
            moisture.aggregate_relative(),
            *moisture.aggregate,
            wind,
            &config.spread,
        );
        let forward_ros = combined_ros(
            woody.rate_of_spread,
            grass,
            inventory.tree_cover,
            inventory.grass_cover,
        );
        let mut spread = SpreadState {
            forward_ros,
            backward_ros: backward_ros(forward_ros, wind, config.spread.backward_decay),
            length_to_breadth: length_to_breadth(
                wind,
                inventory.tree_cover,
                inventory.grass_cover,
                inventory.total_cover,
                &config.area,
            ),
            duration: fire_duration(fdi),
            ..SpreadState::default()
        };
        trace!(
            "patch {} spread: woody {:.3} grass {:.3} forward {:.3} m/min, LB {:.2}",
            self.id,
            woody.rate_of_spread,
            grass,
            forward_ros,
            spread.length_to_breadth
        );

        // 5. Area burned
        let annual = &mut self.fire.annual;
        let area = estimate_burned_area(
            &spread,
            &config.area,
            annual.burned_area_ha,
            annual.active_fires,
            started,
            annual.burned_fraction,
        );
        spread.fire_area = area.fire_area;
        annual.active_fires = area.active_fires;
        report.active_fires = area.active_fires;

        if !area.fraction.is_finite() || !(0.0..=1.0).contains(&area.fraction) {
            error!(
                "patch {}: burned area fraction {} outside [0, 1] ({} ha of {} ha)",
                self.id,
                area.fraction,
                area.area_ha,
                config.area.patch_area_ha()
            );
            return Err(FireError::BurnedFractionOutOfRange {
                patch: self.id,
                fraction: area.fraction,
            });
        }
        if area.fraction < config.area.min_burned_fraction {
            return Ok(self.extinguish(
                report,
                FireDay::Extinguished(ExtinguishCause::NegligibleArea),
            ));
        }
        let burned = Fraction::clamped(area.fraction, "burned_fraction");

        // 6. Dead fuel consumption and intensity
        let fractions = consumed_fractions(&moisture.dead, moisture.live_grass, &config.moisture);
        let consumed = fuel_consumed(&fractions, &inventory.dead);
        let intensity = surface_intensity(&consumed, forward_ros, config.spread.heat_content);
        if intensity <= config.extinction.min_intensity {
            return Ok(self.extinguish(
                report,
                FireDay::Extinguished(ExtinguishCause::LowIntensity),
            ));
        }
        spread.intensity = intensity;
        spread.residence_time = residence_time(&fractions, &inventory.dead, &config.mortality);

        // 7. Canopy
        let canopy = if config.crown_fire.enabled {
            let is_tree = |pft: PftId| {
                table
                    .get(pft)
                    .is_ok_and(|p| p.lifeform == Lifeform::Tree)
            };
            let profile = CanopyProfile::from_trees(
                self.vegetation.iter().filter(|c| is_tree(c.pft)),
                &config.crown_fire,
            );
            let foliar_moisture = canopy_foliar_moisture(
                self.vegetation.iter().filter(|c| is_tree(c.pft)).map(|c| {
                    let stress = self.pfts.get(&c.pft).map_or(1.0, |s| s.water_stress);
                    (stress, c.fpc)
                }),
                inventory.tree_cover,
            );
            let potential = crown_fire_potential(&profile, foliar_moisture, &config.crown_fire);
            Some((profile, potential))
        } else {
            None
        };

        // 8. Remove burned dead fuel
        let mut flux = FireFluxes::default();
        let mut emissions = Emissions::default();
        let dead_burn = burn_dead_fuel(&mut self.pfts, &mut self.soil.surface, &fractions, burned);
        flux.fuel = dead_burn.carbon;
        for &(id, dry_matter) in &dead_burn.dry_matter {
            emissions += Emissions::from_dry_matter(dry_matter, &table.get(id)?.fuel.emission_factors);
        }

        // 9. Live vegetation damage
        let annual = &mut self.fire.annual;
        let mut crown_fire = CrownFireType::Surface;
        let mut removed = Vec::new();
        for cohort in self.vegetation.iter_mut() {
            let pft = table.get(cohort.pft)?;
            let factors = &pft.fuel.emission_factors;
            match pft.lifeform {
                Lifeform::Tree => {
                    let ctx = canopy.as_ref().map(|(profile, potential)| CrownFireContext {
                        profile,
                        potential: *potential,
                        forward_ros,
                    });
                    let kind = assess_cohort(
                        cohort,
                        pft,
                        intensity,
                        spread.residence_time,
                        ctx,
                        burned,
                        &config.mortality,
                    );
                    crown_fire = crown_fire.max(kind);

                    let combusted = burn_crown(cohort, burned, &config.mortality);
                    flux.live_vegetation += combusted;
                    emissions += Emissions::from_dry_matter(combusted * CARBON_TO_DRY_MATTER, factors);

                    let kill = apply_kill(
                        cohort,
                        pft,
                        &mut self.soil.surface,
                        burned,
                        config.area.patch_area_m2,
                        &config.mortality,
                    );
                    flux.killed_vegetation += kill.killed.total;
                    *annual.kills.entry(cohort.pft).or_default() += kill.killed;
                    if kill.removed {
                        debug!("patch {}: cohort {} of {} removed by fire", self.id, cohort.id, pft.name);
                        removed.push(cohort.id);
                    }
                }
                Lifeform::Grass => {
                    let combusted = burn_live_grass(cohort, &fractions, burned);
                    flux.live_vegetation += combusted;
                    emissions += Emissions::from_dry_matter(combusted * CARBON_TO_DRY_MATTER, factors);
                    flux.killed_vegetation +=
                        kill_grass_roots(cohort, &mut self.soil.surface, &fractions, burned);
                }
                Lifeform::Crop => {}
            }
        }
        if !removed.is_empty() {
            self.vegetation.retain(|c| !removed.contains(&c.id));
        }

        // 10. Accumulators
        annual.burn_days += 1;
        annual.burned_area_ha += area.area_ha;
        annual.fires_started += started;
        annual.fdi_sum += *fdi;
        annual.burned_fraction = Fraction::clamped(
            annual.burned_area_ha / config.area.patch_area_ha(),
            "annual_burned_fraction",
        );
        annual.flux += flux;
        annual.emissions += emissions;

        let monthly = &mut self.fire.monthly[date.month as usize];
        monthly.burned_area_ha += area.area_ha;
        monthly.raw_fire_area_ha += area.raw_fire_area;
        monthly.fires += area.active_fires;
        monthly.forward_ros_sum += spread.forward_ros;
        monthly.backward_ros_sum += spread.backward_ros;
        monthly.intensity_sum += spread.intensity;
        monthly.burn_days += 1;
        self.fire.spread = spread;

        debug!(
            "patch {} day {}: burned {:.4} ha ({:.3}), ROS {:.2} m/min, I {:.0} kW/m, {} fires",
            self.id,
            date.day_of_year,
            area.area_ha,
            *burned,
            spread.forward_ros,
            spread.intensity,
            area.active_fires
        );

        report.outcome = FireDay::Burning(BurnSummary {
            burned_area_ha: area.area_ha,
            burned_fraction: burned,
            spread,
            crown_fire,
            cohorts_removed: removed.len(),
        });
        report.flux = flux;
        Ok(report)
    }

    /// Close the day without fire
    ///
    /// Every cause except low intensity puts out the carried-over fires.
    fn extinguish(&mut self, mut report: DailyFireReport, outcome: FireDay) -> DailyFireReport {
        if outcome != FireDay::Extinguished(ExtinguishCause::LowIntensity) {
            self.fire.annual.active_fires = 0;
        }
        report.active_fires = self.fire.annual.active_fires;
        report.outcome = outcome;
        debug!(
            "patch {} day {}: {:?}, FDI {}",
            self.id, report.date.day_of_year, outcome, report.fdi
        );
        report
    }
}

/// Advance many patches by one day in parallel
///
/// # Arguments
/// * `patches` - Independent patches
/// * `date` - Today
/// * `climate` - Today's climate of a patch
/// * `table` - PFT parameters
/// * `config` - Model constants
///
/// # Returns
/// One result per patch, in patch order
pub fn advance_patches<R, C>(
    patches: &mut [Patch<R>],
    date: SimDate,
    climate: C,
    table: &PftTable,
    config: &FireConfig,
) -> Vec<FireResult<DailyFireReport>>
where
    R: IgnitionRng + Send,
    C: Fn(&Patch<R>) -> DailyClimate + Sync,
{
    patches
        .par_iter_mut()
        .map(|patch| {
            let today = climate(patch);
            patch.advance_day(date, &today, table, config)
        })
        .collect()
}
