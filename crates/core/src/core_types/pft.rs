//! Plant functional type parameters consumed by the fire model
//!
//! PFT parameters are constant for a run and loaded once from a TOML
//! reference file. Trees carry scorch-height, bark-thickness and crown-length
//! coefficients; grasses only use ignition efficiency, bulk density and
//! emission factors.
//!
//! # File format
//! ```toml
//! [[pft]]
//! id = 0
//! name = "PSME"
//! lifeform = "Tree"
//!
//! [pft.fuel]
//! ignition_efficiency = 0.10
//! bulk_density = 15.0
//! scorch_height_coefficient = 0.148
//! bark_thickness_slope = 0.048
//! bark_thickness_intercept = 0.41
//! crown_length_slope = 0.69
//! crown_length_intercept = 0.034
//!
//! [pft.allometry]
//! sla = 9.3
//! k_latosa = 6000.0
//! wood_density = 200.0
//! k_allom2 = 60.0
//! k_allom3 = 0.67
//! ```

use crate::error::{FireError, FireResult};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Identifier of a plant functional type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PftId(pub u16);

impl fmt::Display for PftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pft#{}", self.0)
    }
}

/// Growth form of a PFT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifeform {
    Tree,
    Grass,
    Crop,
}

impl Lifeform {
    /// Grasses and crops both count towards herbaceous cover
    pub fn is_herbaceous(self) -> bool {
        matches!(self, Lifeform::Grass | Lifeform::Crop)
    }
}

/// Trace-gas emission factors (g species per kg dry matter burned)
///
/// # References
/// Andreae, M.O., Merlet, P. (2001). "Emission of trace gases and aerosols from biomass
/// burning." Global Biogeochemical Cycles 15(4), 955-966.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmissionFactors {
    pub co2: f64,
    pub co: f64,
    pub ch4: f64,
    pub voc: f64,
    pub tpm: f64,
    pub nox: f64,
}

impl EmissionFactors {
    /// Extratropical forest and C3 vegetation
    pub const EXTRATROPICAL: EmissionFactors = EmissionFactors {
        co2: 1568.0,
        co: 106.0,
        ch4: 4.8,
        voc: 5.7,
        tpm: 17.6,
        nox: 3.24,
    };

    /// Savanna/C4 grassland
    pub const SAVANNA: EmissionFactors = EmissionFactors {
        co2: 1664.0,
        co: 63.0,
        ch4: 2.2,
        voc: 3.4,
        tpm: 8.5,
        nox: 2.54,
    };

    pub fn as_array(&self) -> [f64; 6] {
        [self.co2, self.co, self.ch4, self.voc, self.tpm, self.nox]
    }
}

impl Default for EmissionFactors {
    fn default() -> Self {
        Self::EXTRATROPICAL
    }
}

/// Fuel and fire-damage parameters of a PFT
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuelParams {
    /// Ignition efficiency (0-1)
    pub ignition_efficiency: f64,
    /// Fuel bulk density (kg m-3); overridden daily for grasses
    pub bulk_density: f64,
    /// Scorch height coefficient F in `SH = F × I^0.667` (Van Wagner 1973)
    #[serde(default)]
    pub scorch_height_coefficient: f64,
    /// Bark thickness slope (cm per cm DBH)
    #[serde(default)]
    pub bark_thickness_slope: f64,
    /// Bark thickness intercept (cm)
    #[serde(default)]
    pub bark_thickness_intercept: f64,
    /// Crown length slope (m per m height)
    #[serde(default)]
    pub crown_length_slope: f64,
    /// Crown length intercept (m)
    #[serde(default)]
    pub crown_length_intercept: f64,
    #[serde(default)]
    pub emission_factors: EmissionFactors,
}

/// Allometric constants linking carbon pools to stem geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Allometry {
    /// Specific leaf area (m2 leaf per kgC)
    pub sla: f64,
    /// Leaf area to sapwood cross-sectional area ratio
    pub k_latosa: f64,
    /// Sapwood and heartwood density (kgC m-3)
    pub wood_density: f64,
    /// Height-diameter coefficient
    pub k_allom2: f64,
    /// Height-diameter exponent
    pub k_allom3: f64,
}

impl Default for Allometry {
    fn default() -> Self {
        Allometry {
            sla: 9.3,
            k_latosa: 6000.0,
            wood_density: 200.0,
            k_allom2: 60.0,
            k_allom3: 0.67,
        }
    }
}

/// A plant functional type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pft {
    pub id: PftId,
    pub name: String,
    pub lifeform: Lifeform,
    pub fuel: FuelParams,
    #[serde(default)]
    pub allometry: Allometry,
}

impl Pft {
    /// Generic temperate conifer
    pub fn conifer(id: u16, name: &str) -> Self {
        Pft {
            id: PftId(id),
            name: name.to_string(),
            lifeform: Lifeform::Tree,
            fuel: FuelParams {
                ignition_efficiency: 0.10,
                bulk_density: 15.0,
                scorch_height_coefficient: 0.148,
                bark_thickness_slope: 0.048,
                bark_thickness_intercept: 0.41,
                crown_length_slope: 0.69,
                crown_length_intercept: 0.034,
                emission_factors: EmissionFactors::EXTRATROPICAL,
            },
            allometry: Allometry::default(),
        }
    }

    /// Generic C3 grass
    pub fn c3_grass(id: u16, name: &str) -> Self {
        Pft {
            id: PftId(id),
            name: name.to_string(),
            lifeform: Lifeform::Grass,
            fuel: FuelParams {
                ignition_efficiency: 0.5,
                bulk_density: 2.0,
                scorch_height_coefficient: 0.0,
                bark_thickness_slope: 0.0,
                bark_thickness_intercept: 0.0,
                crown_length_slope: 0.0,
                crown_length_intercept: 0.0,
                emission_factors: EmissionFactors::EXTRATROPICAL,
            },
            allometry: Allometry::default(),
        }
    }

    /// Generic C4 grass
    pub fn c4_grass(id: u16, name: &str) -> Self {
        let mut pft = Self::c3_grass(id, name);
        pft.fuel.emission_factors = EmissionFactors::SAVANNA;
        pft
    }

    /// Crown length from height, bounded by the height itself
    pub fn crown_length(&self, height: f64) -> f64 {
        let length = self.fuel.crown_length_slope * height + self.fuel.crown_length_intercept;
        length.clamp(0.0, height.max(0.0))
    }

    fn validate(&self) -> FireResult<()> {
        let label = |field: &str| format!("{}.{}", self.name, field);
        if !(0.0..=1.0).contains(&self.fuel.ignition_efficiency) {
            return Err(FireError::invalid(
                label("ignition_efficiency"),
                format!("must be in [0, 1], got {}", self.fuel.ignition_efficiency),
            ));
        }
        if !(self.fuel.bulk_density.is_finite() && self.fuel.bulk_density >= 0.0) {
            return Err(FireError::invalid(
                label("bulk_density"),
                format!("must be finite and non-negative, got {}", self.fuel.bulk_density),
            ));
        }
        if self.lifeform == Lifeform::Tree {
            let a = &self.allometry;
            for (field, value) in [
                ("allometry.sla", a.sla),
                ("allometry.k_latosa", a.k_latosa),
                ("allometry.wood_density", a.wood_density),
                ("allometry.k_allom2", a.k_allom2),
                ("allometry.k_allom3", a.k_allom3),
            ] {
                if !(value.is_finite() && value > 0.0) {
                    return Err(FireError::invalid(
                        label(field),
                        format!("must be finite and positive, got {value}"),
                    ));
                }
            }
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct PftFile {
    pft: Vec<Pft>,
}

/// All PFTs of a run, indexed by id
#[derive(Debug, Clone, Default)]
pub struct PftTable {
    pfts: Vec<Pft>,
    index: FxHashMap<PftId, usize>,
}

impl PftTable {
    /// Build a table, validating every entry and rejecting duplicate ids
    pub fn new(pfts: Vec<Pft>) -> FireResult<Self> {
        let mut index = FxHashMap::default();
        for (i, pft) in pfts.iter().enumerate() {
            pft.validate()?;
            if index.insert(pft.id, i).is_some() {
                return Err(FireError::invalid(
                    format!("{}.id", pft.name),
                    format!("duplicate PFT id {}", pft.id),
                ));
            }
        }
        Ok(PftTable { pfts, index })
    }

    pub fn from_toml_str(source: &str) -> FireResult<Self> {
        let file: PftFile = toml::from_str(source).map_err(|e| FireError::ParameterParse {
            path: "<inline>".into(),
            source: e,
        })?;
        Self::new(file.pft)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> FireResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| FireError::ParameterFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        let file: PftFile = toml::from_str(&source).map_err(|e| FireError::ParameterParse {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::new(file.pft)
    }

    pub fn get(&self, id: PftId) -> FireResult<&Pft> {
        self.index
            .get(&id)
            .map(|&i| &self.pfts[i])
            .ok_or(FireError::UnknownPft(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pft> {
        self.pfts.iter()
    }

    pub fn len(&self) -> usize {
        self.pfts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pfts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[[pft]]
id = 0
name = "PSME"
lifeform = "Tree"

[pft.fuel]
ignition_efficiency = 0.10
bulk_density = 15.0
scorch_height_coefficient = 0.148
bark_thickness_slope = 0.048
bark_thickness_intercept = 0.41
crown_length_slope = 0.69
crown_length_intercept = 0.034

[[pft]]
id = 1
name = "C3"
lifeform = "Grass"

[pft.fuel]
ignition_efficiency = 0.5
bulk_density = 2.0
"#;

    #[test]
    fn test_parse_pft_file() {
        let table = PftTable::from_toml_str(SAMPLE).unwrap();
        assert_eq!(table.len(), 2);
        let tree = table.get(PftId(0)).unwrap();
        assert_eq!(tree.lifeform, Lifeform::Tree);
        assert_eq!(tree.fuel.scorch_height_coefficient, 0.148);
        assert_eq!(tree.allometry, Allometry::default());
        let grass = table.get(PftId(1)).unwrap();
        assert_eq!(grass.fuel.emission_factors, EmissionFactors::EXTRATROPICAL);
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = PftTable::from_toml_file("/nonexistent/pfts.toml").unwrap_err();
        assert!(matches!(err, FireError::ParameterFile { .. }));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = PftTable::new(vec![Pft::conifer(3, "A"), Pft::c3_grass(3, "B")]).unwrap_err();
        assert!(matches!(err, FireError::InvalidParameter { .. }));
    }

    #[test]
    fn test_unknown_pft() {
        let table = PftTable::new(vec![Pft::conifer(0, "A")]).unwrap();
        assert!(matches!(table.get(PftId(9)), Err(FireError::UnknownPft(PftId(9)))));
    }

    #[test]
    fn test_crown_length_bounded_by_height() {
        let pft = Pft::conifer(0, "A");
        assert!((pft.crown_length(10.0) - (0.69 * 10.0 + 0.034)).abs() < 1e-12);
        assert_eq!(pft.crown_length(0.0), 0.0);
    }
}
