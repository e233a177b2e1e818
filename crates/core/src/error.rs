//! Error taxonomy for the fire subsystem
//!
//! Only two kinds of failure ever reach the caller:
//! - reference data that cannot be opened, parsed or validated, reported
//!   before any simulation day runs
//! - a burned-area fraction outside [0, 1], which means an upstream
//!   invariant was broken and the run must halt
//!
//! Numerical degeneracy and recoverable physically-invalid values are handled
//! locally by the clamping helpers in [`crate::core_types::units`] and never
//! surface as errors. "No fire today" is a normal day outcome, not an error.

use crate::core_types::pft::PftId;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the fire subsystem.
#[derive(Error, Debug)]
pub enum FireError {
    #[error("burned area fraction {fraction} outside [0, 1] in patch {patch}")]
    BurnedFractionOutOfRange { patch: u32, fraction: f64 },

    #[error("could not open parameter file {path}: {source}")]
    ParameterFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse parameter file {path}: {source}")]
    ParameterParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("unknown plant functional type {0}")]
    UnknownPft(PftId),
}

impl FireError {
    pub(crate) fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        FireError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience type for `Result<T, FireError>`.
pub type FireResult<T> = Result<T, FireError>;
