//! Bounded quantity types and the clamping utility used at every component boundary
//!
//! A patch advances one day at a time through a long chain of empirical formulas.
//! Allometric ratios, moisture recursions and probability products can all
//! degenerate (division by a vanishing leaf mass, `ln(0)`, `0/0` mass weights),
//! and a single NaN written back into a cohort would poison the vegetation
//! population for the rest of the run.
//!
//! Instead of re-checking after each formula, values cross component
//! boundaries through the helpers in this module:
//! - [`Fraction::clamped`] for moistures, probabilities and burned fractions
//! - [`sanitize_finite`] for any derived quantity that must stay finite
//! - [`sanitize_mass`] for pool masses, which must also stay non-negative
//!
//! Non-finite inputs are replaced by `0.0` and reported through `tracing`.
//!
//! # Usage
//! ```
//! use lmfire_core::core_types::units::Fraction;
//!
//! let moisture = Fraction::clamped(1.3, "moisture_1h");
//! assert_eq!(*moisture, 1.0);
//!
//! let bad = Fraction::clamped(f64::NAN, "moisture_1h");
//! assert_eq!(bad, Fraction::ZERO);
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Deref, Mul};
use tracing::warn;

/// Replace a non-finite value with `0.0`, logging the quantity name.
#[inline]
pub fn sanitize_finite(value: f64, quantity: &str) -> f64 {
    if value.is_finite() {
        value
    } else {
        warn!(quantity, value, "non-finite value replaced by 0");
        0.0
    }
}

/// Replace a non-finite or negative mass with `0.0`.
///
/// Negative masses are expected rounding residue after proportional removal
/// and are clamped silently; only non-finite masses are logged.
#[inline]
pub fn sanitize_mass(value: f64, quantity: &str) -> f64 {
    sanitize_finite(value, quantity).max(0.0)
}

// ============================================================================
// FRACTION
// ============================================================================

/// A fraction in the range [0, 1]
///
/// Represents moisture content, mortality probabilities, consumed fractions
/// and burned-area fractions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Fraction(f64);

impl Eq for Fraction {}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Deref for Fraction {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Fraction {
    /// Zero fraction
    pub const ZERO: Fraction = Fraction(0.0);

    /// Full/complete (1.0)
    pub const ONE: Fraction = Fraction(1.0);

    /// Create a new fraction
    ///
    /// # Panics
    /// If `value` is outside [0, 1] or NaN. Use [`Fraction::clamped`] for
    /// values computed at run time.
    #[inline]
    #[must_use]
    #[track_caller]
    pub fn new(value: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&value),
            "Fraction::new: value not in [0, 1]"
        );
        Fraction(value)
    }

    /// Clamp an arbitrary value into [0, 1].
    ///
    /// Finite values outside the range are clamped silently; NaN and
    /// infinities become zero and are logged under `quantity`.
    #[inline]
    #[must_use]
    pub fn clamped(value: f64, quantity: &str) -> Self {
        Fraction(sanitize_finite(value, quantity).clamp(0.0, 1.0))
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// `1 - self`
    #[inline]
    #[must_use]
    pub fn complement(self) -> Fraction {
        Fraction(1.0 - self.0)
    }

    /// Probability that at least one of two independent events occurs
    ///
    /// `P(A ∪ B) = P(A) + P(B) - P(A)·P(B)`
    #[inline]
    #[must_use]
    pub fn union(self, other: Fraction) -> Fraction {
        Fraction((self.0 + other.0 - self.0 * other.0).clamp(0.0, 1.0))
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}

impl From<Fraction> for f64 {
    fn from(f: Fraction) -> f64 {
        f.0
    }
}

impl Mul<Fraction> for Fraction {
    type Output = Fraction;
    fn mul(self, rhs: Fraction) -> Fraction {
        Fraction(self.0 * rhs.0)
    }
}

impl Mul<f64> for Fraction {
    type Output = f64;
    fn mul(self, rhs: f64) -> f64 {
        self.0 * rhs
    }
}

impl Mul<Fraction> for f64 {
    type Output = f64;
    fn mul(self, rhs: Fraction) -> f64 {
        self * rhs.0
    }
}
