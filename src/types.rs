//! Newtype wrappers for validated numeric parameters.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A value in the closed interval `[0, 1]`.
///
/// Used for learning rates, discount factors, exploration rates and
/// probabilities.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct UnitInterval(f64);

impl UnitInterval {
    pub const ZERO: UnitInterval = UnitInterval(0.0);
    pub const ONE: UnitInterval = UnitInterval(1.0);

    /// Validate `value` for the parameter called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidParameter`] if the value is NaN or
    /// outside `[0, 1]`.
    pub fn new(name: &str, value: f64) -> Result<Self, crate::Error> {
        if (0.0..=1.0).contains(&value) {
            Ok(UnitInterval(value))
        } else {
            Err(crate::Error::InvalidParameter {
                name: name.to_string(),
                value,
                min: 0.0,
                max: 1.0,
            })
        }
    }

    /// For constants known to lie in `[0, 1]`.
    pub(crate) const fn new_unchecked(value: f64) -> Self {
        UnitInterval(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for UnitInterval {
    type Error = crate::Error;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        UnitInterval::new("value", value)
    }
}

impl From<UnitInterval> for f64 {
    fn from(value: UnitInterval) -> Self {
        value.0
    }
}

impl fmt::Display for UnitInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A finite, non-negative value.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct NonNegative(f64);

impl NonNegative {
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidParameter`] if the value is negative,
    /// NaN or infinite.
    pub fn new(name: &str, value: f64) -> Result<Self, crate::Error> {
        if value >= 0.0 && value.is_finite() {
            Ok(NonNegative(value))
        } else {
            Err(crate::Error::InvalidParameter {
                name: name.to_string(),
                value,
                min: 0.0,
                max: f64::INFINITY,
            })
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for NonNegative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
