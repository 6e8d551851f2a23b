//! Parameter definitions for the search space.
//!
//! A [`ParameterSpec`] names one hyperparameter and declares its domain:
//! a closed numeric interval for continuous and integer parameters, or a
//! finite ordered list of allowed values for categorical parameters.
//! Specs are immutable once built.
//!
//! # Example
//!
//! ```
//! use bayesopt::parameter::ParameterSpec;
//!
//! let lr = ParameterSpec::continuous("learning_rate", 1e-4, 1e-1);
//! let depth = ParameterSpec::integer("max_depth", 2, 12);
//! let booster = ParameterSpec::categorical("booster", ["gbtree", "dart"]);
//!
//! assert!(booster.is_categorical());
//! assert_eq!(depth.bounds(), Some((2.0, 12.0)));
//! assert_eq!(lr.name(), "learning_rate");
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::param::{CategoryValue, ParamValue};
use crate::rng_util;

/// The declared domain of a parameter.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ParamKind {
    /// A real-valued parameter in `[lower, upper]`.
    Continuous {
        /// Lower bound (inclusive).
        lower: f64,
        /// Upper bound (inclusive).
        upper: f64,
    },
    /// An integer parameter in `[lower, upper]`.
    Integer {
        /// Lower bound (inclusive).
        lower: i64,
        /// Upper bound (inclusive).
        upper: i64,
    },
    /// A parameter taking one of a finite, ordered set of values.
    Categorical {
        /// The allowed values, in declaration order.
        values: Vec<CategoryValue>,
    },
}

/// A named hyperparameter with its domain.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParameterSpec {
    name: String,
    kind: ParamKind,
}

impl ParameterSpec {
    /// Creates a continuous parameter with the given bounds.
    #[must_use]
    pub fn continuous(name: impl Into<String>, lower: f64, upper: f64) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Continuous { lower, upper },
        }
    }

    /// Creates an integer parameter with the given bounds.
    #[must_use]
    pub fn integer(name: impl Into<String>, lower: i64, upper: i64) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Integer { lower, upper },
        }
    }

    /// Creates a categorical parameter over the given values.
    #[must_use]
    pub fn categorical<I, T>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<CategoryValue>,
    {
        Self {
            name: name.into(),
            kind: ParamKind::Categorical {
                values: values.into_iter().map(Into::into).collect(),
            },
        }
    }

    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared domain.
    #[must_use]
    pub fn kind(&self) -> &ParamKind {
        &self.kind
    }

    /// Returns `true` for categorical parameters.
    #[must_use]
    pub fn is_categorical(&self) -> bool {
        matches!(self.kind, ParamKind::Categorical { .. })
    }

    /// Returns `(lower, upper)` for numeric parameters, `None` for categorical ones.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match &self.kind {
            ParamKind::Continuous { lower, upper } => Some((*lower, *upper)),
            ParamKind::Integer { lower, upper } => Some((*lower as f64, *upper as f64)),
            ParamKind::Categorical { .. } => None,
        }
    }

    /// Returns the allowed values of a categorical parameter.
    #[must_use]
    pub fn choices(&self) -> Option<&[CategoryValue]> {
        match &self.kind {
            ParamKind::Categorical { values } => Some(values),
            _ => None,
        }
    }

    /// Validates the parameter configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBounds`] when `lower > upper` (or a bound is
    /// not finite), and [`Error::EmptyChoices`] for a categorical parameter
    /// without values.
    #[allow(clippy::cast_precision_loss)]
    pub fn validate(&self) -> Result<()> {
        match &self.kind {
            ParamKind::Continuous { lower, upper } => {
                if !lower.is_finite() || !upper.is_finite() || lower > upper {
                    return Err(self.invalid_bounds(*lower, *upper));
                }
            }
            ParamKind::Integer { lower, upper } => {
                if lower > upper {
                    return Err(self.invalid_bounds(*lower as f64, *upper as f64));
                }
            }
            ParamKind::Categorical { values } => {
                if values.is_empty() {
                    return Err(Error::EmptyChoices(self.name.clone()));
                }
            }
        }
        Ok(())
    }

    fn invalid_bounds(&self, lower: f64, upper: f64) -> Error {
        Error::InvalidBounds {
            name: self.name.clone(),
            lower,
            upper,
        }
    }

    fn mismatch(&self, reason: impl Into<String>) -> Error {
        Error::TypeMismatch {
            name: self.name.clone(),
            reason: reason.into(),
        }
    }

    /// Maps a value onto its numeric coordinate.
    ///
    /// Numeric values map to themselves; categories map to their index in
    /// the declared value list.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn encode(&self, value: &ParamValue) -> Result<f64> {
        match (&self.kind, value) {
            (ParamKind::Continuous { lower, upper }, ParamValue::Float(_) | ParamValue::Int(_)) => {
                let v = value.as_f64().ok_or(Error::Internal("numeric value expected"))?;
                if v < *lower || v > *upper {
                    return Err(self.mismatch(format!("{v} outside [{lower}, {upper}]")));
                }
                Ok(v)
            }
            (ParamKind::Integer { lower, upper }, ParamValue::Int(v)) => {
                if v < lower || v > upper {
                    return Err(self.mismatch(format!("{v} outside [{lower}, {upper}]")));
                }
                Ok(*v as f64)
            }
            (ParamKind::Categorical { values }, ParamValue::Categorical(c)) => values
                .iter()
                .position(|candidate| candidate == c)
                .map(|index| index as f64)
                .ok_or_else(|| self.mismatch(format!("'{c}' is not an allowed value"))),
            (ParamKind::Continuous { .. }, _) => Err(self.mismatch("expected a float")),
            (ParamKind::Integer { .. }, _) => Err(self.mismatch("expected an integer")),
            (ParamKind::Categorical { .. }, _) => Err(self.mismatch("expected a category")),
        }
    }

    /// Maps a numeric coordinate back onto a typed value.
    ///
    /// Integer coordinates are rounded to the nearest integer, categorical
    /// coordinates are rounded to the nearest valid index and replaced by
    /// the declared value, continuous coordinates are left as they are.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub(crate) fn decode(&self, x: f64) -> ParamValue {
        match &self.kind {
            ParamKind::Continuous { .. } => ParamValue::Float(x),
            ParamKind::Integer { .. } => ParamValue::Int(x.round() as i64),
            ParamKind::Categorical { values } => {
                let last = values.len().saturating_sub(1);
                let index = (x.round().max(0.0) as usize).min(last);
                ParamValue::Categorical(values[index].clone())
            }
        }
    }

    /// Draws a uniformly random numeric coordinate from the domain.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn sample(&self, rng: &mut fastrand::Rng) -> f64 {
        match &self.kind {
            ParamKind::Continuous { lower, upper } => rng_util::uniform(rng, *lower, *upper),
            ParamKind::Integer { lower, upper } => rng.i64(*lower..=*upper) as f64,
            ParamKind::Categorical { values } => rng.usize(0..values.len()) as f64,
        }
    }
}
