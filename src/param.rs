//! Parameter value storage types.

use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One allowed value of a categorical parameter.
///
/// Categories keep their declared type so a proposal hands the model the
/// same kind of value the user listed (a string stays a string, an integer
/// stays an integer).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CategoryValue {
    /// A string category.
    Str(String),
    /// An integer category.
    Int(i64),
    /// A floating-point category.
    Float(f64),
    /// A boolean category.
    Bool(bool),
}

impl core::fmt::Display for CategoryValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for CategoryValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for CategoryValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for CategoryValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for CategoryValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for CategoryValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// A single parameter value inside a [`ParameterVector`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ParamValue {
    /// A continuous parameter value.
    Float(f64),
    /// An integer parameter value.
    Int(i64),
    /// A categorical parameter value.
    Categorical(CategoryValue),
}

impl ParamValue {
    /// Returns the value as `f64` for numeric variants.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            Self::Categorical(_) => None,
        }
    }

    /// Returns the value as `i64` for the integer variant.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the category for the categorical variant.
    #[must_use]
    pub fn as_category(&self) -> Option<&CategoryValue> {
        match self {
            Self::Categorical(c) => Some(c),
            _ => None,
        }
    }
}

impl core::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Categorical(c) => write!(f, "{c}"),
        }
    }
}

/// Array form of a parameter setting: one value per spec, in canonical order.
pub type ParameterVector = Vec<ParamValue>;

/// Dictionary form of a parameter setting, keyed by parameter name.
pub type ParamMap = HashMap<String, ParamValue>;
