//! Core types shared across the optimizer.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The kind of search problem, derived once from the parameter specs.
///
/// Selects both the surrogate kernel and the acquisition maximization
/// strategy for the lifetime of an optimization run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OptimizationType {
    /// Every parameter is categorical.
    Categorical,
    /// No parameter is categorical.
    Numerical,
    /// Some, but not all, parameters are categorical.
    Mixed,
}

impl OptimizationType {
    /// Classify a problem from its categorical parameter count.
    #[must_use]
    pub fn classify(n_categorical: usize, n_params: usize) -> Self {
        if n_categorical == n_params {
            Self::Categorical
        } else if n_categorical > 0 {
            Self::Mixed
        } else {
            Self::Numerical
        }
    }
}

impl core::fmt::Display for OptimizationType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Categorical => "categorical",
            Self::Numerical => "numerical",
            Self::Mixed => "mixed",
        };
        f.write_str(name)
    }
}
