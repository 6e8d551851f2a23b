//! Covariance functions over encoded parameter vectors.
//!
//! Three kernels cover the three kinds of search space:
//!
//! | Kernel | Space | Distance |
//! |--------|-------|----------|
//! | [`Kernel::Hamming`] | all categorical | number of mismatching fields |
//! | [`Kernel::WeightedHamming`] | mixed | weighted mismatches plus scaled squared numeric distance |
//! | [`Kernel::Matern`] | all numeric | Matérn 5/2 with one length scale per dimension |
//!
//! Every kernel has unit signal variance, so `k(x, x) = 1`. Length scales
//! are passed in as a slice of positive values, one per kernel
//! hyperparameter (see [`Kernel::n_length_scales`]); the surrogate chooses
//! them by maximum likelihood.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::space::SearchSpace;
use crate::types::OptimizationType;

/// Precomputed √5 constant.
const SQRT_5: f64 = 2.236_067_977_499_79;

/// Default emphasis of the categorical half of the weighted Hamming kernel.
pub const DEFAULT_CATEGORICAL_WEIGHT: f64 = 1.0;

/// A covariance function between two encoded parameter vectors.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Kernel {
    /// `k(a, b) = exp(-d_H(a, b) / l)` where `d_H` counts differing fields.
    Hamming,
    /// Hamming agreement on the categorical fields combined with a squared
    /// numeric distance on the numeric fields:
    ///
    /// `k(a, b) = exp(-(w Σ_cat [a_i ≠ b_i] / l_i + Σ_num ((a_j - b_j) / l_j)²))`
    WeightedHamming {
        /// `true` at every categorical coordinate.
        categorical: Vec<bool>,
        /// Emphasis `w` of the categorical half relative to the numeric half.
        categorical_weight: f64,
    },
    /// Matérn 5/2 kernel with ARD length scales:
    ///
    /// `k(a, b) = (1 + √5 r + 5/3 r²) exp(-√5 r)`, `r² = Σ ((a_i - b_i) / l_i)²`
    Matern,
}

impl Kernel {
    /// Chooses the kernel for a search space from its optimization type.
    #[must_use]
    pub fn select(space: &SearchSpace) -> Self {
        match space.optimization_type() {
            OptimizationType::Categorical => Self::Hamming,
            OptimizationType::Mixed => Self::WeightedHamming {
                categorical: space.categorical_mask(),
                categorical_weight: DEFAULT_CATEGORICAL_WEIGHT,
            },
            OptimizationType::Numerical => Self::Matern,
        }
    }

    /// Returns the number of length-scale hyperparameters for `n_dims` coordinates.
    #[must_use]
    pub fn n_length_scales(&self, n_dims: usize) -> usize {
        match self {
            Self::Hamming => 1,
            Self::WeightedHamming { .. } | Self::Matern => n_dims,
        }
    }

    /// Evaluates the covariance between `a` and `b`.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn eval(&self, a: &[f64], b: &[f64], length_scales: &[f64]) -> f64 {
        match self {
            Self::Hamming => {
                let mismatches = a
                    .iter()
                    .zip(b)
                    .filter(|(x, y)| differs(**x, **y))
                    .count() as f64;
                (-mismatches / length_scales[0]).exp()
            }
            Self::WeightedHamming {
                categorical,
                categorical_weight,
            } => {
                let mut categorical_distance = 0.0;
                let mut numeric_distance = 0.0;
                for (i, (&x, &y)) in a.iter().zip(b).enumerate() {
                    if categorical[i] {
                        if differs(x, y) {
                            categorical_distance += 1.0 / length_scales[i];
                        }
                    } else {
                        let diff = (x - y) / length_scales[i];
                        numeric_distance += diff * diff;
                    }
                }
                (-(categorical_weight * categorical_distance + numeric_distance)).exp()
            }
            Self::Matern => matern52(a, b, length_scales),
        }
    }

    /// Returns a copy with a different categorical emphasis.
    ///
    /// Only the weighted Hamming kernel carries a weight; other kernels are
    /// returned unchanged.
    #[must_use]
    pub fn with_categorical_weight(self, weight: f64) -> Self {
        match self {
            Self::WeightedHamming { categorical, .. } => Self::WeightedHamming {
                categorical,
                categorical_weight: weight,
            },
            other => other,
        }
    }
}

impl core::fmt::Display for Kernel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Hamming => "hamming",
            Self::WeightedHamming { .. } => "weighted_hamming",
            Self::Matern => "matern52",
        };
        f.write_str(name)
    }
}

/// Categorical coordinates hold integral indices.
fn differs(x: f64, y: f64) -> bool {
    (x - y).abs() > 0.5
}

fn matern52(a: &[f64], b: &[f64], length_scales: &[f64]) -> f64 {
    let mut r_sq = 0.0;
    for i in 0..a.len() {
        let diff = (a[i] - b[i]) / length_scales[i];
        r_sq += diff * diff;
    }
    let r = r_sq.sqrt();
    let sqrt5_r = SQRT_5 * r;
    (1.0 + sqrt5_r + 5.0 / 3.0 * r_sq) * (-sqrt5_r).exp()
}
