//! Acquisition maximization strategies.
//!
//! Each strategy implements [`AcquisitionMaximizer`]: given a bound
//! acquisition function over encoded points and a start vector, find the
//! point with the largest utility and report whether the search succeeded.
//! [`strategy_for`] is the single place that picks a strategy from the
//! space's [`OptimizationType`]:
//!
//! | Type | Strategy |
//! |------|----------|
//! | numerical | [`GradientMaximizer`]: bounded L-BFGS on the negated utility |
//! | categorical | [`CategoricalMaximizer`]: exhaustive grid up to a threshold, annealing above it |
//! | mixed | [`AnnealingMaximizer`]: simulated annealing over the joint space |
//!
//! Restarts are not handled here; the optimization loop calls a strategy
//! once per restart with a fresh start vector.

mod annealing;
mod gradient;
mod grid;

pub use annealing::{
    AnnealingConfig, AnnealingMaximizer, DEFAULT_STEP_FRACTION, DEFAULT_STEPS, DEFAULT_T_MAX,
    DEFAULT_T_MIN,
};
pub use gradient::GradientMaximizer;
pub use grid::{CategoricalMaximizer, DEFAULT_GRID_THRESHOLD};

use crate::error::Result;
use crate::space::SearchSpace;
use crate::types::OptimizationType;

/// The outcome of one maximization attempt.
#[derive(Clone, Debug, PartialEq)]
pub struct Maximum {
    /// Whether the strategy trusts its result.
    pub success: bool,
    /// The encoded point found.
    pub x: Vec<f64>,
    /// The acquisition value at `x`.
    pub value: f64,
}

/// Trait for strategies that maximize an acquisition function.
///
/// Implementations must be `Send + Sync`; strategies that need randomness
/// keep their generator behind a lock, so a shared reference is enough.
pub trait AcquisitionMaximizer: Send + Sync {
    /// Maximizes `acquisition` starting from the encoded point `start`.
    ///
    /// # Errors
    ///
    /// Returns an error only when the strategy cannot run at all (for
    /// example a start vector of the wrong length). A search that runs but
    /// does not converge is reported through [`Maximum::success`].
    fn maximize(&self, acquisition: &dyn Fn(&[f64]) -> f64, start: &[f64]) -> Result<Maximum>;
}

/// Picks the maximization strategy for a search space.
#[must_use]
pub fn strategy_for(
    space: &SearchSpace,
    grid_threshold: usize,
    annealing: &AnnealingConfig,
    seed: Option<u64>,
) -> Box<dyn AcquisitionMaximizer> {
    match space.optimization_type() {
        OptimizationType::Numerical => Box::new(GradientMaximizer::new(space.bounds())),
        OptimizationType::Categorical => Box::new(CategoricalMaximizer::new(
            space,
            grid_threshold,
            annealing.clone(),
            seed,
        )),
        OptimizationType::Mixed => {
            Box::new(AnnealingMaximizer::new(space, annealing.clone(), seed))
        }
    }
}

fn check_len(expected: usize, got: usize) -> Result<()> {
    if expected == got {
        Ok(())
    } else {
        Err(crate::error::Error::DimensionMismatch { expected, got })
    }
}
