//! Bounded quasi-Newton maximization for purely numeric spaces.
//!
//! The acquisition value is negated and minimized with L-BFGS (More-Thuente
//! line search). Bounds are enforced by clamping every evaluated point into
//! the box, and gradient components that would push a coordinate sitting on
//! a bound further outside are zeroed. Gradients are central finite
//! differences.
//!
//! The run counts as successful when the solver reports convergence and the
//! final utility is a number. A start point whose projected gradient already
//! vanishes is a stationary point and is returned as converged without
//! running the solver, which keeps flat acquisition surfaces from being
//! reported as failures.

use argmin::core::{
    CostFunction, Executor, Gradient, State, TerminationReason, TerminationStatus,
};
use argmin::solver::linesearch::MoreThuenteLineSearch;
use argmin::solver::quasinewton::LBFGS;

use super::{AcquisitionMaximizer, Maximum, check_len};
use crate::error::{Error, Result};

/// Default L-BFGS iteration cap.
const DEFAULT_MAX_ITERS: u64 = 200;
/// L-BFGS history size.
const MEMORY: usize = 10;
/// Gradient norm below which a point counts as stationary.
const GRAD_TOLERANCE: f64 = 1e-8;
/// Distance from a bound at which a coordinate counts as sitting on it.
const BOUND_EPS: f64 = 1e-12;
/// Relative cost change below which L-BFGS stops.
const COST_TOLERANCE: f64 = 1e-12;
/// Finite-difference step relative to the coordinate range.
const FD_STEP: f64 = 1e-6;

/// L-BFGS maximizer over a box of numeric bounds.
///
/// # Examples
///
/// ```
/// use bayesopt::maximizer::{AcquisitionMaximizer, GradientMaximizer};
///
/// let maximizer = GradientMaximizer::new(vec![(-5.0, 5.0)]);
/// let peak = |x: &[f64]| -(x[0] - 1.5).powi(2);
/// let result = maximizer.maximize(&peak, &[-4.0]).unwrap();
///
/// assert!(result.success);
/// assert!((result.x[0] - 1.5).abs() < 1e-3);
/// ```
#[derive(Clone, Debug)]
pub struct GradientMaximizer {
    bounds: Vec<(f64, f64)>,
    max_iters: u64,
}

impl GradientMaximizer {
    /// Creates a maximizer constrained to `bounds`, one pair per coordinate.
    #[must_use]
    pub fn new(bounds: Vec<(f64, f64)>) -> Self {
        Self {
            bounds,
            max_iters: DEFAULT_MAX_ITERS,
        }
    }

    /// Sets the iteration cap; a run that hits it is not successful.
    #[must_use]
    pub fn max_iters(mut self, max_iters: u64) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Returns the box the search is constrained to.
    #[must_use]
    pub fn bounds(&self) -> &[(f64, f64)] {
        &self.bounds
    }
}

impl AcquisitionMaximizer for GradientMaximizer {
    fn maximize(&self, acquisition: &dyn Fn(&[f64]) -> f64, start: &[f64]) -> Result<Maximum> {
        check_len(self.bounds.len(), start.len())?;

        let x0 = clamp_params(start, &self.bounds);
        let value0 = acquisition(&x0);
        let failed = |x: Vec<f64>, value: f64| Maximum {
            success: false,
            x,
            value,
        };
        if !value0.is_finite() {
            return Ok(failed(x0, value0));
        }

        let problem = NegatedAcquisition {
            acquisition,
            bounds: &self.bounds,
        };
        let g0 = problem.projected_gradient(&x0);
        if g0.iter().map(|g| g * g).sum::<f64>().sqrt() <= GRAD_TOLERANCE {
            return Ok(Maximum {
                success: true,
                x: x0,
                value: value0,
            });
        }

        let solver = LBFGS::new(MoreThuenteLineSearch::new(), MEMORY)
            .with_tolerance_grad(GRAD_TOLERANCE)
            .and_then(|s| s.with_tolerance_cost(COST_TOLERANCE))
            .map_err(|e| Error::Maximizer(e.to_string()))?;

        let result = Executor::new(problem, solver)
            .configure(|state| state.param(x0.clone()).max_iters(self.max_iters))
            .run();
        let Ok(result) = result else {
            trace_debug!("L-BFGS run failed");
            return Ok(failed(x0, value0));
        };

        let state = result.state();
        let x = state
            .get_best_param()
            .map_or(x0, |p| clamp_params(p, &self.bounds));
        let value = acquisition(&x);
        let converged = matches!(
            state.get_termination_status(),
            TerminationStatus::Terminated(
                TerminationReason::SolverConverged | TerminationReason::TargetCostReached
            )
        );

        Ok(Maximum {
            success: converged && value.is_finite(),
            x,
            value,
        })
    }
}

fn clamp_params(params: &[f64], bounds: &[(f64, f64)]) -> Vec<f64> {
    params
        .iter()
        .zip(bounds)
        .map(|(&v, &(lo, hi))| v.clamp(lo, hi))
        .collect()
}

/// The negated acquisition as an argmin problem over the clamped box.
struct NegatedAcquisition<'a> {
    acquisition: &'a dyn Fn(&[f64]) -> f64,
    bounds: &'a [(f64, f64)],
}

impl NegatedAcquisition<'_> {
    fn value(&self, x: &[f64]) -> f64 {
        -(self.acquisition)(x)
    }

    /// Central differences (one-sided at a bound), with components that
    /// point out of the box zeroed.
    fn projected_gradient(&self, x: &[f64]) -> Vec<f64> {
        let mut grad = vec![0.0; x.len()];
        for (i, &(lo, hi)) in self.bounds.iter().enumerate() {
            let h = FD_STEP * (hi - lo).max(1.0);
            let mut plus = x.to_vec();
            let mut minus = x.to_vec();
            plus[i] = (x[i] + h).min(hi);
            minus[i] = (x[i] - h).max(lo);
            let span = plus[i] - minus[i];
            if span <= 0.0 {
                continue;
            }
            let g = (self.value(&plus) - self.value(&minus)) / span;
            if (x[i] <= lo + BOUND_EPS && g > 0.0) || (x[i] >= hi - BOUND_EPS && g < 0.0) {
                continue;
            }
            grad[i] = g;
        }
        grad
    }
}

impl CostFunction for NegatedAcquisition<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> core::result::Result<Self::Output, argmin::core::Error> {
        let clamped = clamp_params(param, self.bounds);
        Ok(self.value(&clamped))
    }
}

impl Gradient for NegatedAcquisition<'_> {
    type Param = Vec<f64>;
    type Gradient = Vec<f64>;

    fn gradient(
        &self,
        param: &Self::Param,
    ) -> core::result::Result<Self::Gradient, argmin::core::Error> {
        let clamped = clamp_params(param, self.bounds);
        Ok(self.projected_gradient(&clamped))
    }
}
