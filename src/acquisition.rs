//! Acquisition functions: the utility of evaluating a candidate point.
//!
//! Every function maps the surrogate posterior `(mean, std)` at a point and
//! the best score observed so far to a scalar that the
//! [maximizers](crate::maximizer) try to make as large as possible. Scores
//! are maximized, so improvement means `mean > best`.
//!
//! | Function | Utility |
//! |----------|---------|
//! | Upper Confidence Bound | `mean + 1.96 std` |
//! | Expected Improvement | `std (γ Φ(γ) + φ(γ))`, `γ = (mean - best) / std` |
//! | Generalized Expected Improvement | `(mean - best - ξ) Φ(γ) + std φ(γ)`, `γ = (mean - best - ξ) / std` |
//! | Probability of Improvement | `Φ((mean - best) / std)` |
//!
//! A point with `std == 0` carries no exploration value: every function
//! returns exactly `0.0` there, before any division takes place.

use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::space::SearchSpace;
use crate::surrogate::Posterior;

/// Default exploration control `ξ` of the generalized Expected Improvement.
pub const DEFAULT_EXPLORATION_CONTROL: f64 = 0.01;

/// Confidence multiplier of the Upper Confidence Bound.
const UCB_KAPPA: f64 = 1.96;

/// The acquisition function used to rank candidates.
///
/// Parses from the configuration names:
///
/// ```
/// use bayesopt::AcquisitionFunction;
///
/// let ei: AcquisitionFunction = "expected_improvement".parse().unwrap();
/// assert_eq!(ei, AcquisitionFunction::ExpectedImprovement);
/// assert!("best_guess".parse::<AcquisitionFunction>().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AcquisitionFunction {
    /// Optimistic estimate `mean + 1.96 std`.
    UpperConfidenceBound,
    /// Expected amount by which a point improves on the best score.
    #[default]
    ExpectedImprovement,
    /// Expected Improvement with an exploration margin `xi`.
    GeneralizedExpectedImprovement {
        /// Exploration control: larger values favour uncertain points.
        xi: f64,
    },
    /// Probability that a point improves on the best score.
    ProbabilityOfImprovement,
}

impl AcquisitionFunction {
    /// Resolves a configuration name, using `exploration_control` as `ξ`
    /// when the generalized Expected Improvement is selected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownAcquisition`] for an unrecognized name.
    pub fn from_name(name: &str, exploration_control: f64) -> Result<Self, Error> {
        match name {
            "upper_confidence_bound" => Ok(Self::UpperConfidenceBound),
            "expected_improvement" => Ok(Self::ExpectedImprovement),
            "generalized_expected_improvement" => Ok(Self::GeneralizedExpectedImprovement {
                xi: exploration_control,
            }),
            "probability_of_improvement" => Ok(Self::ProbabilityOfImprovement),
            other => Err(Error::UnknownAcquisition(other.to_owned())),
        }
    }

    /// Returns the configuration name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::UpperConfidenceBound => "upper_confidence_bound",
            Self::ExpectedImprovement => "expected_improvement",
            Self::GeneralizedExpectedImprovement { .. } => "generalized_expected_improvement",
            Self::ProbabilityOfImprovement => "probability_of_improvement",
        }
    }

    /// Computes the utility from posterior moments and the best observed score.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn utility(&self, mean: f64, std: f64, best: f64) -> f64 {
        if std == 0.0 {
            return 0.0;
        }
        match self {
            Self::UpperConfidenceBound => mean + UCB_KAPPA * std,
            Self::ExpectedImprovement => {
                let gamma = (mean - best) / std;
                std * (gamma * norm_cdf(gamma) + norm_pdf(gamma))
            }
            Self::GeneralizedExpectedImprovement { xi } => {
                let improvement = mean - best - xi;
                let gamma = improvement / std;
                improvement * norm_cdf(gamma) + std * norm_pdf(gamma)
            }
            Self::ProbabilityOfImprovement => norm_cdf((mean - best) / std),
        }
    }

    /// Evaluates the utility at `x` by querying the posterior.
    #[must_use]
    pub fn evaluate<P: Posterior + ?Sized>(&self, posterior: &P, x: &[f64], best: f64) -> f64 {
        let (mean, std) = posterior.predict_one(x);
        self.utility(mean, std, best)
    }

    /// Binds the function to a fitted posterior and the current best score.
    #[must_use]
    pub fn bind<'a, P: Posterior + ?Sized>(
        self,
        posterior: &'a P,
        best: f64,
    ) -> BoundAcquisition<'a, P> {
        BoundAcquisition {
            function: self,
            posterior,
            best,
            normalizer: None,
        }
    }
}

impl FromStr for AcquisitionFunction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s, DEFAULT_EXPLORATION_CONTROL)
    }
}

impl core::fmt::Display for AcquisitionFunction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// An acquisition function bound to one posterior snapshot.
///
/// Maximizers only see `value(x)`: a deterministic function of a raw
/// encoded point. When the surrogate was trained on normalized inputs the
/// bound function applies the same normalization to every query.
pub struct BoundAcquisition<'a, P: Posterior + ?Sized> {
    function: AcquisitionFunction,
    posterior: &'a P,
    best: f64,
    normalizer: Option<&'a SearchSpace>,
}

impl<'a, P: Posterior + ?Sized> BoundAcquisition<'a, P> {
    /// Normalizes every query point with `space` before prediction.
    #[must_use]
    pub fn normalized_by(mut self, space: &'a SearchSpace) -> Self {
        self.normalizer = Some(space);
        self
    }

    /// Returns the best observed score the utility is measured against.
    #[must_use]
    pub fn best(&self) -> f64 {
        self.best
    }

    /// Evaluates the utility at a raw encoded point.
    #[must_use]
    pub fn value(&self, x: &[f64]) -> f64 {
        match self.normalizer {
            Some(space) => {
                let mut query = x.to_vec();
                space.normalize(&mut query);
                self.function.evaluate(self.posterior, &query, self.best)
            }
            None => self.function.evaluate(self.posterior, x, self.best),
        }
    }
}

/// Standard normal PDF.
#[must_use]
pub fn norm_pdf(x: f64) -> f64 {
    const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;
    INV_SQRT_2PI * (-0.5 * x * x).exp()
}

/// Standard normal CDF (Hart rational approximation, |error| < 7.5e-8).
#[must_use]
pub fn norm_cdf(x: f64) -> f64 {
    if x < -8.0 {
        return 0.0;
    }
    if x > 8.0 {
        return 1.0;
    }

    let abs_x = x.abs();
    let t = 1.0 / (1.0 + 0.231_641_9 * abs_x);
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;
    let t5 = t4 * t;

    let poly = 0.319_381_530 * t - 0.356_563_782 * t2 + 1.781_477_937 * t3 - 1.821_255_978 * t4
        + 1.330_274_429 * t5;
    let tail = norm_pdf(abs_x) * poly;

    if x >= 0.0 { 1.0 - tail } else { tail }
}
