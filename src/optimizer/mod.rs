//! The sequential optimization loop.
//!
//! A [`BayesianOptimizer`] owns the search space, the model adapter and the
//! [`History`] of one run. [`fit`](BayesianOptimizer::fit) alternates
//! *propose → evaluate → record* for a fixed number of iterations and hands
//! back the best parameters together with an untrained model configured
//! with them.
//!
//! The first iteration of a run has nothing to learn from and evaluates the
//! configured start values, or a uniformly random point. Every later
//! iteration refits the Gaussian Process on the full history and maximizes
//! the acquisition function, retrying from fresh start vectors up to
//! `n_restarts_optimizer` times. If no attempt converges the run does not
//! stop: the non-convergence counter is incremented, a warning is logged,
//! and the last start vector is evaluated instead.
//!
//! [`propose`](BayesianOptimizer::propose) and
//! [`record`](BayesianOptimizer::record) expose the same steps for callers
//! that evaluate configurations themselves (ask-and-tell).

mod builder;
mod fit;
mod propose;

pub use builder::BayesianOptimizerBuilder;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::acquisition::{AcquisitionFunction, DEFAULT_EXPLORATION_CONTROL};
use crate::error::{Error, Result};
use crate::history::History;
use crate::kernel::{DEFAULT_CATEGORICAL_WEIGHT, Kernel};
use crate::kfold::FoldSplitter;
use crate::maximizer::{AcquisitionMaximizer, AnnealingConfig, DEFAULT_GRID_THRESHOLD};
use crate::model::{ModelAdapter, ScoreFn};
use crate::param::ParamMap;
use crate::space::SearchSpace;
use crate::surrogate::DEFAULT_NOISE;
use crate::types::OptimizationType;

/// Default number of acquisition maximization attempts per iteration.
pub const DEFAULT_N_RESTARTS: usize = 10;

/// Resolved settings of a [`BayesianOptimizer`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OptimizerConfig {
    /// Acquisition function ranking candidate points.
    pub acquisition: AcquisitionFunction,
    /// Maximization attempts per iteration; also the number of random
    /// restarts of the surrogate's likelihood maximization.
    pub n_restarts_optimizer: usize,
    /// Whether numeric coordinates are centered and scaled before they
    /// reach the surrogate.
    pub normalize: bool,
    /// `ξ` of the generalized Expected Improvement.
    pub exploration_control: f64,
    /// Observation noise added to the surrogate's kernel diagonal.
    pub noise: f64,
    /// Whether the surrogate standardizes scores before fitting.
    pub normalize_y: bool,
    /// Seed of every random component; random when absent.
    pub seed: Option<u64>,
    /// Start point of the first iteration and of every restart.
    pub start_values: Option<ParamMap>,
    /// Schedule of the annealing maximizer.
    pub annealing: AnnealingConfig,
    /// Largest categorical grid searched exhaustively.
    pub grid_threshold: usize,
    /// Emphasis of the categorical fields in the mixed-space kernel.
    pub categorical_weight: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            acquisition: AcquisitionFunction::default(),
            n_restarts_optimizer: DEFAULT_N_RESTARTS,
            normalize: false,
            exploration_control: DEFAULT_EXPLORATION_CONTROL,
            noise: DEFAULT_NOISE,
            normalize_y: true,
            seed: None,
            start_values: None,
            annealing: AnnealingConfig::default(),
            grid_threshold: DEFAULT_GRID_THRESHOLD,
            categorical_weight: DEFAULT_CATEGORICAL_WEIGHT,
        }
    }
}

/// Bayesian hyperparameter optimizer over a mixed search space.
///
/// Scores are maximized. Build one with [`BayesianOptimizer::builder`].
///
/// # Examples
///
/// ```
/// use bayesopt::model::{Dataset, Estimator, EstimatorAdapter};
/// use bayesopt::parameter::ParameterSpec;
/// use bayesopt::{BayesianOptimizer, SearchSpace};
/// use nalgebra::{DMatrix, DVector};
///
/// /// Predicts `slope * x`.
/// struct Line(f64);
///
/// impl Estimator for Line {
///     fn fit(&mut self, _x: &DMatrix<f64>, _y: &DVector<f64>) -> bayesopt::Result<()> {
///         Ok(())
///     }
///     fn predict(&self, x: &DMatrix<f64>) -> bayesopt::Result<DVector<f64>> {
///         Ok(x.column(0) * self.0)
///     }
/// }
///
/// let space = SearchSpace::new(vec![ParameterSpec::continuous("slope", 0.0, 4.0)]).unwrap();
/// let adapter = EstimatorAdapter::new(|p: &bayesopt::param::ParamMap| {
///     Ok(Line(p["slope"].as_f64().unwrap_or_default()))
/// });
/// let neg_mse = Box::new(|y: &DVector<f64>, y_pred: &DVector<f64>| -(y - y_pred).norm_squared());
///
/// let mut optimizer = BayesianOptimizer::builder(space, adapter, neg_mse)
///     .seed(7)
///     .build()
///     .unwrap();
///
/// let x = DMatrix::from_column_slice(4, 1, &[1.0, 2.0, 3.0, 4.0]);
/// let y = DVector::from_column_slice(&[2.0, 4.0, 6.0, 8.0]);
/// let (best, _model) = optimizer.fit(x, y, None, None, 8, None).unwrap();
///
/// assert_eq!(optimizer.history().len(), 8);
/// assert!(best["slope"].as_f64().is_some());
/// ```
pub struct BayesianOptimizer<A: ModelAdapter> {
    space: SearchSpace,
    adapter: A,
    score_fn: ScoreFn,
    config: OptimizerConfig,
    kernel: Kernel,
    maximizer: Box<dyn AcquisitionMaximizer>,
    splitter: Box<dyn FoldSplitter>,
    start: Option<Vec<f64>>,
    history: History,
    rng: fastrand::Rng,
    non_convergence_count: usize,
    last_success: Option<bool>,
}

impl<A: ModelAdapter> BayesianOptimizer<A> {
    /// Starts building an optimizer over `space` that evaluates
    /// configurations with `adapter` and maximizes `score_fn`.
    #[must_use]
    pub fn builder(space: SearchSpace, adapter: A, score_fn: ScoreFn) -> BayesianOptimizerBuilder<A> {
        BayesianOptimizerBuilder::new(space, adapter, score_fn)
    }

    /// Returns the resolved settings.
    #[must_use]
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Returns the search space.
    #[must_use]
    pub fn space(&self) -> &SearchSpace {
        &self.space
    }

    /// Returns the model adapter.
    #[must_use]
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Returns every evaluation recorded so far.
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Returns the problem classification of the search space.
    #[must_use]
    pub fn optimization_type(&self) -> OptimizationType {
        self.space.optimization_type()
    }

    /// Returns the surrogate kernel chosen for the search space.
    #[must_use]
    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    /// Returns the bounds of the numeric parameters, in canonical order.
    #[must_use]
    pub fn bounds(&self) -> Vec<(f64, f64)> {
        self.space.bounds()
    }

    /// Returns how many proposals of the current run fell back to their
    /// start vector because no maximization attempt converged.
    #[must_use]
    pub fn non_convergence_count(&self) -> usize {
        self.non_convergence_count
    }

    /// Returns whether the latest model-based proposal converged, or `None`
    /// before the first one.
    #[must_use]
    pub fn last_success(&self) -> Option<bool> {
        self.last_success
    }

    /// Replaces the history, for example with one restored from disk.
    ///
    /// # Errors
    ///
    /// Returns the encoding error of the first entry that does not fit the
    /// search space; the current history is kept in that case.
    pub fn set_history(&mut self, history: History) -> Result<()> {
        for entry in history.entries() {
            self.space.encode(&entry.params)?;
        }
        self.history = history;
        Ok(())
    }

    /// Returns the best recorded parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoHistory`] if nothing was evaluated yet.
    pub fn best_params(&self) -> Result<ParamMap> {
        let best = self.history.best().ok_or(Error::NoHistory)?;
        self.space.to_map(&best.params)
    }

    /// Returns the best recorded parameters and an untrained model
    /// configured with them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoHistory`] if nothing was evaluated yet, or the
    /// adapter's error when it cannot build the model.
    pub fn best(&self) -> Result<(ParamMap, A::Model)> {
        let params = self.best_params()?;
        let model = self.adapter.build(&params)?;
        Ok((params, model))
    }
}

/// The start vector of the first iteration and of every restart: the
/// configured start values, or a fresh random point.
fn start_vector(start: Option<&[f64]>, space: &SearchSpace, rng: &mut fastrand::Rng) -> Vec<f64> {
    match start {
        Some(start) => start.to_vec(),
        None => space.sample_encoded(rng),
    }
}
