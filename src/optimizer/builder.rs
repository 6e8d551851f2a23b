use crate::acquisition::{AcquisitionFunction, DEFAULT_EXPLORATION_CONTROL};
use crate::error::Result;
use crate::history::History;
use crate::kernel::{DEFAULT_CATEGORICAL_WEIGHT, Kernel};
use crate::kfold::{FoldSplitter, KFold};
use crate::maximizer::{self, AcquisitionMaximizer, AnnealingConfig, DEFAULT_GRID_THRESHOLD};
use crate::model::{ModelAdapter, ScoreFn};
use crate::param::ParamMap;
use crate::space::SearchSpace;
use crate::surrogate::DEFAULT_NOISE;

use super::{BayesianOptimizer, DEFAULT_N_RESTARTS, OptimizerConfig};

/// A builder for constructing [`BayesianOptimizer`] instances with a fluent API.
///
/// Created via [`BayesianOptimizer::builder()`].
///
/// # Defaults
///
/// - Acquisition: [`ExpectedImprovement`](AcquisitionFunction::ExpectedImprovement)
/// - Restarts: [`DEFAULT_N_RESTARTS`]
/// - Input normalization: off; score standardization: on
/// - Exploration control: [`DEFAULT_EXPLORATION_CONTROL`]
/// - Surrogate noise: [`DEFAULT_NOISE`]
/// - Categorical weight of the mixed-space kernel: [`DEFAULT_CATEGORICAL_WEIGHT`]
/// - Maximizer: chosen from the space's
///   [`OptimizationType`](crate::OptimizationType)
/// - Fold splitter: unshuffled [`KFold`]
///
/// # Examples
///
/// ```
/// use bayesopt::model::{BoostingAdapter, Booster, BoostingTrainer, Dataset};
/// use bayesopt::parameter::ParameterSpec;
/// use bayesopt::param::ParamMap;
/// use bayesopt::{AcquisitionFunction, BayesianOptimizer, SearchSpace};
/// use nalgebra::{DMatrix, DVector};
///
/// struct Stub;
/// struct Trained;
///
/// impl Booster for Trained {
///     fn predict(&self, x: &DMatrix<f64>) -> bayesopt::Result<DVector<f64>> {
///         Ok(DVector::zeros(x.nrows()))
///     }
/// }
///
/// impl BoostingTrainer for Stub {
///     type Booster = Trained;
///     fn train(&self, _: &ParamMap, _: &Dataset, _: &Dataset, _: usize) -> bayesopt::Result<Trained> {
///         Ok(Trained)
///     }
/// }
///
/// let space = SearchSpace::new(vec![
///     ParameterSpec::integer("n_estimators", 10, 500),
///     ParameterSpec::continuous("eta", 0.01, 0.3),
/// ])
/// .unwrap();
/// let score = Box::new(|y: &DVector<f64>, y_pred: &DVector<f64>| -(y - y_pred).norm());
///
/// let optimizer = BayesianOptimizer::builder(space, BoostingAdapter::new(Stub), score)
///     .acquisition("generalized_expected_improvement".parse().unwrap())
///     .exploration_control(0.05)
///     .n_restarts_optimizer(5)
///     .normalize(true)
///     .seed(42)
///     .build()
///     .unwrap();
///
/// assert_eq!(
///     optimizer.config().acquisition,
///     AcquisitionFunction::GeneralizedExpectedImprovement { xi: 0.05 }
/// );
/// ```
pub struct BayesianOptimizerBuilder<A: ModelAdapter> {
    space: SearchSpace,
    adapter: A,
    score_fn: ScoreFn,
    acquisition: Option<AcquisitionFunction>,
    n_restarts_optimizer: Option<usize>,
    normalize: Option<bool>,
    exploration_control: Option<f64>,
    noise: Option<f64>,
    normalize_y: Option<bool>,
    seed: Option<u64>,
    start_values: Option<ParamMap>,
    annealing: Option<AnnealingConfig>,
    grid_threshold: Option<usize>,
    categorical_weight: Option<f64>,
    maximizer: Option<Box<dyn AcquisitionMaximizer>>,
    splitter: Option<Box<dyn FoldSplitter>>,
    history: Option<History>,
}

impl<A: ModelAdapter> BayesianOptimizerBuilder<A> {
    pub(super) fn new(space: SearchSpace, adapter: A, score_fn: ScoreFn) -> Self {
        Self {
            space,
            adapter,
            score_fn,
            acquisition: None,
            n_restarts_optimizer: None,
            normalize: None,
            exploration_control: None,
            noise: None,
            normalize_y: None,
            seed: None,
            start_values: None,
            annealing: None,
            grid_threshold: None,
            categorical_weight: None,
            maximizer: None,
            splitter: None,
            history: None,
        }
    }

    /// Set the acquisition function.
    #[must_use]
    pub fn acquisition(mut self, acquisition: AcquisitionFunction) -> Self {
        self.acquisition = Some(acquisition);
        self
    }

    /// Set how many maximization attempts an iteration makes before it
    /// falls back to a start vector. Zero is treated as one.
    #[must_use]
    pub fn n_restarts_optimizer(mut self, n: usize) -> Self {
        self.n_restarts_optimizer = Some(n);
        self
    }

    /// Center and scale numeric coordinates before they reach the surrogate.
    #[must_use]
    pub fn normalize(mut self, normalize: bool) -> Self {
        self.normalize = Some(normalize);
        self
    }

    /// Set `ξ` of the generalized Expected Improvement.
    ///
    /// Only takes effect when that acquisition function is selected.
    #[must_use]
    pub fn exploration_control(mut self, xi: f64) -> Self {
        self.exploration_control = Some(xi);
        self
    }

    /// Set the observation noise of the surrogate.
    #[must_use]
    pub fn noise(mut self, noise: f64) -> Self {
        self.noise = Some(noise);
        self
    }

    /// Standardize scores before fitting the surrogate (on by default).
    #[must_use]
    pub fn normalize_y(mut self, normalize: bool) -> Self {
        self.normalize_y = Some(normalize);
        self
    }

    /// Seed every random component for a reproducible run.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Use `params` for the first iteration and as the start vector of every
    /// maximization attempt.
    #[must_use]
    pub fn start_values(mut self, params: ParamMap) -> Self {
        self.start_values = Some(params);
        self
    }

    /// Set the annealing schedule used for mixed and large categorical spaces.
    #[must_use]
    pub fn annealing(mut self, config: AnnealingConfig) -> Self {
        self.annealing = Some(config);
        self
    }

    /// Set the largest categorical grid that is searched exhaustively.
    #[must_use]
    pub fn grid_threshold(mut self, threshold: usize) -> Self {
        self.grid_threshold = Some(threshold);
        self
    }

    /// Weigh categorical disagreement against numeric distance in the
    /// kernel of a mixed space. Other spaces ignore it.
    #[must_use]
    pub fn categorical_weight(mut self, weight: f64) -> Self {
        self.categorical_weight = Some(weight);
        self
    }

    /// Replace the maximization strategy chosen from the optimization type.
    #[must_use]
    pub fn maximizer(mut self, maximizer: impl AcquisitionMaximizer + 'static) -> Self {
        self.maximizer = Some(Box::new(maximizer));
        self
    }

    /// Replace the default [`KFold`] splitter.
    #[must_use]
    pub fn splitter(mut self, splitter: impl FoldSplitter + 'static) -> Self {
        self.splitter = Some(Box::new(splitter));
        self
    }

    /// Continue from previously recorded evaluations.
    #[must_use]
    pub fn history(mut self, history: History) -> Self {
        self.history = Some(history);
        self
    }

    /// Apply every setting of `config` at once.
    #[must_use]
    pub fn config(mut self, config: OptimizerConfig) -> Self {
        self.acquisition = Some(config.acquisition);
        self.n_restarts_optimizer = Some(config.n_restarts_optimizer);
        self.normalize = Some(config.normalize);
        self.exploration_control = Some(config.exploration_control);
        self.noise = Some(config.noise);
        self.normalize_y = Some(config.normalize_y);
        self.seed = config.seed;
        self.start_values = config.start_values;
        self.annealing = Some(config.annealing);
        self.grid_threshold = Some(config.grid_threshold);
        self.categorical_weight = Some(config.categorical_weight);
        self
    }

    /// Build the [`BayesianOptimizer`] with the configured options.
    ///
    /// # Errors
    ///
    /// Returns an error when the start values do not match the search space
    /// (unknown, missing or out-of-domain parameters), or when the history
    /// holds an entry that does not fit it.
    pub fn build(self) -> Result<BayesianOptimizer<A>> {
        let exploration_control = self
            .exploration_control
            .unwrap_or(DEFAULT_EXPLORATION_CONTROL);
        let acquisition = match self.acquisition.unwrap_or_default() {
            AcquisitionFunction::GeneralizedExpectedImprovement { xi } => {
                AcquisitionFunction::GeneralizedExpectedImprovement {
                    xi: self.exploration_control.unwrap_or(xi),
                }
            }
            other => other,
        };

        let start = self
            .start_values
            .as_ref()
            .map(|params| {
                let vector = self.space.to_vector(params)?;
                self.space.encode(&vector)
            })
            .transpose()?;

        let config = OptimizerConfig {
            acquisition,
            n_restarts_optimizer: self.n_restarts_optimizer.unwrap_or(DEFAULT_N_RESTARTS),
            normalize: self.normalize.unwrap_or(false),
            exploration_control,
            noise: self.noise.unwrap_or(DEFAULT_NOISE),
            normalize_y: self.normalize_y.unwrap_or(true),
            seed: self.seed,
            start_values: self.start_values,
            annealing: self.annealing.unwrap_or_default(),
            grid_threshold: self.grid_threshold.unwrap_or(DEFAULT_GRID_THRESHOLD),
            categorical_weight: self
                .categorical_weight
                .unwrap_or(DEFAULT_CATEGORICAL_WEIGHT),
        };

        let maximizer = self.maximizer.unwrap_or_else(|| {
            maximizer::strategy_for(
                &self.space,
                config.grid_threshold,
                &config.annealing,
                config.seed,
            )
        });
        let splitter = self.splitter.unwrap_or_else(|| Box::new(KFold::new()));
        let rng = config
            .seed
            .map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);

        let mut optimizer = BayesianOptimizer {
            kernel: Kernel::select(&self.space).with_categorical_weight(config.categorical_weight),
            space: self.space,
            adapter: self.adapter,
            score_fn: self.score_fn,
            config,
            maximizer,
            splitter,
            start,
            history: History::new(),
            rng,
            non_convergence_count: 0,
            last_success: None,
        };
        if let Some(history) = self.history {
            optimizer.set_history(history)?;
        }
        Ok(optimizer)
    }
}
