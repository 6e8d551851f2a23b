//! Gaussian Process surrogate regression.
//!
//! [`GaussianProcess`] fits a zero-mean GP with one of the [`Kernel`]s to
//! the encoded history and returns a [`FittedGp`] that predicts the
//! posterior mean and standard deviation at arbitrary points.
//!
//! # Fitting
//!
//! 1. Targets are optionally standardized (zero mean, unit variance).
//! 2. Kernel length scales are chosen by maximizing the log marginal
//!    likelihood. The search starts at unit length scales and from
//!    `n_restarts` additional log-uniform random points inside
//!    `[1e-5, 1e5]`; each start is refined with Nelder-Mead.
//! 3. `K + σ²I` is factorized with Cholesky, where `σ²` is a small fixed
//!    observation noise that keeps the matrix well-conditioned even for
//!    noiseless evaluations.
//!
//! The surrogate holds no incremental state: every call to
//! [`GaussianProcess::fit`] starts from scratch.

use argmin::core::{CostFunction, Executor, State};
use argmin::solver::neldermead::NelderMead;
use nalgebra::{DMatrix, DVector};

use crate::error::{Error, Result};
use crate::kernel::Kernel;
use crate::rng_util;

/// Default observation noise added to the kernel diagonal.
pub const DEFAULT_NOISE: f64 = 1e-4;

/// Log of the smallest admissible length scale.
const LOG_SCALE_MIN: f64 = -11.512_925_464_970_229;
/// Log of the largest admissible length scale.
const LOG_SCALE_MAX: f64 = 11.512_925_464_970_229;
/// Nelder-Mead iteration cap per likelihood restart.
const LIKELIHOOD_MAX_ITERS: u64 = 200;
/// Standard deviation tolerance of the Nelder-Mead simplex.
const LIKELIHOOD_SD_TOLERANCE: f64 = 1e-6;
/// ln(2π).
const LN_2PI: f64 = 1.837_877_066_409_345_5;

/// Read access to a posterior: mean and standard deviation at a point.
///
/// Acquisition functions only need this capability, which keeps them
/// testable against hand-written posteriors.
pub trait Posterior {
    /// Returns `(mean, std)` at a single encoded point.
    fn predict_one(&self, x: &[f64]) -> (f64, f64);
}

/// Gaussian Process regressor configuration.
///
/// # Examples
///
/// ```
/// use bayesopt::kernel::Kernel;
/// use bayesopt::surrogate::{GaussianProcess, Posterior};
///
/// let mut gp = GaussianProcess::new(Kernel::Matern).seed(3);
/// let x = vec![vec![0.0], vec![0.5], vec![1.0]];
/// let y = vec![0.0, 1.0, 0.0];
/// let fitted = gp.fit(&x, &y).unwrap();
///
/// let (mean, std) = fitted.predict_one(&[0.5]);
/// assert!((mean - 1.0).abs() < 0.05);
/// assert!(std < 0.1);
/// ```
#[derive(Debug)]
pub struct GaussianProcess {
    kernel: Kernel,
    noise: f64,
    normalize_y: bool,
    n_restarts: usize,
    rng: fastrand::Rng,
}

impl GaussianProcess {
    /// Creates a regressor with the default noise, target normalization on,
    /// and no extra likelihood restarts.
    #[must_use]
    pub fn new(kernel: Kernel) -> Self {
        Self {
            kernel,
            noise: DEFAULT_NOISE,
            normalize_y: true,
            n_restarts: 0,
            rng: fastrand::Rng::new(),
        }
    }

    /// Sets the observation noise variance added to the kernel diagonal.
    #[must_use]
    pub fn noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    /// Enables or disables standardization of the targets.
    #[must_use]
    pub fn normalize_y(mut self, normalize: bool) -> Self {
        self.normalize_y = normalize;
        self
    }

    /// Sets the number of random restarts of the likelihood maximization.
    #[must_use]
    pub fn n_restarts(mut self, n: usize) -> Self {
        self.n_restarts = n;
        self
    }

    /// Seeds the restart generator.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.rng = fastrand::Rng::with_seed(seed);
        self
    }

    /// Returns the kernel.
    #[must_use]
    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    /// Fits the posterior to `x` (one encoded point per row) and `y`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoHistory`] for empty data,
    /// [`Error::DimensionMismatch`] for ragged input, and
    /// [`Error::Surrogate`] when the covariance of the chosen length scales
    /// is not positive definite.
    #[allow(clippy::cast_precision_loss)]
    pub fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<FittedGp> {
        if x.is_empty() {
            return Err(Error::NoHistory);
        }
        if x.len() != y.len() {
            return Err(Error::DimensionMismatch {
                expected: x.len(),
                got: y.len(),
            });
        }
        let n_dims = x[0].len();
        if let Some(row) = x.iter().find(|row| row.len() != n_dims) {
            return Err(Error::DimensionMismatch {
                expected: n_dims,
                got: row.len(),
            });
        }

        let n = y.len() as f64;
        let (y_mean, y_std) = if self.normalize_y {
            let mean = y.iter().sum::<f64>() / n;
            let var = y.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            let std = var.sqrt();
            (mean, if std > 0.0 { std } else { 1.0 })
        } else {
            (0.0, 1.0)
        };
        let targets = DVector::from_iterator(y.len(), y.iter().map(|v| (v - y_mean) / y_std));

        let problem = Likelihood {
            kernel: &self.kernel,
            x,
            y: &targets,
            noise: self.noise,
        };
        let n_scales = self.kernel.n_length_scales(n_dims);
        let log_scales = maximize_likelihood(&problem, n_scales, self.n_restarts, &mut self.rng);
        let length_scales: Vec<f64> = log_scales
            .iter()
            .map(|v| v.clamp(LOG_SCALE_MIN, LOG_SCALE_MAX).exp())
            .collect();

        let k = kernel_matrix(&self.kernel, x, &length_scales, self.noise);
        let cholesky = nalgebra::linalg::Cholesky::new(k).ok_or_else(|| {
            Error::Surrogate("covariance matrix is not positive definite".to_owned())
        })?;
        let alpha = cholesky.solve(&targets);
        let log_marginal_likelihood = log_likelihood(&cholesky, &alpha, &targets);

        trace_debug!(
            n_points = x.len(),
            kernel = %self.kernel,
            log_marginal_likelihood,
            "surrogate fitted"
        );

        Ok(FittedGp {
            kernel: self.kernel.clone(),
            length_scales,
            x_train: x.to_vec(),
            cholesky,
            alpha,
            y_mean,
            y_std,
            log_marginal_likelihood,
        })
    }
}

/// Returns the best log length scales found across all restarts.
fn maximize_likelihood(
    problem: &Likelihood<'_>,
    n_scales: usize,
    n_restarts: usize,
    rng: &mut fastrand::Rng,
) -> Vec<f64> {
    let initial = vec![0.0; n_scales];
    let mut best_cost = problem.neg_log_likelihood(&initial);
    let mut best = initial.clone();

    let mut starts = vec![initial];
    for _ in 0..n_restarts {
        starts.push(
            (0..n_scales)
                .map(|_| rng_util::uniform(rng, LOG_SCALE_MIN, LOG_SCALE_MAX))
                .collect(),
        );
    }

    for start in starts {
        if let Some((param, cost)) = refine(problem, start)
            && cost < best_cost
        {
            best_cost = cost;
            best = param;
        }
    }
    best
}

/// Runs one Nelder-Mead refinement; `None` when the solver fails.
fn refine(problem: &Likelihood<'_>, start: Vec<f64>) -> Option<(Vec<f64>, f64)> {
    let mut simplex = vec![start.clone()];
    for i in 0..start.len() {
        let mut vertex = start.clone();
        vertex[i] += if vertex[i] + 1.0 > LOG_SCALE_MAX { -1.0 } else { 1.0 };
        simplex.push(vertex);
    }
    let solver = NelderMead::new(simplex)
        .with_sd_tolerance(LIKELIHOOD_SD_TOLERANCE)
        .ok()?;
    let result = Executor::new(problem.clone(), solver)
        .configure(|state| state.max_iters(LIKELIHOOD_MAX_ITERS))
        .run()
        .ok()?;
    let state = result.state();
    let param = state.get_best_param()?.clone();
    let cost = state.get_best_cost();
    cost.is_finite().then_some((param, cost))
}

/// Negative log marginal likelihood over log length scales.
#[derive(Clone)]
struct Likelihood<'a> {
    kernel: &'a Kernel,
    x: &'a [Vec<f64>],
    y: &'a DVector<f64>,
    noise: f64,
}

impl Likelihood<'_> {
    fn neg_log_likelihood(&self, log_scales: &[f64]) -> f64 {
        let scales: Vec<f64> = log_scales
            .iter()
            .map(|v| v.clamp(LOG_SCALE_MIN, LOG_SCALE_MAX).exp())
            .collect();
        let k = kernel_matrix(self.kernel, self.x, &scales, self.noise);
        let Some(cholesky) = nalgebra::linalg::Cholesky::new(k) else {
            return f64::INFINITY;
        };
        let alpha = cholesky.solve(self.y);
        let value = -log_likelihood(&cholesky, &alpha, self.y);
        if value.is_finite() { value } else { f64::INFINITY }
    }
}

impl CostFunction for Likelihood<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> core::result::Result<Self::Output, argmin::core::Error> {
        Ok(self.neg_log_likelihood(param))
    }
}

#[allow(clippy::cast_precision_loss)]
fn log_likelihood(
    cholesky: &nalgebra::linalg::Cholesky<f64, nalgebra::Dyn>,
    alpha: &DVector<f64>,
    y: &DVector<f64>,
) -> f64 {
    let n = y.len() as f64;
    let log_det_half: f64 = cholesky.l_dirty().diagonal().iter().map(|d| d.ln()).sum();
    -0.5 * y.dot(alpha) - log_det_half - 0.5 * n * LN_2PI
}

/// Build the kernel matrix `K + σ²I`.
fn kernel_matrix(kernel: &Kernel, x: &[Vec<f64>], length_scales: &[f64], noise: f64) -> DMatrix<f64> {
    let n = x.len();
    DMatrix::from_fn(n, n, |i, j| {
        let k = kernel.eval(&x[i], &x[j], length_scales);
        if i == j { k + noise } else { k }
    })
}

/// A fitted GP posterior ready for predictions.
#[derive(Debug, Clone)]
pub struct FittedGp {
    kernel: Kernel,
    length_scales: Vec<f64>,
    x_train: Vec<Vec<f64>>,
    /// Cholesky factor of `K + σ²I`.
    cholesky: nalgebra::linalg::Cholesky<f64, nalgebra::Dyn>,
    /// `α = (K + σ²I)⁻¹ y`.
    alpha: DVector<f64>,
    y_mean: f64,
    y_std: f64,
    log_marginal_likelihood: f64,
}

impl FittedGp {
    /// Returns the fitted length scales.
    #[must_use]
    pub fn length_scales(&self) -> &[f64] {
        &self.length_scales
    }

    /// Returns the log marginal likelihood of the (standardized) targets.
    #[must_use]
    pub fn log_marginal_likelihood(&self) -> f64 {
        self.log_marginal_likelihood
    }

    /// Returns the kernel the posterior was fitted with.
    #[must_use]
    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    /// Predicts `(mean, std)` for a batch of points, in input order.
    #[must_use]
    pub fn predict(&self, xs: &[Vec<f64>]) -> Vec<(f64, f64)> {
        xs.iter().map(|x| self.predict_one(x)).collect()
    }
}

impl Posterior for FittedGp {
    fn predict_one(&self, x: &[f64]) -> (f64, f64) {
        let k_star = DVector::from_fn(self.x_train.len(), |i, _| {
            self.kernel.eval(x, &self.x_train[i], &self.length_scales)
        });

        let mean = k_star.dot(&self.alpha);

        // k(x, x) = 1 for every kernel
        let v = self.cholesky.solve(&k_star);
        let var = (1.0 - k_star.dot(&v)).max(0.0);

        (self.y_mean + self.y_std * mean, self.y_std * var.sqrt())
    }
}
