#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]

//! Bayesian hyperparameter optimization over mixed categorical, integer and
//! continuous search spaces.
//!
//! A Gaussian Process surrogate is fitted to every configuration evaluated
//! so far, an acquisition function turns its posterior into a utility, and
//! the point with the highest utility is evaluated next. The model being
//! tuned stays outside the crate: a [`ModelAdapter`](model::ModelAdapter)
//! trains it for a parameter setting and a score function rates its
//! predictions.
//!
//! # Getting Started
//!
//! ```
//! use bayesopt::prelude::*;
//! use nalgebra::{DMatrix, DVector};
//!
//! /// Predicts a constant.
//! struct Constant(f64);
//!
//! impl Estimator for Constant {
//!     fn fit(&mut self, _x: &DMatrix<f64>, _y: &DVector<f64>) -> Result<()> {
//!         Ok(())
//!     }
//!     fn predict(&self, x: &DMatrix<f64>) -> Result<DVector<f64>> {
//!         Ok(DVector::from_element(x.nrows(), self.0))
//!     }
//! }
//!
//! let space = SearchSpace::new(vec![ParameterSpec::continuous("c", -5.0, 5.0)]).unwrap();
//! let adapter = EstimatorAdapter::new(|p: &ParamMap| Ok(Constant(p["c"].as_f64().unwrap_or(0.0))));
//! let score = Box::new(|y: &DVector<f64>, y_pred: &DVector<f64>| -(y - y_pred).norm());
//!
//! let mut optimizer = BayesianOptimizer::builder(space, adapter, score)
//!     .seed(1)
//!     .build()
//!     .unwrap();
//!
//! let x = DMatrix::zeros(3, 1);
//! let y = DVector::from_element(3, 1.5);
//! let (best, _model) = optimizer.fit(x, y, None, None, 6, None).unwrap();
//! println!("c = {}", best["c"]);
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`SearchSpace`] | Ordered [`ParameterSpec`](parameter::ParameterSpec)s; converts between named maps, vectors and the numeric encoding. |
//! | [`OptimizationType`] | Categorical, numerical or mixed; picks the kernel and the maximizer. |
//! | [`GaussianProcess`](surrogate::GaussianProcess) | Surrogate regression with maximum-likelihood length scales. |
//! | [`AcquisitionFunction`] | UCB, EI, generalized EI or PI over the posterior. |
//! | [`AcquisitionMaximizer`](maximizer::AcquisitionMaximizer) | L-BFGS, exhaustive grid or simulated annealing. |
//! | [`BayesianOptimizer`] | The propose → evaluate → record loop. |
//! | [`History`] | Every evaluated configuration with its score. |
//!
//! # Kernels and maximizers
//!
//! | Space | Kernel | Maximizer |
//! |-------|--------|-----------|
//! | all categorical | Hamming | exhaustive grid up to 1000 combinations, annealing above |
//! | all numeric | Matérn 5/2 | bounded L-BFGS |
//! | mixed | weighted Hamming | simulated annealing |
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing), including the non-convergence warning | on |
//! | `serde` | `Serialize`/`Deserialize` on public types, [`History::save`]/[`History::load`] | off |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::warn!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_warn {
    ($($arg:tt)*) => { tracing::warn!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_warn {
    ($($arg:tt)*) => {};
}

pub mod acquisition;
mod error;
pub mod evaluation;
mod history;
pub mod kernel;
pub mod kfold;
pub mod maximizer;
pub mod model;
mod optimizer;
pub mod param;
pub mod parameter;
mod rng_util;
mod space;
pub mod surrogate;
mod types;

pub use acquisition::AcquisitionFunction;
pub use error::{Error, Result};
#[cfg(feature = "serde")]
pub use history::HistorySnapshot;
pub use history::{History, HistoryEntry};
pub use optimizer::{
    BayesianOptimizer, BayesianOptimizerBuilder, DEFAULT_N_RESTARTS, OptimizerConfig,
};
pub use space::SearchSpace;
pub use types::OptimizationType;

/// Convenient wildcard import for the most common types.
///
/// ```
/// use bayesopt::prelude::*;
/// ```
pub mod prelude {
    pub use crate::acquisition::AcquisitionFunction;
    pub use crate::error::{Error, Result};
    pub use crate::evaluation::Validation;
    pub use crate::history::{History, HistoryEntry};
    pub use crate::kernel::Kernel;
    pub use crate::kfold::{FoldSplitter, KFold};
    pub use crate::maximizer::{AcquisitionMaximizer, AnnealingConfig, Maximum};
    pub use crate::model::{
        Booster, BoostingAdapter, BoostingTrainer, Dataset, Estimator, EstimatorAdapter,
        ModelAdapter, ScoreFn,
    };
    pub use crate::optimizer::{BayesianOptimizer, BayesianOptimizerBuilder, OptimizerConfig};
    pub use crate::param::{CategoryValue, ParamMap, ParamValue, ParameterVector};
    pub use crate::parameter::{ParamKind, ParameterSpec};
    pub use crate::space::SearchSpace;
    pub use crate::types::OptimizationType;
}
