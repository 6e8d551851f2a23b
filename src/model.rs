//! The model-evaluation collaborator.
//!
//! The optimizer never trains anything itself. It hands a parameter
//! dictionary and a train/test split to a [`ModelAdapter`], gets test-set
//! predictions back, and scores them with a [`ScoreFn`]. Two adapters cover
//! the usual model families:
//!
//! - [`EstimatorAdapter`] wraps any [`Estimator`] (fit on features and
//!   targets, then predict) built fresh from each parameter dictionary.
//! - [`BoostingAdapter`] wraps a [`BoostingTrainer`] that takes the number
//!   of boosting rounds from the `n_estimators` parameter and monitors the
//!   test split as its evaluation set.

use core::marker::PhantomData;

use nalgebra::{DMatrix, DVector};

use crate::error::{Error, Result};
use crate::param::{CategoryValue, ParamMap, ParamValue};

/// Parameter holding the number of boosting rounds.
pub const N_ESTIMATORS: &str = "n_estimators";

/// Score function `(y_true, y_pred) -> score`; the optimizer maximizes it.
pub type ScoreFn = Box<dyn Fn(&DVector<f64>, &DVector<f64>) -> f64 + Send + Sync>;

/// Features and targets with one row per sample.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    x: DMatrix<f64>,
    y: DVector<f64>,
}

impl Dataset {
    /// Pairs a feature matrix with its targets.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] when the row count differs from
    /// the target count.
    pub fn new(x: DMatrix<f64>, y: DVector<f64>) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(Error::DimensionMismatch {
                expected: x.nrows(),
                got: y.len(),
            });
        }
        Ok(Self { x, y })
    }

    /// Builds a dataset from feature rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] when rows have different lengths
    /// or their count differs from the target count.
    pub fn from_rows(rows: &[Vec<f64>], y: Vec<f64>) -> Result<Self> {
        let n_features = rows.first().map_or(0, Vec::len);
        if let Some(row) = rows.iter().find(|r| r.len() != n_features) {
            return Err(Error::DimensionMismatch {
                expected: n_features,
                got: row.len(),
            });
        }
        let x = DMatrix::from_fn(rows.len(), n_features, |i, j| rows[i][j]);
        Self::new(x, DVector::from_vec(y))
    }

    /// Returns the feature matrix.
    #[must_use]
    pub fn x(&self) -> &DMatrix<f64> {
        &self.x
    }

    /// Returns the targets.
    #[must_use]
    pub fn y(&self) -> &DVector<f64> {
        &self.y
    }

    /// Returns the number of samples.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.y.len()
    }

    /// Returns the number of features.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    /// Returns the samples at `indices`, in that order.
    #[must_use]
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            x: self.x.select_rows(indices),
            y: self.y.select_rows(indices),
        }
    }
}

/// Trains a model for one parameter setting and predicts a test split.
pub trait ModelAdapter {
    /// The untrained model handed back for the best parameters.
    type Model;

    /// Creates an untrained model configured with `params`.
    ///
    /// # Errors
    ///
    /// Returns an error when `params` cannot configure a model.
    fn build(&self, params: &ParamMap) -> Result<Self::Model>;

    /// Trains on `train` with `params` and returns predictions for `test`.
    ///
    /// # Errors
    ///
    /// Returns an error when training or prediction fails; the optimizer
    /// treats this as fatal.
    fn fit_predict(&self, params: &ParamMap, train: &Dataset, test: &Dataset)
    -> Result<DVector<f64>>;
}

/// A model with a fit/predict interface.
pub trait Estimator {
    /// Trains the model in place.
    ///
    /// # Errors
    ///
    /// Returns an error when training fails.
    fn fit(&mut self, x: &DMatrix<f64>, y: &DVector<f64>) -> Result<()>;

    /// Predicts one target per row of `x`.
    ///
    /// # Errors
    ///
    /// Returns an error when prediction fails.
    fn predict(&self, x: &DMatrix<f64>) -> Result<DVector<f64>>;
}

/// Adapts a factory of [`Estimator`]s to [`ModelAdapter`].
///
/// The factory is called with the parameter dictionary for every
/// evaluation, so no state leaks between evaluations.
///
/// # Examples
///
/// ```
/// use bayesopt::model::{Dataset, Estimator, EstimatorAdapter, ModelAdapter};
/// use bayesopt::param::{ParamMap, ParamValue};
/// use nalgebra::{DMatrix, DVector};
///
/// struct Constant(f64);
///
/// impl Estimator for Constant {
///     fn fit(&mut self, _x: &DMatrix<f64>, _y: &DVector<f64>) -> bayesopt::Result<()> {
///         Ok(())
///     }
///     fn predict(&self, x: &DMatrix<f64>) -> bayesopt::Result<DVector<f64>> {
///         Ok(DVector::from_element(x.nrows(), self.0))
///     }
/// }
///
/// let adapter = EstimatorAdapter::new(|p: &ParamMap| {
///     Ok(Constant(p["c"].as_f64().unwrap_or_default()))
/// });
/// let data = Dataset::from_rows(&[vec![1.0], vec![2.0]], vec![0.0, 1.0]).unwrap();
/// let params = ParamMap::from([("c".to_owned(), ParamValue::Float(0.5))]);
///
/// let y_pred = adapter.fit_predict(&params, &data, &data).unwrap();
/// assert_eq!(y_pred.as_slice(), &[0.5, 0.5]);
/// ```
pub struct EstimatorAdapter<F, E> {
    factory: F,
    _model: PhantomData<fn() -> E>,
}

impl<F, E> EstimatorAdapter<F, E>
where
    F: Fn(&ParamMap) -> Result<E>,
    E: Estimator,
{
    /// Wraps a factory that configures a fresh estimator from parameters.
    #[must_use]
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            _model: PhantomData,
        }
    }
}

impl<F, E> ModelAdapter for EstimatorAdapter<F, E>
where
    F: Fn(&ParamMap) -> Result<E>,
    E: Estimator,
{
    type Model = E;

    fn build(&self, params: &ParamMap) -> Result<E> {
        (self.factory)(params)
    }

    fn fit_predict(
        &self,
        params: &ParamMap,
        train: &Dataset,
        test: &Dataset,
    ) -> Result<DVector<f64>> {
        let mut model = self.build(params)?;
        model.fit(train.x(), train.y())?;
        model.predict(test.x())
    }
}

/// A trained boosted ensemble.
pub trait Booster {
    /// Predicts one target per row of `x`.
    ///
    /// # Errors
    ///
    /// Returns an error when prediction fails.
    fn predict(&self, x: &DMatrix<f64>) -> Result<DVector<f64>>;
}

/// A library entry point that trains boosted ensembles round by round.
pub trait BoostingTrainer {
    /// The trained ensemble.
    type Booster: Booster;

    /// Trains `num_rounds` rounds on `train`, reporting progress on `eval`.
    ///
    /// # Errors
    ///
    /// Returns an error when training fails.
    fn train(
        &self,
        params: &ParamMap,
        train: &Dataset,
        eval: &Dataset,
        num_rounds: usize,
    ) -> Result<Self::Booster>;
}

/// An untrained boosting configuration returned as the best model.
#[derive(Clone, Debug, PartialEq)]
pub struct BoostingModel {
    /// The full parameter dictionary.
    pub params: ParamMap,
    /// Boosting rounds taken from `n_estimators`.
    pub num_rounds: usize,
}

/// Adapts a [`BoostingTrainer`] to [`ModelAdapter`].
pub struct BoostingAdapter<T> {
    trainer: T,
}

impl<T: BoostingTrainer> BoostingAdapter<T> {
    /// Wraps a trainer.
    #[must_use]
    pub fn new(trainer: T) -> Self {
        Self { trainer }
    }

    /// Returns the wrapped trainer.
    #[must_use]
    pub fn trainer(&self) -> &T {
        &self.trainer
    }
}

impl<T: BoostingTrainer> ModelAdapter for BoostingAdapter<T> {
    type Model = BoostingModel;

    fn build(&self, params: &ParamMap) -> Result<BoostingModel> {
        Ok(BoostingModel {
            params: params.clone(),
            num_rounds: num_rounds(params)?,
        })
    }

    fn fit_predict(
        &self,
        params: &ParamMap,
        train: &Dataset,
        test: &Dataset,
    ) -> Result<DVector<f64>> {
        let rounds = num_rounds(params)?;
        let booster = self.trainer.train(params, train, test, rounds)?;
        booster.predict(test.x())
    }
}

/// Reads `n_estimators` as a non-negative round count.
fn num_rounds(params: &ParamMap) -> Result<usize> {
    let value = params
        .get(N_ESTIMATORS)
        .ok_or_else(|| Error::MissingParameter(N_ESTIMATORS.to_owned()))?;
    let rounds = match value {
        ParamValue::Int(v) | ParamValue::Categorical(CategoryValue::Int(v)) => Some(*v),
        _ => None,
    };
    rounds
        .and_then(|v| usize::try_from(v).ok())
        .ok_or_else(|| Error::TypeMismatch {
            name: N_ESTIMATORS.to_owned(),
            reason: format!("expected a non-negative integer, got {value}"),
        })
}
