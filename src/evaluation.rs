//! How each proposal is scored: on the training set, on a hold-out set, or
//! by k-fold cross-validation.

use nalgebra::{DMatrix, DVector};

use crate::error::{Error, Result};
use crate::kfold::FoldSplitter;
use crate::model::{Dataset, ModelAdapter, ScoreFn};
use crate::param::ParamMap;

/// A validated choice of evaluation data.
#[derive(Clone, Debug, PartialEq)]
pub enum Validation {
    /// Train and score on the training data itself.
    TrainingSet,
    /// Train on the training data, score on a separate test set.
    HoldOut(Dataset),
    /// Average the score over `n_folds` train/test splits of the training data.
    CrossValidation {
        /// Number of folds, at least 2.
        n_folds: usize,
    },
}

impl Validation {
    /// Resolves the optional test set and fold count of a run.
    ///
    /// With neither, the model is scored on `train`. A test set must come
    /// with both its features and its targets, and cannot be combined with
    /// a fold count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingValue`] when only one of `x_test` / `y_test`
    /// is given, [`Error::ConflictingValidation`] when a test set and a
    /// fold count are both given, [`Error::InvalidFolds`] when the fold
    /// count cannot split `train`, and [`Error::DimensionMismatch`] when the
    /// test set is malformed.
    pub fn new(
        train: &Dataset,
        x_test: Option<DMatrix<f64>>,
        y_test: Option<DVector<f64>>,
        n_folds: Option<usize>,
    ) -> Result<Self> {
        match (x_test, y_test, n_folds) {
            (None, None, None) => Ok(Self::TrainingSet),
            (None, None, Some(n_folds)) => {
                if n_folds < 2 || n_folds > train.n_samples() {
                    return Err(Error::InvalidFolds {
                        n_folds,
                        n_samples: train.n_samples(),
                    });
                }
                Ok(Self::CrossValidation { n_folds })
            }
            (Some(_), None, _) | (None, Some(_), _) => Err(Error::MissingValue),
            (Some(_), Some(_), Some(_)) => Err(Error::ConflictingValidation),
            (Some(x), Some(y), None) => {
                if x.ncols() != train.n_features() {
                    return Err(Error::DimensionMismatch {
                        expected: train.n_features(),
                        got: x.ncols(),
                    });
                }
                Ok(Self::HoldOut(Dataset::new(x, y)?))
            }
        }
    }
}

/// Scores one parameter setting.
///
/// Cross-validation trains once per fold and returns the mean fold score.
///
/// # Errors
///
/// Returns the adapter's or splitter's error unchanged.
#[allow(clippy::cast_precision_loss)]
pub fn evaluate_params<A: ModelAdapter + ?Sized>(
    adapter: &A,
    score_fn: &ScoreFn,
    splitter: &dyn FoldSplitter,
    params: &ParamMap,
    train: &Dataset,
    validation: &Validation,
) -> Result<f64> {
    match validation {
        Validation::TrainingSet => {
            let y_pred = adapter.fit_predict(params, train, train)?;
            Ok(score_fn(train.y(), &y_pred))
        }
        Validation::HoldOut(test) => {
            let y_pred = adapter.fit_predict(params, train, test)?;
            Ok(score_fn(test.y(), &y_pred))
        }
        Validation::CrossValidation { n_folds } => {
            let folds = splitter.split(*n_folds, train)?;
            let mut total = 0.0;
            for fold in &folds {
                let fold_train = train.select(&fold.train);
                let fold_test = train.select(&fold.test);
                let y_pred = adapter.fit_predict(params, &fold_train, &fold_test)?;
                total += score_fn(fold_test.y(), &y_pred);
            }
            Ok(total / folds.len() as f64)
        }
    }
}
