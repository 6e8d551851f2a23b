use nalgebra::{DMatrix, DVector};

use crate::error::Result;
use crate::evaluation::{Validation, evaluate_params};
use crate::model::{Dataset, ModelAdapter};
use crate::param::{ParamMap, ParameterVector};

use super::BayesianOptimizer;

impl<A: ModelAdapter> BayesianOptimizer<A> {
    /// Runs `n_iters` iterations of *propose → evaluate → record* and returns
    /// the best parameters with an untrained model configured with them.
    ///
    /// Each configuration is scored on the training data when neither a test
    /// set nor `n_folds` is given, on `(x_test, y_test)` when both are
    /// given, and by the mean score over `n_folds` folds otherwise.
    ///
    /// Evaluations are appended to the existing history, so calling `fit`
    /// again continues the search. The non-convergence counter is reset at
    /// the start of every call.
    ///
    /// # Errors
    ///
    /// Fails before anything is evaluated with
    /// [`Error::MissingValue`](crate::Error::MissingValue) when only one of
    /// `x_test` / `y_test` is given,
    /// [`Error::ConflictingValidation`](crate::Error::ConflictingValidation)
    /// when a test set and `n_folds` are both given, and
    /// [`Error::InvalidFolds`](crate::Error::InvalidFolds) for an unusable
    /// fold count. Surrogate and model adapter errors abort the run.
    /// [`Error::NoHistory`](crate::Error::NoHistory) is returned when
    /// `n_iters` is zero and nothing was evaluated before.
    pub fn fit(
        &mut self,
        x_train: DMatrix<f64>,
        y_train: DVector<f64>,
        x_test: Option<DMatrix<f64>>,
        y_test: Option<DVector<f64>>,
        n_iters: usize,
        n_folds: Option<usize>,
    ) -> Result<(ParamMap, A::Model)> {
        let train = Dataset::new(x_train, y_train)?;
        let validation = Validation::new(&train, x_test, y_test, n_folds)?;
        self.fit_with(&train, &validation, n_iters)
    }

    /// Runs the loop against an already validated evaluation setup.
    ///
    /// # Errors
    ///
    /// See [`fit`](Self::fit).
    pub fn fit_with(
        &mut self,
        train: &Dataset,
        validation: &Validation,
        n_iters: usize,
    ) -> Result<(ParamMap, A::Model)> {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!(
            "fit",
            n_iters,
            optimization_type = %self.space.optimization_type(),
            acquisition = %self.config.acquisition
        )
        .entered();

        self.non_convergence_count = 0;
        for iteration in 0..n_iters {
            let params = if iteration == 0 {
                self.initial_point()?
            } else {
                self.propose()?
            };
            let score = self.evaluate(&params, train, validation)?;
            self.record(score, params)?;
        }

        if self.non_convergence_count > 0 {
            trace_info!(
                count = self.non_convergence_count,
                "run finished with non-converged proposals"
            );
        }
        self.best()
    }

    /// Scores one configuration with the model adapter.
    ///
    /// # Errors
    ///
    /// Returns the adapter's error, or an error when `params` does not fit
    /// the search space.
    pub fn evaluate(
        &self,
        params: &ParameterVector,
        train: &Dataset,
        validation: &Validation,
    ) -> Result<f64> {
        let map = self.space.to_map(params)?;
        trace_debug!(params = ?map, "evaluating");
        evaluate_params(
            &self.adapter,
            &self.score_fn,
            self.splitter.as_ref(),
            &map,
            train,
            validation,
        )
    }
}
