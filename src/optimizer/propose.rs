use crate::error::{Error, Result};
use crate::model::ModelAdapter;
use crate::param::ParameterVector;
use crate::surrogate::GaussianProcess;

use super::{BayesianOptimizer, start_vector};

impl<A: ModelAdapter> BayesianOptimizer<A> {
    /// Proposes the next configuration to evaluate.
    ///
    /// With an empty history this is the initial point (see
    /// [`initial_point`](Self::initial_point)). Otherwise the surrogate is
    /// refitted on the whole history and the acquisition function is
    /// maximized from up to `n_restarts_optimizer` start vectors; the first
    /// converged attempt wins. When none converges the last start vector is
    /// returned and [`non_convergence_count`](Self::non_convergence_count)
    /// is incremented.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Surrogate`](crate::Error::Surrogate) when the
    /// surrogate cannot be fitted, or a maximizer setup error.
    pub fn propose(&mut self) -> Result<ParameterVector> {
        if self.history.is_empty() {
            return self.initial_point();
        }

        let (mut x, y) = self.history.training_data(&self.space)?;
        if self.config.normalize {
            for row in &mut x {
                self.space.normalize(row);
            }
        }

        let mut gp = GaussianProcess::new(self.kernel.clone())
            .noise(self.config.noise)
            .normalize_y(self.config.normalize_y)
            .n_restarts(self.config.n_restarts_optimizer)
            .seed(self.rng.u64(..));
        let posterior = gp.fit(&x, &y)?;

        let best = self
            .history
            .best_score()
            .ok_or(Error::NoHistory)?;
        let bound = self.config.acquisition.bind(&posterior, best);
        let bound = if self.config.normalize {
            bound.normalized_by(&self.space)
        } else {
            bound
        };
        let acquisition = |x: &[f64]| bound.value(x);

        let attempts = self.config.n_restarts_optimizer.max(1);
        let mut last_start = Vec::new();
        for _ in 0..attempts {
            let start = start_vector(self.start.as_deref(), &self.space, &mut self.rng);
            let result = self.maximizer.maximize(&acquisition, &start)?;
            if result.success {
                trace_debug!(utility = result.value, "acquisition maximized");
                self.last_success = Some(true);
                return self.space.decode(&result.x);
            }
            last_start = start;
        }

        self.non_convergence_count += 1;
        self.last_success = Some(false);
        trace_warn!(
            attempts,
            count = self.non_convergence_count,
            "optimizer did not converge, continuing with randomly sampled point"
        );
        self.space.decode(&last_start)
    }

    /// Returns the point evaluated first: the configured start values, or a
    /// uniformly random point of the space.
    ///
    /// # Errors
    ///
    /// Never fails for a validated space; the `Result` mirrors
    /// [`propose`](Self::propose).
    pub fn initial_point(&mut self) -> Result<ParameterVector> {
        let start = start_vector(self.start.as_deref(), &self.space, &mut self.rng);
        self.space.decode(&start)
    }

    /// Appends an evaluated configuration to the history.
    ///
    /// # Errors
    ///
    /// Returns an error when `params` does not fit the search space; nothing
    /// is recorded in that case.
    pub fn record(&mut self, score: f64, params: ParameterVector) -> Result<()> {
        self.space.encode(&params)?;
        let previous_best = self.history.best_score();
        self.history.push(score, params);

        trace_info!(iteration = self.history.len(), score, "evaluation recorded");
        if previous_best.is_none_or(|best| score > best) {
            trace_info!(score, "new best score");
        }
        Ok(())
    }
}
