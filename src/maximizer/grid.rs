//! Exhaustive maximization over fully categorical spaces.

use super::annealing::{AnnealingConfig, AnnealingMaximizer};
use super::{AcquisitionMaximizer, Maximum, check_len};
use crate::error::Result;
use crate::space::SearchSpace;

/// Largest number of category combinations evaluated exhaustively.
pub const DEFAULT_GRID_THRESHOLD: usize = 1000;

/// Maximizer for spaces where every parameter is categorical.
///
/// When the cartesian product of all categories has at most `threshold`
/// points, every point is evaluated and the first maximum wins; that search
/// always succeeds and ignores the start vector. Larger grids are handed to
/// an [`AnnealingMaximizer`].
///
/// # Examples
///
/// ```
/// use bayesopt::SearchSpace;
/// use bayesopt::maximizer::{AcquisitionMaximizer, AnnealingConfig, CategoricalMaximizer};
/// use bayesopt::parameter::ParameterSpec;
///
/// let space = SearchSpace::new(vec![
///     ParameterSpec::categorical("a", [1_i64, 2, 3]),
///     ParameterSpec::categorical("b", [true, false]),
/// ])
/// .unwrap();
/// let maximizer = CategoricalMaximizer::new(&space, 1000, AnnealingConfig::default(), None);
///
/// let result = maximizer.maximize(&|x| x[0] - x[1], &[0.0, 0.0]).unwrap();
/// assert!(result.success);
/// assert_eq!(result.x, vec![2.0, 0.0]);
/// ```
pub struct CategoricalMaximizer {
    grid: Option<Vec<Vec<f64>>>,
    fallback: AnnealingMaximizer,
    n_dims: usize,
}

impl CategoricalMaximizer {
    /// Creates a maximizer for `space`, enumerating the grid up front when
    /// it holds at most `threshold` combinations.
    #[must_use]
    pub fn new(
        space: &SearchSpace,
        threshold: usize,
        annealing: AnnealingConfig,
        seed: Option<u64>,
    ) -> Self {
        Self {
            grid: space.categorical_grid(threshold),
            fallback: AnnealingMaximizer::new(space, annealing, seed),
            n_dims: space.len(),
        }
    }

    /// Whether the search is exhaustive.
    #[must_use]
    pub fn is_exhaustive(&self) -> bool {
        self.grid.is_some()
    }
}

impl AcquisitionMaximizer for CategoricalMaximizer {
    fn maximize(&self, acquisition: &dyn Fn(&[f64]) -> f64, start: &[f64]) -> Result<Maximum> {
        check_len(self.n_dims, start.len())?;

        let Some(grid) = &self.grid else {
            return self.fallback.maximize(acquisition, start);
        };

        let mut best: Option<(&Vec<f64>, f64)> = None;
        for point in grid {
            let value = acquisition(point);
            if value.is_nan() {
                continue;
            }
            if best.is_none_or(|(_, b)| value > b) {
                best = Some((point, value));
            }
        }

        // A grid where every utility is NaN still has a defined answer.
        let (x, value) = match best {
            Some((point, value)) => (point.clone(), value),
            None => (grid.first().cloned().unwrap_or_default(), f64::NAN),
        };
        Ok(Maximum {
            success: true,
            x,
            value,
        })
    }
}
