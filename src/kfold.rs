//! K-fold splitting of the training data.

use crate::error::{Error, Result};
use crate::model::Dataset;

/// Produces train/test index pairs for cross-validation.
pub trait FoldSplitter: Send + Sync {
    /// Splits the sample indices of `data` into `n_folds` train/test pairs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFolds`] when the data cannot be split into
    /// `n_folds` non-empty folds.
    fn split(&self, n_folds: usize, data: &Dataset) -> Result<Vec<Fold>>;
}

/// One train/test split.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fold {
    /// Indices used for training.
    pub train: Vec<usize>,
    /// Indices held out for scoring.
    pub test: Vec<usize>,
}

/// Contiguous k-fold splitting, optionally shuffled.
///
/// The first `n_samples % n_folds` folds hold one sample more than the rest.
///
/// # Examples
///
/// ```
/// use bayesopt::kfold::KFold;
///
/// let folds = KFold::new().folds(3, 7).unwrap();
/// let sizes: Vec<usize> = folds.iter().map(|f| f.test.len()).collect();
/// assert_eq!(sizes, vec![3, 2, 2]);
/// assert_eq!(folds[1].test, vec![3, 4]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct KFold {
    shuffle_seed: Option<u64>,
}

impl KFold {
    /// Creates an unshuffled splitter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shuffles sample order with `seed` before splitting.
    #[must_use]
    pub fn shuffled(seed: u64) -> Self {
        Self {
            shuffle_seed: Some(seed),
        }
    }

    /// Splits `n_samples` indices into `n_folds` train/test pairs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFolds`] when `n_folds < 2` or there are
    /// fewer samples than folds.
    pub fn folds(&self, n_folds: usize, n_samples: usize) -> Result<Vec<Fold>> {
        if n_folds < 2 || n_folds > n_samples {
            return Err(Error::InvalidFolds { n_folds, n_samples });
        }

        let mut indices: Vec<usize> = (0..n_samples).collect();
        if let Some(seed) = self.shuffle_seed {
            fastrand::Rng::with_seed(seed).shuffle(&mut indices);
        }

        let base = n_samples / n_folds;
        let remainder = n_samples % n_folds;
        let mut folds = Vec::with_capacity(n_folds);
        let mut start = 0;
        for i in 0..n_folds {
            let size = if i < remainder { base + 1 } else { base };
            let end = start + size;
            folds.push(Fold {
                train: indices[..start]
                    .iter()
                    .chain(&indices[end..])
                    .copied()
                    .collect(),
                test: indices[start..end].to_vec(),
            });
            start = end;
        }
        Ok(folds)
    }
}

impl FoldSplitter for KFold {
    fn split(&self, n_folds: usize, data: &Dataset) -> Result<Vec<Fold>> {
        self.folds(n_folds, data.n_samples())
    }
}
