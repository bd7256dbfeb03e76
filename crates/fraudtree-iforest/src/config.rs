//! Configuration builder for isolation forest training.

use crate::error::IForestError;
use crate::forest::IsolationForest;

/// Configuration for isolation forest training.
///
/// Construct via [`IsolationForestConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter     | Default                          |
/// |---------------|----------------------------------|
/// | `sample_size` | 256                              |
/// | `max_depth`   | `None` (`ceil(log2(sample_size))`) |
/// | `seed`        | 42                               |
#[derive(Debug, Clone)]
pub struct IsolationForestConfig {
    pub(crate) tree_count: usize,
    pub(crate) sample_size: usize,
    pub(crate) max_depth: Option<usize>,
    pub(crate) seed: u64,
}

impl IsolationForestConfig {
    /// Create a new config with the given number of trees.
    ///
    /// # Errors
    ///
    /// Returns [`IForestError::InvalidTreeCount`] if `tree_count` is zero.
    pub fn new(tree_count: usize) -> Result<Self, IForestError> {
        if tree_count == 0 {
            return Err(IForestError::InvalidTreeCount { tree_count });
        }
        Ok(Self {
            tree_count,
            sample_size: 256,
            max_depth: None,
            seed: 42,
        })
    }

    /// Set the number of rows drawn (without replacement) per tree.
    #[must_use]
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    /// Set the depth limit. `None` derives `ceil(log2(sample_size))`.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the random seed for reproducibility.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the number of trees.
    #[must_use]
    pub fn tree_count(&self) -> usize {
        self.tree_count
    }

    /// Return the per-tree sub-sample size.
    #[must_use]
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Return the explicit depth limit, if any.
    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Check every hyperparameter without touching any data.
    ///
    /// # Errors
    ///
    /// | Variant                             | When                  |
    /// |-------------------------------------|-----------------------|
    /// | [`IForestError::InvalidTreeCount`]  | `tree_count` is zero  |
    /// | [`IForestError::InvalidSampleSize`] | `sample_size` is zero |
    pub fn validate(&self) -> Result<(), IForestError> {
        if self.tree_count == 0 {
            return Err(IForestError::InvalidTreeCount {
                tree_count: self.tree_count,
            });
        }
        if self.sample_size == 0 {
            return Err(IForestError::InvalidSampleSize {
                sample_size: self.sample_size,
            });
        }
        Ok(())
    }

    /// Train an isolation forest on the provided row-major dataset.
    ///
    /// # Errors
    ///
    /// Any error from [`validate`](Self::validate), plus:
    ///
    /// | Variant                                | When                           |
    /// |----------------------------------------|--------------------------------|
    /// | [`IForestError::EmptyDataset`]         | `features` is empty            |
    /// | [`IForestError::ZeroFeatures`]         | rows have zero feature columns |
    /// | [`IForestError::FeatureCountMismatch`] | rows have inconsistent lengths |
    /// | [`IForestError::NonFiniteValue`]       | any value is NaN or infinite   |
    pub fn fit(&self, features: &[Vec<f64>]) -> Result<IsolationForest, IForestError> {
        crate::forest::train(self, features)
    }
}
