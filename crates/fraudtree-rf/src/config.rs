//! Configuration builder for classification forest training.

use crate::error::RfError;
use crate::forest::RandomForest;

/// Strategy for determining how many features each split considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FeatureSubset {
    /// `floor(sqrt(n_features))`, at least 1.
    Sqrt,
    /// A fixed count, clamped to the number of available features.
    Fixed(usize),
    /// All features.
    All,
}

impl FeatureSubset {
    /// Resolve the strategy to a concrete count for `n_features` columns.
    ///
    /// A fixed count larger than `n_features` is clamped rather than rejected.
    #[must_use]
    pub fn resolve(self, n_features: usize) -> usize {
        let resolved = match self {
            FeatureSubset::Sqrt => (n_features as f64).sqrt().floor() as usize,
            FeatureSubset::Fixed(n) => n,
            FeatureSubset::All => n_features,
        };
        resolved.clamp(1, n_features.max(1))
    }
}

/// Configuration for classification forest training.
///
/// Construct via [`RandomForestConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter           | Default                 |
/// |---------------------|-------------------------|
/// | `max_depth`         | 10                      |
/// | `min_samples_split` | 2                       |
/// | `feature_subset`    | `Sqrt`                  |
/// | `sample_size`       | `None` (dataset size)   |
/// | `seed`              | 42                      |
#[derive(Debug, Clone)]
pub struct RandomForestConfig {
    pub(crate) n_trees: usize,
    pub(crate) max_depth: usize,
    pub(crate) min_samples_split: usize,
    pub(crate) feature_subset: FeatureSubset,
    pub(crate) sample_size: Option<usize>,
    pub(crate) seed: u64,
}

impl RandomForestConfig {
    /// Create a new config with the given number of trees.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InvalidTreeCount`] if `n_trees` is zero.
    pub fn new(n_trees: usize) -> Result<Self, RfError> {
        if n_trees == 0 {
            return Err(RfError::InvalidTreeCount { n_trees });
        }
        Ok(Self {
            n_trees,
            max_depth: 10,
            min_samples_split: 2,
            feature_subset: FeatureSubset::Sqrt,
            sample_size: None,
            seed: 42,
        })
    }

    // --- Setters ---

    /// Set the maximum tree depth (root is depth 0).
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the minimum number of samples required to attempt a split.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    /// Set the feature subset strategy used at each split.
    #[must_use]
    pub fn with_feature_subset(mut self, feature_subset: FeatureSubset) -> Self {
        self.feature_subset = feature_subset;
        self
    }

    /// Set the bootstrap sample size. `None` draws as many rows as the dataset has.
    #[must_use]
    pub fn with_sample_size(mut self, sample_size: Option<usize>) -> Self {
        self.sample_size = sample_size;
        self
    }

    /// Set the random seed for reproducibility.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    // --- Getters ---

    /// Return the number of trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    /// Return the maximum depth limit.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Return the minimum samples required to split a node.
    #[must_use]
    pub fn min_samples_split(&self) -> usize {
        self.min_samples_split
    }

    /// Return the feature subset strategy.
    #[must_use]
    pub fn feature_subset(&self) -> FeatureSubset {
        self.feature_subset
    }

    /// Return the explicit bootstrap sample size, if any.
    #[must_use]
    pub fn sample_size(&self) -> Option<usize> {
        self.sample_size
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
    /// | Variant                               | When                              |
    /// |---------------------------------------|-----------------------------------|
    /// | [`RfError::InvalidTreeCount`]         | `n_trees` is zero                 |
    /// | [`RfError::InvalidMaxDepth`]          | `max_depth` is zero               |
    /// | [`RfError::InvalidMinSamplesSplit`]   | `min_samples_split` is zero       |
    /// | [`RfError::InvalidFeatureSubsetSize`] | `FeatureSubset::Fixed(0)`         |
    /// | [`RfError::InvalidSampleSize`]        | `sample_size` is `Some(0)`        |
    pub fn validate(&self) -> Result<(), RfError> {
        if self.n_trees == 0 {
            return Err(RfError::InvalidTreeCount {
                n_trees: self.n_trees,
            });
        }
        if self.max_depth == 0 {
            return Err(RfError::InvalidMaxDepth {
                max_depth: self.max_depth,
            });
        }
        if self.min_samples_split == 0 {
            return Err(RfError::InvalidMinSamplesSplit {
                min_samples_split: self.min_samples_split,
            });
        }
        if let FeatureSubset::Fixed(0) = self.feature_subset {
            return Err(RfError::InvalidFeatureSubsetSize {
                feature_subset_size: 0,
            });
        }
        if let Some(0) = self.sample_size {
            return Err(RfError::InvalidSampleSize { sample_size: 0 });
        }
        Ok(())
    }

    /// Train a classification forest on the provided dataset.
    ///
    /// `features[sample_idx][feature_idx]` is row-major.
    /// `labels[sample_idx]` holds zero-based class labels.
    ///
    /// # Errors
    ///
    /// Any error from [`validate`](Self::validate), plus:
    ///
    /// | Variant                           | When                                   |
    /// |-----------------------------------|----------------------------------------|
    /// | [`RfError::EmptyDataset`]         | `features` is empty                    |
    /// | [`RfError::ZeroFeatures`]         | rows have zero feature columns         |
    /// | [`RfError::FeatureCountMismatch`] | rows have inconsistent lengths         |
    /// | [`RfError::LabelCountMismatch`]   | `labels.len() != features.len()`       |
    /// | [`RfError::NonFiniteValue`]       | any value is NaN or infinite           |
    pub fn fit(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<RandomForest, RfError> {
        crate::forest::train(self, features, labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqrt_of_four_features_is_two() {
        assert_eq!(FeatureSubset::Sqrt.resolve(4), 2);
    }

    #[test]
    fn sqrt_floors() {
        assert_eq!(FeatureSubset::Sqrt.resolve(8), 2);
        assert_eq!(FeatureSubset::Sqrt.resolve(1), 1);
    }

    #[test]
    fn fixed_is_clamped_to_available_features() {
        assert_eq!(FeatureSubset::Fixed(9).resolve(4), 4);
    }

    #[test]
    fn zero_trees_rejected() {
        let err = RandomForestConfig::new(0).unwrap_err();
        assert!(matches!(err, RfError::InvalidTreeCount { n_trees: 0 }));
        assert!(err.is_configuration());
    }

    #[test]
    fn validate_catches_each_bad_parameter() {
        let base = RandomForestConfig::new(3).unwrap();
        assert!(base.clone().validate().is_ok());
        assert!(matches!(
            base.clone().with_max_depth(0).validate(),
            Err(RfError::InvalidMaxDepth { .. })
        ));
        assert!(matches!(
            base.clone().with_min_samples_split(0).validate(),
            Err(RfError::InvalidMinSamplesSplit { .. })
        ));
        assert!(matches!(
            base.clone()
                .with_feature_subset(FeatureSubset::Fixed(0))
                .validate(),
            Err(RfError::InvalidFeatureSubsetSize { .. })
        ));
        assert!(matches!(
            base.with_sample_size(Some(0)).validate(),
            Err(RfError::InvalidSampleSize { .. })
        ));
    }

    #[test]
    fn defaults_match_table() {
        let config = RandomForestConfig::new(100).unwrap();
        assert_eq!(config.max_depth(), 10);
        assert_eq!(config.min_samples_split(), 2);
        assert_eq!(config.feature_subset(), FeatureSubset::Sqrt);
        assert_eq!(config.sample_size(), None);
        assert_eq!(config.seed(), 42);
    }
}
