//! Request-level hyperparameters for each ensemble kind.

use fraudtree_iforest::{AnomalyThreshold, IForestError, IsolationForestConfig, IsolationSettings};
use fraudtree_rf::{FeatureSubset, ForestSettings, RandomForestConfig, RfError};

/// Isolation forest request parameters.
///
/// | Field         | Default |
/// |---------------|---------|
/// | `tree_count`  | 120     |
/// | `sample_size` | 256     |
/// | `threshold`   | 0.55    |
/// | `max_depth`   | `None` (`ceil(log2(sample_size))`) |
/// | `seed`        | 42      |
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IsolationParams {
    /// Number of isolation trees.
    pub tree_count: usize,
    /// Rows drawn without replacement per tree.
    pub sample_size: usize,
    /// Score at or above which a record is flagged.
    pub threshold: f64,
    /// Explicit depth limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
    /// Master seed.
    pub seed: u64,
}

impl Default for IsolationParams {
    fn default() -> Self {
        Self {
            tree_count: 120,
            sample_size: 256,
            threshold: AnomalyThreshold::DEFAULT.value(),
            max_depth: None,
            seed: 42,
        }
    }
}

impl IsolationParams {
    /// Build and validate the training config.
    ///
    /// # Errors
    ///
    /// Any configuration error from [`IsolationForestConfig::validate`].
    pub fn config(&self) -> Result<IsolationForestConfig, IForestError> {
        let config = IsolationForestConfig::new(self.tree_count)?
            .with_sample_size(self.sample_size)
            .with_max_depth(self.max_depth)
            .with_seed(self.seed);
        config.validate()?;
        Ok(config)
    }

    /// Validate and wrap the flagging threshold.
    ///
    /// # Errors
    ///
    /// Returns [`IForestError::InvalidThreshold`] unless `0 < threshold <= 1`.
    pub fn threshold(&self) -> Result<AnomalyThreshold, IForestError> {
        AnomalyThreshold::new(self.threshold)
    }

    /// Describe a stored model as the parameters it was trained with.
    pub(crate) fn from_settings(settings: &IsolationSettings, threshold: AnomalyThreshold) -> Self {
        Self {
            tree_count: settings.tree_count,
            sample_size: settings.sample_size,
            threshold: threshold.value(),
            max_depth: Some(settings.max_depth),
            seed: settings.seed,
        }
    }
}

/// Classification forest request parameters.
///
/// | Field                 | Default                 |
/// |-----------------------|-------------------------|
/// | `n_trees`             | 100                     |
/// | `max_depth`           | 10                      |
/// | `min_samples_split`   | 2                       |
/// | `feature_subset_size` | `None` (`floor(sqrt(D))`) |
/// | `sample_size`         | `None` (dataset size)   |
/// | `seed`                | 42                      |
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ClassificationParams {
    /// Number of trees.
    pub n_trees: usize,
    /// Maximum tree depth.
    pub max_depth: usize,
    /// Minimum rows at a node to attempt a split.
    pub min_samples_split: usize,
    /// Features considered per split.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_subset_size: Option<usize>,
    /// Bootstrap draws per tree.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_size: Option<usize>,
    /// Master seed.
    pub seed: u64,
}

impl Default for ClassificationParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 10,
            min_samples_split: 2,
            feature_subset_size: None,
            sample_size: None,
            seed: 42,
        }
    }
}

impl ClassificationParams {
    /// Build and validate the training config.
    ///
    /// # Errors
    ///
    /// Any configuration error from [`RandomForestConfig::validate`].
    pub fn config(&self) -> Result<RandomForestConfig, RfError> {
        let feature_subset = self
            .feature_subset_size
            .map_or(FeatureSubset::Sqrt, FeatureSubset::Fixed);
        let config = RandomForestConfig::new(self.n_trees)?
            .with_max_depth(self.max_depth)
            .with_min_samples_split(self.min_samples_split)
            .with_feature_subset(feature_subset)
            .with_sample_size(self.sample_size)
            .with_seed(self.seed);
        config.validate()?;
        Ok(config)
    }

    /// Describe a stored model as the parameters it was trained with.
    pub(crate) fn from_settings(settings: &ForestSettings) -> Self {
        Self {
            n_trees: settings.n_trees,
            max_depth: settings.max_depth,
            min_samples_split: settings.min_samples_split,
            feature_subset_size: Some(settings.feature_subset_size),
            sample_size: Some(settings.sample_size),
            seed: settings.seed,
        }
    }
}
