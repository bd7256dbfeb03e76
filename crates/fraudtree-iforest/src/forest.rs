//! Isolation forest training and anomaly scoring.

use rand::Rng;
use rand::SeedableRng;
use rand::seq::index;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::config::IsolationForestConfig;
use crate::error::IForestError;
use crate::path::{default_max_depth, normalization_factor};
use crate::threshold::AnomalyThreshold;
use crate::tree::IsolationTree;

/// Hyperparameters a forest was trained with, after defaults were resolved.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IsolationSettings {
    /// Number of trees in the ensemble.
    pub tree_count: usize,
    /// Configured per-tree sub-sample size (also the normalization size).
    pub sample_size: usize,
    /// Depth limit shared by all trees.
    pub max_depth: usize,
    /// Master seed of the training run.
    pub seed: u64,
}

/// A fitted isolation forest.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IsolationForest {
    pub(crate) trees: Vec<IsolationTree>,
    pub(crate) n_features: usize,
    pub(crate) settings: IsolationSettings,
}

fn validate_dataset(features: &[Vec<f64>]) -> Result<usize, IForestError> {
    if features.is_empty() {
        return Err(IForestError::EmptyDataset);
    }
    let n_features = features[0].len();
    if n_features == 0 {
        return Err(IForestError::ZeroFeatures);
    }
    for (sample_index, row) in features.iter().enumerate() {
        if row.len() != n_features {
            return Err(IForestError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        if let Some(feature_index) = row.iter().position(|v| !v.is_finite()) {
            return Err(IForestError::NonFiniteValue {
                sample_index,
                feature_index,
            });
        }
    }
    Ok(n_features)
}

/// Row indices for one tree: a draw without replacement when the dataset is
/// larger than `sample_size`, otherwise every row.
fn subsample(n_samples: usize, sample_size: usize, rng: &mut impl Rng) -> Vec<usize> {
    if n_samples > sample_size {
        index::sample(rng, n_samples, sample_size).into_vec()
    } else {
        (0..n_samples).collect()
    }
}

/// Train the isolation forest.
#[instrument(skip_all, fields(tree_count = config.tree_count, n_samples = features.len()))]
pub(crate) fn train(
    config: &IsolationForestConfig,
    features: &[Vec<f64>],
) -> Result<IsolationForest, IForestError> {
    config.validate()?;
    let n_features = validate_dataset(features)?;

    let n_samples = features.len();
    let max_depth = config
        .max_depth
        .unwrap_or_else(|| default_max_depth(config.sample_size));

    info!(
        tree_count = config.tree_count,
        n_samples,
        n_features,
        sample_size = config.sample_size,
        max_depth,
        "training isolation forest"
    );

    let mut master_rng = ChaCha8Rng::seed_from_u64(config.seed);
    let tree_seeds: Vec<u64> = (0..config.tree_count).map(|_| master_rng.r#gen()).collect();
    let sample_size = config.sample_size;

    let trees: Vec<IsolationTree> = tree_seeds
        .into_par_iter()
        .map(|seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let indices = subsample(n_samples, sample_size, &mut rng);
            IsolationTree::grow(features, &indices, max_depth, &mut rng)
        })
        .collect();

    debug!(
        n_trees_trained = trees.len(),
        total_nodes = trees.iter().map(IsolationTree::n_nodes).sum::<usize>(),
        "isolation trees grown"
    );

    Ok(IsolationForest {
        trees,
        n_features,
        settings: IsolationSettings {
            tree_count: config.tree_count,
            sample_size: config.sample_size,
            max_depth,
            seed: config.seed,
        },
    })
}

impl IsolationForest {
    /// Mean isolation depth of `sample` across all trees.
    ///
    /// # Errors
    ///
    /// Returns [`IForestError::ScoreFeatureMismatch`] when `sample.len() != n_features`.
    pub fn average_path_length(&self, sample: &[f64]) -> Result<f64, IForestError> {
        if sample.len() != self.n_features {
            return Err(IForestError::ScoreFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        let total: f64 = self.trees.iter().map(|t| t.path_length(sample)).sum();
        Ok(total / self.trees.len() as f64)
    }

    /// Anomaly score `2^(-mean_depth / c(sample_size))`, in `(0, 1]`.
    ///
    /// Near 1 means easy to isolate (anomalous); lower values blend into
    /// dense regions. Normalization uses the configured `sample_size`, not
    /// the number of rows each tree actually saw.
    ///
    /// # Errors
    ///
    /// Returns [`IForestError::ScoreFeatureMismatch`] when `sample.len() != n_features`.
    pub fn score(&self, sample: &[f64]) -> Result<f64, IForestError> {
        let mean_depth = self.average_path_length(sample)?;
        let c = normalization_factor(self.settings.sample_size);
        Ok(2f64.powf(-mean_depth / c))
    }

    /// Score a batch of samples in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`IForestError::ScoreFeatureMismatch`] if any sample has the wrong width.
    pub fn score_batch(&self, features: &[Vec<f64>]) -> Result<Vec<f64>, IForestError> {
        features
            .into_par_iter()
            .map(|sample| self.score(sample))
            .collect()
    }

    /// Return `true` when `sample` scores at or above `threshold`.
    ///
    /// # Errors
    ///
    /// Returns [`IForestError::ScoreFeatureMismatch`] when `sample.len() != n_features`.
    pub fn detect(&self, sample: &[f64], threshold: AnomalyThreshold) -> Result<bool, IForestError> {
        Ok(threshold.flags(self.score(sample)?))
    }

    /// Flag a batch of samples in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`IForestError::ScoreFeatureMismatch`] if any sample has the wrong width.
    pub fn detect_batch(
        &self,
        features: &[Vec<f64>],
        threshold: AnomalyThreshold,
    ) -> Result<Vec<bool>, IForestError> {
        Ok(self
            .score_batch(features)?
            .into_iter()
            .map(|s| threshold.flags(s))
            .collect())
    }

    /// Return the number of features this forest was trained on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the number of trees in the ensemble.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Borrow the individual trees.
    #[must_use]
    pub fn trees(&self) -> &[IsolationTree] {
        &self.trees
    }

    /// Return the resolved training hyperparameters.
    #[must_use]
    pub fn settings(&self) -> &IsolationSettings {
        &self.settings
    }
}
