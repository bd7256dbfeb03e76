//! Bagged forest training with parallel tree construction.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::config::RandomForestConfig;
use crate::error::RfError;
use crate::tree::{DecisionTree, GrowthContext};

/// Hyperparameters a forest was trained with, after defaults were resolved.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ForestSettings {
    /// Number of trees in the ensemble.
    pub n_trees: usize,
    /// Maximum depth of every tree.
    pub max_depth: usize,
    /// Minimum samples required to attempt a split.
    pub min_samples_split: usize,
    /// Features considered per split.
    pub feature_subset_size: usize,
    /// Rows drawn (with replacement) per tree.
    pub sample_size: usize,
    /// Master seed of the training run.
    pub seed: u64,
}

/// A fitted bagged classification forest.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RandomForest {
    pub(crate) trees: Vec<DecisionTree>,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
    pub(crate) settings: ForestSettings,
}

/// Draw `draw_count` row indices uniformly with replacement.
fn bootstrap_sample(n_samples: usize, draw_count: usize, rng: &mut impl Rng) -> Vec<usize> {
    (0..draw_count).map(|_| rng.gen_range(0..n_samples)).collect()
}

/// Largest accepted class label; labels are binary.
const MAX_LABEL: usize = 1;

/// Check shape, alignment, label range, and finiteness of a training set.
pub(crate) fn validate_dataset(features: &[Vec<f64>], labels: &[usize]) -> Result<usize, RfError> {
    if features.is_empty() {
        return Err(RfError::EmptyDataset);
    }
    let n_features = features[0].len();
    if n_features == 0 {
        return Err(RfError::ZeroFeatures);
    }
    if labels.len() != features.len() {
        return Err(RfError::LabelCountMismatch {
            n_samples: features.len(),
            n_labels: labels.len(),
        });
    }
    if let Some((sample_index, &label)) = labels
        .iter()
        .enumerate()
        .find(|&(_, &l)| l > MAX_LABEL)
    {
        return Err(RfError::InvalidLabel {
            sample_index,
            label,
        });
    }
    for (sample_index, row) in features.iter().enumerate() {
        if row.len() != n_features {
            return Err(RfError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        for (feature_index, &val) in row.iter().enumerate() {
            if !val.is_finite() {
                return Err(RfError::NonFiniteValue {
                    sample_index,
                    feature_index,
                });
            }
        }
    }
    Ok(n_features)
}

/// Train the classification forest.
#[instrument(skip_all, fields(n_trees = config.n_trees, n_samples = features.len()))]
pub(crate) fn train(
    config: &RandomForestConfig,
    features: &[Vec<f64>],
    labels: &[usize],
) -> Result<RandomForest, RfError> {
    config.validate()?;
    let n_features = validate_dataset(features, labels)?;

    let n_samples = features.len();
    let n_classes = labels.iter().max().copied().unwrap_or(0) + 1;
    let sample_size = config.sample_size.unwrap_or(n_samples);
    let feature_subset_size = config.feature_subset.resolve(n_features);

    let ctx = GrowthContext {
        max_depth: config.max_depth,
        min_samples_split: config.min_samples_split,
        feature_subset_size,
        n_classes,
    };

    info!(
        n_trees = config.n_trees,
        n_samples,
        n_features,
        n_classes,
        feature_subset_size,
        sample_size,
        "training classification forest"
    );

    // Column-major copy so split search scans contiguous feature values.
    let columns: Vec<Vec<f64>> = (0..n_features)
        .map(|feat_idx| features.iter().map(|row| row[feat_idx]).collect())
        .collect();

    // Per-tree seeds from the master RNG keep results independent of thread count.
    let mut master_rng = ChaCha8Rng::seed_from_u64(config.seed);
    let tree_seeds: Vec<u64> = (0..config.n_trees).map(|_| master_rng.r#gen()).collect();

    let trees: Vec<DecisionTree> = tree_seeds
        .into_par_iter()
        .map(|seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let bootstrap_indices = bootstrap_sample(n_samples, sample_size, &mut rng);
            DecisionTree::grow(&columns, labels, &bootstrap_indices, &ctx, &mut rng)
        })
        .collect();

    debug!(
        n_trees_trained = trees.len(),
        total_nodes = trees.iter().map(DecisionTree::n_nodes).sum::<usize>(),
        "tree training complete"
    );

    let settings = ForestSettings {
        n_trees: config.n_trees,
        max_depth: config.max_depth,
        min_samples_split: config.min_samples_split,
        feature_subset_size,
        sample_size,
        seed: config.seed,
    };

    info!("classification forest training complete");

    Ok(RandomForest {
        trees,
        n_features,
        n_classes,
        settings,
    })
}
