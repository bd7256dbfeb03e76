use rand::Rng;
use tracing::trace;

use crate::{
    RfError,
    node::Node,
    split::{find_random_split, gini},
    vote::{majority_label, tally},
};

/// Training-time settings shared by every node of every tree in a forest.
///
/// Resolved once per training pass and threaded through the recursion.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GrowthContext {
    pub(crate) max_depth: usize,
    pub(crate) min_samples_split: usize,
    pub(crate) feature_subset_size: usize,
    pub(crate) n_classes: usize,
}

/// A fitted randomized classification tree.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DecisionTree {
    pub(crate) root: Node,
    pub(crate) n_features: usize,
}

impl DecisionTree {
    /// Grow a tree over `sample_indices` (which may repeat, as in a bootstrap).
    ///
    /// `columns` is column-major: `columns[feature_idx][sample_idx]`.
    pub(crate) fn grow(
        columns: &[Vec<f64>],
        labels: &[usize],
        sample_indices: &[usize],
        ctx: &GrowthContext,
        rng: &mut impl Rng,
    ) -> Self {
        let root = build_node(columns, labels, sample_indices, ctx, 0, rng);
        Self {
            root,
            n_features: columns.len(),
        }
    }

    /// Predict the class label for a single sample.
    ///
    /// Descends low when `sample[feature] < threshold`, high otherwise, and
    /// returns the majority label stored at the leaf.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict(&self, sample: &[f64]) -> Result<usize, RfError> {
        if sample.len() != self.n_features {
            return Err(RfError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        Ok(self.root.leaf_for(sample).prediction())
    }

    /// Borrow the root node.
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Return the total number of nodes in the tree (both splits and leaves).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.root.count_nodes()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.root.count_leaves()
    }

    /// Return the maximum depth of the tree. A single-leaf tree has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.root.max_depth()
    }
}

/// Recursively build one node and its subtrees.
fn build_node(
    columns: &[Vec<f64>],
    labels: &[usize],
    sample_indices: &[usize],
    ctx: &GrowthContext,
    depth: usize,
    rng: &mut impl Rng,
) -> Node {
    let n_samples = sample_indices.len();
    let class_counts = tally(sample_indices.iter().map(|&si| labels[si]), ctx.n_classes);
    let prediction = majority_label(&class_counts);
    let impurity = gini(&class_counts, n_samples);

    let leaf = Node::Leaf {
        prediction,
        impurity,
        n_samples,
    };

    // Stopping conditions → leaf.
    let depth_reached = depth >= ctx.max_depth;
    let too_few = n_samples < ctx.min_samples_split;
    let single_class = class_counts.iter().filter(|&&c| c > 0).count() <= 1;
    if depth_reached || too_few || single_class {
        return leaf;
    }

    let Some(split) = find_random_split(
        columns,
        labels,
        sample_indices,
        ctx.n_classes,
        ctx.feature_subset_size,
        rng,
    ) else {
        return leaf;
    };

    trace!(
        depth,
        feature = split.feature.index(),
        threshold = split.threshold,
        weighted_gini = split.weighted_impurity,
        "committing split"
    );

    let low = build_node(columns, labels, &split.low_indices, ctx, depth + 1, rng);
    let high = build_node(columns, labels, &split.high_indices, ctx, depth + 1, rng);

    Node::Split {
        feature: split.feature,
        threshold: split.threshold,
        prediction,
        impurity,
        n_samples,
        low: Box::new(low),
        high: Box::new(high),
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn columns_of(rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        (0..rows[0].len())
            .map(|f| rows.iter().map(|row| row[f]).collect())
            .collect()
    }

    fn ctx(max_depth: usize, feature_subset_size: usize) -> GrowthContext {
        GrowthContext {
            max_depth,
            min_samples_split: 2,
            feature_subset_size,
            n_classes: 2,
        }
    }

    fn grow(rows: &[Vec<f64>], labels: &[usize], ctx: &GrowthContext, seed: u64) -> DecisionTree {
        let columns = columns_of(rows);
        let indices: Vec<usize> = (0..rows.len()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        DecisionTree::grow(&columns, labels, &indices, ctx, &mut rng)
    }

    /// Route every training sample through the tree and check that each
    /// split sends strictly-smaller values low, the rest high, and that the
    /// children's sample counts add up to the parent's.
    fn assert_partition_invariant(node: &Node, rows: &[Vec<f64>], reaching: &[usize]) {
        assert_eq!(node.n_samples(), reaching.len());
        if let Node::Split {
            feature,
            threshold,
            low,
            high,
            ..
        } = node
        {
            let (low_set, high_set): (Vec<usize>, Vec<usize>) = reaching
                .iter()
                .partition(|&&i| rows[i][feature.index()] < *threshold);
            assert!(!low_set.is_empty() && !high_set.is_empty());
            for &i in &high_set {
                assert!(rows[i][feature.index()] >= *threshold);
            }
            assert_eq!(low_set.len() + high_set.len(), reaching.len());
            assert_partition_invariant(low, rows, &low_set);
            assert_partition_invariant(high, rows, &high_set);
        }
    }

    #[test]
    fn pure_dataset_single_leaf() {
        let rows = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
        let labels = vec![1, 1, 1];
        let tree = grow(&rows, &labels, &ctx(10, 2), 42);
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.n_leaves(), 1);
        assert_eq!(tree.predict(&[2.0, 3.0]).unwrap(), 1);
    }

    #[test]
    fn linearly_separable_correct_predictions() {
        let rows = vec![
            vec![1.0, 0.0],
            vec![2.0, 0.0],
            vec![3.0, 0.0],
            vec![10.0, 0.0],
            vec![11.0, 0.0],
            vec![12.0, 0.0],
        ];
        let labels = vec![0, 0, 0, 1, 1, 1];
        let tree = grow(&rows, &labels, &ctx(10, 2), 42);
        for (row, &label) in rows.iter().zip(&labels) {
            assert_eq!(tree.predict(row).unwrap(), label);
        }
    }

    #[test]
    fn split_invariant_holds_on_every_node() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let rows: Vec<Vec<f64>> = (0..120)
            .map(|_| (0..4).map(|_| rng.r#gen::<f64>() * 10.0).collect())
            .collect();
        let labels: Vec<usize> = rows.iter().map(|r| usize::from(r[0] + r[2] > 10.0)).collect();
        let tree = grow(&rows, &labels, &ctx(8, 2), 5);
        assert!(tree.n_nodes() > 1);
        let all: Vec<usize> = (0..rows.len()).collect();
        assert_partition_invariant(tree.root(), &rows, &all);
    }

    #[test]
    fn every_node_stores_majority_label() {
        let rows = vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0], vec![4.0]];
        let labels = vec![1, 1, 1, 0, 0];
        let tree = grow(&rows, &labels, &ctx(1, 1), 42);
        assert_eq!(tree.root().prediction(), 1);
    }

    #[test]
    fn max_depth_limits_tree() {
        let rows = vec![
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
        ];
        let labels = vec![0, 1, 1, 0];
        let tree = grow(&rows, &labels, &ctx(1, 2), 42);
        assert!(tree.depth() <= 1);
    }

    #[test]
    fn min_samples_split_stops_growth() {
        let rows = vec![vec![0.0], vec![1.0], vec![2.0]];
        let labels = vec![0, 1, 0];
        let context = GrowthContext {
            min_samples_split: 4,
            ..ctx(10, 1)
        };
        let tree = grow(&rows, &labels, &context, 42);
        assert!(tree.root().is_leaf());
        assert_eq!(tree.root().prediction(), 0);
    }

    #[test]
    fn constant_features_yield_leaf() {
        let rows = vec![vec![5.0, 5.0], vec![5.0, 5.0], vec![5.0, 5.0]];
        let labels = vec![0, 1, 1];
        let tree = grow(&rows, &labels, &ctx(10, 2), 42);
        assert!(tree.root().is_leaf());
        assert_eq!(tree.predict(&[5.0, 5.0]).unwrap(), 1);
    }

    #[test]
    fn deterministic_with_same_seed() {
        let rows = vec![
            vec![1.0, 5.0],
            vec![2.0, 6.0],
            vec![3.0, 7.0],
            vec![10.0, 15.0],
            vec![11.0, 16.0],
            vec![12.0, 17.0],
        ];
        let labels = vec![0, 1, 0, 1, 1, 0];
        let a = grow(&rows, &labels, &ctx(10, 1), 123);
        let b = grow(&rows, &labels, &ctx(10, 1), 123);
        assert_eq!(a, b);
    }

    #[test]
    fn prediction_feature_mismatch() {
        let rows = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let labels = vec![0, 1];
        let tree = grow(&rows, &labels, &ctx(10, 2), 42);
        let err = tree.predict(&[1.0]).unwrap_err();
        assert!(matches!(
            err,
            RfError::PredictionFeatureMismatch { expected: 2, got: 1 }
        ));
    }
}
