use rand::Rng;

use crate::node::{FeatureIndex, IsolationNode};

/// A fitted isolation tree.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IsolationTree {
    pub(crate) root: IsolationNode,
}

impl IsolationTree {
    /// Grow a tree over the rows of `features` named by `sample_indices`.
    pub(crate) fn grow(
        features: &[Vec<f64>],
        sample_indices: &[usize],
        max_depth: usize,
        rng: &mut impl Rng,
    ) -> Self {
        Self {
            root: build_node(features, sample_indices, 0, max_depth, rng),
        }
    }

    /// Isolation depth of `sample`: edges to its leaf plus the leaf correction.
    #[must_use]
    pub fn path_length(&self, sample: &[f64]) -> f64 {
        self.root.path_length(sample)
    }

    /// Borrow the root node.
    #[must_use]
    pub fn root(&self) -> &IsolationNode {
        &self.root
    }

    /// Return the total number of nodes in the tree.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.root.count_nodes()
    }

    /// Return the number of leaf nodes in the tree.
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

/// `true` when every row in the slice equals the first one on every feature.
fn all_identical(features: &[Vec<f64>], sample_indices: &[usize]) -> bool {
    let Some((&first, rest)) = sample_indices.split_first() else {
        return true;
    };
    rest.iter().all(|&si| features[si] == features[first])
}

fn build_node(
    features: &[Vec<f64>],
    sample_indices: &[usize],
    depth: usize,
    max_depth: usize,
    rng: &mut impl Rng,
) -> IsolationNode {
    let n_samples = sample_indices.len();
    let leaf = IsolationNode::Leaf { n_samples };

    if depth >= max_depth || n_samples <= 1 || all_identical(features, sample_indices) {
        return leaf;
    }

    let n_features = features[sample_indices[0]].len();
    let feat_idx = rng.gen_range(0..n_features);

    let (min, max) = sample_indices
        .iter()
        .map(|&si| features[si][feat_idx])
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if min == max {
        return leaf;
    }

    // A range wider than f64::MAX overflows to infinity; such draws give a leaf.
    let threshold = min + rng.r#gen::<f64>() * (max - min);
    if !(threshold.is_finite() && min < threshold && threshold < max) {
        return leaf;
    }

    let (low_indices, high_indices): (Vec<usize>, Vec<usize>) = sample_indices
        .iter()
        .partition(|&&si| features[si][feat_idx] < threshold);
    if low_indices.is_empty() || high_indices.is_empty() {
        return leaf;
    }

    let low = build_node(features, &low_indices, depth + 1, max_depth, rng);
    let high = build_node(features, &high_indices, depth + 1, max_depth, rng);

    IsolationNode::Split {
        feature: FeatureIndex::new(feat_idx),
        threshold,
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

    fn grow_all(rows: &[Vec<f64>], max_depth: usize, seed: u64) -> IsolationTree {
        let indices: Vec<usize> = (0..rows.len()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        IsolationTree::grow(rows, &indices, max_depth, &mut rng)
    }

    /// Every split threshold lies strictly inside the observed range of its
    /// feature, and children partition the parent's rows.
    fn assert_split_invariant(node: &IsolationNode, rows: &[Vec<f64>], reaching: &[usize]) {
        assert_eq!(node.n_samples(), reaching.len());
        if let IsolationNode::Split {
            feature,
            threshold,
            low,
            high,
            ..
        } = node
        {
            let values: Vec<f64> = reaching.iter().map(|&i| rows[i][feature.index()]).collect();
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            assert!(min < *threshold && *threshold < max);

            let (lo, hi): (Vec<usize>, Vec<usize>) = reaching
                .iter()
                .partition(|&&i| rows[i][feature.index()] < *threshold);
            assert_split_invariant(low, rows, &lo);
            assert_split_invariant(high, rows, &hi);
        }
    }

    #[test]
    fn single_row_is_a_leaf() {
        let tree = grow_all(&[vec![1.0, 2.0, 3.0, 4.0]], 8, 1);
        assert!(tree.root().is_leaf());
        assert_eq!(tree.path_length(&[1.0, 2.0, 3.0, 4.0]), 0.0);
    }

    #[test]
    fn identical_rows_are_a_leaf() {
        let rows = vec![vec![2.0, 2.0]; 5];
        let tree = grow_all(&rows, 8, 1);
        assert!(tree.root().is_leaf());
        assert_eq!(tree.root().n_samples(), 5);
    }

    #[test]
    fn zero_depth_limit_is_a_leaf() {
        let rows = vec![vec![0.0], vec![1.0], vec![2.0]];
        let tree = grow_all(&rows, 0, 1);
        assert!(tree.root().is_leaf());
    }

    #[test]
    fn depth_limit_respected() {
        let rows: Vec<Vec<f64>> = (0..64).map(|i| vec![i as f64, (i * 7 % 13) as f64]).collect();
        let tree = grow_all(&rows, 3, 9);
        assert!(tree.depth() <= 3);
    }

    #[test]
    fn split_invariant_holds() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let rows: Vec<Vec<f64>> = (0..100)
            .map(|_| (0..4).map(|_| rng.r#gen::<f64>()).collect())
            .collect();
        let tree = grow_all(&rows, 10, 12);
        let all: Vec<usize> = (0..rows.len()).collect();
        assert!(tree.n_nodes() > 1);
        assert_eq!(tree.n_nodes(), 2 * tree.n_leaves() - 1);
        assert_split_invariant(tree.root(), &rows, &all);
    }

    #[test]
    fn overflowing_range_becomes_leaf_not_panic() {
        // max - min on feature 0 exceeds f64::MAX at the root.
        let rows = vec![vec![-1e308, 0.0], vec![1e308, 1.0], vec![0.0, 2.0]];
        let all: Vec<usize> = (0..rows.len()).collect();
        for seed in 0..50 {
            let tree = grow_all(&rows, 8, seed);
            assert_split_invariant(tree.root(), &rows, &all);
        }
    }

    #[test]
    fn constant_column_never_fails() {
        // Feature 1 is constant; whenever it is drawn the node becomes a leaf.
        let rows: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64, 3.0]).collect();
        for seed in 0..10 {
            let tree = grow_all(&rows, 8, seed);
            assert!(tree.n_nodes() >= 1);
        }
    }
}
