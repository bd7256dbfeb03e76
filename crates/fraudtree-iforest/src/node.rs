use std::fmt;

use crate::path::average_path_length;

/// Zero-based feature column index.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    serde::Serialize, serde::Deserialize,
)]
pub struct FeatureIndex(usize);

impl FeatureIndex {
    /// Create a new feature index from a zero-based column position.
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based feature column index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FeatureIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node in an isolation tree.
///
/// Split nodes exclusively own both subtrees; the threshold always lies
/// strictly between the minimum and maximum of the split feature over the
/// rows that reached the node.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum IsolationNode {
    /// An interior split node.
    Split {
        /// Feature used for the split.
        feature: FeatureIndex,
        /// Samples with `value >= threshold` go high, the rest go low.
        threshold: f64,
        /// Number of training rows that reached this node.
        n_samples: usize,
        /// Subtree for `value < threshold`.
        low: Box<IsolationNode>,
        /// Subtree for `value >= threshold`.
        high: Box<IsolationNode>,
    },
    /// A terminal leaf node.
    Leaf {
        /// Number of training rows that reached this leaf.
        n_samples: usize,
    },
}

impl IsolationNode {
    /// Return the number of training rows that reached this node.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        match self {
            IsolationNode::Split { n_samples, .. } | IsolationNode::Leaf { n_samples } => {
                *n_samples
            }
        }
    }

    /// Return `true` if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, IsolationNode::Leaf { .. })
    }

    /// Isolation depth of `sample` below this node.
    ///
    /// Counts one per edge traversed, then adds `c(n)` for the rows left at
    /// the leaf. A leaf holding one row or fewer adds nothing.
    #[must_use]
    pub fn path_length(&self, sample: &[f64]) -> f64 {
        let mut node = self;
        let mut edges = 0usize;
        loop {
            match node {
                IsolationNode::Leaf { n_samples } => {
                    return edges as f64 + average_path_length(*n_samples);
                }
                IsolationNode::Split {
                    feature,
                    threshold,
                    low,
                    high,
                    ..
                } => {
                    node = if sample[feature.index()] >= *threshold {
                        &**high
                    } else {
                        &**low
                    };
                    edges += 1;
                }
            }
        }
    }

    /// Count every node in this subtree, including `self`.
    #[must_use]
    pub fn count_nodes(&self) -> usize {
        match self {
            IsolationNode::Leaf { .. } => 1,
            IsolationNode::Split { low, high, .. } => 1 + low.count_nodes() + high.count_nodes(),
        }
    }

    /// Count the leaves in this subtree.
    #[must_use]
    pub fn count_leaves(&self) -> usize {
        match self {
            IsolationNode::Leaf { .. } => 1,
            IsolationNode::Split { low, high, .. } => low.count_leaves() + high.count_leaves(),
        }
    }

    /// Depth of the deepest leaf below this node (a lone leaf has depth 0).
    #[must_use]
    pub fn max_depth(&self) -> usize {
        match self {
            IsolationNode::Leaf { .. } => 0,
            IsolationNode::Split { low, high, .. } => 1 + low.max_depth().max(high.max_depth()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(feature: usize, threshold: f64, low: IsolationNode, high: IsolationNode) -> IsolationNode {
        IsolationNode::Split {
            feature: FeatureIndex::new(feature),
            threshold,
            n_samples: low.n_samples() + high.n_samples(),
            low: Box::new(low),
            high: Box::new(high),
        }
    }

    #[test]
    fn singleton_leaf_adds_no_correction() {
        // root -> high -> high(leaf, 1 row): exactly two edges.
        let tree = split(
            0,
            5.0,
            IsolationNode::Leaf { n_samples: 6 },
            split(
                1,
                2.0,
                IsolationNode::Leaf { n_samples: 3 },
                IsolationNode::Leaf { n_samples: 1 },
            ),
        );
        assert_eq!(tree.path_length(&[7.0, 9.0]), 2.0);
    }

    #[test]
    fn empty_leaf_adds_no_correction() {
        let leaf = IsolationNode::Leaf { n_samples: 0 };
        assert_eq!(leaf.path_length(&[1.0]), 0.0);
    }

    #[test]
    fn crowded_leaf_adds_average_path_length() {
        let tree = split(
            0,
            5.0,
            IsolationNode::Leaf { n_samples: 10 },
            IsolationNode::Leaf { n_samples: 1 },
        );
        let expected = 1.0 + average_path_length(10);
        assert!((tree.path_length(&[1.0]) - expected).abs() < 1e-12);
    }

    #[test]
    fn threshold_value_goes_high() {
        let tree = split(
            0,
            5.0,
            IsolationNode::Leaf { n_samples: 4 },
            IsolationNode::Leaf { n_samples: 1 },
        );
        assert_eq!(tree.path_length(&[5.0]), 1.0);
    }

    #[test]
    fn introspection() {
        let tree = split(
            0,
            5.0,
            IsolationNode::Leaf { n_samples: 4 },
            IsolationNode::Leaf { n_samples: 1 },
        );
        assert_eq!(tree.count_nodes(), 3);
        assert_eq!(tree.count_leaves(), 2);
        assert_eq!(tree.max_depth(), 1);
        assert_eq!(tree.n_samples(), 5);
        assert!(!tree.is_leaf());
    }
}
