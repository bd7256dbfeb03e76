use std::fmt;

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

/// Gini impurity value.
#[derive(
    Debug, Clone, Copy, PartialEq, PartialOrd,
    serde::Serialize, serde::Deserialize,
)]
pub struct Impurity(f64);

impl Impurity {
    /// Create a new impurity value.
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    /// Return the raw impurity value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Impurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

/// A node in a classification tree.
///
/// Each split node exclusively owns its two children. Every node, split or
/// leaf, records the majority label of the training samples that reached it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Node {
    /// An interior split node.
    Split {
        /// Feature used for the split.
        feature: FeatureIndex,
        /// Samples with `value < threshold` go low, the rest go high.
        threshold: f64,
        /// Majority label of the samples at this node.
        prediction: usize,
        /// Gini impurity of the samples at this node.
        impurity: Impurity,
        /// Number of training samples that reached this node.
        n_samples: usize,
        /// Subtree for `value < threshold`.
        low: Box<Node>,
        /// Subtree for `value >= threshold`.
        high: Box<Node>,
    },
    /// A terminal leaf node.
    Leaf {
        /// Majority label of the samples at this leaf.
        prediction: usize,
        /// Gini impurity of the samples at this leaf.
        impurity: Impurity,
        /// Number of training samples in this leaf.
        n_samples: usize,
    },
}

impl Node {
    /// Return the majority label stored at this node.
    #[must_use]
    pub fn prediction(&self) -> usize {
        match self {
            Node::Split { prediction, .. } | Node::Leaf { prediction, .. } => *prediction,
        }
    }

    /// Return the impurity at this node.
    #[must_use]
    pub fn impurity(&self) -> Impurity {
        match self {
            Node::Split { impurity, .. } | Node::Leaf { impurity, .. } => *impurity,
        }
    }

    /// Return the number of training samples that reached this node.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        match self {
            Node::Split { n_samples, .. } | Node::Leaf { n_samples, .. } => *n_samples,
        }
    }

    /// Return `true` if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Descend from this node to the leaf that `sample` lands in.
    pub(crate) fn leaf_for(&self, sample: &[f64]) -> &Node {
        let mut node = self;
        loop {
            match node {
                Node::Leaf { .. } => return node,
                Node::Split {
                    feature,
                    threshold,
                    low,
                    high,
                    ..
                } => {
                    node = if sample[feature.index()] < *threshold {
                        &**low
                    } else {
                        &**high
                    };
                }
            }
        }
    }

    /// Count every node in this subtree, including `self`.
    pub(crate) fn count_nodes(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Split { low, high, .. } => 1 + low.count_nodes() + high.count_nodes(),
        }
    }

    /// Count the leaves in this subtree.
    pub(crate) fn count_leaves(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Split { low, high, .. } => low.count_leaves() + high.count_leaves(),
        }
    }

    /// Depth of the deepest leaf below this node (a lone leaf has depth 0).
    pub(crate) fn max_depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Split { low, high, .. } => 1 + low.max_depth().max(high.max_depth()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FeatureIndex, Impurity, Node};

    // --- FeatureIndex ---

    #[test]
    fn feature_index_roundtrip() {
        let fi = FeatureIndex::new(3);
        assert_eq!(fi.index(), 3);
        assert_eq!(format!("{fi}"), "3");
    }

    // --- Impurity ---

    #[test]
    fn impurity_display() {
        let imp = Impurity::new(0.333333);
        assert_eq!(format!("{imp}"), "0.333333");
    }

    #[test]
    fn impurity_ordering() {
        assert!(Impurity::new(0.1) < Impurity::new(0.5));
    }

    // --- Node ---

    fn leaf(prediction: usize, n_samples: usize) -> Node {
        Node::Leaf {
            prediction,
            impurity: Impurity::new(0.0),
            n_samples,
        }
    }

    fn make_split() -> Node {
        Node::Split {
            feature: FeatureIndex::new(1),
            threshold: 3.5,
            prediction: 0,
            impurity: Impurity::new(0.48),
            n_samples: 20,
            low: Box::new(leaf(0, 12)),
            high: Box::new(leaf(1, 8)),
        }
    }

    #[test]
    fn split_routes_strictly_below_threshold_low() {
        let node = make_split();
        assert_eq!(node.leaf_for(&[0.0, 3.4999]).prediction(), 0);
        assert_eq!(node.leaf_for(&[0.0, 3.5]).prediction(), 1);
        assert_eq!(node.leaf_for(&[0.0, 100.0]).prediction(), 1);
    }

    #[test]
    fn introspection_counts() {
        let node = make_split();
        assert_eq!(node.count_nodes(), 3);
        assert_eq!(node.count_leaves(), 2);
        assert_eq!(node.max_depth(), 1);
        assert!(!node.is_leaf());
        assert_eq!(node.n_samples(), 20);
        assert!((node.impurity().value() - 0.48).abs() < f64::EPSILON);
    }

    #[test]
    fn lone_leaf_has_depth_zero() {
        let node = leaf(1, 5);
        assert!(node.is_leaf());
        assert_eq!(node.max_depth(), 0);
        assert_eq!(node.leaf_for(&[9.0]).prediction(), 1);
    }
}
