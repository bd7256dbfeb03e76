//! Bagged classification forest: train, vote, predict.
//!
//! Hand-rolled randomized trees grown on bootstrap samples. Each split
//! considers a random feature subset and a handful of uniformly drawn
//! thresholds per feature, keeping the lowest weighted Gini impurity.
//! Trees are trained in parallel via rayon from per-tree seeds, so a fixed
//! seed reproduces the same forest regardless of thread count.

mod config;
mod error;
mod forest;
mod node;
mod predict;
mod split;
mod tree;
mod vote;

pub use config::{FeatureSubset, RandomForestConfig};
pub use error::RfError;
pub use forest::{ForestSettings, RandomForest};
pub use node::{FeatureIndex, Impurity, Node};
pub use split::{gini, weighted_gini};
pub use tree::DecisionTree;
pub use vote::majority_label;
