//! Isolation forest for unsupervised anomaly scoring.
//!
//! Each tree isolates a random sub-sample by recursively splitting on a
//! random feature at a uniform threshold inside its observed range. Rows
//! that isolate in few splits are anomalous; the mean depth across trees is
//! normalized into a score in `(0, 1]`.

mod config;
mod error;
mod forest;
mod node;
mod path;
mod threshold;
mod tree;

pub use config::IsolationForestConfig;
pub use error::IForestError;
pub use forest::{IsolationForest, IsolationSettings};
pub use node::{FeatureIndex, IsolationNode};
pub use path::{EULER_GAMMA, average_path_length, default_max_depth, normalization_factor};
pub use threshold::AnomalyThreshold;
pub use tree::IsolationTree;
