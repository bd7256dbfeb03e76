//! Analysis orchestration: fetch records, train or load an ensemble, score
//! or predict, and summarize against ground truth.

mod confusion;
mod error;
mod metrics;
mod params;
mod service;

pub use confusion::ConfusionMatrix;
pub use error::AnalysisError;
pub use metrics::{EvaluatedRecord, Metrics, ParametersUsed};
pub use params::{ClassificationParams, IsolationParams};
pub use service::AnalysisService;
