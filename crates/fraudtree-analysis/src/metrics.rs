//! Evaluation summary returned by every metric-producing operation.

use fraudtree_io::RecordMetadata;

use crate::confusion::ConfusionMatrix;
use crate::params::{ClassificationParams, IsolationParams};

/// Hyperparameters echoed back with the metrics.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "ensemble", rename_all = "snake_case")]
pub enum ParametersUsed {
    /// Isolation forest run.
    Isolation(IsolationParams),
    /// Classification forest run.
    Classification(ClassificationParams),
}

/// One evaluated record, as placed in a flagged or unflagged partition.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct EvaluatedRecord {
    /// Position of the record in the fetched dataset.
    pub index: usize,
    /// The record's feature vector.
    pub features: Vec<f64>,
    /// Descriptive fields from the source, unchanged.
    pub metadata: RecordMetadata,
    /// Ground-truth label.
    pub label: usize,
    /// Anomaly score (isolation runs).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Predicted label (classification runs).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted: Option<usize>,
}

/// Outcome of a train or evaluate pass.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Metrics {
    /// Wall-clock seconds spent in the operation.
    pub execution_time: f64,
    /// (TP + TN) / total.
    pub accuracy: f64,
    /// TP / (TP + FP), 0 when nothing was flagged.
    pub precision: f64,
    /// TP / (TP + FN), 0 when there is no fraud.
    pub recall: f64,
    /// Harmonic mean of precision and recall.
    pub f1: f64,
    /// Raw counts behind the ratios.
    pub confusion_matrix: ConfusionMatrix,
    /// Number of records evaluated.
    pub data_points: usize,
    /// Hyperparameters of the model that produced these results.
    pub parameters_used: ParametersUsed,
    /// Records flagged as fraud, in dataset order.
    pub flagged_records: Vec<EvaluatedRecord>,
    /// Records not flagged, in dataset order.
    pub unflagged_records: Vec<EvaluatedRecord>,
    /// `flagged_records.len()`.
    pub flagged_count: usize,
    /// Outcome of persisting the freshly trained model; absent when evaluating
    /// a stored one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_save_status: Option<String>,
}

impl Metrics {
    /// Assemble metrics from per-record flags and their evaluated records.
    ///
    /// `records[i]` is placed in the flagged partition iff `flags[i]`.
    pub(crate) fn summarize(
        execution_time: f64,
        actual: &[bool],
        flags: &[bool],
        records: Vec<EvaluatedRecord>,
        parameters_used: ParametersUsed,
        model_save_status: Option<String>,
    ) -> Self {
        let confusion_matrix = ConfusionMatrix::from_flags(actual, flags);
        let data_points = records.len();
        let (flagged_records, unflagged_records): (Vec<_>, Vec<_>) =
            records.into_iter().partition(|r| flags[r.index]);

        Self {
            execution_time,
            accuracy: confusion_matrix.accuracy(),
            precision: confusion_matrix.precision(),
            recall: confusion_matrix.recall(),
            f1: confusion_matrix.f1(),
            confusion_matrix,
            data_points,
            parameters_used,
            flagged_count: flagged_records.len(),
            flagged_records,
            unflagged_records,
            model_save_status,
        }
    }
}
