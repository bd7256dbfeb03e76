//! Domain types for fraudtree-io.

use std::collections::BTreeMap;

/// Feature columns, in vector order, of every transaction record.
pub const FEATURE_COLUMNS: [&str; 4] = ["amt", "distance_km", "age", "trans_hour"];

/// Name of the optional ground-truth column (`1` = fraud).
pub const LABEL_COLUMN: &str = "is_fraud";

/// Descriptive fields carried alongside a record but never used for training.
///
/// Holds every non-feature, non-label column of the source row, keyed by
/// column name, so it serializes as a flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct RecordMetadata(BTreeMap<String, String>);

impl RecordMetadata {
    /// Create empty metadata.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a field, replacing any previous value under the same name.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Look up a field by column name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Return the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return `true` if there are no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for RecordMetadata {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A table of transaction records ready for training or evaluation.
///
/// Features, labels, and metadata are stored in parallel vectors:
/// `features[i]`, `labels[i]`, and `metadata[i]` describe the same record.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Feature vectors: `features[record_index][feature_index]`.
    pub features: Vec<Vec<f64>>,
    /// Ground-truth labels, when the source provides them.
    pub labels: Option<Vec<usize>>,
    /// Per-record descriptive fields in record order.
    pub metadata: Vec<RecordMetadata>,
}

impl Dataset {
    /// Build an unlabeled dataset with empty metadata.
    #[must_use]
    pub fn unlabeled(features: Vec<Vec<f64>>) -> Self {
        let metadata = vec![RecordMetadata::new(); features.len()];
        Self {
            features,
            labels: None,
            metadata,
        }
    }

    /// Build a labeled dataset with empty metadata.
    #[must_use]
    pub fn labeled(features: Vec<Vec<f64>>, labels: Vec<usize>) -> Self {
        let metadata = vec![RecordMetadata::new(); features.len()];
        Self {
            features,
            labels: Some(labels),
            metadata,
        }
    }

    /// Replace the per-record metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Vec<RecordMetadata>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Return the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Return `true` if the dataset holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
