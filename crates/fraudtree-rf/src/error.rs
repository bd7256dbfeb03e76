/// Errors from classification forest operations.
#[derive(Debug, thiserror::Error)]
pub enum RfError {
    /// Returned when n_trees is zero.
    #[error("n_trees must be at least 1, got {n_trees}")]
    InvalidTreeCount {
        /// The invalid n_trees value provided.
        n_trees: usize,
    },

    /// Returned when max_depth is zero.
    #[error("max_depth must be at least 1, got {max_depth}")]
    InvalidMaxDepth {
        /// The invalid max_depth value provided.
        max_depth: usize,
    },

    /// Returned when min_samples_split is zero.
    #[error("min_samples_split must be at least 1, got {min_samples_split}")]
    InvalidMinSamplesSplit {
        /// The invalid min_samples_split value provided.
        min_samples_split: usize,
    },

    /// Returned when a fixed feature subset size is zero.
    #[error("feature_subset_size must be at least 1, got {feature_subset_size}")]
    InvalidFeatureSubsetSize {
        /// The invalid feature_subset_size value provided.
        feature_subset_size: usize,
    },

    /// Returned when an explicit bootstrap sample size is zero.
    #[error("sample_size must be at least 1, got {sample_size}")]
    InvalidSampleSize {
        /// The invalid sample_size value provided.
        sample_size: usize,
    },

    /// Returned when the training dataset has zero samples.
    #[error("training dataset has zero samples")]
    EmptyDataset,

    /// Returned when the training dataset has zero feature columns.
    #[error("training dataset has zero feature columns")]
    ZeroFeatures,

    /// Returned when a sample has a different number of features than expected.
    #[error("sample {sample_index} has {got} features, expected {expected}")]
    FeatureCountMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the sample.
        got: usize,
        /// The zero-based index of the offending sample.
        sample_index: usize,
    },

    /// Returned when the label vector is not index-aligned with the features.
    #[error("got {n_labels} labels for {n_samples} samples")]
    LabelCountMismatch {
        /// Number of feature rows.
        n_samples: usize,
        /// Number of labels.
        n_labels: usize,
    },

    /// Returned when a training label is neither 0 nor 1.
    #[error("label {label} at sample {sample_index} is not binary (expected 0 or 1)")]
    InvalidLabel {
        /// The zero-based index of the offending sample.
        sample_index: usize,
        /// The label provided.
        label: usize,
    },

    /// Returned when a training value is NaN or infinite.
    #[error("non-finite value at sample {sample_index}, feature {feature_index}")]
    NonFiniteValue {
        /// The zero-based index of the offending sample.
        sample_index: usize,
        /// The zero-based index of the offending feature column.
        feature_index: usize,
    },

    /// Returned when a sample has a different number of features at prediction time.
    #[error("prediction input has {got} features, expected {expected}")]
    PredictionFeatureMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the prediction input.
        got: usize,
    },
}

impl RfError {
    /// Return `true` for errors caused by an invalid hyperparameter.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            RfError::InvalidTreeCount { .. }
                | RfError::InvalidMaxDepth { .. }
                | RfError::InvalidMinSamplesSplit { .. }
                | RfError::InvalidFeatureSubsetSize { .. }
                | RfError::InvalidSampleSize { .. }
        )
    }
}
