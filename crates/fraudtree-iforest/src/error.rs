/// Errors from isolation forest operations.
#[derive(Debug, thiserror::Error)]
pub enum IForestError {
    /// Returned when tree_count is zero.
    #[error("tree_count must be at least 1, got {tree_count}")]
    InvalidTreeCount {
        /// The invalid tree_count value provided.
        tree_count: usize,
    },

    /// Returned when sample_size is zero.
    #[error("sample_size must be at least 1, got {sample_size}")]
    InvalidSampleSize {
        /// The invalid sample_size value provided.
        sample_size: usize,
    },

    /// Returned when an anomaly threshold falls outside (0, 1].
    #[error("anomaly threshold must be in (0, 1], got {threshold}")]
    InvalidThreshold {
        /// The invalid threshold value provided.
        threshold: f64,
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

    /// Returned when a training value is NaN or infinite.
    #[error("non-finite value at sample {sample_index}, feature {feature_index}")]
    NonFiniteValue {
        /// The zero-based index of the offending sample.
        sample_index: usize,
        /// The zero-based index of the offending feature column.
        feature_index: usize,
    },

    /// Returned when a scored sample has the wrong number of features.
    #[error("scoring input has {got} features, expected {expected}")]
    ScoreFeatureMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the input.
        got: usize,
    },
}

impl IForestError {
    /// Return `true` for errors caused by an invalid hyperparameter.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            IForestError::InvalidTreeCount { .. }
                | IForestError::InvalidSampleSize { .. }
                | IForestError::InvalidThreshold { .. }
        )
    }
}
