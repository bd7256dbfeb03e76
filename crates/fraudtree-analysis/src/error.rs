use fraudtree_iforest::IForestError;
use fraudtree_io::{IoError, StoreError};
use fraudtree_rf::RfError;

/// Errors surfaced by [`AnalysisService`](crate::AnalysisService) operations.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Isolation forest configuration or scoring failed.
    #[error(transparent)]
    Isolation(#[from] IForestError),

    /// Classification forest configuration or prediction failed.
    #[error(transparent)]
    Classification(#[from] RfError),

    /// The feature source could not be read.
    #[error("cannot fetch records")]
    Source(#[from] IoError),

    /// The stored model could not be loaded.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Metrics were requested but the source carries no ground truth.
    #[error("records have no labels; metrics need ground truth")]
    MissingLabels,

    /// The source returned label or metadata columns out of step with features.
    #[error("source returned {got} {column} for {expected} records")]
    MisalignedSource {
        /// Which parallel column is off.
        column: &'static str,
        /// Number of feature vectors.
        expected: usize,
        /// Length of the offending column.
        got: usize,
    },
}

impl AnalysisError {
    /// Return `true` for an invalid hyperparameter, caught before any training.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        match self {
            AnalysisError::Isolation(e) => e.is_configuration(),
            AnalysisError::Classification(e) => e.is_configuration(),
            _ => false,
        }
    }

    /// Return `true` when an operation needed a stored model and none exists.
    #[must_use]
    pub fn is_model_not_found(&self) -> bool {
        matches!(self, AnalysisError::Store(StoreError::ModelNotFound { .. }))
    }
}
