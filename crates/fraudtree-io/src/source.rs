//! The fetch-side contract between storage and the analysis pipeline.

use crate::IoError;
use crate::domain::Dataset;

/// Supplies the full set of transaction records for one analysis run.
///
/// Each call returns a fresh snapshot; implementations decide where the
/// records live.
pub trait FeatureSource {
    /// Fetch every record.
    ///
    /// # Errors
    ///
    /// Returns an [`IoError`] when the backing storage cannot be read or
    /// holds malformed records.
    fn fetch(&self) -> Result<Dataset, IoError>;
}

/// A [`FeatureSource`] over a dataset already held in memory.
#[derive(Debug, Clone)]
pub struct InMemorySource {
    dataset: Dataset,
}

impl InMemorySource {
    /// Wrap a prebuilt dataset.
    #[must_use]
    pub fn new(dataset: Dataset) -> Self {
        Self { dataset }
    }
}

impl FeatureSource for InMemorySource {
    fn fetch(&self) -> Result<Dataset, IoError> {
        Ok(self.dataset.clone())
    }
}

impl<S: FeatureSource + ?Sized> FeatureSource for &S {
    fn fetch(&self) -> Result<Dataset, IoError> {
        (**self).fetch()
    }
}
