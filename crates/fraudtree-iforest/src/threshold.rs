use std::fmt;

use crate::error::IForestError;

/// Score at or above which a sample is flagged as anomalous.
///
/// Always in `(0, 1]`. Observed useful operating range is roughly 0.5–0.65.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct AnomalyThreshold(f64);

impl AnomalyThreshold {
    /// Default operating threshold.
    pub const DEFAULT: AnomalyThreshold = AnomalyThreshold(0.55);

    /// Validate and wrap a threshold.
    ///
    /// # Errors
    ///
    /// Returns [`IForestError::InvalidThreshold`] unless `0 < threshold <= 1`.
    pub fn new(threshold: f64) -> Result<Self, IForestError> {
        if threshold > 0.0 && threshold <= 1.0 {
            Ok(Self(threshold))
        } else {
            Err(IForestError::InvalidThreshold { threshold })
        }
    }

    /// Return the raw threshold.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Return `true` when `score` should be flagged.
    #[must_use]
    pub fn flags(self, score: f64) -> bool {
        score >= self.0
    }
}

impl Default for AnomalyThreshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<f64> for AnomalyThreshold {
    type Error = IForestError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AnomalyThreshold> for f64 {
    fn from(threshold: AnomalyThreshold) -> Self {
        threshold.0
    }
}

impl fmt::Display for AnomalyThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}
