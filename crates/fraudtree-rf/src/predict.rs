//! Prediction methods for the classification forest.

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::error::RfError;
use crate::forest::{ForestSettings, RandomForest};
use crate::tree::DecisionTree;
use crate::vote::majority_label;

impl RandomForest {
    /// Predict the class label for a single sample by majority vote.
    ///
    /// Each tree contributes one vote; ties go to the lowest label.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict(&self, sample: &[f64]) -> Result<usize, RfError> {
        Ok(majority_label(&self.votes(sample)?))
    }

    /// Return the per-class vote counts for a single sample.
    ///
    /// The returned `Vec` has length `n_classes` and sums to `n_trees`.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn votes(&self, sample: &[f64]) -> Result<Vec<usize>, RfError> {
        if sample.len() != self.n_features {
            return Err(RfError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        let mut counts = vec![0usize; self.n_classes];
        for tree in &self.trees {
            let label = tree.predict(sample)?;
            if label >= counts.len() {
                counts.resize(label + 1, 0);
            }
            counts[label] += 1;
        }
        Ok(counts)
    }

    /// Predict class labels for a batch of samples in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] if any sample has the wrong feature count.
    pub fn predict_batch(&self, features: &[Vec<f64>]) -> Result<Vec<usize>, RfError> {
        features
            .into_par_iter()
            .map(|sample| self.predict(sample))
            .collect()
    }

    /// Return the number of features this forest was trained on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the number of classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Return the number of trees in the ensemble.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Borrow the individual trees.
    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Return the resolved training hyperparameters.
    #[must_use]
    pub fn settings(&self) -> &ForestSettings {
        &self.settings
    }
}
