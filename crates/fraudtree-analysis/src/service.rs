//! Fetch, train or load, score, and summarize.

use std::time::Instant;

use fraudtree_iforest::AnomalyThreshold;
use fraudtree_io::{Dataset, FeatureSource, IsolationModel, ModelStore};
use fraudtree_rf::RandomForest;
use tracing::{debug, info, instrument};

use crate::error::AnalysisError;
use crate::metrics::{EvaluatedRecord, Metrics, ParametersUsed};
use crate::params::{ClassificationParams, IsolationParams};

/// Label value that marks a fraudulent record.
const FRAUD_LABEL: usize = 1;

/// Orchestrates both ensemble kinds over one feature source and one store.
///
/// Train operations fit a fresh model on every fetched record, persist it,
/// and evaluate it on the same records. Evaluate operations reuse the stored
/// model. Hyperparameters are validated before any record is fetched.
#[derive(Debug)]
pub struct AnalysisService<S> {
    source: S,
    store: ModelStore,
}

/// A fetched dataset checked for metric evaluation.
struct Labeled {
    dataset: Dataset,
    labels: Vec<usize>,
}

impl Labeled {
    fn actual(&self) -> Vec<bool> {
        self.labels.iter().map(|&l| l == FRAUD_LABEL).collect()
    }

    fn records(&self, score: &[f64], predicted: &[usize]) -> Vec<EvaluatedRecord> {
        self.dataset
            .features
            .iter()
            .zip(&self.dataset.metadata)
            .zip(&self.labels)
            .enumerate()
            .map(|(index, ((features, metadata), &label))| EvaluatedRecord {
                index,
                features: features.clone(),
                metadata: metadata.clone(),
                label,
                score: score.get(index).copied(),
                predicted: predicted.get(index).copied(),
            })
            .collect()
    }
}

impl<S: FeatureSource> AnalysisService<S> {
    /// Create a service reading from `source` and persisting to `store`.
    pub fn new(source: S, store: ModelStore) -> Self {
        Self { source, store }
    }

    /// Borrow the model store.
    #[must_use]
    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    fn fetch_labeled(&self) -> Result<Labeled, AnalysisError> {
        let mut dataset = self.source.fetch()?;
        let n = dataset.features.len();
        if dataset.metadata.len() != n {
            return Err(AnalysisError::MisalignedSource {
                column: "metadata entries",
                expected: n,
                got: dataset.metadata.len(),
            });
        }
        let labels = dataset.labels.take().ok_or(AnalysisError::MissingLabels)?;
        if labels.len() != n {
            return Err(AnalysisError::MisalignedSource {
                column: "labels",
                expected: n,
                got: labels.len(),
            });
        }
        debug!(n_records = n, "records fetched");
        Ok(Labeled { dataset, labels })
    }

    fn evaluate_isolation_model(
        data: &Labeled,
        model: &IsolationModel,
        threshold: AnomalyThreshold,
        started: Instant,
        model_save_status: Option<String>,
    ) -> Result<Metrics, AnalysisError> {
        let scores = model.forest.score_batch(&data.dataset.features)?;
        let flags: Vec<bool> = scores.iter().map(|&s| threshold.flags(s)).collect();
        let parameters_used = ParametersUsed::Isolation(IsolationParams::from_settings(
            model.forest.settings(),
            threshold,
        ));

        let metrics = Metrics::summarize(
            started.elapsed().as_secs_f64(),
            &data.actual(),
            &flags,
            data.records(&scores, &[]),
            parameters_used,
            model_save_status,
        );
        info!(
            flagged = metrics.flagged_count,
            accuracy = metrics.accuracy,
            f1 = metrics.f1,
            "isolation evaluation complete"
        );
        Ok(metrics)
    }

    fn evaluate_classifier_model(
        data: &Labeled,
        forest: &RandomForest,
        started: Instant,
        model_save_status: Option<String>,
    ) -> Result<Metrics, AnalysisError> {
        let predicted = forest.predict_batch(&data.dataset.features)?;
        let flags: Vec<bool> = predicted.iter().map(|&p| p == FRAUD_LABEL).collect();
        let parameters_used =
            ParametersUsed::Classification(ClassificationParams::from_settings(forest.settings()));

        let metrics = Metrics::summarize(
            started.elapsed().as_secs_f64(),
            &data.actual(),
            &flags,
            data.records(&[], &predicted),
            parameters_used,
            model_save_status,
        );
        info!(
            flagged = metrics.flagged_count,
            accuracy = metrics.accuracy,
            f1 = metrics.f1,
            "classification evaluation complete"
        );
        Ok(metrics)
    }

    /// Train an isolation forest on every record, store it with its
    /// threshold, and evaluate it on the same records.
    ///
    /// A failed save is reported in [`Metrics::model_save_status`] and does
    /// not abort the evaluation.
    ///
    /// # Errors
    ///
    /// Configuration errors before any fetch; source errors;
    /// [`AnalysisError::MissingLabels`]; data validation errors from training.
    #[instrument(skip_all, fields(tree_count = params.tree_count, sample_size = params.sample_size))]
    pub fn train_isolation(&self, params: &IsolationParams) -> Result<Metrics, AnalysisError> {
        let started = Instant::now();
        let config = params.config()?;
        let threshold = params.threshold()?;

        let data = self.fetch_labeled()?;
        let model = IsolationModel {
            forest: config.fit(&data.dataset.features)?,
            threshold,
        };
        let status = self.store.save(&model);

        Self::evaluate_isolation_model(&data, &model, threshold, started, Some(status.to_string()))
    }

    /// Score every record with the stored isolation forest.
    ///
    /// Flags at `threshold` when given, otherwise at the threshold saved
    /// with the model.
    ///
    /// # Errors
    ///
    /// [`IForestError::InvalidThreshold`](fraudtree_iforest::IForestError::InvalidThreshold)
    /// for a bad override; `ModelNotFound` when nothing was trained; source
    /// errors; [`AnalysisError::MissingLabels`].
    #[instrument(skip_all)]
    pub fn evaluate_isolation(&self, threshold: Option<f64>) -> Result<Metrics, AnalysisError> {
        let started = Instant::now();
        let threshold = threshold.map(AnomalyThreshold::new).transpose()?;

        let model: IsolationModel = self.store.load()?;
        let threshold = threshold.unwrap_or(model.threshold);
        let data = self.fetch_labeled()?;

        Self::evaluate_isolation_model(&data, &model, threshold, started, None)
    }

    /// Train a classification forest on every labeled record, store it, and
    /// evaluate it on the same records.
    ///
    /// # Errors
    ///
    /// Configuration errors before any fetch; source errors;
    /// [`AnalysisError::MissingLabels`]; data validation errors from training.
    #[instrument(skip_all, fields(n_trees = params.n_trees, max_depth = params.max_depth))]
    pub fn train_classifier(
        &self,
        params: &ClassificationParams,
    ) -> Result<Metrics, AnalysisError> {
        let started = Instant::now();
        let config = params.config()?;

        let data = self.fetch_labeled()?;
        let forest = config.fit(&data.dataset.features, &data.labels)?;
        let status = self.store.save(&forest);

        Self::evaluate_classifier_model(&data, &forest, started, Some(status.to_string()))
    }

    /// Predict every record with the stored classification forest.
    ///
    /// # Errors
    ///
    /// `ModelNotFound` when nothing was trained; source errors;
    /// [`AnalysisError::MissingLabels`].
    #[instrument(skip_all)]
    pub fn evaluate_classifier(&self) -> Result<Metrics, AnalysisError> {
        let started = Instant::now();
        let forest: RandomForest = self.store.load()?;
        let data = self.fetch_labeled()?;
        Self::evaluate_classifier_model(&data, &forest, started, None)
    }

    /// Predict one feature vector with the stored classification forest.
    ///
    /// # Errors
    ///
    /// `ModelNotFound` when nothing was trained;
    /// [`RfError::PredictionFeatureMismatch`](fraudtree_rf::RfError::PredictionFeatureMismatch)
    /// for a vector of the wrong width.
    #[instrument(skip_all)]
    pub fn predict_single(&self, features: &[f64]) -> Result<usize, AnalysisError> {
        let forest: RandomForest = self.store.load()?;
        Ok(forest.predict(features)?)
    }

    /// Predict many feature vectors with the stored classification forest.
    ///
    /// # Errors
    ///
    /// Same as [`predict_single`](Self::predict_single).
    #[instrument(skip_all, fields(n_samples = features.len()))]
    pub fn predict_batch(&self, features: &[Vec<f64>]) -> Result<Vec<usize>, AnalysisError> {
        let forest: RandomForest = self.store.load()?;
        Ok(forest.predict_batch(features)?)
    }
}
