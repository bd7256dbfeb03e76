//! CSV transaction reader with full input validation.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::{Dataset, FEATURE_COLUMNS, LABEL_COLUMN, RecordMetadata};
use crate::source::FeatureSource;

/// Reads preprocessed transaction records from a CSV file.
///
/// Expected CSV format:
/// - Header row required; column order is free
/// - `amt`, `distance_km`, `age`, `trans_hour` must be present
/// - `is_fraud` is optional; when present every row must carry a
///   non-negative integer label
/// - Any other column is kept verbatim as [`RecordMetadata`]
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::MissingColumn`] | A feature column is absent from the header |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
/// | [`IoError::NonFiniteValue`] | Feature cell is NaN, Inf, or unparseable float |
/// | [`IoError::InvalidLabel`] | Label cell is not `0` or `1` |
#[derive(Debug, Clone)]
pub struct CsvFeatureSource {
    path: PathBuf,
}

/// Positions of the known columns within one header.
struct ColumnLayout {
    features: [usize; FEATURE_COLUMNS.len()],
    label: Option<usize>,
    metadata: Vec<(usize, String)>,
}

impl CsvFeatureSource {
    /// Create a new source for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Return the CSV file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn layout(&self, header: &csv::StringRecord) -> Result<ColumnLayout, IoError> {
        let position = |name: &str| header.iter().position(|h| h.trim() == name);

        let mut features = [0usize; FEATURE_COLUMNS.len()];
        for (slot, name) in features.iter_mut().zip(FEATURE_COLUMNS) {
            *slot = position(name).ok_or_else(|| IoError::MissingColumn {
                path: self.path.clone(),
                column: name.to_string(),
            })?;
        }
        let label = position(LABEL_COLUMN);

        let metadata = header
            .iter()
            .enumerate()
            .filter(|(i, _)| !features.contains(i) && Some(*i) != label)
            .map(|(i, h)| (i, h.trim().to_string()))
            .collect();

        Ok(ColumnLayout {
            features,
            label,
            metadata,
        })
    }

    fn parse_feature(&self, raw: &str, row_index: usize, column: &str) -> Result<f64, IoError> {
        let non_finite = || IoError::NonFiniteValue {
            path: self.path.clone(),
            row_index,
            column: column.to_string(),
            raw: raw.to_string(),
        };
        let value: f64 = raw.trim().parse().map_err(|_| non_finite())?;
        if !value.is_finite() {
            return Err(non_finite());
        }
        Ok(value)
    }

    /// Read and validate the CSV file, returning a [`Dataset`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Dataset, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) so that our own InconsistentRowLength check fires
        // instead of a low-level CsvParse error.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let header = rdr
            .headers()
            .map_err(|e| IoError::CsvParse {
                path: self.path.clone(),
                offset: e.position().map_or(0, |p| p.byte()),
                source: e,
            })?
            .clone();
        let expected_cols = header.len();
        let layout = self.layout(&header)?;
        debug!(
            expected_cols,
            labeled = layout.label.is_some(),
            n_metadata = layout.metadata.len(),
            "read CSV header"
        );

        let mut features = Vec::new();
        let mut labels = Vec::new();
        let mut metadata = Vec::new();

        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| IoError::CsvParse {
                path: self.path.clone(),
                offset: e.position().map_or(0, |p| p.byte()),
                source: e,
            })?;

            if record.len() != expected_cols {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected: expected_cols,
                    got: record.len(),
                });
            }

            let mut row = Vec::with_capacity(FEATURE_COLUMNS.len());
            for (&col, name) in layout.features.iter().zip(FEATURE_COLUMNS) {
                row.push(self.parse_feature(&record[col], row_index, name)?);
            }

            if let Some(col) = layout.label {
                let raw = &record[col];
                let label = match raw.trim() {
                    "0" => 0,
                    "1" => 1,
                    _ => {
                        return Err(IoError::InvalidLabel {
                            path: self.path.clone(),
                            row_index,
                            raw: raw.to_string(),
                        });
                    }
                };
                labels.push(label);
            }

            metadata.push(
                layout
                    .metadata
                    .iter()
                    .map(|(col, name)| (name.clone(), record[*col].to_string()))
                    .collect::<RecordMetadata>(),
            );
            features.push(row);
        }

        if features.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        info!(
            n_records = features.len(),
            labeled = layout.label.is_some(),
            "dataset loaded"
        );

        Ok(Dataset {
            features,
            labels: layout.label.map(|_| labels),
            metadata,
        })
    }
}

impl FeatureSource for CsvFeatureSource {
    fn fetch(&self) -> Result<Dataset, IoError> {
        self.read()
    }
}
