//! I/O error types for fraudtree-io.

use std::path::PathBuf;

use crate::store::EnsembleKind;

/// Errors from reading transaction feature tables.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the CSV file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when the CSV file contains a header but zero data rows.
    #[error("empty dataset (no data rows) in {path}")]
    EmptyDataset {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when a required feature column is absent from the header.
    #[error("missing column \"{column}\" in {path}")]
    MissingColumn {
        /// Path to the CSV file.
        path: PathBuf,
        /// Name of the absent column.
        column: String,
    },

    /// Returned when a data row has a different number of columns than the header.
    #[error("inconsistent row length in {path}: row {row_index} has {got} columns, expected {expected}")]
    InconsistentRowLength {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Expected number of columns (from header).
        expected: usize,
        /// Actual number of columns in this row.
        got: usize,
    },

    /// Returned when a feature cell is NaN, Inf, or otherwise not a finite float.
    #[error("non-finite value in {path}: row {row_index}, column \"{column}\", raw value \"{raw}\"")]
    NonFiniteValue {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Name of the offending column.
        column: String,
        /// The raw string value that failed to parse.
        raw: String,
    },

    /// Returned when a label cell is not `0` or `1`.
    #[error("invalid label in {path}: row {row_index}, raw value \"{raw}\"")]
    InvalidLabel {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// The raw string value that failed to parse.
        raw: String,
    },
}

/// Errors from loading and saving ensemble snapshots.
///
/// Save-side variants never reach callers of
/// [`ModelStore::save`](crate::ModelStore::save); they are rendered into a
/// [`SaveStatus::Failed`](crate::SaveStatus::Failed) reason instead.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Returned when no snapshot has been saved for this kind yet.
    #[error("no stored {kind} model at {path}")]
    ModelNotFound {
        /// Ensemble kind that was requested.
        kind: EnsembleKind,
        /// Snapshot location that was checked.
        path: PathBuf,
    },

    /// Returned when the snapshot exists but cannot be read.
    #[error("cannot read model file {path}")]
    ReadModel {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when bincode decoding fails.
    #[error("cannot decode model file {path}")]
    DeserializeModel {
        /// Path to the snapshot.
        path: PathBuf,
        /// Underlying bincode error.
        source: bincode::Error,
    },

    /// Returned when the snapshot was written by an incompatible format version.
    #[error("model file {path} has format version {found}, expected {expected}")]
    IncompatibleVersion {
        /// Version this build reads.
        expected: u32,
        /// Version recorded in the snapshot.
        found: u32,
        /// Path to the snapshot.
        path: PathBuf,
    },

    /// Returned when the snapshot holds a different ensemble kind.
    #[error("model file {path} holds a {found} model, expected {expected}")]
    KindMismatch {
        /// Kind that was requested.
        expected: EnsembleKind,
        /// Kind recorded in the snapshot.
        found: EnsembleKind,
        /// Path to the snapshot.
        path: PathBuf,
    },

    /// Returned when bincode encoding fails.
    #[error("cannot encode {kind} model")]
    SerializeModel {
        /// Ensemble kind being saved.
        kind: EnsembleKind,
        /// Underlying bincode error.
        source: bincode::Error,
    },

    /// Returned when the model directory cannot be created.
    #[error("cannot create model directory {path}")]
    CreateDir {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the snapshot cannot be written.
    #[error("cannot write model file {path}")]
    WriteModel {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
