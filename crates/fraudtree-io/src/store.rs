//! Versioned bincode snapshots of trained ensembles.

use std::fmt;
use std::path::{Path, PathBuf};

use fraudtree_iforest::{AnomalyThreshold, IsolationForest};
use fraudtree_rf::RandomForest;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use crate::error::StoreError;

/// Current binary format version.
const FORMAT_VERSION: u32 = 1;

/// The two ensemble kinds the store keeps one snapshot each of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnsembleKind {
    /// Unsupervised isolation forest.
    Isolation,
    /// Supervised classification forest.
    Classification,
}

impl EnsembleKind {
    fn file_name(self) -> &'static str {
        match self {
            EnsembleKind::Isolation => "isolation_forest.bin",
            EnsembleKind::Classification => "random_forest.bin",
        }
    }
}

impl fmt::Display for EnsembleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EnsembleKind::Isolation => "isolation",
            EnsembleKind::Classification => "classification",
        })
    }
}

/// A model type the store knows how to persist.
pub trait StoredModel: Serialize + DeserializeOwned {
    /// Snapshot slot this model type occupies.
    const KIND: EnsembleKind;
}

/// An isolation forest together with the threshold it was trained for.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IsolationModel {
    /// The fitted forest.
    pub forest: IsolationForest,
    /// Flagging threshold chosen at training time.
    pub threshold: AnomalyThreshold,
}

impl StoredModel for IsolationModel {
    const KIND: EnsembleKind = EnsembleKind::Isolation;
}

impl StoredModel for RandomForest {
    const KIND: EnsembleKind = EnsembleKind::Classification;
}

/// Leading fields of every snapshot, decoded before the model body.
#[derive(serde::Serialize, serde::Deserialize)]
struct EnvelopeHeader {
    format_version: u32,
    kind: EnsembleKind,
}

/// Versioned envelope for a serialized model.
#[derive(serde::Serialize, serde::Deserialize)]
struct ModelEnvelope<M> {
    format_version: u32,
    kind: EnsembleKind,
    model: M,
}

/// Outcome of a [`ModelStore::save`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    /// The snapshot was written.
    Saved {
        /// Location of the snapshot.
        path: PathBuf,
    },
    /// The snapshot could not be written; the previous one, if any, may remain.
    Failed {
        /// Human-readable cause.
        reason: String,
    },
}

impl SaveStatus {
    /// Return `true` if the snapshot was written.
    #[must_use]
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveStatus::Saved { .. })
    }
}

impl fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveStatus::Saved { path } => write!(f, "model saved to {}", path.display()),
            SaveStatus::Failed { reason } => write!(f, "model save failed: {reason}"),
        }
    }
}

/// Persists at most one snapshot per [`EnsembleKind`] under a fixed directory.
///
/// Saving overwrites the previous snapshot of the same kind. The directory
/// is created on first save.
#[derive(Debug, Clone)]
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    /// Create a store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Return the directory snapshots are kept in.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Return the snapshot location for `kind`.
    #[must_use]
    pub fn path_for(&self, kind: EnsembleKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    /// Return `true` if a snapshot of `kind` exists.
    #[must_use]
    pub fn contains(&self, kind: EnsembleKind) -> bool {
        self.path_for(kind).is_file()
    }

    /// Save `model`, replacing any previous snapshot of its kind.
    ///
    /// Never fails: any storage error is logged and reported as
    /// [`SaveStatus::Failed`].
    #[instrument(skip_all, fields(kind = %M::KIND, dir = %self.dir.display()))]
    pub fn save<M: StoredModel>(&self, model: &M) -> SaveStatus {
        match self.try_save(model) {
            Ok((path, size_bytes)) => {
                info!(size_bytes, path = %path.display(), "model saved");
                SaveStatus::Saved { path }
            }
            Err(e) => {
                warn!(error = %e, "model save failed");
                SaveStatus::Failed {
                    reason: error_chain(&e),
                }
            }
        }
    }

    fn try_save<M: StoredModel>(&self, model: &M) -> Result<(PathBuf, usize), StoreError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| StoreError::CreateDir {
            path: self.dir.clone(),
            source: e,
        })?;

        let envelope = ModelEnvelope {
            format_version: FORMAT_VERSION,
            kind: M::KIND,
            model,
        };
        let bytes = bincode::serialize(&envelope).map_err(|e| StoreError::SerializeModel {
            kind: M::KIND,
            source: e,
        })?;

        let path = self.path_for(M::KIND);
        std::fs::write(&path, &bytes).map_err(|e| StoreError::WriteModel {
            path: path.clone(),
            source: e,
        })?;
        Ok((path, bytes.len()))
    }

    /// Load the stored snapshot of `M`'s kind.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`StoreError::ModelNotFound`] | nothing saved yet |
    /// | [`StoreError::ReadModel`] | file read failed |
    /// | [`StoreError::DeserializeModel`] | bincode decoding failed |
    /// | [`StoreError::IncompatibleVersion`] | format version mismatch |
    /// | [`StoreError::KindMismatch`] | file holds the other ensemble kind |
    #[instrument(skip_all, fields(kind = %M::KIND, dir = %self.dir.display()))]
    pub fn load<M: StoredModel>(&self) -> Result<M, StoreError> {
        let path = self.path_for(M::KIND);

        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::ModelNotFound { kind: M::KIND, path });
            }
            Err(e) => return Err(StoreError::ReadModel { path, source: e }),
        };

        let header: EnvelopeHeader =
            bincode::deserialize(&bytes).map_err(|e| StoreError::DeserializeModel {
                path: path.clone(),
                source: e,
            })?;
        if header.format_version != FORMAT_VERSION {
            return Err(StoreError::IncompatibleVersion {
                expected: FORMAT_VERSION,
                found: header.format_version,
                path,
            });
        }
        if header.kind != M::KIND {
            return Err(StoreError::KindMismatch {
                expected: M::KIND,
                found: header.kind,
                path,
            });
        }

        let envelope: ModelEnvelope<M> =
            bincode::deserialize(&bytes).map_err(|e| StoreError::DeserializeModel {
                path: path.clone(),
                source: e,
            })?;

        debug!(size_bytes = bytes.len(), "model loaded");
        Ok(envelope.model)
    }
}

/// Render an error and its sources as one line.
fn error_chain(e: &dyn std::error::Error) -> String {
    let mut out = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
