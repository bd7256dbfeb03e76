//! Feature sources and model persistence for the fraudtree pipeline.

mod domain;
mod error;
mod reader;
mod source;
mod store;

pub use domain::{Dataset, FEATURE_COLUMNS, LABEL_COLUMN, RecordMetadata};
pub use error::{IoError, StoreError};
pub use reader::CsvFeatureSource;
pub use source::{FeatureSource, InMemorySource};
pub use store::{EnsembleKind, IsolationModel, ModelStore, SaveStatus, StoredModel};
