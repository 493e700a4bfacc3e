use std::io;

use thiserror::Error;

use crate::types::FieldName;

/// Error type for record resolution, tree construction, and document IO failures.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("row {row}: missing grouping field '{key}'")]
    MissingGroupKey { key: FieldName, row: usize },
    #[error("grouping tree invariant violated: {0}")]
    StructuralInvariant(String),
    #[error("input '{input}' is empty or has no header row")]
    EmptyInput { input: String },
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
