use std::path::PathBuf;

use thiserror::Error;

/// Failures that stop a batch run.
///
/// Per-row problems (bad CAS RN text, registry failures, unknown numbers)
/// are never reported here; they end up in the row's status instead.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("column '{column}' not found in CSV header (available: {available})")]
    MissingColumn { column: String, available: String },

    #[error("failed to read CSV: {0}")]
    Read(#[source] csv::Error),

    #[error("failed to write CSV: {0}")]
    Write(#[source] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BatchError>;
