//! Vector store error types.

use std::path::PathBuf;

use thiserror::Error;
use vectorlite_index::IndexError;

/// Errors that can occur during store operations.
///
/// Unknown ids are not errors: `update`/`delete` return `false` and
/// `get_by_id` returns `None`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Vector length differs from the store dimension
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Caller-supplied id already present
    #[error("Document with id '{0}' already exists")]
    DuplicateId(String),

    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// On-disk snapshot failed to parse or replay
    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    /// Snapshot could not be read or written
    #[error("Persistence failure at {path:?}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Index adapter failure
    #[error("Adapter failure: {0}")]
    Adapter(#[from] IndexError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Shared store lock was poisoned
    #[error("Lock error: {0}")]
    Lock(String),
}

impl StoreError {
    /// Whether this error was raised by input validation, before any
    /// state was touched.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            StoreError::DimensionMismatch { .. }
                | StoreError::DuplicateId(_)
                | StoreError::InvalidInput(_)
        )
    }
}
