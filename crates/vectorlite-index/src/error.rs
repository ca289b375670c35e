//! Index adapter error types.

use thiserror::Error;

/// Errors that can occur inside an index adapter.
#[derive(Debug, Error)]
pub enum IndexError {
    /// usearch index error
    #[error("Index error: {0}")]
    Index(String),

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Index is full
    #[error("Index capacity reached: {0}")]
    CapacityReached(usize),

    /// Index not initialized
    #[error("Index not initialized")]
    NotInitialized,
}
