//! Approximate index trait and types.
//!
//! Defines the capability the store needs from a nearest-neighbor
//! structure. Vectors are addressed by dense integer slots assigned by the
//! store, never by document id.

use crate::error::IndexError;

/// Dense integer handle used by the index to refer to a vector.
pub type Slot = u64;

/// A candidate returned by an approximate search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Slot of the matched vector
    pub slot: Slot,
    /// Adapter-native similarity (higher = more similar)
    pub score: f32,
}

impl Candidate {
    pub fn new(slot: Slot, score: f32) -> Self {
        Self { slot, score }
    }
}

/// Index statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexStats {
    /// Number of live vectors in the index
    pub vector_count: usize,
    /// Embedding dimension
    pub dimension: usize,
    /// Maximum number of vectors
    pub capacity: usize,
    /// Whether the index has been initialized
    pub available: bool,
}

/// Trait for approximate nearest-neighbor indexes.
///
/// Implementations must be thread-safe for concurrent read access.
pub trait ApproxIndex: Send + Sync {
    /// (Re)create an empty index for the given dimension and capacity.
    fn initialize(&mut self, dimension: usize, capacity: usize) -> Result<(), IndexError>;

    /// Get the embedding dimension (0 before initialization)
    fn dimension(&self) -> usize;

    /// Get the number of live vectors in the index
    fn len(&self) -> usize;

    /// Check if the index is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add a vector at the given slot.
    fn add_point(&mut self, vector: &[f32], slot: Slot) -> Result<(), IndexError>;

    /// Tombstone a slot. Returns whether the slot held a live vector.
    fn mark_deleted(&mut self, slot: Slot) -> Result<bool, IndexError>;

    /// Search for k nearest neighbors.
    /// Returns candidates sorted by similarity (best first).
    fn search_approx(&self, query: &[f32], k: usize) -> Result<Vec<Candidate>, IndexError>;

    /// Get index statistics
    fn stats(&self) -> IndexStats;
}

/// Reject vectors whose length differs from the index dimension.
pub(crate) fn check_dimension(expected: usize, vector: &[f32]) -> Result<(), IndexError> {
    if vector.len() != expected {
        return Err(IndexError::DimensionMismatch {
            expected,
            actual: vector.len(),
        });
    }
    Ok(())
}
