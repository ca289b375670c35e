//! Brute-force index.
//!
//! Exact O(n) cosine scan over every live vector. Sufficient for small
//! stores and gives deterministic results for tests.

use std::collections::BTreeMap;

use tracing::debug;

use crate::distance::cosine_similarity;
use crate::error::IndexError;
use crate::index::{check_dimension, ApproxIndex, Candidate, IndexStats, Slot};

/// Exact nearest-neighbor index.
#[derive(Debug, Default)]
pub struct FlatIndex {
    /// Live vectors keyed by slot (BTreeMap keeps iteration deterministic)
    vectors: BTreeMap<Slot, Vec<f32>>,
    dimension: usize,
    capacity: usize,
    initialized: bool,
}

impl FlatIndex {
    /// Create an uninitialized index; call `initialize` before use.
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_initialized(&self) -> Result<(), IndexError> {
        if self.initialized {
            Ok(())
        } else {
            Err(IndexError::NotInitialized)
        }
    }
}

impl ApproxIndex for FlatIndex {
    fn initialize(&mut self, dimension: usize, capacity: usize) -> Result<(), IndexError> {
        self.vectors.clear();
        self.dimension = dimension;
        self.capacity = capacity;
        self.initialized = true;
        Ok(())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }

    fn add_point(&mut self, vector: &[f32], slot: Slot) -> Result<(), IndexError> {
        self.ensure_initialized()?;
        check_dimension(self.dimension, vector)?;

        if !self.vectors.contains_key(&slot) && self.vectors.len() >= self.capacity {
            return Err(IndexError::CapacityReached(self.capacity));
        }

        self.vectors.insert(slot, vector.to_vec());
        debug!(slot = slot, "Added vector");
        Ok(())
    }

    fn mark_deleted(&mut self, slot: Slot) -> Result<bool, IndexError> {
        self.ensure_initialized()?;
        Ok(self.vectors.remove(&slot).is_some())
    }

    fn search_approx(&self, query: &[f32], k: usize) -> Result<Vec<Candidate>, IndexError> {
        self.ensure_initialized()?;
        check_dimension(self.dimension, query)?;

        if k == 0 {
            return Ok(Vec::new());
        }

        let mut candidates: Vec<Candidate> = self
            .vectors
            .iter()
            .map(|(&slot, vector)| Candidate::new(slot, cosine_similarity(query, vector)))
            .collect();

        // Score descending, slot ascending on ties
        candidates.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.slot.cmp(&b.slot))
        });
        candidates.truncate(k);
        Ok(candidates)
    }

    fn stats(&self) -> IndexStats {
        IndexStats {
            vector_count: self.vectors.len(),
            dimension: self.dimension,
            capacity: self.capacity,
            available: self.initialized,
        }
    }
}
