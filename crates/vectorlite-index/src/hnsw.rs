//! usearch-backed HNSW adapter.
//!
//! Slots are used directly as usearch keys. Cosine metric, f32 storage.
//! Defaults favour recall: M = 16, ef_construction = 200, ef_search = 100.

use tracing::{debug, info};
use usearch::{Index, IndexOptions, MetricKind, ScalarKind};

use crate::error::IndexError;
use crate::index::{check_dimension, ApproxIndex, Candidate, IndexStats, Slot};

/// HNSW graph parameters
#[derive(Debug, Clone)]
pub struct HnswConfig {
    /// Number of connections per layer (M parameter)
    pub connectivity: usize,
    /// Build-time search depth (ef_construction)
    pub expansion_add: usize,
    /// Query-time search depth (ef_search)
    pub expansion_search: usize,
}

impl Default for HnswConfig {
    fn default() -> Self {
        Self {
            connectivity: 16,
            expansion_add: 200,
            expansion_search: 100,
        }
    }
}

impl HnswConfig {
    pub fn with_connectivity(mut self, m: usize) -> Self {
        self.connectivity = m;
        self
    }

    pub fn with_expansion(mut self, ef_add: usize, ef_search: usize) -> Self {
        self.expansion_add = ef_add;
        self.expansion_search = ef_search;
        self
    }
}

/// Approximate index over a usearch HNSW graph.
///
/// usearch reclaims the storage of removed keys internally, so a slot that
/// was marked deleted can be re-added in place.
pub struct HnswIndex {
    index: Option<Index>,
    config: HnswConfig,
    dimension: usize,
    capacity: usize,
}

impl HnswIndex {
    /// Create an uninitialized index; call `initialize` before use.
    pub fn new(config: HnswConfig) -> Self {
        Self {
            index: None,
            config,
            dimension: 0,
            capacity: 0,
        }
    }

    fn options(&self, dimension: usize) -> IndexOptions {
        IndexOptions {
            dimensions: dimension,
            metric: MetricKind::Cos,
            quantization: ScalarKind::F32,
            connectivity: self.config.connectivity,
            expansion_add: self.config.expansion_add,
            expansion_search: self.config.expansion_search,
            multi: false,
        }
    }

    fn inner(&self) -> Result<&Index, IndexError> {
        self.index.as_ref().ok_or(IndexError::NotInitialized)
    }
}

impl ApproxIndex for HnswIndex {
    fn initialize(&mut self, dimension: usize, capacity: usize) -> Result<(), IndexError> {
        let index =
            Index::new(&self.options(dimension)).map_err(|e| IndexError::Index(e.to_string()))?;
        index
            .reserve(capacity)
            .map_err(|e| IndexError::Index(e.to_string()))?;

        self.index = Some(index);
        self.dimension = dimension;
        self.capacity = capacity;
        info!(dim = dimension, capacity = capacity, "Initialized HNSW index");
        Ok(())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.index.as_ref().map(|i| i.size()).unwrap_or(0)
    }

    fn add_point(&mut self, vector: &[f32], slot: Slot) -> Result<(), IndexError> {
        let index = self.inner()?;
        check_dimension(self.dimension, vector)?;

        if index.size() >= self.capacity {
            return Err(IndexError::CapacityReached(self.capacity));
        }

        index
            .add(slot, vector)
            .map_err(|e| IndexError::Index(e.to_string()))?;

        debug!(slot = slot, "Added vector");
        Ok(())
    }

    fn mark_deleted(&mut self, slot: Slot) -> Result<bool, IndexError> {
        let index = self.inner()?;
        let removed = index
            .remove(slot)
            .map_err(|e| IndexError::Index(e.to_string()))?;

        if removed > 0 {
            debug!(slot = slot, "Removed vector");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn search_approx(&self, query: &[f32], k: usize) -> Result<Vec<Candidate>, IndexError> {
        let index = self.inner()?;
        check_dimension(self.dimension, query)?;

        if k == 0 || index.size() == 0 {
            return Ok(Vec::new());
        }

        let results = index
            .search(query, k)
            .map_err(|e| IndexError::Index(e.to_string()))?;

        let candidates: Vec<Candidate> = results
            .keys
            .iter()
            .zip(results.distances.iter())
            .map(|(&slot, &dist)| Candidate::new(slot, 1.0 - dist)) // Convert distance to similarity
            .collect();

        debug!(k = k, found = candidates.len(), "Search complete");
        Ok(candidates)
    }

    fn stats(&self) -> IndexStats {
        IndexStats {
            vector_count: self.len(),
            dimension: self.dimension,
            capacity: self.capacity,
            available: self.index.is_some(),
        }
    }
}
