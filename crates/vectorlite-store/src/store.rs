//! Vector store engine.
//!
//! Owns the document table, the id <-> slot index, the approximate index and
//! the snapshot codec. Every successful mutation rewrites the full snapshot
//! before returning.
//!
//! Failure handling:
//! - Validation (dimension, duplicate/empty id) runs before anything changes.
//! - Index calls run before bookkeeping, so an index failure leaves the
//!   document table untouched. A slot consumed by a failed `add` is burned.
//! - A failed snapshot write is reported after the in-memory change has been
//!   applied; the file catches up on the next successful write.

use std::collections::HashMap;

use tracing::{debug, info, warn};
use ulid::Ulid;
use vectorlite_index::{
    cosine_similarity, ApproxIndex, FlatIndex, HnswConfig, HnswIndex, IndexStats, Slot,
};
use vectorlite_types::{Document, DocumentPatch, IndexKind, Metadata, SearchHit, StoreSettings};

use crate::error::StoreError;
use crate::filter::matches;
use crate::slots::SlotIndex;
use crate::snapshot::SnapshotCodec;

/// Multiplier applied to `top_k` when asking the index for candidates, to
/// leave room for filtered-out and tombstoned slots.
pub const OVERFETCH_FACTOR: usize = 3;

/// Store statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreStats {
    /// Number of live documents
    pub document_count: usize,
    /// Vector dimension
    pub dimension: usize,
    /// Next slot to be allocated
    pub next_slot: Slot,
    /// Snapshot file size in bytes, `None` if the file could not be inspected
    pub snapshot_bytes: Option<u64>,
    /// Index statistics
    pub index: IndexStats,
}

/// Build the index implementation selected in settings.
pub fn build_index(settings: &StoreSettings) -> Box<dyn ApproxIndex> {
    match settings.index {
        IndexKind::Hnsw => {
            let config = HnswConfig::default()
                .with_connectivity(settings.connectivity)
                .with_expansion(settings.expansion_add, settings.expansion_search);
            Box::new(HnswIndex::new(config))
        }
        IndexKind::Flat => Box::new(FlatIndex::new()),
    }
}

/// Embedded vector store.
pub struct VectorStore {
    dimension: usize,
    documents: HashMap<String, Document>,
    slots: SlotIndex,
    index: Box<dyn ApproxIndex>,
    snapshot: SnapshotCodec,
}

impl VectorStore {
    /// Open the store described by `settings`, replaying its snapshot.
    pub fn open(settings: &StoreSettings) -> Result<Self, StoreError> {
        Self::open_with_index(settings, build_index(settings))
    }

    /// Open with a caller-provided index implementation.
    pub fn open_with_index(
        settings: &StoreSettings,
        mut index: Box<dyn ApproxIndex>,
    ) -> Result<Self, StoreError> {
        settings.validate().map_err(StoreError::InvalidInput)?;
        index.initialize(settings.dimension, settings.capacity)?;

        let mut store = Self {
            dimension: settings.dimension,
            documents: HashMap::new(),
            slots: SlotIndex::new(),
            index,
            snapshot: SnapshotCodec::new(settings.expanded_snapshot_path()),
        };
        store.recover()?;

        info!(
            path = ?store.snapshot.path(),
            documents = store.len(),
            dim = store.dimension,
            index = settings.index.as_str(),
            "Opened vector store"
        );
        Ok(store)
    }

    /// Replay the snapshot through slot allocation without re-persisting.
    fn recover(&mut self) -> Result<(), StoreError> {
        for (position, doc) in self.snapshot.load()?.into_iter().enumerate() {
            if doc.dimension() != self.dimension {
                return Err(StoreError::CorruptSnapshot(format!(
                    "record {} ('{}') has dimension {}, expected {}",
                    position,
                    doc.id,
                    doc.dimension(),
                    self.dimension
                )));
            }
            if doc.vector.iter().any(|v| !v.is_finite()) {
                return Err(StoreError::CorruptSnapshot(format!(
                    "record {} ('{}') has a non-finite component",
                    position, doc.id
                )));
            }
            if self.slots.contains(&doc.id) {
                return Err(StoreError::CorruptSnapshot(format!(
                    "record {} repeats id '{}'",
                    position, doc.id
                )));
            }
            self.insert_document(doc)?;
        }
        Ok(())
    }

    /// Vector dimension shared by every document
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of live documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Add a document under a freshly generated id.
    pub fn add(&mut self, vector: Vec<f32>, metadata: Option<Metadata>) -> Result<String, StoreError> {
        let id = Ulid::new().to_string();
        self.add_with_id(id.clone(), vector, metadata)?;
        Ok(id)
    }

    /// Add a document under a caller-supplied id.
    pub fn add_with_id(
        &mut self,
        id: impl Into<String>,
        vector: Vec<f32>,
        metadata: Option<Metadata>,
    ) -> Result<(), StoreError> {
        let id = id.into();
        if id.is_empty() {
            return Err(StoreError::InvalidInput("document id must not be empty".to_string()));
        }
        self.check_vector(&vector)?;
        if self.slots.contains(&id) {
            return Err(StoreError::DuplicateId(id));
        }

        let doc = Document {
            id,
            vector,
            metadata: metadata.unwrap_or_default(),
        };
        let slot = self.insert_document(doc)?;
        debug!(slot = slot, "Added document");

        self.persist()
    }

    /// Allocate a slot, index the vector, then record the document.
    fn insert_document(&mut self, doc: Document) -> Result<Slot, StoreError> {
        let slot = self.slots.next_slot();
        self.index.add_point(&doc.vector, slot)?;
        self.slots.bind(&doc.id, slot);
        self.documents.insert(doc.id.clone(), doc);
        Ok(slot)
    }

    /// Approximate search re-ranked by exact cosine similarity.
    ///
    /// Candidates are taken in index order until `top_k` pass the filter,
    /// then sorted by score descending (stable on ties).
    pub fn search(
        &self,
        query: &[f32],
        top_k: usize,
        filter: Option<&Metadata>,
    ) -> Result<Vec<SearchHit>, StoreError> {
        self.check_vector(query)?;

        // Never more hits than live documents, never more candidates than indexed points
        let top_k = top_k.min(self.len());
        if top_k == 0 {
            return Ok(Vec::new());
        }
        let request = top_k
            .saturating_mul(OVERFETCH_FACTOR)
            .min(self.index.len());

        let candidates = self.index.search_approx(query, request)?;

        let mut hits = Vec::with_capacity(top_k);
        for candidate in &candidates {
            let Some(doc) = self
                .slots
                .id_of(candidate.slot)
                .and_then(|id| self.documents.get(id))
            else {
                continue;
            };

            if let Some(predicate) = filter {
                if !matches(&doc.metadata, predicate) {
                    continue;
                }
            }

            hits.push(SearchHit {
                document: doc.clone(),
                score: cosine_similarity(query, &doc.vector),
            });
            if hits.len() >= top_k {
                break;
            }
        }

        hits.sort_by(|a, b| b.score.total_cmp(&a.score));

        debug!(
            top_k = top_k,
            requested = request,
            candidates = candidates.len(),
            found = hits.len(),
            "Search complete"
        );
        Ok(hits)
    }

    /// Apply a partial update. Returns `false` if `id` is unknown.
    ///
    /// The slot is kept; the index entry is tombstoned and re-added in place.
    pub fn update(&mut self, id: &str, patch: DocumentPatch) -> Result<bool, StoreError> {
        if let Some(vector) = &patch.vector {
            self.check_vector(vector)?;
        }

        let (Some(slot), Some(existing)) = (self.slots.slot_of(id), self.documents.get(id)) else {
            return Ok(false);
        };
        if patch.is_empty() {
            return Ok(true);
        }
        let updated = patch.apply(existing);

        self.index.mark_deleted(slot)?;
        if let Err(e) = self.index.add_point(&updated.vector, slot) {
            if let Err(restore) = self.index.add_point(&existing.vector, slot) {
                warn!(id = %id, slot = slot, error = %restore, "Failed to restore index entry");
            }
            return Err(e.into());
        }

        self.documents.insert(id.to_string(), updated);
        debug!(id = %id, slot = slot, "Updated document");

        self.persist()?;
        Ok(true)
    }

    /// Delete a document. Returns `false` if `id` is unknown.
    ///
    /// The slot is tombstoned and never reissued.
    pub fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let Some(slot) = self.slots.slot_of(id) else {
            return Ok(false);
        };

        self.index.mark_deleted(slot)?;
        self.slots.unbind(id);
        self.documents.remove(id);
        debug!(id = %id, slot = slot, "Deleted document");

        self.persist()?;
        Ok(true)
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Document> {
        self.documents.get(id)
    }

    /// All live documents in insertion order.
    pub fn get_all(&self) -> Vec<&Document> {
        self.live_documents().collect()
    }

    fn live_documents(&self) -> impl Iterator<Item = &Document> {
        self.slots.ids().filter_map(|id| self.documents.get(id))
    }

    /// Rewrite the snapshot from the current live set.
    pub fn persist(&self) -> Result<(), StoreError> {
        self.snapshot.save(self.live_documents())
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            document_count: self.len(),
            dimension: self.dimension,
            next_slot: self.slots.peek_next(),
            snapshot_bytes: self.snapshot.size_bytes().ok(),
            index: self.index.stats(),
        }
    }

    /// Reject vectors of the wrong length or with NaN/infinite components.
    fn check_vector(&self, vector: &[f32]) -> Result<(), StoreError> {
        if vector.len() != self.dimension {
            return Err(StoreError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        if let Some(position) = vector.iter().position(|v| !v.is_finite()) {
            return Err(StoreError::InvalidInput(format!(
                "vector component {} is not finite",
                position
            )));
        }
        Ok(())
    }
}
