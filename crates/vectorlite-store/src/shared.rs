//! Thread-safe handle over a [`VectorStore`].
//!
//! Reads (`search`, `get_*`, `stats`) share the lock; mutations and
//! `persist` take it exclusively, so each mutation and its snapshot write
//! appear atomic to other callers. Results are returned as owned clones.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use vectorlite_types::{Document, DocumentPatch, Metadata, SearchHit, StoreSettings};

use crate::error::StoreError;
use crate::store::{StoreStats, VectorStore};

/// Cloneable, shareable store handle.
#[derive(Clone)]
pub struct SharedVectorStore {
    inner: Arc<RwLock<VectorStore>>,
}

impl SharedVectorStore {
    pub fn new(store: VectorStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// Open a store and wrap it.
    pub fn open(settings: &StoreSettings) -> Result<Self, StoreError> {
        Ok(Self::new(VectorStore::open(settings)?))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, VectorStore>, StoreError> {
        self.inner
            .read()
            .map_err(|e| StoreError::Lock(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, VectorStore>, StoreError> {
        self.inner
            .write()
            .map_err(|e| StoreError::Lock(e.to_string()))
    }

    pub fn add(&self, vector: Vec<f32>, metadata: Option<Metadata>) -> Result<String, StoreError> {
        self.write()?.add(vector, metadata)
    }

    pub fn add_with_id(
        &self,
        id: impl Into<String>,
        vector: Vec<f32>,
        metadata: Option<Metadata>,
    ) -> Result<(), StoreError> {
        self.write()?.add_with_id(id, vector, metadata)
    }

    pub fn search(
        &self,
        query: &[f32],
        top_k: usize,
        filter: Option<&Metadata>,
    ) -> Result<Vec<SearchHit>, StoreError> {
        self.read()?.search(query, top_k, filter)
    }

    pub fn update(&self, id: &str, patch: DocumentPatch) -> Result<bool, StoreError> {
        self.write()?.update(id, patch)
    }

    pub fn delete(&self, id: &str) -> Result<bool, StoreError> {
        self.write()?.delete(id)
    }

    pub fn get_by_id(&self, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self.read()?.get_by_id(id).cloned())
    }

    pub fn get_all(&self) -> Result<Vec<Document>, StoreError> {
        Ok(self.read()?.get_all().into_iter().cloned().collect())
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.read()?.is_empty())
    }

    pub fn stats(&self) -> Result<StoreStats, StoreError> {
        Ok(self.read()?.stats())
    }

    /// Rewrite the snapshot. Exclusive, like every other write to disk.
    pub fn persist(&self) -> Result<(), StoreError> {
        self.write()?.persist()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    use tempfile::TempDir;
    use vectorlite_types::IndexKind;

    fn open(temp: &TempDir) -> SharedVectorStore {
        let settings = StoreSettings::new(3, temp.path().join("data.bin"))
            .with_capacity(1000)
            .with_index(IndexKind::Flat);
        SharedVectorStore::open(&settings).unwrap()
    }

    #[test]
    fn test_concurrent_adds() {
        let temp = TempDir::new().unwrap();
        let store = open(&temp);

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let store = store.clone();
                thread::spawn(move || {
                    for i in 0..10 {
                        store
                            .add_with_id(format!("t{}-{}", t, i), vec![1.0, t as f32, i as f32], None)
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len().unwrap(), 40);
        assert_eq!(store.stats().unwrap().next_slot, 40);
    }

    #[test]
    fn test_reads_return_owned_copies() {
        let temp = TempDir::new().unwrap();
        let store = open(&temp);
        let id = store.add(vec![1.0, 0.0, 0.0], None).unwrap();

        let before = store.get_by_id(&id).unwrap().unwrap();
        store
            .update(&id, DocumentPatch::new().with_vector(vec![0.0, 1.0, 0.0]))
            .unwrap();

        assert_eq!(before.vector, vec![1.0, 0.0, 0.0]);
        assert_eq!(
            store.get_by_id(&id).unwrap().unwrap().vector,
            vec![0.0, 1.0, 0.0]
        );
        assert_eq!(store.get_all().unwrap().len(), 1);
    }

    #[test]
    fn test_concurrent_persist_keeps_snapshot_whole() {
        let temp = TempDir::new().unwrap();
        let store = open(&temp);
        for i in 0..5 {
            store
                .add_with_id(format!("d{}", i), vec![1.0, i as f32, 0.0], None)
                .unwrap();
        }

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                thread::spawn(move || {
                    for _ in 0..10 {
                        store.persist().unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let settings = StoreSettings::new(3, temp.path().join("data.bin"))
            .with_capacity(1000)
            .with_index(IndexKind::Flat);
        let reopened = VectorStore::open(&settings).unwrap();
        assert_eq!(reopened.len(), 5);
    }

    #[test]
    fn test_search_while_shared() {
        let temp = TempDir::new().unwrap();
        let store = open(&temp);
        let id = store.add(vec![1.0, 0.0, 0.0], None).unwrap();

        let reader = store.clone();
        let hits = thread::spawn(move || reader.search(&[1.0, 0.0, 0.0], 1, None).unwrap())
            .join()
            .unwrap();
        assert_eq!(hits[0].document.id, id);
    }
}
