//! Integration tests for the vector store.
//!
//! Covers the public contract end to end: add/search/update/delete,
//! filtered search, restart recovery, and both index backends.

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use rand::Rng;
use serde_json::json;
use tempfile::TempDir;

use vectorlite_index::cosine_similarity;
use vectorlite_store::{SharedVectorStore, StoreError, VectorStore};
use vectorlite_types::{DocumentPatch, IndexKind, Metadata, StoreSettings};

/// Temporary store location that lives for the duration of a test.
struct Harness {
    _temp: TempDir,
    path: PathBuf,
}

impl Harness {
    fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let path = temp.path().join("store").join("vectors.bin");
        Self { _temp: temp, path }
    }

    fn settings(&self, dimension: usize, index: IndexKind) -> StoreSettings {
        StoreSettings::new(dimension, &self.path)
            .with_capacity(1000)
            .with_index(index)
    }

    fn open(&self, dimension: usize, index: IndexKind) -> VectorStore {
        VectorStore::open(&self.settings(dimension, index)).expect("Failed to open store")
    }
}

fn meta(value: serde_json::Value) -> Metadata {
    value.as_object().cloned().expect("metadata must be an object")
}

fn random_vector(rng: &mut impl Rng, dimension: usize) -> Vec<f32> {
    (0..dimension).map(|_| rng.random_range(-1.0..1.0)).collect()
}

#[test]
fn test_add_search_update_delete_flow() {
    let harness = Harness::new();
    let mut store = harness.open(3, IndexKind::Flat);

    let x = store
        .add(vec![1.0, 0.0, 0.0], Some(meta(json!({"tag": "a"}))))
        .unwrap();
    let y = store
        .add(vec![0.0, 1.0, 0.0], Some(meta(json!({"tag": "b"}))))
        .unwrap();

    let hits = store.search(&[1.0, 0.0, 0.0], 1, None).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].document.id, x);
    assert!((hits[0].score - 1.0).abs() < 1e-6);

    let filter = meta(json!({"tag": "b"}));
    let hits = store.search(&[1.0, 0.0, 0.0], 2, Some(&filter)).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].document.id, y);
    assert!(hits[0].score.abs() < 1e-6);

    let patch = DocumentPatch::new().with_metadata(meta(json!({"tag": "c"})));
    assert!(store.update(&x, patch).unwrap());
    let doc = store.get_by_id(&x).unwrap();
    assert_eq!(doc.metadata, meta(json!({"tag": "c"})));
    assert_eq!(doc.vector, vec![1.0, 0.0, 0.0]);

    assert!(store.delete(&x).unwrap());
    assert!(store.get_by_id(&x).is_none());
    let hits = store.search(&[1.0, 0.0, 0.0], 2, None).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].document.id, y);
}

#[test]
fn test_results_are_sorted_bounded_and_scored_exactly() {
    let harness = Harness::new();
    let mut store = harness.open(8, IndexKind::Flat);
    let mut rng = rand::rng();

    for _ in 0..50 {
        store.add(random_vector(&mut rng, 8), None).unwrap();
    }

    let query = random_vector(&mut rng, 8);
    let hits = store.search(&query, 10, None).unwrap();
    assert_eq!(hits.len(), 10);

    for pair in hits.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    for hit in &hits {
        let exact = cosine_similarity(&query, &hit.document.vector);
        assert_eq!(hit.score, exact);
        assert!((-1.0 - 1e-6..=1.0 + 1e-6).contains(&hit.score));
    }
}

#[test]
fn test_filtered_results_all_match() {
    let harness = Harness::new();
    let mut store = harness.open(4, IndexKind::Flat);
    let mut rng = rand::rng();

    for i in 0..30 {
        let metadata = meta(json!({"parity": if i % 2 == 0 { "even" } else { "odd" }, "n": i}));
        store.add(random_vector(&mut rng, 4), Some(metadata)).unwrap();
    }

    let filter = meta(json!({"parity": "odd", "n": {"$gt": 10}}));
    let hits = store
        .search(&random_vector(&mut rng, 4), 5, Some(&filter))
        .unwrap();
    assert!(!hits.is_empty());
    for hit in &hits {
        assert_eq!(hit.document.metadata["parity"], json!("odd"));
        assert!(hit.document.metadata["n"].as_i64().unwrap() > 10);
    }
}

#[test]
fn test_deleted_document_never_returned_even_if_nearest() {
    let harness = Harness::new();
    let mut store = harness.open(3, IndexKind::Flat);

    let nearest = store.add(vec![1.0, 0.0, 0.0], None).unwrap();
    store.add(vec![0.5, 0.5, 0.0], None).unwrap();
    store.add(vec![0.0, 0.0, 1.0], None).unwrap();
    store.delete(&nearest).unwrap();

    let hits = store.search(&[1.0, 0.0, 0.0], 3, None).unwrap();
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|h| h.document.id != nearest));
}

#[test]
fn test_update_unknown_and_delete_unknown() {
    let harness = Harness::new();
    let mut store = harness.open(3, IndexKind::Flat);

    let patch = DocumentPatch::new().with_vector(vec![1.0, 0.0, 0.0]);
    assert!(!store.update("nope", patch).unwrap());
    assert!(!store.delete("nope").unwrap());
    assert!(store.is_empty());
}

#[test]
fn test_dimension_mismatch_is_rejected_everywhere() {
    let harness = Harness::new();
    let mut store = harness.open(3, IndexKind::Flat);
    let id = store.add(vec![1.0, 0.0, 0.0], None).unwrap();

    let err = store.add(vec![1.0; 4], None).unwrap_err();
    assert!(err.is_validation());
    assert!(matches!(
        store.search(&[1.0; 2], 1, None),
        Err(StoreError::DimensionMismatch {
            expected: 3,
            actual: 2
        })
    ));
    let patch = DocumentPatch::new().with_vector(vec![1.0]);
    assert!(store.update(&id, patch).unwrap_err().is_validation());

    assert_eq!(store.len(), 1);
}

#[test]
fn test_restart_round_trip() {
    let harness = Harness::new();
    let expected = {
        let mut store = harness.open(3, IndexKind::Flat);
        let a = store
            .add(vec![1.0, 0.0, 0.0], Some(meta(json!({"k": "a", "n": 1.5}))))
            .unwrap();
        let b = store.add(vec![0.0, 1.0, 0.0], None).unwrap();
        store.add(vec![0.0, 0.0, 1.0], None).unwrap();
        store
            .update(&b, DocumentPatch::new().with_vector(vec![0.0, 0.6, 0.8]))
            .unwrap();
        store.delete(&a).unwrap();
        store
            .get_all()
            .into_iter()
            .cloned()
            .collect::<Vec<_>>()
    };

    let store = harness.open(3, IndexKind::Flat);
    let restored: Vec<_> = store.get_all().into_iter().cloned().collect();
    assert_eq!(restored, expected);

    let hits = store.search(&[0.0, 0.6, 0.8], 1, None).unwrap();
    assert_eq!(hits[0].document.id, expected[0].id);
}

#[test]
fn test_restart_with_missing_snapshot_is_empty() {
    let harness = Harness::new();
    let store = harness.open(3, IndexKind::Flat);
    assert!(store.is_empty());
    assert!(!harness.path.exists());
}

#[test]
fn test_corrupt_snapshot_fails_open() {
    let harness = Harness::new();
    std::fs::create_dir_all(harness.path.parent().unwrap()).unwrap();
    std::fs::write(&harness.path, [0xff, 0xff, 0xff, 0x7f, 0x01]).unwrap();

    let result = VectorStore::open(&harness.settings(3, IndexKind::Flat));
    assert!(matches!(result, Err(StoreError::CorruptSnapshot(_))));
}

#[test]
fn test_hnsw_backend_finds_exact_match() {
    let harness = Harness::new();
    let mut store = harness.open(16, IndexKind::Hnsw);
    let mut rng = rand::rng();

    let mut ids = Vec::new();
    let mut vectors = Vec::new();
    for _ in 0..40 {
        let vector = random_vector(&mut rng, 16);
        ids.push(store.add(vector.clone(), None).unwrap());
        vectors.push(vector);
    }

    let hits = store.search(&vectors[7], 1, None).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].document.id, ids[7]);
    assert!((hits[0].score - 1.0).abs() < 1e-5);

    assert!(store.delete(&ids[7]).unwrap());
    let hits = store.search(&vectors[7], 5, None).unwrap();
    assert!(hits.iter().all(|h| h.document.id != ids[7]));
}

#[test]
fn test_huge_top_k_returns_every_live_document() {
    for kind in [IndexKind::Flat, IndexKind::Hnsw] {
        let harness = Harness::new();
        let mut store = harness.open(3, kind);
        let id = store.add(vec![1.0, 0.0, 0.0], None).unwrap();

        let hits = store.search(&[1.0, 0.0, 0.0], usize::MAX, None).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document.id, id);

        store.add(vec![0.0, 1.0, 0.0], None).unwrap();
        let hits = store
            .search(&[1.0, 0.0, 0.0], usize::MAX / 2, None)
            .unwrap();
        assert_eq!(hits.len(), 2);
    }
}

#[test]
fn test_hnsw_update_and_restart() {
    let harness = Harness::new();
    let id = {
        let mut store = harness.open(3, IndexKind::Hnsw);
        let id = store.add(vec![1.0, 0.0, 0.0], None).unwrap();
        store.add(vec![0.0, 1.0, 0.0], None).unwrap();
        store
            .update(&id, DocumentPatch::new().with_vector(vec![0.0, 0.0, 1.0]))
            .unwrap();
        id
    };

    let store = harness.open(3, IndexKind::Hnsw);
    assert_eq!(store.len(), 2);
    let hits = store.search(&[0.0, 0.0, 1.0], 1, None).unwrap();
    assert_eq!(hits[0].document.id, id);
}

#[test]
fn test_shared_store_round_trip() {
    let harness = Harness::new();
    let store = SharedVectorStore::open(&harness.settings(3, IndexKind::Flat)).unwrap();
    let id = store
        .add(vec![1.0, 0.0, 0.0], Some(meta(json!({"tag": "a"}))))
        .unwrap();

    let filter = meta(json!({"tag": {"$in": ["a", "z"]}}));
    let hits = store.search(&[1.0, 0.0, 0.0], 3, Some(&filter)).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].document.id, id);
    assert_eq!(store.stats().unwrap().document_count, 1);
}
