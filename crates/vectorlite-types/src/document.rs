//! Document types stored by the vector store.

use serde::{Deserialize, Serialize};

/// Free-form metadata attached to a document.
///
/// Also used as the shape of a search filter predicate.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A stored document: external id, fixed-dimension vector, metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// External identifier (unique, immutable once assigned)
    pub id: String,
    /// Embedding vector (length == store dimension)
    pub vector: Vec<f32>,
    /// Metadata (defaults to empty)
    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    pub fn new(id: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            vector,
            metadata: Metadata::new(),
        }
    }

    /// Set metadata (builder pattern).
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Vector dimension of this document.
    pub fn dimension(&self) -> usize {
        self.vector.len()
    }
}

/// Partial update applied by `update`.
///
/// The vector is replaced wholesale when present; metadata fields are
/// shallow-merged over the existing metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentPatch {
    #[serde(default)]
    pub vector: Option<Vec<f32>>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

impl DocumentPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vector(mut self, vector: Vec<f32>) -> Self {
        self.vector = Some(vector);
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Check if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.vector.is_none() && self.metadata.is_none()
    }

    /// Apply this patch to a copy of `existing`.
    pub fn apply(&self, existing: &Document) -> Document {
        let mut updated = existing.clone();
        if let Some(vector) = &self.vector {
            updated.vector = vector.clone();
        }
        if let Some(metadata) = &self.metadata {
            for (key, value) in metadata {
                updated.metadata.insert(key.clone(), value.clone());
            }
        }
        updated
    }
}

/// A search result: the matched document and its exact cosine similarity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub document: Document,
    pub score: f32,
}
