//! # vectorlite-index
//!
//! Nearest-neighbor index adapters for the VectorLite store.
//!
//! The store talks to its index only through the [`ApproxIndex`] trait:
//! `initialize`, `add_point`, `mark_deleted`, `search_approx`. Two
//! implementations are provided:
//! - [`HnswIndex`]: usearch-powered HNSW graph, cosine metric
//! - [`FlatIndex`]: exact brute-force scan

pub mod distance;
pub mod error;
pub mod flat;
pub mod hnsw;
pub mod index;

pub use distance::cosine_similarity;
pub use error::IndexError;
pub use flat::FlatIndex;
pub use hnsw::{HnswConfig, HnswIndex};
pub use index::{ApproxIndex, Candidate, IndexStats, Slot};
