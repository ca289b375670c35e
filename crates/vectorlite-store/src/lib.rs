//! # vectorlite-store
//!
//! Embedded vector store: documents with a fixed-dimension vector and JSON
//! metadata, approximate nearest-neighbor search re-ranked by exact cosine
//! similarity, metadata filters, and a single-file snapshot rewritten after
//! every mutation.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use vectorlite_store::VectorStore;
//! use vectorlite_types::StoreSettings;
//!
//! let settings = StoreSettings::new(3, "/tmp/vectorlite.bin");
//! let mut store = VectorStore::open(&settings)?;
//! let id = store.add(vec![1.0, 0.0, 0.0], None)?;
//! let hits = store.search(&[1.0, 0.0, 0.0], 1, None)?;
//! assert_eq!(hits[0].document.id, id);
//! # Ok::<(), vectorlite_store::StoreError>(())
//! ```

pub mod error;
pub mod filter;
pub mod shared;
pub mod slots;
pub mod snapshot;
pub mod store;

pub use error::StoreError;
pub use filter::matches;
pub use shared::SharedVectorStore;
pub use slots::SlotIndex;
pub use snapshot::SnapshotCodec;
pub use store::{build_index, StoreStats, VectorStore, OVERFETCH_FACTOR};
