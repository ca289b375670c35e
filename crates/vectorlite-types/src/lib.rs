//! # vectorlite-types
//!
//! Shared domain types for the VectorLite store.
//!
//! - Documents: id, vector and metadata records, partial updates, search hits
//! - Settings: layered configuration for the store and its adapters
//! - Auth: the API key artifact consumed by transport adapters

pub mod auth;
pub mod config;
pub mod document;
pub mod error;

pub use auth::{generate_api_key, AuthConfig, DEFAULT_KEY_BYTES};
pub use config::{IndexKind, Settings, StoreSettings};
pub use document::{Document, DocumentPatch, Metadata, SearchHit};
pub use error::TypesError;
