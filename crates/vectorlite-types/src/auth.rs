//! API key configuration artifact.
//!
//! A small JSON file holding the API key and whether auth is enforced.
//! Auto-provisioned with a fresh key on first use.

use std::fs;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::TypesError;

/// Default number of random bytes in a generated key (64 hex chars).
pub const DEFAULT_KEY_BYTES: usize = 32;

/// Persisted auth configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    pub api_key: String,
    #[serde(default = "default_auth_enabled")]
    pub auth_enabled: bool,
}

fn default_auth_enabled() -> bool {
    true
}

/// Generate `len` random bytes rendered as lowercase hex.
pub fn generate_api_key(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::rng().fill(&mut bytes[..]);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

impl AuthConfig {
    /// Create an enabled config around the given key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            auth_enabled: true,
        }
    }

    /// Create an enabled config with a freshly generated key.
    pub fn generate() -> Self {
        Self::new(generate_api_key(DEFAULT_KEY_BYTES))
    }

    /// Read the config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TypesError> {
        let bytes = fs::read(path.as_ref())?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Write the config file as pretty JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TypesError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!(path = ?path, "API key written");
        Ok(())
    }

    /// Load the config file, provisioning a new one if it does not exist.
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self, TypesError> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }
        let config = Self::generate();
        config.save(path)?;
        Ok(config)
    }

    /// Check an `Authorization` header value.
    ///
    /// Always passes when auth is disabled; otherwise requires
    /// `Bearer <api_key>`.
    pub fn authorize(&self, authorization: Option<&str>) -> bool {
        if !self.auth_enabled {
            return true;
        }
        authorization
            .and_then(|header| header.strip_prefix("Bearer "))
            .map(|token| !token.is_empty() && token == self.api_key)
            .unwrap_or(false)
    }
}
