//! Configuration loading for VectorLite.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! Default config file lives at `~/.config/vectorlite/config.toml` (or the
//! platform equivalent).

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::TypesError;

/// Which nearest-neighbor structure backs the store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    /// usearch HNSW graph (default)
    #[default]
    Hnsw,
    /// Exact brute-force scan
    Flat,
}

impl IndexKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexKind::Hnsw => "hnsw",
            IndexKind::Flat => "flat",
        }
    }
}

/// Vector store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Vector dimension shared by every document
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Maximum number of vectors the index is sized for
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Path of the binary snapshot file
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,

    /// Index implementation
    #[serde(default)]
    pub index: IndexKind,

    /// HNSW connections per layer (M)
    #[serde(default = "default_connectivity")]
    pub connectivity: usize,

    /// HNSW build-time search depth (ef_construction)
    #[serde(default = "default_expansion_add")]
    pub expansion_add: usize,

    /// HNSW query-time search depth (ef_search)
    #[serde(default = "default_expansion_search")]
    pub expansion_search: usize,
}

fn default_dimension() -> usize {
    1536
}

fn default_capacity() -> usize {
    10_000
}

fn default_snapshot_path() -> String {
    ProjectDirs::from("", "", "vectorlite")
        .map(|p| p.data_local_dir().join("data.bin"))
        .unwrap_or_else(|| PathBuf::from("./db/data.bin"))
        .to_string_lossy()
        .to_string()
}

fn default_connectivity() -> usize {
    16
}

fn default_expansion_add() -> usize {
    200
}

fn default_expansion_search() -> usize {
    100
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            dimension: default_dimension(),
            capacity: default_capacity(),
            snapshot_path: default_snapshot_path(),
            index: IndexKind::default(),
            connectivity: default_connectivity(),
            expansion_add: default_expansion_add(),
            expansion_search: default_expansion_search(),
        }
    }
}

impl StoreSettings {
    pub fn new(dimension: usize, snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            dimension,
            snapshot_path: snapshot_path.into().to_string_lossy().to_string(),
            ..Default::default()
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_index(mut self, index: IndexKind) -> Self {
        self.index = index;
        self
    }

    pub fn with_expansion(mut self, ef_add: usize, ef_search: usize) -> Self {
        self.expansion_add = ef_add;
        self.expansion_search = ef_search;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.dimension == 0 {
            return Err("dimension must be > 0".to_string());
        }
        if self.capacity == 0 {
            return Err("capacity must be > 0".to_string());
        }
        if self.snapshot_path.trim().is_empty() {
            return Err("snapshot_path must not be empty".to_string());
        }
        Ok(())
    }

    /// Snapshot path with `~/` expanded to the home directory
    pub fn expanded_snapshot_path(&self) -> PathBuf {
        expand_home(&self.snapshot_path)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Path of the API key file
    #[serde(default = "default_auth_path")]
    pub auth_path: String,

    /// Store configuration
    #[serde(default)]
    pub store: StoreSettings,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_auth_path() -> String {
    ProjectDirs::from("", "", "vectorlite")
        .map(|p| p.config_dir().join("auth.json"))
        .unwrap_or_else(|| PathBuf::from("./config/auth.json"))
        .to_string_lossy()
        .to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            auth_path: default_auth_path(),
            store: StoreSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/vectorlite/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (VECTORLITE_*, nested keys split by `__`)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, TypesError> {
        let config_dir = ProjectDirs::from("", "", "vectorlite")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("log_level", default_log_level())
            .map_err(|e| TypesError::Config(e.to_string()))?
            .set_default("auth_path", default_auth_path())
            .map_err(|e| TypesError::Config(e.to_string()))?
            .set_default("store.dimension", default_dimension() as i64)
            .map_err(|e| TypesError::Config(e.to_string()))?
            .set_default("store.capacity", default_capacity() as i64)
            .map_err(|e| TypesError::Config(e.to_string()))?
            .set_default("store.snapshot_path", default_snapshot_path())
            .map_err(|e| TypesError::Config(e.to_string()))?
            .set_default("store.index", IndexKind::default().as_str())
            .map_err(|e| TypesError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Format: VECTORLITE_LOG_LEVEL, VECTORLITE_STORE__DIMENSION, ...
        builder = builder.add_source(
            Environment::with_prefix("VECTORLITE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| TypesError::Config(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| TypesError::Config(e.to_string()))?;

        settings.store.validate().map_err(TypesError::Config)?;
        Ok(settings)
    }

    /// Auth file path with `~/` expanded
    pub fn expanded_auth_path(&self) -> PathBuf {
        expand_home(&self.auth_path)
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
