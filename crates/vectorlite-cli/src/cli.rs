//! CLI argument parsing for the vectorlite binary.
//!
//! Global flags override every other configuration source.

use clap::{Parser, Subcommand};

/// VectorLite
///
/// Embedded vector store with metadata filtering and snapshot persistence.
#[derive(Parser, Debug)]
#[command(name = "vectorlite")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (merged over ~/.config/vectorlite/config)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Override snapshot file path
    #[arg(long, global = true)]
    pub snapshot_path: Option<String>,

    /// Override vector dimension
    #[arg(long, global = true)]
    pub dimension: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Store commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Add a document and print its id
    Add {
        /// Vector as a JSON array, e.g. "[0.1, 0.2, 0.3]"
        #[arg(long)]
        vector: String,

        /// Metadata as a JSON object
        #[arg(short, long)]
        metadata: Option<String>,

        /// Use this id instead of generating one
        #[arg(long)]
        id: Option<String>,
    },

    /// Search for the nearest documents
    Search {
        /// Query vector as a JSON array
        #[arg(long)]
        vector: String,

        /// Maximum results
        #[arg(short = 'k', long, default_value = "10")]
        top_k: usize,

        /// Metadata filter as a JSON object
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Print a document
    Get {
        /// Document id
        id: String,
    },

    /// Replace a document's vector and/or merge into its metadata
    Update {
        /// Document id
        id: String,

        /// New vector as a JSON array
        #[arg(long)]
        vector: Option<String>,

        /// Metadata keys to merge, as a JSON object
        #[arg(short, long)]
        metadata: Option<String>,
    },

    /// Delete a document
    Delete {
        /// Document id
        id: String,
    },

    /// Print every document in insertion order
    All,

    /// Print store statistics
    Stats,

    /// Generate an API key and write the auth file
    GenerateKey {
        /// Key length in random bytes (printed as hex)
        #[arg(long, default_value = "32")]
        length: usize,

        /// Auth file path (default from config)
        #[arg(short, long)]
        output: Option<String>,
    },
}
