//! VectorLite
//!
//! Embedded vector store driven from the command line.
//!
//! # Usage
//!
//! ```bash
//! vectorlite add --vector '[0.1, 0.2, 0.3]' --metadata '{"tag": "a"}'
//! vectorlite search --vector '[0.1, 0.2, 0.3]' --top-k 5 --filter '{"tag": "a"}'
//! vectorlite get <ID>
//! vectorlite update <ID> [--vector JSON] [--metadata JSON]
//! vectorlite delete <ID>
//! vectorlite all
//! vectorlite stats
//! vectorlite generate-key [--length N] [--output PATH]
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/vectorlite/config.{toml,json,yaml})
//! 3. File passed with --config
//! 4. Environment variables (VECTORLITE_*, e.g. VECTORLITE_STORE__DIMENSION)
//! 5. CLI flags

use anyhow::Result;
use clap::Parser;

use vectorlite_cli::{run, Cli};

fn main() -> Result<()> {
    run(Cli::parse())
}
