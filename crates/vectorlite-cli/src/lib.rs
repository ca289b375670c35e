//! VectorLite CLI library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (add, search, get, update, delete, ...)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::{execute, init_logging, load_settings, parse_metadata, parse_vector, run};
