//! Command implementations for the vectorlite binary.
//!
//! Every command opens the store from layered settings, runs one operation
//! and prints its result as JSON on stdout. Logs go to stderr.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde_json::{json, Value};

use vectorlite_store::{StoreStats, VectorStore};
use vectorlite_types::{generate_api_key, AuthConfig, DocumentPatch, Metadata, Settings};

use crate::cli::{Cli, Commands};

/// Load settings and apply CLI overrides (highest precedence).
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings =
        Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Some(log_level) = &cli.log_level {
        settings.log_level = log_level.clone();
    }
    if let Some(path) = &cli.snapshot_path {
        settings.store.snapshot_path = path.clone();
    }
    if let Some(dimension) = cli.dimension {
        settings.store.dimension = dimension;
    }

    settings
        .store
        .validate()
        .map_err(anyhow::Error::msg)
        .context("Invalid store configuration")?;
    Ok(settings)
}

/// Install the global tracing subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Parse the CLI, set up logging and run the command against stdout.
pub fn run(cli: Cli) -> Result<()> {
    let settings = load_settings(&cli)?;
    init_logging(&settings.log_level)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&settings, cli.command, &mut out)
}

/// Run a single command with already-resolved settings.
pub fn execute(settings: &Settings, command: Commands, out: &mut impl Write) -> Result<()> {
    let open = || VectorStore::open(&settings.store).context("Failed to open vector store");

    match command {
        Commands::Add {
            vector,
            metadata,
            id,
        } => {
            let mut store = open()?;
            let vector = parse_vector(&vector)?;
            let metadata = metadata.as_deref().map(parse_metadata).transpose()?;
            let id = match id {
                Some(id) => {
                    store.add_with_id(id.clone(), vector, metadata)?;
                    id
                }
                None => store.add(vector, metadata)?,
            };
            print_json(out, &json!({ "id": id }))
        }
        Commands::Search {
            vector,
            top_k,
            filter,
        } => {
            let query = parse_vector(&vector)?;
            let filter = filter.as_deref().map(parse_metadata).transpose()?;
            let hits = open()?.search(&query, top_k, filter.as_ref())?;
            print_json(out, &hits)
        }
        Commands::Get { id } => match open()?.get_by_id(&id) {
            Some(doc) => print_json(out, doc),
            None => bail!("Document not found: {}", id),
        },
        Commands::Update {
            id,
            vector,
            metadata,
        } => {
            let mut patch = DocumentPatch::new();
            if let Some(vector) = vector {
                patch = patch.with_vector(parse_vector(&vector)?);
            }
            if let Some(metadata) = metadata {
                patch = patch.with_metadata(parse_metadata(&metadata)?);
            }
            let mut store = open()?;
            if !store.update(&id, patch)? {
                bail!("Document not found: {}", id);
            }
            match store.get_by_id(&id) {
                Some(doc) => print_json(out, doc),
                None => bail!("Document not found: {}", id),
            }
        }
        Commands::Delete { id } => {
            if !open()?.delete(&id)? {
                bail!("Document not found: {}", id);
            }
            print_json(out, &json!({ "deleted": id }))
        }
        Commands::All => print_json(out, &open()?.get_all()),
        Commands::Stats => print_json(out, &stats_json(&open()?.stats())),
        Commands::GenerateKey { length, output } => generate_key(settings, length, output, out),
    }
}

/// Generate a key, write it as an enabled auth file and print it.
fn generate_key(
    settings: &Settings,
    length: usize,
    output: Option<String>,
    out: &mut impl Write,
) -> Result<()> {
    if length == 0 {
        bail!("Key length must be at least 1 byte");
    }

    let path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| settings.expanded_auth_path());
    let auth = AuthConfig::new(generate_api_key(length));
    auth.save(&path)
        .with_context(|| format!("Failed to write auth file {:?}", path))?;

    print_json(
        out,
        &json!({ "apiKey": auth.api_key, "path": path.to_string_lossy() }),
    )
}

fn stats_json(stats: &StoreStats) -> Value {
    json!({
        "documents": stats.document_count,
        "dimension": stats.dimension,
        "nextSlot": stats.next_slot,
        "snapshotBytes": stats.snapshot_bytes,
        "index": {
            "vectors": stats.index.vector_count,
            "dimension": stats.index.dimension,
            "capacity": stats.index.capacity,
            "available": stats.index.available,
        },
    })
}

/// Parse a JSON array of numbers into a vector.
pub fn parse_vector(raw: &str) -> Result<Vec<f32>> {
    serde_json::from_str(raw)
        .with_context(|| format!("Invalid vector (expected JSON array of numbers): {}", raw))
}

/// Parse a JSON object into metadata.
pub fn parse_metadata(raw: &str) -> Result<Metadata> {
    match serde_json::from_str::<Value>(raw).with_context(|| format!("Invalid JSON: {}", raw))? {
        Value::Object(map) => Ok(map),
        other => bail!("Expected a JSON object, got: {}", other),
    }
}

fn print_json<T: serde::Serialize + ?Sized>(out: &mut impl Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
