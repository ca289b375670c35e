//! Binary snapshot of the live document set.
//!
//! The file is a concatenation of records, all integers little-endian:
//!
//! ```text
//! u32 id_len      | id_len bytes of UTF-8 id
//! u32 dim         | dim x f32 vector components
//! u32 meta_len    | meta_len bytes of UTF-8 JSON metadata
//! ```
//!
//! Saves always rewrite the whole file through a temporary sibling that is
//! renamed into place, so readers never observe a half-written snapshot.
//! Each save gets its own temporary name, so concurrent writers (threads or
//! processes) never share one.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info};
use vectorlite_types::{Document, Metadata};

use crate::error::StoreError;

const LEN_BYTES: usize = 4;

/// Per-process counter that makes temporary file names unique.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Reads and writes snapshot files.
#[derive(Debug, Clone)]
pub struct SnapshotCodec {
    path: PathBuf,
}

impl SnapshotCodec {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Snapshot file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fresh temporary path for one save: `<path>.<pid>.<seq>.tmp`
    fn temp_path(&self) -> PathBuf {
        let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".{}.{}.tmp", std::process::id(), seq));
        PathBuf::from(name)
    }

    /// Serialize documents into snapshot bytes, preserving order.
    pub fn encode<'a>(
        docs: impl IntoIterator<Item = &'a Document>,
    ) -> Result<Vec<u8>, StoreError> {
        let mut buf = Vec::new();

        for doc in docs {
            write_len(&mut buf, doc.id.len(), "id")?;
            buf.extend_from_slice(doc.id.as_bytes());

            write_len(&mut buf, doc.vector.len(), "vector")?;
            for value in &doc.vector {
                buf.extend_from_slice(&value.to_le_bytes());
            }

            let metadata = serde_json::to_vec(&doc.metadata)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            write_len(&mut buf, metadata.len(), "metadata")?;
            buf.extend_from_slice(&metadata);
        }

        Ok(buf)
    }

    /// Parse snapshot bytes back into documents in file order.
    pub fn decode(bytes: &[u8]) -> Result<Vec<Document>, StoreError> {
        let mut reader = Reader::new(bytes);
        let mut docs = Vec::new();

        while !reader.is_at_end() {
            let id_len = reader.read_u32("id length")? as usize;
            let id_start = reader.offset;
            let id = std::str::from_utf8(reader.read_bytes(id_len, "id")?)
                .map_err(|e| corrupt(id_start, format!("id is not UTF-8: {}", e)))?
                .to_string();

            let dim = reader.read_u32("vector length")? as usize;
            let byte_len = dim
                .checked_mul(LEN_BYTES)
                .ok_or_else(|| corrupt(reader.offset, "vector length overflows"))?;
            let vector = reader
                .read_bytes(byte_len, "vector")?
                .chunks_exact(LEN_BYTES)
                .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect();

            let meta_len = reader.read_u32("metadata length")? as usize;
            let meta_start = reader.offset;
            let meta_bytes = reader.read_bytes(meta_len, "metadata")?;
            let metadata: Metadata = serde_json::from_slice(meta_bytes)
                .map_err(|e| corrupt(meta_start, format!("invalid metadata: {}", e)))?;

            docs.push(Document {
                id,
                vector,
                metadata,
            });
        }

        Ok(docs)
    }

    /// Overwrite the snapshot with exactly `docs`.
    pub fn save<'a>(
        &self,
        docs: impl IntoIterator<Item = &'a Document>,
    ) -> Result<(), StoreError> {
        let bytes = Self::encode(docs)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }

        let temp = self.temp_path();
        let write = || -> io::Result<()> {
            let mut file = File::create(&temp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
            fs::rename(&temp, &self.path)
        };

        if let Err(e) = write() {
            let _ = fs::remove_file(&temp);
            return Err(self.io_error(e));
        }

        debug!(path = ?self.path, bytes = bytes.len(), "Saved snapshot");
        Ok(())
    }

    /// Load the snapshot; a missing file is an empty store.
    pub fn load(&self) -> Result<Vec<Document>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = ?self.path, "No snapshot found, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        let docs = Self::decode(&bytes)?;
        info!(path = ?self.path, documents = docs.len(), "Loaded snapshot");
        Ok(docs)
    }

    /// Size of the snapshot file in bytes. A missing file is 0 bytes;
    /// any other I/O failure is reported.
    pub fn size_bytes(&self) -> Result<u64, StoreError> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Persistence {
            path: self.path.clone(),
            source,
        }
    }
}

fn write_len(buf: &mut Vec<u8>, len: usize, field: &str) -> Result<(), StoreError> {
    let len = u32::try_from(len)
        .map_err(|_| StoreError::Serialization(format!("{} too long: {}", field, len)))?;
    buf.extend_from_slice(&len.to_le_bytes());
    Ok(())
}

fn corrupt(offset: usize, reason: impl std::fmt::Display) -> StoreError {
    StoreError::CorruptSnapshot(format!("at byte {}: {}", offset, reason))
}

/// Bounds-checked cursor over snapshot bytes.
struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn is_at_end(&self) -> bool {
        self.offset >= self.bytes.len()
    }

    fn read_bytes(&mut self, len: usize, what: &str) -> Result<&'a [u8], StoreError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| {
                corrupt(
                    self.offset,
                    format!(
                        "truncated {}: need {} bytes, {} remain",
                        what,
                        len,
                        self.bytes.len() - self.offset
                    ),
                )
            })?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn read_u32(&mut self, what: &str) -> Result<u32, StoreError> {
        let b = self.read_bytes(LEN_BYTES, what)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
}
