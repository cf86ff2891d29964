//! Embedded JSON document store.
//!
//! The persistence primitive under the parameter store: named tables of
//! immutable JSON documents kept in a single file (or entirely in memory),
//! with two core operations, `append` and predicate `search`, plus a
//! singleton-table upsert for scratch state.
//!
//! Durability model: every mutation serializes the whole collection, writes
//! it to a temp file in the target directory and renames it over the backing
//! file *before* the in-memory view changes. An append either lands
//! completely or not at all; readers never observe a partial document.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DocDbError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but does not parse as a document collection.
    #[error("malformed database file {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not serialize database state: {0}")]
    Serialize(#[source] serde_json::Error),
}

// ============================================================================
// DocDb
// ============================================================================

/// An append-only document collection, file-backed or in-memory.
///
/// Tables are created on first write. Documents are immutable once appended;
/// the only non-append operation is [`DocDb::put_singleton`], which replaces
/// the single document of a dedicated one-document table.
///
/// The backing file handle is owned by the value: dropping the `DocDb`
/// releases it on every exit path.
#[derive(Debug)]
pub struct DocDb {
    tables: BTreeMap<String, Vec<Value>>,
    backing: Option<PathBuf>,
}

impl DocDb {
    /// A volatile store with no backing file.
    pub fn in_memory() -> Self {
        Self {
            tables: BTreeMap::new(),
            backing: None,
        }
    }

    /// Open a file-backed store, loading any existing collection.
    ///
    /// A missing file starts an empty collection; it is created on the first
    /// write. A file that exists but does not parse surfaces
    /// [`DocDbError::Malformed`], never silently discarded.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DocDbError> {
        let path = path.as_ref().to_path_buf();
        let tables: BTreeMap<String, Vec<Value>> = if path.exists() {
            let text = fs::read_to_string(&path)?;
            serde_json::from_str(&text).map_err(|source| DocDbError::Malformed {
                path: path.clone(),
                source,
            })?
        } else {
            BTreeMap::new()
        };
        debug!(path = %path.display(), tables = tables.len(), "opened document db");
        Ok(Self {
            tables,
            backing: Some(path),
        })
    }

    /// Append one immutable document to `table`, all-or-nothing.
    pub fn append(&mut self, table: &str, doc: Value) -> Result<(), DocDbError> {
        let mut next = self.tables.clone();
        next.entry(table.to_string()).or_default().push(doc);
        self.persist(&next)?;
        self.tables = next;
        Ok(())
    }

    /// Replace the single document of a one-document table, all-or-nothing.
    pub fn put_singleton(&mut self, table: &str, doc: Value) -> Result<(), DocDbError> {
        let mut next = self.tables.clone();
        next.insert(table.to_string(), vec![doc]);
        self.persist(&next)?;
        self.tables = next;
        Ok(())
    }

    /// The document of a one-document table, if present.
    pub fn get_singleton(&self, table: &str) -> Option<&Value> {
        self.tables.get(table).and_then(|docs| docs.first())
    }

    /// All documents of `table` matching `predicate`, in insertion order.
    pub fn search<P>(&self, table: &str, predicate: P) -> Vec<Value>
    where
        P: Fn(&Value) -> bool,
    {
        self.tables
            .get(table)
            .map(|docs| docs.iter().filter(|d| predicate(d)).cloned().collect())
            .unwrap_or_default()
    }

    /// Number of documents in `table` (0 for an unknown table).
    pub fn len(&self, table: &str) -> usize {
        self.tables.get(table).map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self, table: &str) -> bool {
        self.len(table) == 0
    }

    /// Write `tables` to the backing file atomically. In-memory stores are a
    /// no-op. The temp file lives in the target directory so the final
    /// rename cannot cross filesystems.
    fn persist(&self, tables: &BTreeMap<String, Vec<Value>>) -> Result<(), DocDbError> {
        let Some(path) = &self.backing else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(tables).map_err(DocDbError::Serialize)?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| DocDbError::Io(e.error))?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
