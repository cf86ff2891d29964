//! The parameter store: live state plus the commit, checkout, and log
//! engines.
//!
//! ```text
//! ┌──────────┐   set/delete   ┌───────────┐   append    ┌───────────┐
//! │  caller  │ ─────────────► │ ParamDict │ ──commit──► │   DocDb   │
//! └──────────┘                └───────────┘             │ (commits) │
//!       ▲                           ▲                   └───────────┘
//!       │            checkout ──────┘  ◄──── search ──────────┘
//!       └───────────── log (metadata, oldest-first) ◄──────────┘
//! ```
//!
//! Single-writer, synchronous: every operation completes before returning
//! and the store performs no internal locking. Callers that share a store
//! across threads must serialize the full read-modify-commit sequence
//! themselves.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use paramstore_docdb::DocDb;
use serde_json::Value;
use tracing::{debug, warn};

use crate::dict::{Attr, AttrMut, ParamDict};
use crate::error::StoreError;
use crate::snapshot::{commit_id, CommitId, Metadata, Snapshot};
use crate::value::ParamValue;

/// Table holding one document per commit, in commit order.
const COMMITS_TABLE: &str = "commits";
/// Singleton table for the uncommitted temp stash.
const TEMP_TABLE: &str = "temp";

// ============================================================================
// Configuration
// ============================================================================

/// Store construction options.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    /// Backing file for the document db. `None` keeps everything in memory.
    pub db_path: Option<PathBuf>,
}

// ============================================================================
// ParamStore
// ============================================================================

/// A versioned key-value parameter store.
///
/// Owns the live [`ParamDict`], the backing [`DocDb`] handle (released by
/// drop on every exit path), and the id of the last successful commit.
pub struct ParamStore {
    dict: ParamDict,
    db: DocDb,
    last_commit_id: Option<CommitId>,
}

impl ParamStore {
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        match config.db_path {
            Some(path) => Self::open(path),
            None => Ok(Self::in_memory()),
        }
    }

    /// A volatile store with no backing file.
    pub fn in_memory() -> Self {
        Self {
            dict: ParamDict::new(),
            db: DocDb::in_memory(),
            last_commit_id: None,
        }
    }

    /// Open a file-backed store.
    ///
    /// A file with existing commits hydrates the live mapping from the
    /// newest one (so an immediate [`commit`](Self::commit) is the
    /// documented no-op); a missing or empty file starts empty.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = DocDb::open(path)?;
        let mut store = Self {
            dict: ParamDict::new(),
            db,
            last_commit_id: None,
        };

        let newest = store
            .db
            .search(COMMITS_TABLE, |_| true)
            .into_iter()
            .next_back();
        if let Some(doc) = newest {
            let snapshot = Snapshot::from_doc(&doc)?;
            store.dict.set_params(snapshot.params, false);
            store.last_commit_id = Some(snapshot.metadata.id);
        }
        Ok(store)
    }

    // ========================================================================
    // Live mapping access
    // ========================================================================

    pub fn get(&self, key: &str) -> Result<&ParamValue, StoreError> {
        self.dict.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.dict.set(key, value);
    }

    pub fn delete(&mut self, key: &str) -> bool {
        self.dict.delete(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.dict.contains(key)
    }

    /// Attribute-style read view, sharing the live mapping.
    pub fn attr<'s>(&'s self, name: &'s str) -> Attr<'s> {
        self.dict.attr(name)
    }

    /// Attribute-style write view, sharing the live mapping.
    pub fn attr_mut(&mut self, name: &str) -> AttrMut<'_> {
        self.dict.attr_mut(name)
    }

    pub fn dict(&self) -> &ParamDict {
        &self.dict
    }

    pub fn dict_mut(&mut self) -> &mut ParamDict {
        &mut self.dict
    }

    pub fn to_map(&self) -> BTreeMap<String, ParamValue> {
        self.dict.to_map()
    }

    pub fn is_dirty(&self) -> bool {
        self.dict.is_dirty()
    }

    pub fn last_commit_id(&self) -> Option<&str> {
        self.last_commit_id.as_deref()
    }

    // ========================================================================
    // Commit
    // ========================================================================

    /// Snapshot the live mapping into a new persisted commit and return its
    /// id.
    ///
    /// If nothing changed since the last commit, this is a no-op returning
    /// the existing id: no record is written and a supplied `label` is
    /// discarded (with a warning). A failed append leaves live state, the
    /// dirty flag, and persisted history exactly as they were.
    pub fn commit(&mut self, label: Option<&str>) -> Result<CommitId, StoreError> {
        if !self.dict.is_dirty() {
            if let Some(id) = &self.last_commit_id {
                if let Some(label) = label {
                    warn!(id = %id, label, "commit is a no-op; label discarded");
                }
                return Ok(id.clone());
            }
        }

        let timestamp = Utc::now();
        let params = self.dict.to_map();
        let id = commit_id(&params, &timestamp)?;
        let snapshot = Snapshot {
            params,
            metadata: Metadata {
                id: id.clone(),
                timestamp,
                label: label.map(str::to_string),
            },
        };

        self.db.append(COMMITS_TABLE, snapshot.to_doc()?)?;
        self.last_commit_id = Some(id.clone());
        self.dict.mark_clean();
        debug!(id = %id, params = snapshot.params.len(), label = ?label, "committed");
        Ok(id)
    }

    // ========================================================================
    // Checkout
    // ========================================================================

    /// Restore the live mapping to a persisted commit.
    ///
    /// Full replacement: keys absent from the snapshot disappear from live
    /// state, keys absent from live state reappear. On success the dirty
    /// flag clears and `last_commit_id` becomes `id`, so an immediately
    /// following [`commit`](Self::commit) is the documented no-op. Live
    /// state is untouched on any failure, and persisted history is
    /// untouched always.
    pub fn checkout(&mut self, id: &str) -> Result<(), StoreError> {
        let doc = self
            .db
            .search(COMMITS_TABLE, |doc| doc_id(doc) == Some(id))
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::CommitNotFound { id: id.to_string() })?;

        let snapshot = Snapshot::from_doc(&doc)?;
        self.dict.set_params(snapshot.params, false);
        self.last_commit_id = Some(snapshot.metadata.id);
        debug!(id, "checked out");
        Ok(())
    }

    // ========================================================================
    // History
    // ========================================================================

    /// Commit metadata, oldest-first, recomputed fresh from the backend on
    /// every call.
    ///
    /// With a filter, only commits whose label contains it as a
    /// case-sensitive substring are returned; unlabeled commits never match
    /// a non-empty filter. A persisted document that fails to parse
    /// surfaces [`StoreError::CorruptRecord`], never silently skipped.
    pub fn log(&self, label_filter: Option<&str>) -> Result<Vec<Metadata>, StoreError> {
        let docs = self.db.search(COMMITS_TABLE, |_| true);
        let mut entries = Vec::with_capacity(docs.len());
        for doc in &docs {
            entries.push(Snapshot::from_doc(doc)?.metadata);
        }

        if let Some(filter) = label_filter {
            if filter.is_empty() {
                warn!("empty label filter matches every labeled commit");
            }
            entries.retain(|m| m.label.as_deref().is_some_and(|l| l.contains(filter)));
        }
        Ok(entries)
    }

    // ========================================================================
    // Temp stash
    // ========================================================================

    /// Stash the current live mapping without committing. One slot; each
    /// save overwrites the previous stash.
    pub fn save_temp(&mut self) -> Result<(), StoreError> {
        let doc = serde_json::to_value(self.dict.as_map()).map_err(StoreError::Canonicalize)?;
        self.db.put_singleton(TEMP_TABLE, doc)?;
        debug!(params = self.dict.len(), "saved temp state");
        Ok(())
    }

    /// Replace the live mapping with the stashed one and mark the store
    /// dirty (a stash is working state, not a commit).
    pub fn load_temp(&mut self) -> Result<(), StoreError> {
        let doc = self
            .db
            .get_singleton(TEMP_TABLE)
            .ok_or(StoreError::NoTempState)?;
        let params: BTreeMap<String, ParamValue> = serde_json::from_value(doc.clone())
            .map_err(|source| StoreError::CorruptRecord { source })?;
        self.dict.set_params(params, true);
        Ok(())
    }
}

/// The commit id of a persisted snapshot document, if it has one.
fn doc_id(doc: &Value) -> Option<&str> {
    doc.get("metadata")?.get("id")?.as_str()
}
