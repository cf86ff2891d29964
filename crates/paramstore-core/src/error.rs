//! Error taxonomy for store operations.
//!
//! Every error propagates synchronously to the caller; nothing is retried
//! internally, and no operation leaves live state or persisted history
//! partially mutated on failure.

use paramstore_docdb::DocDbError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// `get` on an absent key, or on the empty-string key sentinel.
    #[error("key not found: {key:?}")]
    KeyNotFound { key: String },

    /// `checkout` referencing an id with no persisted snapshot.
    #[error("commit not found: {id}")]
    CommitNotFound { id: String },

    /// A persisted document does not parse as a snapshot. Surfaced as-is,
    /// never skipped or auto-repaired.
    #[error("corrupt snapshot record: {source}")]
    CorruptRecord {
        #[source]
        source: serde_json::Error,
    },

    /// `load_temp` with nothing stashed.
    #[error("no temp state has been saved")]
    NoTempState,

    #[error("could not canonicalize parameters: {0}")]
    Canonicalize(#[source] serde_json::Error),

    #[error("backend error: {0}")]
    Backend(#[from] DocDbError),
}
