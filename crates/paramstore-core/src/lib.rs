//! Versioned key-value parameter store.
//!
//! A mutable dictionary of named parameters with git-like snapshotting:
//! content-addressed commits, point-in-time checkout, and filterable
//! history.
//!
//! ```
//! use paramstore_core::ParamStore;
//!
//! let mut store = ParamStore::in_memory();
//! store.set("freq", 5.0e9);
//! let id = store.commit(Some("baseline")).unwrap();
//!
//! store.set("freq", 5.1e9);
//! store.checkout(&id).unwrap();
//! assert_eq!(store.get("freq").unwrap().as_f64(), Some(5.0e9));
//! ```
//!
//! The store is single-writer and fully synchronous; it performs no internal
//! locking. Persistence goes through [`paramstore_docdb::DocDb`], an embedded
//! append-only document collection.

pub mod dict;
pub mod error;
pub mod snapshot;
pub mod store;
pub mod value;


pub use dict::{Attr, AttrMut, ParamDict};
pub use error::StoreError;
pub use snapshot::{commit_id, CommitId, Metadata, Snapshot};
pub use store::{ParamStore, StoreConfig};
pub use value::ParamValue;
