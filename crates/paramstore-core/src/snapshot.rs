//! Commit snapshots, metadata, and the commit id digest.
//!
//! A commit id is the SHA-1 digest of the canonical serialization of the
//! param mapping plus the commit instant, rendered as 40 lowercase hex
//! characters. Canonicalization is key-sorted JSON, so the id is independent
//! of mutation order; the instant makes a re-commit of recurring content a
//! distinct commit. Label and id metadata never enter the hash.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::error::StoreError;
use crate::value::ParamValue;

/// Commit id: 40 lowercase hex characters (a 160-bit digest).
pub type CommitId = String;

/// Metadata attached to a persisted snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub id: CommitId,
    pub timestamp: DateTime<Utc>,
    pub label: Option<String>,
}

/// An immutable, persisted point-in-time copy of the param mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub params: BTreeMap<String, ParamValue>,
    pub metadata: Metadata,
}

impl Snapshot {
    pub(crate) fn to_doc(&self) -> Result<serde_json::Value, StoreError> {
        serde_json::to_value(self).map_err(StoreError::Canonicalize)
    }

    pub(crate) fn from_doc(doc: &serde_json::Value) -> Result<Self, StoreError> {
        serde_json::from_value(doc.clone())
            .map_err(|source| StoreError::CorruptRecord { source })
    }
}

/// Canonical serialization of a param mapping: JSON with keys in
/// lexicographic order. `BTreeMap` iterates in key order at every nesting
/// level, so plain `serde_json` output is already canonical.
pub fn canonical_json(params: &BTreeMap<String, ParamValue>) -> Result<String, StoreError> {
    serde_json::to_string(params).map_err(StoreError::Canonicalize)
}

/// Compute the commit id for `params` at `timestamp`.
///
/// Deterministic in its inputs: the same content committed at the same
/// instant hashes identically no matter the order mutations happened in.
pub fn commit_id(
    params: &BTreeMap<String, ParamValue>,
    timestamp: &DateTime<Utc>,
) -> Result<CommitId, StoreError> {
    let canonical = canonical_json(params)?;

    let mut hasher = Sha1::new();
    hasher.update(canonical.as_bytes());
    hasher.update(timestamp.to_rfc3339().as_bytes());
    let digest: [u8; 20] = hasher.finalize().into();

    Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 17, 12, 0, 0).unwrap()
    }

    #[test]
    fn id_has_expected_width_and_alphabet() {
        let mut params = BTreeMap::new();
        params.insert("foo".to_string(), ParamValue::from("bar"));

        let id = commit_id(&params, &fixed_instant()).unwrap();
        assert_eq!(id.len(), 40);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn empty_mapping_still_hashes() {
        let id = commit_id(&BTreeMap::new(), &fixed_instant()).unwrap();
        assert_eq!(id.len(), 40);
    }

    #[test]
    fn id_is_independent_of_insertion_order() {
        let mut forward = BTreeMap::new();
        forward.insert("a".to_string(), ParamValue::Int(1));
        forward.insert("b".to_string(), ParamValue::Int(2));
        forward.insert("c".to_string(), ParamValue::Int(3));

        let mut backward = BTreeMap::new();
        backward.insert("c".to_string(), ParamValue::Int(3));
        backward.insert("b".to_string(), ParamValue::Int(2));
        backward.insert("a".to_string(), ParamValue::Int(1));

        let instant = fixed_instant();
        assert_eq!(
            commit_id(&forward, &instant).unwrap(),
            commit_id(&backward, &instant).unwrap()
        );
    }

    #[test]
    fn id_changes_with_content() {
        let instant = fixed_instant();
        let mut a = BTreeMap::new();
        a.insert("foo".to_string(), ParamValue::from("bar"));
        let mut b = BTreeMap::new();
        b.insert("foo".to_string(), ParamValue::from("baz"));

        assert_ne!(
            commit_id(&a, &instant).unwrap(),
            commit_id(&b, &instant).unwrap()
        );
    }

    #[test]
    fn id_changes_with_instant() {
        let mut params = BTreeMap::new();
        params.insert("foo".to_string(), ParamValue::from("bar"));

        let later = fixed_instant() + chrono::Duration::nanoseconds(1);
        assert_ne!(
            commit_id(&params, &fixed_instant()).unwrap(),
            commit_id(&params, &later).unwrap()
        );
    }

    #[test]
    fn canonical_json_sorts_keys() {
        let mut params = BTreeMap::new();
        params.insert("z".to_string(), ParamValue::Int(1));
        params.insert("a".to_string(), ParamValue::Int(2));

        assert_eq!(canonical_json(&params).unwrap(), r#"{"a":2,"z":1}"#);
    }

    #[test]
    fn snapshot_round_trips_through_doc() {
        let mut params = BTreeMap::new();
        params.insert("foo".to_string(), ParamValue::from("bar"));
        let timestamp = fixed_instant();
        let snapshot = Snapshot {
            metadata: Metadata {
                id: commit_id(&params, &timestamp).unwrap(),
                timestamp,
                label: Some("first".to_string()),
            },
            params,
        };

        let doc = snapshot.to_doc().unwrap();
        let back = Snapshot::from_doc(&doc).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn from_doc_rejects_wrong_shape() {
        let doc = serde_json::json!({"params": {"a": 1}});
        assert!(matches!(
            Snapshot::from_doc(&doc),
            Err(StoreError::CorruptRecord { .. })
        ));
    }
}
