//! The live parameter mapping.
//!
//! [`ParamDict`] is the mutable key→value dictionary the engines snapshot
//! and restore. It offers two access styles over one backing map:
//! dictionary-style (`get`/`set`/`dict["key"]`) and attribute-style via the
//! [`Attr`]/[`AttrMut`] accessor views. Mutation through either style is
//! visible through the other, because both borrow the same `BTreeMap`.

use std::collections::BTreeMap;
use std::ops::Index;

use crate::error::StoreError;
use crate::value::ParamValue;

/// Mutable key→value mapping with a dirty flag tracking changes since the
/// last successful commit.
#[derive(Debug, Clone, Default)]
pub struct ParamDict {
    params: BTreeMap<String, ParamValue>,
    dirty: bool,
}

impl ParamDict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a value. The empty string is the not-a-key sentinel and always
    /// fails, exactly like an absent key.
    pub fn get(&self, key: &str) -> Result<&ParamValue, StoreError> {
        if key.is_empty() {
            return Err(StoreError::KeyNotFound { key: String::new() });
        }
        self.params.get(key).ok_or_else(|| StoreError::KeyNotFound {
            key: key.to_string(),
        })
    }

    /// Insert or overwrite; marks the dict dirty.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.params.insert(key.into(), value.into());
        self.dirty = true;
    }

    /// Remove `key`, marking the dict dirty, and return whether it existed.
    ///
    /// Deleting a missing key is a documented no-op: returns `false` and the
    /// dirty flag is untouched.
    pub fn delete(&mut self, key: &str) -> bool {
        let existed = self.params.remove(key).is_some();
        if existed {
            self.dirty = true;
        }
        existed
    }

    /// Membership test; no side effect.
    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Whether live state has changed since the last successful commit.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Cloned copy of the full mapping, in key order.
    pub fn to_map(&self) -> BTreeMap<String, ParamValue> {
        self.params.clone()
    }

    pub(crate) fn as_map(&self) -> &BTreeMap<String, ParamValue> {
        &self.params
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Replace the whole mapping (commit restore / temp load).
    pub(crate) fn set_params(&mut self, params: BTreeMap<String, ParamValue>, dirty: bool) {
        self.params = params;
        self.dirty = dirty;
    }

    /// Read-only attribute-style view of one key.
    pub fn attr<'d>(&'d self, name: &'d str) -> Attr<'d> {
        Attr { dict: self, name }
    }

    /// Mutable attribute-style view of one key.
    pub fn attr_mut(&mut self, name: &str) -> AttrMut<'_> {
        AttrMut {
            dict: self,
            name: name.to_string(),
        }
    }
}

impl Index<&str> for ParamDict {
    type Output = ParamValue;

    /// Panics if the key is absent, matching map indexing; [`ParamDict::get`]
    /// is the fallible form.
    fn index(&self, key: &str) -> &ParamValue {
        match self.params.get(key) {
            Some(value) => value,
            None => panic!("no parameter {key:?}"),
        }
    }
}

// ============================================================================
// Attribute-style views
// ============================================================================

/// Read-only accessor for one key, backed by the dict's own mapping.
pub struct Attr<'d> {
    dict: &'d ParamDict,
    name: &'d str,
}

impl<'d> Attr<'d> {
    pub fn get(&self) -> Result<&'d ParamValue, StoreError> {
        self.dict.get(self.name)
    }

    pub fn exists(&self) -> bool {
        self.dict.contains(self.name)
    }
}

/// Mutable accessor for one key; writes land in the same mapping the
/// dictionary API reads.
pub struct AttrMut<'d> {
    dict: &'d mut ParamDict,
    name: String,
}

impl AttrMut<'_> {
    pub fn get(&self) -> Result<&ParamValue, StoreError> {
        self.dict.get(&self.name)
    }

    pub fn set(self, value: impl Into<ParamValue>) {
        self.dict.set(self.name, value);
    }

    pub fn delete(self) -> bool {
        self.dict.delete(&self.name)
    }
}
