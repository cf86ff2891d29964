//! The closed value universe for stored parameters.
//!
//! Values are restricted to a closed set of serializable kinds so that
//! canonical serialization and content hashing stay deterministic and total.
//! Mappings are `BTreeMap`s: iteration order is key order at every nesting
//! level, which is exactly the canonical order the content hash needs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A parameter value.
///
/// Reads and writes as plain JSON (`#[serde(untagged)]`): `Int` wins over
/// `Float` for whole JSON numbers, everything else maps one-to-one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Seq(Vec<ParamValue>),
    Map(BTreeMap<String, ParamValue>),
}

impl ParamValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric read: floats directly, integers widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Float(f) => Some(*f),
            ParamValue::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, ParamValue>> {
        match self {
            ParamValue::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[ParamValue]> {
        match self {
            ParamValue::Seq(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Bool(b)
    }
}

impl From<i32> for ParamValue {
    fn from(n: i32) -> Self {
        ParamValue::Int(n as i64)
    }
}

impl From<i64> for ParamValue {
    fn from(n: i64) -> Self {
        ParamValue::Int(n)
    }
}

impl From<f64> for ParamValue {
    fn from(f: f64) -> Self {
        ParamValue::Float(f)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Text(s)
    }
}

impl From<Vec<ParamValue>> for ParamValue {
    fn from(seq: Vec<ParamValue>) -> Self {
        ParamValue::Seq(seq)
    }
}

impl From<BTreeMap<String, ParamValue>> for ParamValue {
    fn from(map: BTreeMap<String, ParamValue>) -> Self {
        ParamValue::Map(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_round_trip_keeps_kinds() {
        let mut map = BTreeMap::new();
        map.insert("gain".to_string(), ParamValue::Float(0.5));
        map.insert("shots".to_string(), ParamValue::Int(1024));
        let value = ParamValue::Map(map);

        let json = serde_json::to_string(&value).unwrap();
        let back: ParamValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn whole_numbers_deserialize_as_int() {
        let v: ParamValue = serde_json::from_str("42").unwrap();
        assert_eq!(v, ParamValue::Int(42));

        let v: ParamValue = serde_json::from_str("42.5").unwrap();
        assert_eq!(v, ParamValue::Float(42.5));
    }

    #[test]
    fn null_round_trips() {
        let v: ParamValue = serde_json::from_str("null").unwrap();
        assert_eq!(v, ParamValue::Null);
        assert_eq!(serde_json::to_string(&v).unwrap(), "null");
    }

    #[test]
    fn from_impls_pick_the_right_kind() {
        assert_eq!(ParamValue::from("x"), ParamValue::Text("x".into()));
        assert_eq!(ParamValue::from(3), ParamValue::Int(3));
        assert_eq!(ParamValue::from(3.5), ParamValue::Float(3.5));
        assert_eq!(ParamValue::from(true), ParamValue::Bool(true));
    }

    #[test]
    fn nested_map_serializes_in_key_order() {
        let mut inner = BTreeMap::new();
        inner.insert("z".to_string(), ParamValue::Int(1));
        inner.insert("a".to_string(), ParamValue::Int(2));
        let v = ParamValue::Map(inner);

        assert_eq!(serde_json::to_string(&v).unwrap(), r#"{"a":2,"z":1}"#);
    }

    #[test]
    fn accessors() {
        assert_eq!(ParamValue::Int(7).as_i64(), Some(7));
        assert_eq!(ParamValue::Int(7).as_f64(), Some(7.0));
        assert_eq!(ParamValue::Float(1.5).as_f64(), Some(1.5));
        assert_eq!(ParamValue::Text("hi".into()).as_str(), Some("hi"));
        assert_eq!(ParamValue::Text("hi".into()).as_i64(), None);
        assert_eq!(ParamValue::Bool(true).as_bool(), Some(true));
    }
}
