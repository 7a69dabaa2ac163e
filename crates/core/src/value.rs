//! The dynamically-typed value stored in a [`Record`](crate::Record) cell.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single value held in a record attribute.
///
/// `Map` uses a [`BTreeMap`] rather than a hash map so two records with the
/// same contents always compare equal and serialize deterministically —
/// load-bearing for the round-trip tests that compare records directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    /// Absence of a value (distinct from the attribute being unset).
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed 64-bit integer.
    Int(i64),
    /// A 64-bit float.
    Float(f64),
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// An ordered list of values.
    Array(Vec<Value>),
    /// A nested, sorted mapping of values (used for the JSON attribute
    /// type and for nested criteria values).
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Returns `true` if this value is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// A collection record: an opaque mapping from attribute name to value.
///
/// Stored as a [`BTreeMap`] so two records with identical contents are
/// `==` and `Debug`-print in a stable order, regardless of the order
/// attributes were inserted in.
pub type Record = BTreeMap<String, Value>;

/// Returns the current wall-clock time in Unix epoch milliseconds, the unit
/// `created_at`/`updated_at` timestamps are stamped in.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
