//! Tagged cell values crossing the driver boundary.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A row keyed by column name. Ordered so generated SQL is deterministic.
pub type RowData = BTreeMap<String, Value>;

/// A single cell value.
///
/// Values are checked against the column type reported by the server before
/// they are bound, so a `Text` sent to an `int4` column is parsed rather than
/// passed through blindly.
///
/// Deserialization is untagged and tries `Text` before `Timestamp`, so any
/// JSON string, including a serialized timestamp, comes back as `Text`. Binding
/// parses such text again when the target column is a date or time type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Any integer width
    Int(i64),
    /// Any float width
    Float(f64),
    /// Text, and the textual form of types without a native variant
    Text(String),
    /// Raw bytes
    Binary(Vec<u8>),
    /// Point in time, normalized to UTC
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Variant name, used in bind error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Bool(_) => "Bool",
            Self::Int(_) => "Int",
            Self::Float(_) => "Float",
            Self::Text(_) => "Text",
            Self::Binary(_) => "Binary",
            Self::Timestamp(_) => "Timestamp",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
            Self::Binary(v) => write!(f, "<{} bytes>", v.len()),
            Self::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Binary(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
