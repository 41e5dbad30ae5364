//! Typed field values
//!
//! `FieldValue` is the in-memory form of a record attribute. Each variant
//! corresponds to a declared [`FieldType`](super::FieldType), plus `Null`,
//! which survives the wire format as a sentinel distinct from absence.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// A record's attributes: field name -> typed value
pub type Attributes = BTreeMap<String, FieldValue>;

/// A typed attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point
    Float(f64),
    /// UTF-8 string
    Text(String),
    /// Boolean
    Boolean(bool),
    /// Millisecond-precision UTC timestamp
    DateTime(DateTime<Utc>),
    /// Opaque identifier of a record in another type
    Reference(String),
    /// Explicit null, distinct from an absent field
    Null,
}

impl FieldValue {
    /// Numeric view of this value, when it has one.
    ///
    /// Integers, floats, and text that parses as a number all qualify; this
    /// is what loose filter equality compares by.
    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Whether this is the explicit null value
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Boolean(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(v: DateTime<Utc>) -> Self {
        FieldValue::DateTime(v)
    }
}
