//! Wire codec for bridgekv
//!
//! The store keeps records as flat string-to-string field maps. The codec
//! converts between that form and typed attributes:
//!
//! - datetimes become millisecond-epoch integers as strings
//! - booleans become the literal strings `"true"` / `"false"`
//! - numbers become their decimal string
//! - null becomes the literal string `"null"`, a sentinel distinct from an
//!   absent field
//! - text and references pass through unchanged
//!
//! Decoding is a best-effort coercion driven by the model's declared types,
//! not a validating parse: the null sentinel is checked before any
//! type-specific decode, and a field that has no declared type or whose raw
//! string does not parse is left untouched as text.
//!
//! `decode(model, encode(x)) == x` for every declared type except
//! `Reference`, where only the primitive identifier round-trips.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::schema::{Attributes, FieldType, FieldValue, ModelDef};

/// The flat string form a record takes in storage
pub type FlatRecord = BTreeMap<String, String>;

/// Sentinel string distinguishing an explicit null from an absent field
pub const NULL_SENTINEL: &str = "null";

/// Encode one typed value to its wire string
pub fn encode_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Integer(i) => i.to_string(),
        FieldValue::Float(f) => f.to_string(),
        FieldValue::Text(s) => s.clone(),
        FieldValue::Boolean(b) => if *b { "true" } else { "false" }.to_string(),
        FieldValue::DateTime(dt) => dt.timestamp_millis().to_string(),
        FieldValue::Reference(r) => r.clone(),
        FieldValue::Null => NULL_SENTINEL.to_string(),
    }
}

/// Encode a full attribute set to its flat storage form.
///
/// Encoding dispatches on each value's variant; the declared model is not
/// consulted (every declared shape encodes the same way).
pub fn encode_record(attrs: &Attributes) -> FlatRecord {
    attrs
        .iter()
        .map(|(field, value)| (field.clone(), encode_value(value)))
        .collect()
}

/// Decode one wire string per a declared type.
///
/// The raw string is returned untouched as text when it does not parse as
/// the declared type.
pub fn decode_value(declared: FieldType, raw: String) -> FieldValue {
    match declared {
        FieldType::Integer => match raw.parse::<i64>() {
            Ok(i) => FieldValue::Integer(i),
            Err(_) => FieldValue::Text(raw),
        },
        FieldType::Float => match raw.parse::<f64>() {
            Ok(f) => FieldValue::Float(f),
            Err(_) => FieldValue::Text(raw),
        },
        FieldType::Text => FieldValue::Text(raw),
        FieldType::Boolean => match raw.as_str() {
            "true" => FieldValue::Boolean(true),
            "false" => FieldValue::Boolean(false),
            _ => FieldValue::Text(raw),
        },
        FieldType::DateTime => match raw.parse::<i64>() {
            Ok(ms) => match DateTime::<Utc>::from_timestamp_millis(ms) {
                Some(dt) => FieldValue::DateTime(dt),
                None => FieldValue::Text(raw),
            },
            Err(_) => FieldValue::Text(raw),
        },
        FieldType::Reference => FieldValue::Reference(raw),
    }
}

/// Decode a flat stored record back to typed attributes.
///
/// The null sentinel decodes to `Null` regardless of declared type and is
/// checked before any type-specific decode. Fields absent from the model
/// are left untouched as text.
pub fn decode_record(model: &ModelDef, flat: FlatRecord) -> Attributes {
    flat.into_iter()
        .map(|(field, raw)| {
            if raw == NULL_SENTINEL {
                return (field, FieldValue::Null);
            }
            let value = match model.field_type(&field) {
                Some(declared) => decode_value(declared, raw),
                None => FieldValue::Text(raw),
            };
            (field, value)
        })
        .collect()
}
