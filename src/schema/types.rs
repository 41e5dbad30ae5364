//! Model type definitions
//!
//! Declared field types form a closed set:
//! - integer: 64-bit signed integer
//! - float: 64-bit floating point
//! - text: UTF-8 string
//! - boolean: true/false
//! - datetime: millisecond-precision UTC timestamp
//! - reference: opaque identifier of a record in another type
//!
//! Declared types drive decode-time coercion only; nothing is enforced at
//! write time.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Declared field types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// 64-bit signed integer
    Integer,
    /// 64-bit floating point
    Float,
    /// UTF-8 string
    Text,
    /// Boolean
    Boolean,
    /// Millisecond-precision UTC timestamp
    DateTime,
    /// Opaque identifier of a record in another type
    Reference,
}

impl FieldType {
    /// Returns the type name used in definition files and error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Text => "text",
            FieldType::Boolean => "boolean",
            FieldType::DateTime => "datetime",
            FieldType::Reference => "reference",
        }
    }
}

/// A single field: declared type plus index flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Declared type, used for decode-time coercion
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether writes to this field maintain a membership set
    #[serde(default)]
    pub index: bool,
}

impl FieldDef {
    /// Create an unindexed field of the given type
    pub fn of(field_type: FieldType) -> Self {
        Self {
            field_type,
            index: false,
        }
    }

    /// Create an indexed field of the given type
    pub fn indexed(field_type: FieldType) -> Self {
        Self {
            field_type,
            index: true,
        }
    }
}

/// A named record type: field name -> declared type and index flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDef {
    /// Record type name; becomes the key namespace prefix
    #[serde(rename = "model")]
    pub name: String,
    /// Field definitions
    pub fields: BTreeMap<String, FieldDef>,
}

impl ModelDef {
    /// Create an empty model definition
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Add a field definition
    pub fn with_field(mut self, field: impl Into<String>, def: FieldDef) -> Self {
        self.fields.insert(field.into(), def);
        self
    }

    /// Declared type of a field, if the field is declared
    pub fn field_type(&self, field: &str) -> Option<FieldType> {
        self.fields.get(field).map(|d| d.field_type)
    }

    /// Whether a field is marked indexed
    pub fn is_indexed(&self, field: &str) -> bool {
        self.fields.get(field).map(|d| d.index).unwrap_or(false)
    }

    /// Names and types of all indexed fields, in field-name order
    pub fn indexed_fields(&self) -> impl Iterator<Item = (&str, FieldType)> {
        self.fields
            .iter()
            .filter(|(_, d)| d.index)
            .map(|(name, d)| (name.as_str(), d.field_type))
    }
}
