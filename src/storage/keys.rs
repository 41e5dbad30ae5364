//! Composite storage key construction
//!
//! All keys this layer writes live in one of four namespaces:
//!
//! - `"<type>:<id>"` — primary records
//! - `"i:<type>:<field>:<value>"` — index membership sets
//! - `"s:<type>"` — per-type membership list
//! - `"id:<type>"` — per-type id counter
//!
//! Record type names must not contain `:`.

/// Key of a primary record
pub fn record(model: &str, id: u64) -> String {
    format!("{}:{}", model, id)
}

/// Namespace prefix matching every primary record of a type
pub fn record_prefix(model: &str) -> String {
    format!("{}:", model)
}

/// Key of the membership set for one indexed field value
pub fn index(model: &str, field: &str, value: &str) -> String {
    format!("i:{}:{}:{}", model, field, value)
}

/// Key of the per-type membership list
pub fn members(model: &str) -> String {
    format!("s:{}", model)
}

/// Key of the per-type id counter
pub fn counter(model: &str) -> String {
    format!("id:{}", model)
}

/// Recover the id from a primary record key, if the key is in the
/// type's namespace
pub fn id_from_record_key(model: &str, key: &str) -> Option<u64> {
    key.strip_prefix(&record_prefix(model))
        .and_then(|raw| raw.parse().ok())
}
