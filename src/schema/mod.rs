//! Record type schemas for bridgekv
//!
//! A model names a record type and declares, per field, one of a closed set
//! of types plus an index flag. Models are registered once at startup into
//! an immutable registry; declared types drive decode-time coercion only.

mod errors;
mod loader;
mod registry;
mod types;
mod value;

pub use errors::{SchemaError, SchemaResult};
pub use registry::{ModelRegistry, RegistryBuilder, ID_FIELD};
pub use types::{FieldDef, FieldType, ModelDef};
pub use value::{Attributes, FieldValue};
