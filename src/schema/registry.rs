//! Model registry
//!
//! The registry is explicit, immutable configuration: it is assembled once
//! at startup through [`RegistryBuilder`], then shared by reference between
//! the write path and the query planner. Nothing mutates it afterward.

use std::collections::BTreeMap;

use super::errors::{SchemaError, SchemaResult};
use super::types::{FieldDef, FieldType, ModelDef};

/// Primary-key field name carried by every record once persisted
pub const ID_FIELD: &str = "id";

/// Builds a [`ModelRegistry`] during startup.
///
/// `define` and `define_foreign_key` may be called in any order; `build`
/// freezes the result.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    models: BTreeMap<String, ModelDef>,
}

impl RegistryBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record type.
    ///
    /// Every model implicitly carries an `id: integer` field so that decode
    /// restores primary keys as integers; an explicit `id` declaration wins.
    pub fn define(&mut self, mut model: ModelDef) -> SchemaResult<()> {
        if self.models.contains_key(&model.name) {
            return Err(SchemaError::ModelRedefined(model.name));
        }

        model
            .fields
            .entry(ID_FIELD.to_string())
            .or_insert_with(|| FieldDef::of(FieldType::Integer));

        self.models.insert(model.name.clone(), model);
        Ok(())
    }

    /// Register a foreign-key field on an already-defined model.
    ///
    /// Foreign keys are indexed reference fields; the lookup sets they
    /// maintain are what make relation traversal queries cheap.
    pub fn define_foreign_key(&mut self, model: &str, key: &str) -> SchemaResult<()> {
        let def = self
            .models
            .get_mut(model)
            .ok_or_else(|| SchemaError::UnknownModel(model.to_string()))?;

        def.fields
            .insert(key.to_string(), FieldDef::indexed(FieldType::Reference));
        Ok(())
    }

    /// Freeze the registry
    pub fn build(self) -> ModelRegistry {
        ModelRegistry {
            models: self.models,
        }
    }
}

/// Immutable model registry shared across the store
#[derive(Debug)]
pub struct ModelRegistry {
    models: BTreeMap<String, ModelDef>,
}

impl ModelRegistry {
    /// Look up a model definition
    pub fn get(&self, name: &str) -> SchemaResult<&ModelDef> {
        self.models
            .get(name)
            .ok_or_else(|| SchemaError::UnknownModel(name.to_string()))
    }

    /// Whether a model is registered
    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Registered model names, in name order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    /// Number of registered models
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
