//! Model definition loader
//!
//! Loads model definitions from a directory of JSON files at startup, one
//! model per file:
//!
//! ```json
//! { "model": "Person", "fields": { "age": { "type": "integer", "index": true } } }
//! ```
//!
//! Non-JSON files are skipped; a malformed definition fails the load.

use std::fs;
use std::path::Path;

use super::errors::{SchemaError, SchemaResult};
use super::registry::RegistryBuilder;
use super::types::ModelDef;

impl RegistryBuilder {
    /// Load every `*.json` model definition from a directory.
    ///
    /// Returns the number of models registered. A missing directory is an
    /// error; an empty one registers nothing.
    pub fn load_dir(&mut self, dir: &Path) -> SchemaResult<usize> {
        let entries = fs::read_dir(dir)
            .map_err(|e| SchemaError::malformed(dir.display().to_string(), e.to_string()))?;

        let mut loaded = 0;
        for entry in entries {
            let entry = entry
                .map_err(|e| SchemaError::malformed(dir.display().to_string(), e.to_string()))?;
            let path = entry.path();

            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }

            self.load_file(&path)?;
            loaded += 1;
        }

        Ok(loaded)
    }

    /// Load a single model definition file
    pub fn load_file(&mut self, path: &Path) -> SchemaResult<()> {
        let content = fs::read_to_string(path)
            .map_err(|e| SchemaError::malformed(path.display().to_string(), e.to_string()))?;

        let model: ModelDef = serde_json::from_str(&content)
            .map_err(|e| SchemaError::malformed(path.display().to_string(), e.to_string()))?;

        self.define(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_definition(dir: &Path, file: &str, content: &str) {
        let mut f = fs::File::create(dir.join(file)).unwrap();
        f.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_load_directory() {
        let dir = TempDir::new().unwrap();
        write_definition(
            dir.path(),
            "person.json",
            r#"{ "model": "Person", "fields": { "age": { "type": "integer", "index": true } } }"#,
        );
        write_definition(
            dir.path(),
            "order.json",
            r#"{ "model": "Order", "fields": { "total": { "type": "float" } } }"#,
        );
        write_definition(dir.path(), "notes.txt", "not a definition");

        let mut builder = RegistryBuilder::new();
        let loaded = builder.load_dir(dir.path()).unwrap();
        assert_eq!(loaded, 2);

        let registry = builder.build();
        assert!(registry.contains("Person"));
        assert!(registry.contains("Order"));
        assert!(registry.get("Person").unwrap().is_indexed("age"));
    }

    #[test]
    fn test_malformed_definition_fails() {
        let dir = TempDir::new().unwrap();
        write_definition(dir.path(), "bad.json", "{ not json");

        let mut builder = RegistryBuilder::new();
        let result = builder.load_dir(dir.path());
        assert!(matches!(
            result,
            Err(SchemaError::MalformedDefinition { .. })
        ));
    }

    #[test]
    fn test_empty_directory() {
        let dir = TempDir::new().unwrap();
        let mut builder = RegistryBuilder::new();
        assert_eq!(builder.load_dir(dir.path()).unwrap(), 0);
    }
}
