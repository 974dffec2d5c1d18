//! Schema loader for table definitions stored as JSON
//!
//! File shape:
//!
//! ```json
//! {
//!   "users": {
//!     "fields": {
//!       "firstName": "string",
//!       "age": "integer",
//!       "nickname": "string?",
//!       "tags": "string[]",
//!       "address": { "line1": "string" }
//!     }
//!   }
//! }
//! ```
//!
//! A string is a leaf spec (see `FieldDef::from_str`); an object is a
//! required nested schema.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::errors::{SchemaError, SchemaResult};
use super::registry::SchemaRegistry;
use super::types::{FieldDef, Schema};

#[derive(Debug, Deserialize)]
struct TableDefinition {
    fields: BTreeMap<String, FieldSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FieldSpec {
    Leaf(String),
    Nested(BTreeMap<String, FieldSpec>),
}

impl FieldSpec {
    fn into_field_def(self, path: &str) -> Result<FieldDef, String> {
        match self {
            FieldSpec::Leaf(spec) => spec
                .parse()
                .map_err(|e| format!("field '{}': {}", path, e)),
            FieldSpec::Nested(fields) => Ok(FieldDef::nested(fields_to_schema(fields, path)?)),
        }
    }
}

fn fields_to_schema(fields: BTreeMap<String, FieldSpec>, prefix: &str) -> Result<Schema, String> {
    let mut defs = BTreeMap::new();
    for (name, spec) in fields {
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", prefix, name)
        };
        defs.insert(name, spec.into_field_def(&path)?);
    }
    Ok(Schema::new(defs))
}

/// Loads schema registries from JSON table definitions.
pub struct SchemaLoader;

impl SchemaLoader {
    /// Parses a registry from a JSON string.
    pub fn from_json_str(content: &str) -> SchemaResult<SchemaRegistry> {
        Self::parse(content, "<in-memory>")
    }

    /// Reads and parses a registry from a JSON file.
    ///
    /// Missing or malformed files are rejected with `KV_SCHEMA_MALFORMED`.
    pub fn load(path: &Path) -> SchemaResult<SchemaRegistry> {
        let origin = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::malformed(&origin, format!("Failed to read file: {}", e))
        })?;
        Self::parse(&content, &origin)
    }

    fn parse(content: &str, origin: &str) -> SchemaResult<SchemaRegistry> {
        let definitions: BTreeMap<String, TableDefinition> = serde_json::from_str(content)
            .map_err(|e| SchemaError::malformed(origin, format!("Invalid JSON: {}", e)))?;

        let mut tables = Vec::with_capacity(definitions.len());
        for (table, definition) in definitions {
            let schema = fields_to_schema(definition.fields, "")
                .map_err(|e| SchemaError::malformed(&table, e))?;
            tables.push((table, schema));
        }

        SchemaRegistry::new(tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldRule, SchemaErrorCode, Validator};
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const USERS: &str = r#"{
        "users": {
            "fields": {
                "firstName": "string",
                "lastName": "string",
                "age": "integer",
                "nickname": "string?",
                "address": { "line1": "string" }
            }
        }
    }"#;

    #[test]
    fn test_parse_table_definitions() {
        let registry = SchemaLoader::from_json_str(USERS).unwrap();
        let schema = registry.schema("users").unwrap();

        assert_eq!(schema.fields.len(), 5);
        assert!(!schema.field("nickname").unwrap().required);
        match &schema.field("address").unwrap().rule {
            FieldRule::Nested(nested) => {
                assert_eq!(
                    nested.field("line1").unwrap().rule,
                    FieldRule::Leaf(Validator::String)
                );
            }
            other => panic!("expected nested rule, got {:?}", other),
        }
    }

    #[test]
    fn test_loaded_registry_validates() {
        let registry = SchemaLoader::from_json_str(USERS).unwrap();
        let doc = json!({
            "firstName": "Alloys", "lastName": "Mila", "age": 23,
            "address": { "line1": "1 Main St" }
        });
        assert!(registry.validate_full("users", &doc).is_ok());
    }

    #[test]
    fn test_unknown_type_is_malformed() {
        let err = SchemaLoader::from_json_str(r#"{"users": {"fields": {"born": "date"}}}"#)
            .unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::Malformed);
        assert!(err.message().contains("born"));
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let err = SchemaLoader::from_json_str("{ not json").unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::Malformed);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(USERS.as_bytes()).unwrap();

        let registry = SchemaLoader::load(file.path()).unwrap();
        assert!(registry.contains("users"));
    }

    #[test]
    fn test_missing_file_is_malformed() {
        let err = SchemaLoader::load(Path::new("/nonexistent/schemas.json")).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::Malformed);
    }
}
