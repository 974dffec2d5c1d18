//! Immutable per-table schema registry
//!
//! Built once, owned by the document store and shared read-only.
//! Table names double as SQL identifiers, so they are checked for
//! identifier safety at registration.

use std::collections::HashMap;

use serde_json::Value;

use super::errors::{SchemaError, SchemaResult};
use super::types::Schema;
use super::validator::SchemaValidator;
use crate::engine::validate_identifier;

/// Registry of table schemas, indexed by table name.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    tables: HashMap<String, Schema>,
}

impl SchemaRegistry {
    /// Builds a registry from `(table, schema)` pairs.
    ///
    /// # Errors
    ///
    /// Returns `KV_SCHEMA_MALFORMED` if a table name is not a safe identifier,
    /// a schema is structurally invalid, or a table is declared twice.
    pub fn new<I, S>(tables: I) -> SchemaResult<Self>
    where
        I: IntoIterator<Item = (S, Schema)>,
        S: Into<String>,
    {
        let mut registry = HashMap::new();

        for (table, schema) in tables {
            let table = table.into();

            validate_identifier(&table).map_err(|e| SchemaError::malformed(&table, e))?;
            schema
                .validate_structure()
                .map_err(|e| SchemaError::malformed(&table, e))?;

            if registry.contains_key(&table) {
                return Err(SchemaError::malformed(&table, "table declared more than once"));
            }
            registry.insert(table, schema);
        }

        Ok(Self { tables: registry })
    }

    /// Looks up the schema for a table.
    pub fn schema(&self, table: &str) -> SchemaResult<&Schema> {
        self.tables
            .get(table)
            .ok_or_else(|| SchemaError::unknown_table(table))
    }

    /// Checks if a table is registered.
    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    /// Returns registered table names in sorted order.
    pub fn tables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether no tables are registered.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Validates a full document against the table's schema.
    pub fn validate_full(&self, table: &str, value: &Value) -> SchemaResult<()> {
        SchemaValidator::new(self).validate_full(table, value)
    }

    /// Validates a partial document against the table's schema.
    pub fn validate_partial(&self, table: &str, value: &Value) -> SchemaResult<()> {
        SchemaValidator::new(self).validate_partial(table, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDef, SchemaErrorCode, Validator};

    fn schema() -> Schema {
        Schema::from_fields([("name", FieldDef::required(Validator::String))])
    }

    #[test]
    fn test_lookup_registered_table() {
        let registry = SchemaRegistry::new([("users", schema())]).unwrap();
        assert!(registry.contains("users"));
        assert!(registry.schema("users").is_ok());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_lookup_unknown_table() {
        let registry = SchemaRegistry::new([("users", schema())]).unwrap();
        let err = registry.schema("orders").unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::UnknownTable);
    }

    #[test]
    fn test_unsafe_table_name_rejected() {
        let err = SchemaRegistry::new([("users; DROP TABLE x", schema())]).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::Malformed);

        let err = SchemaRegistry::new([("1users", schema())]).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::Malformed);
    }

    #[test]
    fn test_malformed_schema_rejected() {
        let err = SchemaRegistry::new([("users", Schema::default())]).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::Malformed);
    }

    #[test]
    fn test_duplicate_table_rejected() {
        let err = SchemaRegistry::new([("users", schema()), ("users", schema())]).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::Malformed);
    }

    #[test]
    fn test_tables_sorted() {
        let registry =
            SchemaRegistry::new([("users", schema()), ("accounts", schema())]).unwrap();
        assert_eq!(registry.tables(), vec!["accounts", "users"]);
    }
}
