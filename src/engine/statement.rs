//! Statement vocabulary of the document store
//!
//! Every statement the store issues is one of these variants. Backends
//! either render them to SQL (`sql::render`) or execute them directly.
//!
//! For statements that address a document, `key: None` means "match on
//! id alone"; `Some(sub_key)` additionally requires the key column to match.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Create the backing table with its uniqueness constraint
    CreateTable { table: String },
    /// Create the JSON-content (GIN) index on `data`
    CreateDataIndex { table: String },
    /// Create the secondary index on `key`
    CreateKeyIndex { table: String },
    /// Insert a document, reviving a soft-deleted row with the same id
    Insert {
        table: String,
        id: String,
        key: Option<String>,
        data: Value,
    },
    /// Fetch live documents
    Select {
        table: String,
        id: String,
        key: Option<String>,
    },
    /// Shallow-merge `patch` into live documents, server side
    Merge {
        table: String,
        id: String,
        key: Option<String>,
        patch: Value,
    },
    /// Stamp live documents as deleted
    SoftDelete {
        table: String,
        id: String,
        key: Option<String>,
    },
    /// Physically remove documents
    Delete {
        table: String,
        id: String,
        key: Option<String>,
    },
}

impl Statement {
    /// Target table of the statement
    pub fn table(&self) -> &str {
        match self {
            Statement::CreateTable { table }
            | Statement::CreateDataIndex { table }
            | Statement::CreateKeyIndex { table }
            | Statement::Insert { table, .. }
            | Statement::Select { table, .. }
            | Statement::Merge { table, .. }
            | Statement::SoftDelete { table, .. }
            | Statement::Delete { table, .. } => table,
        }
    }

    /// Whether this is schema DDL (rendered without bind parameters)
    pub fn is_ddl(&self) -> bool {
        matches!(
            self,
            Statement::CreateTable { .. }
                | Statement::CreateDataIndex { .. }
                | Statement::CreateKeyIndex { .. }
        )
    }

    /// Statements that create a table and both of its indexes, in order
    pub fn provision(table: &str) -> Vec<Statement> {
        vec![
            Statement::CreateTable {
                table: table.to_string(),
            },
            Statement::CreateDataIndex {
                table: table.to_string(),
            },
            Statement::CreateKeyIndex {
                table: table.to_string(),
            },
        ]
    }
}
