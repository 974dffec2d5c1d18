//! pgkv - schema-validated JSON documents on PostgreSQL
//!
//! Documents are addressed by `(table, id[, sub_key])`, validated against
//! a per-table schema and stored as JSONB rows. Backing tables are created
//! on first use.

pub mod cli;
pub mod engine;
pub mod key;
pub mod observability;
pub mod provision;
pub mod schema;
pub mod store;

pub use engine::{Connection, Document, MemoryConnection, PostgresConnection};
pub use key::DocumentKey;
pub use schema::{SchemaLoader, SchemaRegistry};
pub use store::{
    DeleteOptions, DocumentStore, ProvisioningMode, StoreConfig, StoreError, StoreResult,
    ValidationMode,
};
