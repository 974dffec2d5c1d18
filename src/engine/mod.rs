//! Connection facade subsystem
//!
//! The document store talks to its backing engine only through the
//! `Connection` trait and the `Statement` vocabulary:
//! - `PostgresConnection` renders statements to SQL and runs them on an `sqlx` pool
//! - `MemoryConnection` executes them in process with matching semantics
//!
//! Engine failures keep their SQLSTATE code. The store relies on
//! `42P01` (relation does not exist) to trigger table provisioning.

mod connection;
mod document;
mod errors;
mod memory;
mod postgres;
mod statement;

pub mod sql;

pub use connection::Connection;
pub use document::Document;
pub use errors::{sqlstate, EngineError, EngineResult};
pub use memory::MemoryConnection;
pub use postgres::PostgresConnection;
pub use sql::{quote_identifier, validate_identifier};
pub use statement::Statement;
