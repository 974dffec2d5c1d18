//! Connection facade trait

use async_trait::async_trait;

use super::document::Document;
use super::errors::EngineResult;
use super::statement::Statement;

/// Executes store statements against a backing engine.
///
/// Implementations must report a missing table with SQLSTATE `42P01`
/// (see `EngineError::is_undefined_table`) so the store can provision it.
#[async_trait]
pub trait Connection: Send + Sync + std::fmt::Debug {
    /// Execute one statement, returning the rows it produced.
    ///
    /// DDL statements return no rows. An `Insert` that collides with a
    /// live document fails with a unique violation.
    async fn execute(&self, statement: &Statement) -> EngineResult<Vec<Document>>;

    /// Execute statements atomically: either all take effect or none do.
    async fn transaction(&self, statements: &[Statement]) -> EngineResult<()>;
}
