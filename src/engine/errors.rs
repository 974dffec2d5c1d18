//! Backing engine errors
//!
//! Errors keep the engine's SQLSTATE code so callers can tell
//! "relation does not exist" apart from every other failure.

use thiserror::Error;

/// SQLSTATE codes the store and provisioner react to
pub mod sqlstate {
    /// relation does not exist
    pub const UNDEFINED_TABLE: &str = "42P01";
    /// relation already exists
    pub const DUPLICATE_TABLE: &str = "42P07";
    /// object (index, constraint) already exists
    pub const DUPLICATE_OBJECT: &str = "42710";
    /// unique constraint violated
    pub const UNIQUE_VIOLATION: &str = "23505";
    /// permission denied
    pub const INSUFFICIENT_PRIVILEGE: &str = "42501";
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Error surfaced by a connection facade
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EngineError {
    code: Option<String>,
    message: String,
}

impl EngineError {
    /// Create an error with an optional SQLSTATE code
    pub fn new(code: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            code: code.map(str::to_string),
            message: message.into(),
        }
    }

    /// Relation does not exist
    pub fn undefined_table(table: &str) -> Self {
        Self::new(
            Some(sqlstate::UNDEFINED_TABLE),
            format!("relation \"{}\" does not exist", table),
        )
    }

    /// Unique constraint violated
    pub fn unique_violation(table: &str, id: &str) -> Self {
        Self::new(
            Some(sqlstate::UNIQUE_VIOLATION),
            format!(
                "duplicate key value violates unique constraint on \"{}\": id={}",
                table, id
            ),
        )
    }

    /// Failure inside the engine itself, no SQLSTATE
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(None, message)
    }

    /// Returns the SQLSTATE code if the engine reported one
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The target table does not exist yet
    pub fn is_undefined_table(&self) -> bool {
        self.code() == Some(sqlstate::UNDEFINED_TABLE)
    }

    /// A unique constraint rejected the write
    pub fn is_unique_violation(&self) -> bool {
        self.code() == Some(sqlstate::UNIQUE_VIOLATION)
    }

    /// A table, index or constraint being created already exists
    pub fn is_already_exists(&self) -> bool {
        matches!(
            self.code(),
            Some(sqlstate::DUPLICATE_TABLE) | Some(sqlstate::DUPLICATE_OBJECT)
        )
    }
}

impl From<sqlx::Error> for EngineError {
    fn from(err: sqlx::Error) -> Self {
        let code = err
            .as_database_error()
            .and_then(|db| db.code())
            .map(|code| code.into_owned());
        Self {
            code,
            message: err.to_string(),
        }
    }
}
