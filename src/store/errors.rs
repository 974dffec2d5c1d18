//! Document store errors
//!
//! Error codes:
//! - KV_INVALID_KEY: key parts malformed
//! - KV_UNKNOWN_TABLE: no schema registered for the table
//! - KV_SCHEMA_VIOLATION: payload rejected by the schema
//! - KV_NOT_FOUND: update target does not exist
//! - KV_RETRYABLE: table is being provisioned, retry the call
//! - KV_STORAGE: any other backing engine failure, passed through

use thiserror::Error;

use crate::engine::EngineError;
use crate::key::{DocumentKey, KeyError};
use crate::schema::{SchemaError, SchemaErrorCode};

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid key: {0}")]
    InvalidKey(#[from] KeyError),

    #[error("no schema registered for table '{0}'")]
    UnknownTable(String),

    #[error("{0}")]
    SchemaViolation(SchemaError),

    #[error("no document at '{0}'")]
    NotFound(DocumentKey),

    #[error("table '{0}' did not exist and is being provisioned; retry the call")]
    Retryable(String),

    #[error("storage error: {0}")]
    Storage(#[from] EngineError),
}

impl StoreError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::InvalidKey(_) => "KV_INVALID_KEY",
            StoreError::UnknownTable(_) => "KV_UNKNOWN_TABLE",
            StoreError::SchemaViolation(_) => "KV_SCHEMA_VIOLATION",
            StoreError::NotFound(_) => "KV_NOT_FOUND",
            StoreError::Retryable(_) => "KV_RETRYABLE",
            StoreError::Storage(_) => "KV_STORAGE",
        }
    }

    /// Whether the caller should retry the same call after a short delay
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Retryable(_))
    }
}

impl From<SchemaError> for StoreError {
    fn from(err: SchemaError) -> Self {
        match err.code() {
            SchemaErrorCode::UnknownTable => {
                StoreError::UnknownTable(err.table().unwrap_or_default().to_string())
            }
            SchemaErrorCode::Violation | SchemaErrorCode::Malformed => {
                StoreError::SchemaViolation(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ViolationDetails;

    #[test]
    fn test_schema_errors_map_to_taxonomy() {
        let err: StoreError = SchemaError::unknown_table("orders").into();
        assert!(matches!(err, StoreError::UnknownTable(ref t) if t == "orders"));
        assert_eq!(err.code(), "KV_UNKNOWN_TABLE");

        let err: StoreError =
            SchemaError::violation("users", ViolationDetails::missing_field("age")).into();
        assert_eq!(err.code(), "KV_SCHEMA_VIOLATION");
        assert!(err.to_string().contains("age"));
    }

    #[test]
    fn test_only_retryable_is_retryable() {
        assert!(StoreError::Retryable("users".into()).is_retryable());
        assert!(!StoreError::NotFound(DocumentKey::new("users", "u1")).is_retryable());
        assert!(!StoreError::Storage(EngineError::undefined_table("users")).is_retryable());
    }

    #[test]
    fn test_storage_error_keeps_engine_code() {
        let err: StoreError = EngineError::unique_violation("users", "u1").into();
        match err {
            StoreError::Storage(inner) => assert!(inner.is_unique_violation()),
            other => panic!("unexpected {:?}", other),
        }
    }
}
