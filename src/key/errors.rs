//! Key construction errors

use thiserror::Error;

/// Result type for key construction
pub type KeyResult<T> = Result<T, KeyError>;

/// Errors raised while building a document key
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// Keys have two parts (table, id) or three (table, id, sub-key)
    #[error("key must have 2 or 3 parts, got {0}")]
    Arity(usize),

    /// Table and id must be non-empty
    #[error("key part '{0}' must not be empty")]
    Empty(&'static str),
}

impl KeyError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        "KV_INVALID_KEY"
    }
}
