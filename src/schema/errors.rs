//! Schema error types
//!
//! Error codes:
//! - KV_UNKNOWN_TABLE (no schema registered for the table)
//! - KV_SCHEMA_VIOLATION (payload rejected by the table schema)
//! - KV_SCHEMA_MALFORMED (the schema definition itself is invalid)

use std::fmt;

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Table name has no registered schema
    UnknownTable,
    /// Document violates schema
    Violation,
    /// Schema definition is invalid
    Malformed,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::UnknownTable => "KV_UNKNOWN_TABLE",
            SchemaErrorCode::Violation => "KV_SCHEMA_VIOLATION",
            SchemaErrorCode::Malformed => "KV_SCHEMA_MALFORMED",
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Violation details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViolationDetails {
    /// Field path (e.g., "address.line1" or "tags[2]")
    pub field: String,
    /// Expected type or condition
    pub expected: String,
    /// Actual value or type found
    pub actual: String,
}

impl ViolationDetails {
    pub fn new(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::new(field, "field to be present", "missing")
    }

    pub fn type_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::new(field, expected, actual)
    }
}

impl fmt::Display for ViolationDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "field '{}': expected {}, got {}",
            self.field, self.expected, self.actual
        )
    }
}

/// Schema error type with full context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    table: Option<String>,
    details: Option<ViolationDetails>,
}

impl SchemaError {
    /// Create an unknown table error
    pub fn unknown_table(table: impl Into<String>) -> Self {
        let table = table.into();
        Self {
            code: SchemaErrorCode::UnknownTable,
            message: format!("No schema registered for table '{}'", table),
            table: Some(table),
            details: None,
        }
    }

    /// Create a violation error
    pub fn violation(table: impl Into<String>, details: ViolationDetails) -> Self {
        Self {
            code: SchemaErrorCode::Violation,
            message: format!("Document validation failed: {}", details),
            table: Some(table.into()),
            details: Some(details),
        }
    }

    /// Create an error for a malformed schema definition
    pub fn malformed(origin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::Malformed,
            message: format!("Malformed schema '{}': {}", origin.into(), reason.into()),
            table: None,
            details: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the table name if applicable
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Returns violation details if applicable
    pub fn details(&self) -> Option<&ViolationDetails> {
        self.details.as_ref()
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
