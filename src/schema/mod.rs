//! Schema registry subsystem
//!
//! Each logical table carries a field schema. Payloads are checked
//! against it before they reach storage:
//! - `validate_full` on `set`
//! - `validate_partial` on `update`
//!
//! Schemas only constrain the fields they declare. Registries are
//! immutable once built.

mod errors;
mod loader;
mod registry;
mod types;
mod validator;

pub use errors::{SchemaError, SchemaErrorCode, SchemaResult, ViolationDetails};
pub use loader::SchemaLoader;
pub use registry::SchemaRegistry;
pub use types::{FieldDef, FieldRule, Schema, Validator};
pub use validator::SchemaValidator;
