//! Document validation against registered table schemas
//!
//! Validation semantics:
//! - The payload must be a JSON object
//! - Full validation: every required field is present and valid,
//!   optional fields are checked when present
//! - Partial validation: only declared fields that are present are checked
//! - Undeclared fields pass through unchecked in both modes
//! - No coercion: `"23"` is not an integer, `23.0` is
//! - Null only satisfies `any`

use serde_json::{Map, Value};

use super::errors::{SchemaError, SchemaResult, ViolationDetails};
use super::registry::SchemaRegistry;
use super::types::{FieldRule, Schema, Validator};

/// Schema validator that enforces table schemas on payloads.
///
/// The validator does not mutate documents and is deterministic:
/// fields are visited in name order, so the first reported violation
/// is stable across runs.
pub struct SchemaValidator<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> SchemaValidator<'a> {
    /// Creates a new validator backed by the given registry.
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Validates a complete document for `table`.
    ///
    /// # Errors
    ///
    /// - `KV_UNKNOWN_TABLE` if the table has no schema
    /// - `KV_SCHEMA_VIOLATION` if a required field is missing or any
    ///   present declared field fails its validator
    pub fn validate_full(&self, table: &str, document: &Value) -> SchemaResult<()> {
        let schema = self.registry.schema(table)?;
        let obj = root_object(table, document)?;
        validate_object(table, obj, schema, "", Mode::Full)
    }

    /// Validates a partial document (any subset of declared fields).
    ///
    /// Nested values that are present are checked in full, since a shallow
    /// merge replaces them wholesale.
    pub fn validate_partial(&self, table: &str, document: &Value) -> SchemaResult<()> {
        let schema = self.registry.schema(table)?;
        let obj = root_object(table, document)?;
        validate_object(table, obj, schema, "", Mode::Partial)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Full,
    Partial,
}

fn root_object<'v>(table: &str, document: &'v Value) -> SchemaResult<&'v Map<String, Value>> {
    document.as_object().ok_or_else(|| {
        SchemaError::violation(
            table,
            ViolationDetails::type_mismatch("$root", "object", json_type_name(document)),
        )
    })
}

/// Validates an object against field definitions.
fn validate_object(
    table: &str,
    obj: &Map<String, Value>,
    schema: &Schema,
    path_prefix: &str,
    mode: Mode,
) -> SchemaResult<()> {
    for (field_name, field_def) in &schema.fields {
        let field_path = make_path(path_prefix, field_name);

        match obj.get(field_name) {
            Some(value) => match &field_def.rule {
                FieldRule::Leaf(validator) => {
                    validate_value(table, value, validator, &field_path)?;
                }
                FieldRule::Nested(nested) => {
                    let nested_obj = value
                        .as_object()
                        .ok_or_else(|| type_error(table, &field_path, "object", value))?;
                    validate_object(table, nested_obj, nested, &field_path, Mode::Full)?;
                }
            },
            None => {
                if mode == Mode::Full && field_def.required {
                    return Err(SchemaError::violation(
                        table,
                        ViolationDetails::missing_field(field_path),
                    ));
                }
            }
        }
    }

    Ok(())
}

/// Validates a value against a leaf validator.
fn validate_value(
    table: &str,
    value: &Value,
    validator: &Validator,
    field_path: &str,
) -> SchemaResult<()> {
    let ok = match validator {
        Validator::String => value.is_string(),
        Validator::Integer => is_integral(value),
        Validator::Float => value.is_number(),
        Validator::Bool => value.is_boolean(),
        Validator::Object => value.is_object(),
        Validator::Any => true,
        Validator::Array(element) => {
            let arr = value
                .as_array()
                .ok_or_else(|| type_error(table, field_path, &validator.type_name(), value))?;
            for (i, elem) in arr.iter().enumerate() {
                validate_value(table, elem, element, &format!("{}[{}]", field_path, i))?;
            }
            true
        }
    };

    if ok {
        Ok(())
    } else {
        Err(type_error(table, field_path, &validator.type_name(), value))
    }
}

/// Returns the JSON type name for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "integer"
            } else {
                "float"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Integral numbers, including floats with no fractional part (`23.0`).
fn is_integral(value: &Value) -> bool {
    value.is_i64()
        || value.is_u64()
        || value
            .as_f64()
            .map_or(false, |n| n.is_finite() && n.fract() == 0.0)
}

fn make_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}

fn type_error(table: &str, field_path: &str, expected: &str, actual: &Value) -> SchemaError {
    SchemaError::violation(
        table,
        ViolationDetails::type_mismatch(field_path, expected, json_type_name(actual)),
    )
}
