//! Schema type definitions
//!
//! A schema maps field names to rules. A rule is either a leaf validator
//! or a nested schema of the same shape:
//! - string: UTF-8 string
//! - integer: integral number
//! - float: any number
//! - bool: boolean
//! - object: any JSON object
//! - any: any value, null included
//! - array: homogeneous array with element validator

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Leaf validator for a single value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validator {
    /// UTF-8 string
    String,
    /// Integral number (no fractional part)
    Integer,
    /// Any number
    Float,
    /// Boolean
    Bool,
    /// Any JSON object, contents unchecked
    Object,
    /// Anything, including null
    Any,
    /// Homogeneous array with single element validator
    Array(Box<Validator>),
}

impl Validator {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> String {
        match self {
            Validator::String => "string".into(),
            Validator::Integer => "integer".into(),
            Validator::Float => "float".into(),
            Validator::Bool => "bool".into(),
            Validator::Object => "object".into(),
            Validator::Any => "any".into(),
            Validator::Array(element) => format!("{}[]", element.type_name()),
        }
    }
}

impl fmt::Display for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

impl FromStr for Validator {
    type Err = String;

    /// Parses `string`, `integer`, `float`, `bool`, `object`, `any`,
    /// with any number of trailing `[]` for arrays.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(element) = s.strip_suffix("[]") {
            return Ok(Validator::Array(Box::new(element.parse()?)));
        }

        match s {
            "string" => Ok(Validator::String),
            "integer" | "int" => Ok(Validator::Integer),
            "float" | "number" => Ok(Validator::Float),
            "bool" | "boolean" => Ok(Validator::Bool),
            "object" => Ok(Validator::Object),
            "any" => Ok(Validator::Any),
            other => Err(format!("unknown field type '{}'", other)),
        }
    }
}

/// A field rule: either a leaf validator or a nested schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRule {
    Leaf(Validator),
    Nested(Schema),
}

/// Field definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// How the value is checked
    pub rule: FieldRule,
    /// Whether the field must be present on a full write
    pub required: bool,
}

impl FieldDef {
    /// Create a required leaf field
    pub fn required(validator: Validator) -> Self {
        Self {
            rule: FieldRule::Leaf(validator),
            required: true,
        }
    }

    /// Create an optional leaf field
    pub fn optional(validator: Validator) -> Self {
        Self {
            rule: FieldRule::Leaf(validator),
            required: false,
        }
    }

    /// Create a required nested field
    pub fn nested(schema: Schema) -> Self {
        Self {
            rule: FieldRule::Nested(schema),
            required: true,
        }
    }

    /// Create an optional nested field
    pub fn optional_nested(schema: Schema) -> Self {
        Self {
            rule: FieldRule::Nested(schema),
            required: false,
        }
    }
}

impl FromStr for FieldDef {
    type Err = String;

    /// Parses a leaf spec such as `string`, `integer?` or `string[]?`.
    /// A trailing `?` marks the field optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.strip_suffix('?') {
            Some(inner) => Ok(FieldDef::optional(inner.parse()?)),
            None => Ok(FieldDef::required(s.parse()?)),
        }
    }
}

/// Field schema for one table (or one nested object)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    /// Field definitions, ordered by name
    pub fields: BTreeMap<String, FieldDef>,
}

impl Schema {
    /// Create a schema from field definitions
    pub fn new(fields: BTreeMap<String, FieldDef>) -> Self {
        Self { fields }
    }

    /// Create a schema from `(name, definition)` pairs
    pub fn from_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, FieldDef)>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Returns the definition of a field
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }

    /// Validates the schema structure itself (not a document)
    pub fn validate_structure(&self) -> Result<(), String> {
        self.validate_structure_at("")
    }

    fn validate_structure_at(&self, prefix: &str) -> Result<(), String> {
        if self.fields.is_empty() {
            if prefix.is_empty() {
                return Err("schema declares no fields".into());
            }
            return Err(format!("nested schema '{}' declares no fields", prefix));
        }

        for (name, def) in &self.fields {
            if name.trim().is_empty() {
                return Err("field names must not be empty".into());
            }
            if let FieldRule::Nested(nested) = &def.rule {
                let path = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{}.{}", prefix, name)
                };
                nested.validate_structure_at(&path)?;
            }
        }

        Ok(())
    }
}
