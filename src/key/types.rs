//! Document key type and canonicalization

use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::{KeyError, KeyResult};

/// Composite address of a stored document.
///
/// Keys are immutable once built. `sub_key` is `None` when the caller
/// supplied two parts or an empty third part.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "KeyParts")]
pub struct DocumentKey {
    table: String,
    id: String,
    sub_key: Option<String>,
}

impl DocumentKey {
    /// Create a key without a sub-key
    pub fn new(table: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            id: id.into(),
            sub_key: None,
        }
    }

    /// Create a key with a sub-key. An empty sub-key is normalized to `None`.
    pub fn with_sub_key(
        table: impl Into<String>,
        id: impl Into<String>,
        sub_key: impl Into<String>,
    ) -> Self {
        let sub_key = sub_key.into();
        Self {
            table: table.into(),
            id: id.into(),
            sub_key: normalize(Some(sub_key)),
        }
    }

    /// Build a key from caller-supplied parts.
    ///
    /// Accepts `[table, id]` or `[table, id, sub_key]`. Table and id must be
    /// non-empty; an empty sub-key means "no sub-key".
    pub fn from_parts(parts: &[&str]) -> KeyResult<Self> {
        let (table, id, sub_key) = match parts {
            [table, id] => (*table, *id, None),
            [table, id, sub_key] => (*table, *id, Some(*sub_key)),
            other => return Err(KeyError::Arity(other.len())),
        };

        let key = Self {
            table: table.to_string(),
            id: id.to_string(),
            sub_key: normalize(sub_key.map(str::to_string)),
        };
        key.validate()?;
        Ok(key)
    }

    /// Checks that table and id are non-empty.
    ///
    /// The infallible constructors skip this; the document store runs it
    /// before every operation.
    pub fn validate(&self) -> KeyResult<()> {
        if self.table.is_empty() {
            return Err(KeyError::Empty("table"));
        }
        if self.id.is_empty() {
            return Err(KeyError::Empty("id"));
        }
        Ok(())
    }

    /// Logical table name
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Document id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Sub-key, if any
    pub fn sub_key(&self) -> Option<&str> {
        self.sub_key.as_deref()
    }
}

fn normalize(sub_key: Option<String>) -> Option<String> {
    sub_key.filter(|s| !s.is_empty())
}

/// Wire shape of a key; deserialization goes through the same checks as
/// `from_parts`.
#[derive(Deserialize)]
struct KeyParts {
    table: String,
    id: String,
    #[serde(default)]
    sub_key: Option<String>,
}

impl TryFrom<KeyParts> for DocumentKey {
    type Error = KeyError;

    fn try_from(parts: KeyParts) -> KeyResult<Self> {
        let key = Self {
            table: parts.table,
            id: parts.id,
            sub_key: normalize(parts.sub_key),
        };
        key.validate()?;
        Ok(key)
    }
}

impl From<(&str, &str)> for DocumentKey {
    fn from((table, id): (&str, &str)) -> Self {
        Self::new(table, id)
    }
}

impl From<(&str, &str, &str)> for DocumentKey {
    fn from((table, id, sub_key): (&str, &str, &str)) -> Self {
        Self::with_sub_key(table, id, sub_key)
    }
}

impl From<(&str, &str, Option<&str>)> for DocumentKey {
    fn from((table, id, sub_key): (&str, &str, Option<&str>)) -> Self {
        Self {
            table: table.to_string(),
            id: id.to_string(),
            sub_key: normalize(sub_key.map(str::to_string)),
        }
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sub_key {
            Some(sub_key) => write!(f, "{}/{}/{}", self.table, self.id, sub_key),
            None => write!(f, "{}/{}", self.table, self.id),
        }
    }
}
