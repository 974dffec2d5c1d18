//! PostgreSQL rendering of store statements
//!
//! Identifiers are validated at schema registration and always quoted
//! here. Values travel as bind parameters; DDL carries none.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use super::statement::Statement;

/// Longest accepted table name. Index names append up to 9 characters
/// and must stay within PostgreSQL's 63-byte identifier limit.
pub const MAX_TABLE_NAME_LEN: usize = 48;

const COLUMNS: &str = "id, key, data, creation_date, last_updated_date";

/// Bind parameter for a rendered statement
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Text(String),
    OptionalText(Option<String>),
    Json(Value),
}

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is a valid regex")
    })
}

/// Checks that a name is safe to use as a table identifier.
pub fn validate_identifier(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("table name must not be empty".into());
    }
    if name.len() > MAX_TABLE_NAME_LEN {
        return Err(format!(
            "table name '{}' exceeds {} characters",
            name, MAX_TABLE_NAME_LEN
        ));
    }
    if !identifier_pattern().is_match(name) {
        return Err(format!(
            "table name '{}' must start with a letter or underscore and contain only letters, digits and underscores",
            name
        ));
    }
    Ok(())
}

/// Quotes an identifier for PostgreSQL.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Renders a statement to SQL text plus its bind parameters.
pub fn render(statement: &Statement) -> (String, Vec<Param>) {
    match statement {
        Statement::CreateTable { table } => (
            format!(
                "CREATE TABLE IF NOT EXISTS {} (\
                 id VARCHAR(255) PRIMARY KEY, \
                 key VARCHAR(255), \
                 data JSONB NOT NULL, \
                 creation_date TIMESTAMP NOT NULL DEFAULT now(), \
                 last_updated_date TIMESTAMP NOT NULL DEFAULT now(), \
                 deleted_date TIMESTAMP, \
                 CONSTRAINT {} UNIQUE (id, key))",
                quote_identifier(table),
                quote_identifier(&format!("{}_id_key", table)),
            ),
            Vec::new(),
        ),
        Statement::CreateDataIndex { table } => (
            format!(
                "CREATE INDEX IF NOT EXISTS {} ON {} USING gin (data)",
                quote_identifier(&format!("{}_data_gin", table)),
                quote_identifier(table),
            ),
            Vec::new(),
        ),
        Statement::CreateKeyIndex { table } => (
            format!(
                "CREATE INDEX IF NOT EXISTS {} ON {} (key)",
                quote_identifier(&format!("{}_key_idx", table)),
                quote_identifier(table),
            ),
            Vec::new(),
        ),
        Statement::Insert {
            table,
            id,
            key,
            data,
        } => (
            format!(
                "INSERT INTO {table} AS t (id, key, data, creation_date, last_updated_date, deleted_date) \
                 VALUES ($1, $2, $3, now(), now(), NULL) \
                 ON CONFLICT (id) DO UPDATE SET \
                 key = EXCLUDED.key, data = EXCLUDED.data, \
                 creation_date = EXCLUDED.creation_date, \
                 last_updated_date = EXCLUDED.last_updated_date, \
                 deleted_date = NULL \
                 WHERE t.deleted_date IS NOT NULL \
                 RETURNING {COLUMNS}",
                table = quote_identifier(table),
            ),
            vec![
                Param::Text(id.clone()),
                Param::OptionalText(key.clone()),
                Param::Json(data.clone()),
            ],
        ),
        Statement::Select { table, id, key } => {
            let (predicate, params) = key_predicate(id, key, 1);
            (
                format!(
                    "SELECT {COLUMNS} FROM {} WHERE {} AND deleted_date IS NULL",
                    quote_identifier(table),
                    predicate,
                ),
                params,
            )
        }
        Statement::Merge {
            table,
            id,
            key,
            patch,
        } => {
            let (predicate, mut params) = key_predicate(id, key, 2);
            params.insert(0, Param::Json(patch.clone()));
            (
                format!(
                    "UPDATE {} SET data = data || $1::jsonb, last_updated_date = now() \
                     WHERE {} AND deleted_date IS NULL RETURNING {COLUMNS}",
                    quote_identifier(table),
                    predicate,
                ),
                params,
            )
        }
        Statement::SoftDelete { table, id, key } => {
            let (predicate, params) = key_predicate(id, key, 1);
            (
                format!(
                    "UPDATE {} SET deleted_date = now() \
                     WHERE {} AND deleted_date IS NULL RETURNING {COLUMNS}",
                    quote_identifier(table),
                    predicate,
                ),
                params,
            )
        }
        Statement::Delete { table, id, key } => {
            let (predicate, params) = key_predicate(id, key, 1);
            (
                format!(
                    "DELETE FROM {} WHERE {} RETURNING {COLUMNS}",
                    quote_identifier(table),
                    predicate,
                ),
                params,
            )
        }
    }
}

/// Builds `id = $n [AND key = $n+1]` starting at placeholder `first`.
fn key_predicate(id: &str, key: &Option<String>, first: usize) -> (String, Vec<Param>) {
    match key {
        Some(key) => (
            format!("id = ${} AND key = ${}", first, first + 1),
            vec![Param::Text(id.to_string()), Param::Text(key.clone())],
        ),
        None => (format!("id = ${}", first), vec![Param::Text(id.to_string())]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("users").is_ok());
        assert!(validate_identifier("_audit_log2").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("2users").is_err());
        assert!(validate_identifier("users-archive").is_err());
        assert!(validate_identifier("users\"; drop").is_err());
        assert!(validate_identifier(&"a".repeat(MAX_TABLE_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("users"), "\"users\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_create_table_shape() {
        let (sql, params) = render(&Statement::CreateTable {
            table: "users".into(),
        });
        assert!(params.is_empty());
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS \"users\""));
        assert!(sql.contains("id VARCHAR(255) PRIMARY KEY"));
        assert!(sql.contains("data JSONB NOT NULL"));
        assert!(sql.contains("deleted_date TIMESTAMP"));
        assert!(sql.contains("CONSTRAINT \"users_id_key\" UNIQUE (id, key)"));
    }

    #[test]
    fn test_index_names_are_per_table() {
        let (gin, _) = render(&Statement::CreateDataIndex {
            table: "users".into(),
        });
        assert_eq!(
            gin,
            "CREATE INDEX IF NOT EXISTS \"users_data_gin\" ON \"users\" USING gin (data)"
        );

        let (key, _) = render(&Statement::CreateKeyIndex {
            table: "orders".into(),
        });
        assert_eq!(
            key,
            "CREATE INDEX IF NOT EXISTS \"orders_key_idx\" ON \"orders\" (key)"
        );
    }

    #[test]
    fn test_insert_binds_values() {
        let (sql, params) = render(&Statement::Insert {
            table: "users".into(),
            id: "u1".into(),
            key: None,
            data: json!({ "age": 23 }),
        });
        assert!(sql.starts_with("INSERT INTO \"users\""));
        assert!(sql.contains("WHERE t.deleted_date IS NOT NULL"));
        assert_eq!(
            params,
            vec![
                Param::Text("u1".into()),
                Param::OptionalText(None),
                Param::Json(json!({ "age": 23 })),
            ]
        );
    }

    #[test]
    fn test_select_by_id_alone() {
        let (sql, params) = render(&Statement::Select {
            table: "users".into(),
            id: "u1".into(),
            key: None,
        });
        assert!(sql.contains("WHERE id = $1 AND deleted_date IS NULL"));
        assert_eq!(params, vec![Param::Text("u1".into())]);
    }

    #[test]
    fn test_select_by_id_and_key() {
        let (sql, params) = render(&Statement::Select {
            table: "users".into(),
            id: "u1".into(),
            key: Some("home".into()),
        });
        assert!(sql.contains("WHERE id = $1 AND key = $2"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_merge_is_single_statement() {
        let (sql, params) = render(&Statement::Merge {
            table: "users".into(),
            id: "u1".into(),
            key: Some("home".into()),
            patch: json!({ "age": 24 }),
        });
        assert!(sql.contains("data = data || $1::jsonb"));
        assert!(sql.contains("id = $2 AND key = $3"));
        assert_eq!(params[0], Param::Json(json!({ "age": 24 })));
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_delete_variants() {
        let (soft, _) = render(&Statement::SoftDelete {
            table: "users".into(),
            id: "u1".into(),
            key: None,
        });
        assert!(soft.starts_with("UPDATE \"users\" SET deleted_date = now()"));

        let (hard, _) = render(&Statement::Delete {
            table: "users".into(),
            id: "u1".into(),
            key: None,
        });
        assert!(hard.starts_with("DELETE FROM \"users\" WHERE id = $1"));
    }
}
