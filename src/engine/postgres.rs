//! PostgreSQL connection facade backed by an `sqlx` pool

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgPool, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::types::Json;
use sqlx::{Postgres, Row};

use super::connection::Connection;
use super::document::Document;
use super::errors::{EngineError, EngineResult};
use super::sql::{self, Param};
use super::statement::Statement;

/// Connection facade over a PostgreSQL-compatible server.
#[derive(Debug, Clone)]
pub struct PostgresConnection {
    pool: PgPool,
}

impl PostgresConnection {
    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> EngineResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn bind_all<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: Vec<Param>,
) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        query = match param {
            Param::Text(value) => query.bind(value),
            Param::OptionalText(value) => query.bind(value),
            Param::Json(value) => query.bind(Json(value)),
        };
    }
    query
}

fn decode_row(row: &PgRow) -> EngineResult<Document> {
    let data: Json<Value> = row.try_get("data")?;
    Ok(Document {
        id: row.try_get("id")?,
        key: row.try_get::<Option<String>, _>("key")?,
        data: data.0,
        creation_date: row.try_get::<NaiveDateTime, _>("creation_date")?,
        last_updated_date: row.try_get::<NaiveDateTime, _>("last_updated_date")?,
    })
}

#[async_trait]
impl Connection for PostgresConnection {
    async fn execute(&self, statement: &Statement) -> EngineResult<Vec<Document>> {
        let (text, params) = sql::render(statement);

        if statement.is_ddl() {
            sqlx::query(&text).execute(&self.pool).await?;
            return Ok(Vec::new());
        }

        let rows = bind_all(sqlx::query(&text), params)
            .fetch_all(&self.pool)
            .await?;
        let documents = rows.iter().map(decode_row).collect::<EngineResult<Vec<_>>>()?;

        // The upsert only fires over tombstones; a live row leaves nothing behind
        if let Statement::Insert { table, id, .. } = statement {
            if documents.is_empty() {
                return Err(EngineError::unique_violation(table, id));
            }
        }

        Ok(documents)
    }

    async fn transaction(&self, statements: &[Statement]) -> EngineResult<()> {
        let mut tx = self.pool.begin().await?;
        for statement in statements {
            let (text, params) = sql::render(statement);
            bind_all(sqlx::query(&text), params)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
