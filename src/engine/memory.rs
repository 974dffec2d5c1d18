//! In-process connection facade
//!
//! Mirrors the observable behavior of the PostgreSQL backend:
//! - statements against an absent table fail with `42P01`
//! - a second live document with the same id fails with `23505`
//! - inserts over a soft-deleted row revive it
//! - merges are shallow, top-level overlays
//! - transactions apply all statements or none

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use serde_json::Value;

use super::connection::Connection;
use super::document::Document;
use super::errors::{sqlstate, EngineError, EngineResult};
use super::statement::Statement;

#[derive(Debug, Clone)]
struct StoredRow {
    document: Document,
    deleted_date: Option<NaiveDateTime>,
}

impl StoredRow {
    fn is_live(&self) -> bool {
        self.deleted_date.is_none()
    }

    fn matches(&self, id: &str, key: &Option<String>) -> bool {
        self.document.id == id
            && match key {
                Some(key) => self.document.key.as_deref() == Some(key.as_str()),
                None => true,
            }
    }
}

#[derive(Debug, Clone, Default)]
struct MemoryTable {
    rows: Vec<StoredRow>,
    data_index: bool,
    key_index: bool,
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    tables: HashMap<String, MemoryTable>,
}

impl MemoryState {
    fn table_mut(&mut self, table: &str) -> EngineResult<&mut MemoryTable> {
        self.tables
            .get_mut(table)
            .ok_or_else(|| EngineError::undefined_table(table))
    }

    fn apply(&mut self, statement: &Statement, tables_created: &AtomicUsize) -> EngineResult<Vec<Document>> {
        let now = Utc::now().naive_utc();

        match statement {
            Statement::CreateTable { table } => {
                if !self.tables.contains_key(table) {
                    self.tables.insert(table.clone(), MemoryTable::default());
                    tables_created.fetch_add(1, Ordering::SeqCst);
                }
                Ok(Vec::new())
            }
            Statement::CreateDataIndex { table } => {
                self.table_mut(table)?.data_index = true;
                Ok(Vec::new())
            }
            Statement::CreateKeyIndex { table } => {
                self.table_mut(table)?.key_index = true;
                Ok(Vec::new())
            }
            Statement::Insert {
                table,
                id,
                key,
                data,
            } => {
                let rows = &mut self.table_mut(table)?.rows;
                let document = Document {
                    id: id.clone(),
                    key: key.clone(),
                    data: data.clone(),
                    creation_date: now,
                    last_updated_date: now,
                };

                match rows.iter_mut().find(|row| row.document.id == *id) {
                    Some(row) if row.is_live() => Err(EngineError::unique_violation(table, id)),
                    Some(row) => {
                        row.document = document.clone();
                        row.deleted_date = None;
                        Ok(vec![document])
                    }
                    None => {
                        rows.push(StoredRow {
                            document: document.clone(),
                            deleted_date: None,
                        });
                        Ok(vec![document])
                    }
                }
            }
            Statement::Select { table, id, key } => Ok(self
                .table_mut(table)?
                .rows
                .iter()
                .filter(|row| row.is_live() && row.matches(id, key))
                .map(|row| row.document.clone())
                .collect()),
            Statement::Merge {
                table,
                id,
                key,
                patch,
            } => {
                let mut merged = Vec::new();
                for row in self.table_mut(table)?.rows.iter_mut() {
                    if row.is_live() && row.matches(id, key) {
                        shallow_merge(&mut row.document.data, patch);
                        row.document.last_updated_date = now;
                        merged.push(row.document.clone());
                    }
                }
                Ok(merged)
            }
            Statement::SoftDelete { table, id, key } => {
                let mut deleted = Vec::new();
                for row in self.table_mut(table)?.rows.iter_mut() {
                    if row.is_live() && row.matches(id, key) {
                        row.deleted_date = Some(now);
                        deleted.push(row.document.clone());
                    }
                }
                Ok(deleted)
            }
            Statement::Delete { table, id, key } => {
                let rows = &mut self.table_mut(table)?.rows;
                let (removed, kept): (Vec<_>, Vec<_>) =
                    rows.drain(..).partition(|row| row.matches(id, key));
                *rows = kept;
                Ok(removed.into_iter().map(|row| row.document).collect())
            }
        }
    }
}

/// Top-level overlay, the same as PostgreSQL's `jsonb || jsonb` on objects.
fn shallow_merge(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (field, value) in patch {
                target.insert(field.clone(), value.clone());
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}

/// In-memory backend for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryConnection {
    state: RwLock<MemoryState>,
    reject_ddl: AtomicBool,
    tables_created: AtomicUsize,
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every DDL statement fail with a permission error.
    pub fn set_reject_ddl(&self, reject: bool) {
        self.reject_ddl.store(reject, Ordering::SeqCst);
    }

    /// Whether a backing table exists with both of its indexes.
    pub fn is_provisioned(&self, table: &str) -> bool {
        self.state
            .read()
            .map(|state| {
                state
                    .tables
                    .get(table)
                    .map_or(false, |t| t.data_index && t.key_index)
            })
            .unwrap_or(false)
    }

    /// Whether a backing table exists at all.
    pub fn has_table(&self, table: &str) -> bool {
        self.state
            .read()
            .map(|state| state.tables.contains_key(table))
            .unwrap_or(false)
    }

    /// Number of tables physically created so far.
    pub fn tables_created(&self) -> usize {
        self.tables_created.load(Ordering::SeqCst)
    }

    /// Number of stored rows in a table, soft-deleted rows included.
    pub fn row_count(&self, table: &str) -> usize {
        self.state
            .read()
            .map(|state| state.tables.get(table).map_or(0, |t| t.rows.len()))
            .unwrap_or(0)
    }

    fn check_ddl(&self, statement: &Statement) -> EngineResult<()> {
        if statement.is_ddl() && self.reject_ddl.load(Ordering::SeqCst) {
            return Err(EngineError::new(
                Some(sqlstate::INSUFFICIENT_PRIVILEGE),
                format!("permission denied to create objects for \"{}\"", statement.table()),
            ));
        }
        Ok(())
    }
}

fn poisoned() -> EngineError {
    EngineError::internal("memory engine lock poisoned")
}

#[async_trait]
impl Connection for MemoryConnection {
    async fn execute(&self, statement: &Statement) -> EngineResult<Vec<Document>> {
        self.check_ddl(statement)?;
        let mut state = self.state.write().map_err(|_| poisoned())?;
        state.apply(statement, &self.tables_created)
    }

    async fn transaction(&self, statements: &[Statement]) -> EngineResult<()> {
        for statement in statements {
            self.check_ddl(statement)?;
        }

        let mut state = self.state.write().map_err(|_| poisoned())?;
        let mut working = state.clone();
        let created = AtomicUsize::new(0);
        for statement in statements {
            working.apply(statement, &created)?;
        }

        *state = working;
        self.tables_created
            .fetch_add(created.load(Ordering::SeqCst), Ordering::SeqCst);
        Ok(())
    }
}
