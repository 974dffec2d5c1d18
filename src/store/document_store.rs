//! Key-addressed CRUD over validated JSON documents
//!
//! Every operation:
//! 1. resolves the key and checks the table is registered
//! 2. validates the payload according to the validation policy
//! 3. issues one statement through the connection facade
//!
//! A write against a table that does not exist yet triggers provisioning.
//! Under the lazy policy the call fails with `Retryable` while the table is
//! created in the background; nothing in this layer retries on its own.

use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use tokio::task::JoinHandle;

use super::config::{DeleteOptions, ProvisioningMode, StoreConfig, ValidationMode};
use super::errors::{StoreError, StoreResult};
use crate::engine::{Connection, Document, EngineError, Statement};
use crate::key::DocumentKey;
use crate::observability::{Event, Logger, MetricsRegistry, MetricsSnapshot};
use crate::provision::TableProvisioner;
use crate::schema::{SchemaError, SchemaRegistry, ViolationDetails};

/// Schema-validated document store.
///
/// Holds no per-call state: the registry is immutable and the facade is
/// the only writer of physical state, so calls on different keys run
/// concurrently without coordination. The only bookkeeping is the list of
/// background provisioning tasks awaited by `shutdown`.
#[derive(Debug)]
pub struct DocumentStore {
    registry: Arc<SchemaRegistry>,
    connection: Arc<dyn Connection>,
    provisioner: Arc<TableProvisioner>,
    metrics: Arc<MetricsRegistry>,
    config: StoreConfig,
    /// Background provisioning started by lazy writes
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl DocumentStore {
    pub fn new(
        registry: Arc<SchemaRegistry>,
        connection: Arc<dyn Connection>,
        config: StoreConfig,
    ) -> Self {
        let metrics = Arc::new(MetricsRegistry::new());
        let provisioner = Arc::new(TableProvisioner::new(
            Arc::clone(&connection),
            Arc::clone(&metrics),
        ));

        let tables = registry.len().to_string();
        Logger::info(Event::StoreOpen, &[("tables", tables.as_str())]);

        Self {
            registry,
            connection,
            provisioner,
            metrics,
            config,
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn config(&self) -> StoreConfig {
        self.config
    }

    pub fn provisioner(&self) -> &TableProvisioner {
        &self.provisioner
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Create the backing table for a registered table name now.
    ///
    /// Returns whether the table exists afterwards.
    pub async fn provision(&self, table: &str) -> StoreResult<bool> {
        self.registry.schema(table)?;
        Ok(self.provisioner.ensure(table).await)
    }

    /// Wait for background provisioning started by earlier writes.
    ///
    /// Tasks still running when the runtime shuts down are cancelled, so
    /// short-lived processes call this before exiting.
    pub async fn shutdown(&self) {
        let tasks: Vec<_> = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();

        for task in tasks {
            if let Err(err) = task.await {
                let reason = err.to_string();
                Logger::warn(Event::ProvisionFailed, &[("reason", reason.as_str())]);
            }
        }
    }

    /// Store a new document at `key`.
    ///
    /// # Errors
    ///
    /// - `UnknownTable` if the key's table has no schema
    /// - `SchemaViolation` if the payload fails full validation
    /// - `Retryable` if the backing table did not exist (lazy provisioning)
    /// - `Storage` for any other engine failure, including a live document
    ///   already stored under the same id
    pub async fn set(&self, key: impl Into<DocumentKey>, value: Value) -> StoreResult<Document> {
        let key = resolve(key)?;
        self.validate(&key, &value, true)?;

        if self.config.provisioning == ProvisioningMode::Eager {
            self.provisioner.ensure(key.table()).await;
        }

        let statement = Statement::Insert {
            table: key.table().to_string(),
            id: key.id().to_string(),
            key: key.sub_key().map(str::to_string),
            data: value,
        };

        match self.connection.execute(&statement).await {
            Ok(rows) => {
                let document = rows.into_iter().next().ok_or_else(|| {
                    self.storage_failure(&key, EngineError::internal("insert returned no row"))
                })?;
                self.metrics.increment_sets();
                Logger::trace(Event::DocumentSet, &[("key", key.to_string().as_str())]);
                Ok(document)
            }
            Err(err) if err.is_undefined_table() => {
                self.spawn_provisioning(key.table());
                self.metrics.increment_retryable();
                Logger::info(
                    Event::DocumentRetryable,
                    &[("key", key.to_string().as_str()), ("table", key.table())],
                );
                Err(StoreError::Retryable(key.table().to_string()))
            }
            Err(err) => Err(self.storage_failure(&key, err)),
        }
    }

    /// Fetch the document at `key`, or `None` if there is none.
    ///
    /// Without a sub-key the lookup is by id alone. A table that has not
    /// been provisioned yet holds no documents.
    pub async fn get(&self, key: impl Into<DocumentKey>) -> StoreResult<Option<Document>> {
        let key = resolve(key)?;
        self.registry.schema(key.table())?;

        let statement = Statement::Select {
            table: key.table().to_string(),
            id: key.id().to_string(),
            key: key.sub_key().map(str::to_string),
        };

        let rows = match self.connection.execute(&statement).await {
            Ok(rows) => rows,
            Err(err) if err.is_undefined_table() => Vec::new(),
            Err(err) => return Err(self.storage_failure(&key, err)),
        };

        let document = rows.into_iter().next();
        self.metrics.increment_gets(document.is_some());
        Logger::trace(
            Event::DocumentGet,
            &[
                ("key", key.to_string().as_str()),
                ("found", if document.is_some() { "true" } else { "false" }),
            ],
        );
        Ok(document)
    }

    /// Shallow-merge `partial` into the document at `key`.
    ///
    /// Top-level fields in `partial` replace the stored ones; other fields
    /// are kept. The merge runs as one statement on the server, so
    /// concurrent updates to disjoint fields do not overwrite each other.
    ///
    /// # Errors
    ///
    /// - `SchemaViolation` if a present declared field fails validation
    /// - `NotFound` if no live document exists at `key`
    pub async fn update(&self, key: impl Into<DocumentKey>, partial: Value) -> StoreResult<Document> {
        let key = resolve(key)?;
        self.validate(&key, &partial, false)?;

        let statement = Statement::Merge {
            table: key.table().to_string(),
            id: key.id().to_string(),
            key: key.sub_key().map(str::to_string),
            patch: partial,
        };

        let rows = match self.connection.execute(&statement).await {
            Ok(rows) => rows,
            Err(err) if err.is_undefined_table() => Vec::new(),
            Err(err) => return Err(self.storage_failure(&key, err)),
        };

        let document = rows
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;
        self.metrics.increment_updates();
        Logger::trace(Event::DocumentUpdate, &[("key", key.to_string().as_str())]);
        Ok(document)
    }

    /// Delete the document at `key`.
    ///
    /// Soft deletes stamp the row and hide it from reads; hard deletes
    /// remove it. Deleting nothing succeeds. Returns whether a document
    /// was deleted.
    pub async fn delete(
        &self,
        key: impl Into<DocumentKey>,
        options: DeleteOptions,
    ) -> StoreResult<bool> {
        let key = resolve(key)?;
        self.registry.schema(key.table())?;

        let table = key.table().to_string();
        let id = key.id().to_string();
        let sub_key = key.sub_key().map(str::to_string);
        let statement = if options.soft {
            Statement::SoftDelete {
                table,
                id,
                key: sub_key,
            }
        } else {
            Statement::Delete {
                table,
                id,
                key: sub_key,
            }
        };

        let rows = match self.connection.execute(&statement).await {
            Ok(rows) => rows,
            Err(err) if err.is_undefined_table() => Vec::new(),
            Err(err) => return Err(self.storage_failure(&key, err)),
        };

        self.metrics.increment_deletes();
        Logger::trace(
            Event::DocumentDelete,
            &[
                ("key", key.to_string().as_str()),
                ("soft", if options.soft { "true" } else { "false" }),
            ],
        );
        Ok(!rows.is_empty())
    }

    /// Registry lookup plus payload validation per the validation policy.
    fn validate(&self, key: &DocumentKey, value: &Value, full: bool) -> StoreResult<()> {
        let table = key.table();
        let result = match self.config.validation {
            ValidationMode::Strict if full => self.registry.validate_full(table, value),
            ValidationMode::Strict => self.registry.validate_partial(table, value),
            ValidationMode::Off => self.registry.schema(table).and_then(|_| {
                if value.is_object() {
                    Ok(())
                } else {
                    Err(SchemaError::violation(
                        table,
                        ViolationDetails::type_mismatch("$root", "object", "non-object"),
                    ))
                }
            }),
        };

        result.map_err(|err| {
            let err = StoreError::from(err);
            if let StoreError::SchemaViolation(violation) = &err {
                self.metrics.increment_rejected();
                Logger::info(
                    Event::DocumentRejected,
                    &[("key", key.to_string().as_str()), ("reason", violation.message())],
                );
            }
            err
        })
    }

    /// Fire-and-forget table creation after a write hit a missing table.
    fn spawn_provisioning(&self, table: &str) {
        let provisioner = Arc::clone(&self.provisioner);
        let table = table.to_string();

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let task = handle.spawn(async move {
                    // The table is gone even if an earlier ensure succeeded
                    provisioner.forget(&table).await;
                    provisioner.ensure(&table).await;
                });
                let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
                pending.retain(|task| !task.is_finished());
                pending.push(task);
            }
            Err(_) => {
                Logger::warn(
                    Event::ProvisionFailed,
                    &[("table", table.as_str()), ("reason", "no tokio runtime")],
                );
            }
        }
    }

    fn storage_failure(&self, key: &DocumentKey, err: EngineError) -> StoreError {
        self.metrics.increment_storage_errors();
        Logger::error(
            Event::StorageFailed,
            &[
                ("key", key.to_string().as_str()),
                ("code", err.code().unwrap_or("none")),
                ("reason", err.message()),
            ],
        );
        StoreError::Storage(err)
    }
}

fn resolve(key: impl Into<DocumentKey>) -> StoreResult<DocumentKey> {
    let key = key.into();
    key.validate()?;
    Ok(key)
}
