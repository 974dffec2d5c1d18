//! Table provisioning
//!
//! A logical table has no backing structure until it is first needed.
//! `TableProvisioner::ensure` creates the table, its `(id, key)` uniqueness
//! constraint, the GIN index on `data` and the index on `key` inside one
//! transaction, so either all of them exist or none do.
//!
//! Provisioning runs off the failure path of the triggering call, so its
//! own failures are logged and swallowed rather than returned.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use tokio::sync::Mutex;

use crate::engine::{Connection, EngineError, Statement};
use crate::observability::{Event, Logger, MetricsRegistry};

/// Per-table flag: whether the table is known to exist. Held across
/// creation so concurrent callers for the same table wait instead of
/// racing.
type TableGuard = Arc<Mutex<bool>>;

/// Creates backing tables at most once per process.
#[derive(Debug)]
pub struct TableProvisioner {
    connection: Arc<dyn Connection>,
    metrics: Arc<MetricsRegistry>,
    /// One guard per table; provisioning one table never blocks another.
    guards: StdMutex<HashMap<String, TableGuard>>,
}

impl TableProvisioner {
    pub fn new(connection: Arc<dyn Connection>, metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            connection,
            metrics,
            guards: StdMutex::new(HashMap::new()),
        }
    }

    fn guard(&self, table: &str) -> TableGuard {
        let mut guards = self.guards.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(guards.entry(table.to_string()).or_default())
    }

    /// Idempotently create the backing structure for `table`.
    ///
    /// Returns whether the table is known to exist afterwards. Failures
    /// are logged, never raised.
    pub async fn ensure(&self, table: &str) -> bool {
        let guard = self.guard(table);
        let mut provisioned = guard.lock().await;
        if *provisioned {
            return true;
        }

        Logger::info(Event::ProvisionBegin, &[("table", table)]);

        match self.connection.transaction(&Statement::provision(table)).await {
            Ok(()) => {
                Logger::info(Event::ProvisionComplete, &[("table", table)]);
            }
            Err(err) if already_exists(&err) => {
                Logger::info(
                    Event::ProvisionComplete,
                    &[("table", table), ("note", "already exists")],
                );
            }
            Err(err) => {
                self.metrics.increment_provision_failures();
                let code = err.code().unwrap_or("none").to_string();
                Logger::warn(
                    Event::ProvisionFailed,
                    &[("table", table), ("code", code.as_str()), ("reason", err.message())],
                );
                return false;
            }
        }

        self.metrics.increment_provisions();
        *provisioned = true;
        true
    }

    /// Whether `ensure` has completed successfully for `table`.
    pub async fn is_provisioned(&self, table: &str) -> bool {
        *self.guard(table).lock().await
    }

    /// Drop `table` from the known set, e.g. after the engine reported it
    /// missing. The next `ensure` issues the DDL again.
    pub async fn forget(&self, table: &str) {
        *self.guard(table).lock().await = false;
    }
}

/// Racing `CREATE ... IF NOT EXISTS` statements can still trip over each
/// other in the catalog; any of these means another caller won.
fn already_exists(err: &EngineError) -> bool {
    err.is_already_exists() || err.is_unique_violation()
}
