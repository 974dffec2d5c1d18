//! Operation counters for a document store
//!
//! - Counters only, monotonic
//! - Reset only when the store is built
//! - Lock-free, Relaxed ordering

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Per-store operation counters
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    sets: AtomicU64,
    gets: AtomicU64,
    get_misses: AtomicU64,
    updates: AtomicU64,
    deletes: AtomicU64,
    rejected: AtomicU64,
    retryable: AtomicU64,
    storage_errors: AtomicU64,
    provisions: AtomicU64,
    provision_failures: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_sets(&self) {
        self.sets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_gets(&self, hit: bool) {
        self.gets.fetch_add(1, Ordering::Relaxed);
        if !hit {
            self.get_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn increment_updates(&self) {
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_deletes(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    /// Payload rejected by schema validation
    pub fn increment_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_retryable(&self) {
        self.retryable.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_storage_errors(&self) {
        self.storage_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_provisions(&self) {
        self.provisions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_provision_failures(&self) {
        self.provision_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            sets: self.sets.load(Ordering::Relaxed),
            gets: self.gets.load(Ordering::Relaxed),
            get_misses: self.get_misses.load(Ordering::Relaxed),
            updates: self.updates.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            retryable: self.retryable.load(Ordering::Relaxed),
            storage_errors: self.storage_errors.load(Ordering::Relaxed),
            provisions: self.provisions.load(Ordering::Relaxed),
            provision_failures: self.provision_failures.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub sets: u64,
    pub gets: u64,
    pub get_misses: u64,
    pub updates: u64,
    pub deletes: u64,
    pub rejected: u64,
    pub retryable: u64,
    pub storage_errors: u64,
    pub provisions: u64,
    pub provision_failures: u64,
}
