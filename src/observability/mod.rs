//! Observability subsystem
//!
//! - Structured JSON logging (`Logger`)
//! - Typed lifecycle and operation events (`Event`)
//! - Per-store operation counters (`MetricsRegistry`)
//!
//! Observability is read-only: a logging or counting failure never
//! changes the outcome of a store operation.

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
