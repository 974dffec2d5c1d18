//! Observable events of the document store
//!
//! Events are explicit and typed; their string form is the `event`
//! field of every log line.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    ConfigLoaded,
    SchemasLoaded,
    StoreOpen,

    // Document operations
    DocumentSet,
    DocumentGet,
    DocumentUpdate,
    DocumentDelete,
    /// Payload rejected by the table schema
    DocumentRejected,
    /// First write against an absent table, caller must retry
    DocumentRetryable,
    /// Backing engine failure surfaced to the caller
    StorageFailed,

    // Provisioning
    ProvisionBegin,
    ProvisionComplete,
    /// Provisioning failed; logged and swallowed
    ProvisionFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SchemasLoaded => "SCHEMAS_LOADED",
            Event::StoreOpen => "STORE_OPEN",

            Event::DocumentSet => "DOCUMENT_SET",
            Event::DocumentGet => "DOCUMENT_GET",
            Event::DocumentUpdate => "DOCUMENT_UPDATE",
            Event::DocumentDelete => "DOCUMENT_DELETE",
            Event::DocumentRejected => "DOCUMENT_REJECTED",
            Event::DocumentRetryable => "DOCUMENT_RETRYABLE",
            Event::StorageFailed => "STORAGE_FAILED",

            Event::ProvisionBegin => "PROVISION_BEGIN",
            Event::ProvisionComplete => "PROVISION_COMPLETE",
            Event::ProvisionFailed => "PROVISION_FAILED",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
