//! Document store
//!
//! Public entry point: `DocumentStore` performs set/get/update/delete on
//! composite-keyed JSON documents, validating payloads against the
//! registered schemas and provisioning backing tables on first use.

mod config;
mod document_store;
mod errors;

pub use config::{DeleteOptions, ProvisioningMode, StoreConfig, ValidationMode};
pub use document_store::DocumentStore;
pub use errors::{StoreError, StoreResult};
