//! Store policies
//!
//! Both policies are explicit so a store never validates (or provisions)
//! by accident:
//! - `validation`: `strict` checks payloads against the table schema,
//!   `off` only requires a JSON object
//! - `provisioning`: `lazy` fails the first write to an absent table with
//!   a retryable error while the table is created in the background,
//!   `eager` creates the table before the first write and never fails it

use serde::{Deserialize, Serialize};

/// Payload validation policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    #[default]
    Strict,
    Off,
}

/// Table provisioning policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProvisioningMode {
    #[default]
    Lazy,
    Eager,
}

/// Document store configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub validation: ValidationMode,
    #[serde(default)]
    pub provisioning: ProvisioningMode,
}

impl StoreConfig {
    pub fn with_validation(mut self, validation: ValidationMode) -> Self {
        self.validation = validation;
        self
    }

    pub fn with_provisioning(mut self, provisioning: ProvisioningMode) -> Self {
        self.provisioning = provisioning;
        self
    }
}

/// Options for `DocumentStore::delete`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOptions {
    /// Stamp the row as deleted instead of removing it
    #[serde(default = "default_soft")]
    pub soft: bool,
}

fn default_soft() -> bool {
    true
}

impl Default for DeleteOptions {
    fn default() -> Self {
        Self {
            soft: default_soft(),
        }
    }
}

impl DeleteOptions {
    pub fn soft() -> Self {
        Self { soft: true }
    }

    pub fn hard() -> Self {
        Self { soft: false }
    }
}
