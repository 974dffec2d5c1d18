//! CLI configuration file
//!
//! ```json
//! {
//!   "database_url": "postgres://kv:kv@localhost/kv",
//!   "schema_path": "./schemas.json",
//!   "max_connections": 5,
//!   "log_level": "warn",
//!   "store": { "validation": "strict", "provisioning": "lazy" }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::observability::Severity;
use crate::store::StoreConfig;

use super::errors::{CliError, CliResult};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// PostgreSQL connection string (required)
    pub database_url: String,

    /// Schema definition file (required)
    pub schema_path: PathBuf,

    /// Pool size (optional, default 5)
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Lowest severity written to the log (optional, default "warn")
    #[serde(default = "default_log_level")]
    pub log_level: Severity,

    /// Validation and provisioning policies
    #[serde(default)]
    pub store: StoreConfig,
}

fn default_max_connections() -> u32 {
    5
}

fn default_log_level() -> Severity {
    Severity::Warn
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let mut config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        // Relative schema paths are relative to the config file
        if config.schema_path.is_relative() {
            if let Some(dir) = path.parent() {
                config.schema_path = dir.join(&config.schema_path);
            }
        }

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.database_url.trim().is_empty() {
            return Err(CliError::config_error("database_url must not be empty"));
        }

        if self.max_connections == 0 {
            return Err(CliError::config_error("max_connections must be > 0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ProvisioningMode, ValidationMode};
    use serde_json::json;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, value: serde_json::Value) -> PathBuf {
        let path = dir.path().join("pgkv.json");
        fs::write(&path, value.to_string()).unwrap();
        path
    }

    #[test]
    fn test_defaults_applied() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            json!({
                "database_url": "postgres://localhost/kv",
                "schema_path": "schemas.json"
            }),
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.log_level, Severity::Warn);
        assert_eq!(config.store, StoreConfig::default());
        assert_eq!(config.schema_path, dir.path().join("schemas.json"));
    }

    #[test]
    fn test_store_policies_parsed() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            json!({
                "database_url": "postgres://localhost/kv",
                "schema_path": "/etc/pgkv/schemas.json",
                "log_level": "trace",
                "store": { "validation": "off", "provisioning": "eager" }
            }),
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(config.schema_path, PathBuf::from("/etc/pgkv/schemas.json"));
        assert_eq!(config.log_level, Severity::Trace);
        assert_eq!(config.store.validation, ValidationMode::Off);
        assert_eq!(config.store.provisioning, ProvisioningMode::Eager);
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let dir = TempDir::new().unwrap();

        let missing_url = write_config(&dir, json!({ "schema_path": "s.json" }));
        assert!(Config::load(&missing_url).is_err());

        let zero_pool = write_config(
            &dir,
            json!({
                "database_url": "postgres://localhost/kv",
                "schema_path": "s.json",
                "max_connections": 0
            }),
        );
        let err = Config::load(&zero_pool).unwrap_err();
        assert_eq!(err.code_str(), "KV_CLI_CONFIG_ERROR");

        assert!(Config::load(&dir.path().join("absent.json")).is_err());
    }
}
