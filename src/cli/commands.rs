//! CLI command implementations
//!
//! `run` loads the configuration, opens the store and executes one command.
//! The outcome is always reported as a single JSON object on stdout.
//! Background provisioning started by the command is awaited before the
//! process exits, so a retried `set` finds its table.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::engine::PostgresConnection;
use crate::key::DocumentKey;
use crate::observability::{Event, Logger};
use crate::schema::SchemaLoader;
use crate::store::{DeleteOptions, DocumentStore};

use super::args::{Cli, Command};
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{write_error, write_response};

/// Main entry point for CLI
pub async fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli).await
}

/// Run a parsed command line, reporting the outcome on stdout
pub async fn run_command(cli: Cli) -> CliResult<()> {
    let outcome = async {
        let store = open_store(&cli).await?;
        let result = execute(&store, cli.command.clone()).await;
        // A retryable set leaves table creation running in the background
        store.shutdown().await;
        result
    }
    .await;

    match outcome {
        Ok(data) => write_response(data),
        Err(err) => {
            write_error(err.code_str(), err.message())?;
            Err(err)
        }
    }
}

async fn open_store(cli: &Cli) -> CliResult<DocumentStore> {
    let config = Config::load(&cli.config)?;
    Logger::set_min_severity(config.log_level);

    let config_path = cli.config.display().to_string();
    Logger::info(Event::ConfigLoaded, &[("path", config_path.as_str())]);

    let registry = SchemaLoader::load(&config.schema_path)
        .map_err(|e| CliError::config_error(e.to_string()))?;
    let tables = registry.tables().join(",");
    Logger::info(Event::SchemasLoaded, &[("tables", tables.as_str())]);

    let connection = PostgresConnection::connect(&config.database_url, config.max_connections)
        .await
        .map_err(|e| CliError::connect_failed(e.to_string()))?;

    Ok(DocumentStore::new(
        Arc::new(registry),
        Arc::new(connection),
        config.store,
    ))
}

/// Execute one command against an open store.
///
/// Returns the `data` payload of the success response.
pub async fn execute(store: &DocumentStore, command: Command) -> CliResult<Value> {
    match command {
        Command::Set {
            table,
            id,
            value,
            sub_key,
        } => {
            let key = parse_key(&table, &id, sub_key.as_deref())?;
            let document = store.set(key, parse_value(&value)?).await?;
            Ok(serde_json::to_value(document)?)
        }
        Command::Get { table, id, sub_key } => {
            let key = parse_key(&table, &id, sub_key.as_deref())?;
            let document = store.get(key).await?;
            Ok(serde_json::to_value(document)?)
        }
        Command::Update {
            table,
            id,
            value,
            sub_key,
        } => {
            let key = parse_key(&table, &id, sub_key.as_deref())?;
            let document = store.update(key, parse_value(&value)?).await?;
            Ok(serde_json::to_value(document)?)
        }
        Command::Delete {
            table,
            id,
            sub_key,
            hard,
        } => {
            let key = parse_key(&table, &id, sub_key.as_deref())?;
            let options = if hard {
                DeleteOptions::hard()
            } else {
                DeleteOptions::soft()
            };
            let deleted = store.delete(key, options).await?;
            Ok(json!({ "deleted": deleted }))
        }
        Command::Provision { table } => {
            let provisioned = store.provision(&table).await?;
            Ok(json!({ "table": table, "provisioned": provisioned }))
        }
    }
}

fn parse_key(table: &str, id: &str, sub_key: Option<&str>) -> CliResult<DocumentKey> {
    let key = match sub_key {
        Some(sub_key) => DocumentKey::from_parts(&[table, id, sub_key]),
        None => DocumentKey::from_parts(&[table, id]),
    };
    key.map_err(|e| CliError::invalid_input(e.to_string()))
}

fn parse_value(raw: &str) -> CliResult<Value> {
    serde_json::from_str(raw)
        .map_err(|e| CliError::invalid_input(format!("value is not valid JSON: {}", e)))
}
