//! CLI argument definitions using clap
//!
//! Commands:
//! - pgkv set <table> <id> <json> [--sub-key <key>]
//! - pgkv get <table> <id> [--sub-key <key>]
//! - pgkv update <table> <id> <json> [--sub-key <key>]
//! - pgkv delete <table> <id> [--sub-key <key>] [--hard]
//! - pgkv provision <table>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// pgkv - schema-validated JSON documents on PostgreSQL
#[derive(Parser, Debug)]
#[command(name = "pgkv")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true, default_value = "./pgkv.json")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Store a new document
    Set {
        table: String,
        id: String,
        /// Document body as a JSON object
        value: String,
        #[arg(long)]
        sub_key: Option<String>,
    },

    /// Fetch a document
    Get {
        table: String,
        id: String,
        #[arg(long)]
        sub_key: Option<String>,
    },

    /// Merge fields into an existing document
    Update {
        table: String,
        id: String,
        /// Fields to overwrite, as a JSON object
        value: String,
        #[arg(long)]
        sub_key: Option<String>,
    },

    /// Delete a document
    Delete {
        table: String,
        id: String,
        #[arg(long)]
        sub_key: Option<String>,
        /// Remove the row instead of marking it deleted
        #[arg(long)]
        hard: bool,
    },

    /// Create the backing table for a registered schema
    Provision { table: String },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_set_with_sub_key() {
        let cli = Cli::try_parse_from([
            "pgkv", "--config", "/tmp/kv.json", "set", "users", "u1", "{}", "--sub-key", "home",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("/tmp/kv.json"));
        assert_eq!(
            cli.command,
            Command::Set {
                table: "users".into(),
                id: "u1".into(),
                value: "{}".into(),
                sub_key: Some("home".into()),
            }
        );
    }

    #[test]
    fn test_parse_delete_defaults_to_soft() {
        let cli = Cli::try_parse_from(["pgkv", "delete", "users", "u1"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("./pgkv.json"));
        assert!(matches!(cli.command, Command::Delete { hard: false, .. }));

        let cli = Cli::try_parse_from(["pgkv", "delete", "users", "u1", "--hard"]).unwrap();
        assert!(matches!(cli.command, Command::Delete { hard: true, .. }));
    }

    #[test]
    fn test_missing_arguments_rejected() {
        assert!(Cli::try_parse_from(["pgkv", "set", "users", "u1"]).is_err());
        assert!(Cli::try_parse_from(["pgkv", "provision"]).is_err());
    }
}
