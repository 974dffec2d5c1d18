//! CLI module for pgkv
//!
//! One-shot commands against the document store:
//! - set / get / update / delete: document operations
//! - provision: create a table ahead of the first write

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{execute, run, run_command};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
