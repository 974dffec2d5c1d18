//! pgkv CLI entry point
//!
//! Parses arguments and runs one command. The JSON response is written by
//! the CLI module; this only maps failure to the exit status.

use pgkv::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
