//! hdb: helper CLI for remote HarperDB instances
//!
//! Wraps the local `harperdb` executable for lifecycle commands (deploy,
//! restart, run, dev) and forwards everything else to the instance's
//! operations API. Credentials and the target environment/instance are
//! managed per project directory.
//!
//! # Target resolution
//!
//! Before a command runs, the target is taken from, in order:
//!
//! 1. `HDB_ENV` + `HDB_INSTANCE` environment variables
//! 2. `--env` + `--instance` flags
//! 3. the saved default (`hdb config use`), with a 3 second window to change it
//! 4. an interactive pick
//!
//! Set `HDB_LOG=debug` for diagnostic logging.

mod args;
mod auto_confirm;
mod commands;
mod console;
mod prompt;
mod router;
mod signal_handler;

use clap::Parser;
use console::CliConsole;
use hdb_core::UnifiedError;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

pub use args::{Cli, Commands, ComponentsAction, ConfigAction};

/// Environment variable holding the log filter
const LOG_ENV: &str = "HDB_LOG";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = signal_handler::start_signal_handling() {
        tracing::warn!("Signal handling unavailable: {}", e);
    }

    let console = CliConsole::new(cli.verbose);
    match router::route(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_cancellation() => {
            console.warn(&e.message());
            ExitCode::from(e.exit_code())
        }
        Err(e) => {
            tracing::debug!("Command failed with {}: {:?}", e.error_code(), e);
            console.error(&e.to_string());
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
