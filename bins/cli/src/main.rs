//! CLI binary entrypoint.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use error::CliError;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "notesync",
    version,
    about = "Markdown note synchronization CLI",
    long_about = None
)]
struct Cli {
    /// Config file path (JSON or TOML). Env overrides always apply on top.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit debug-level structured logs on stderr.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one interactive synchronization sweep.
    Sync,
    /// Report reconciliation state without changing anything.
    Status,
    /// Show build and configuration details.
    Info,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    tracing::debug!(command = ?cli.command, "parsed command line");

    let result = match cli.command {
        Commands::Sync => commands::sync::run(cli.config.as_deref(), cli.verbose).await,
        Commands::Status => commands::status::run(cli.config.as_deref(), cli.verbose).await,
        Commands::Info => commands::info::run(cli.config.as_deref()),
    };

    match result {
        Ok(code) => std::process::ExitCode::from(code.as_u8()),
        Err(error) => exit_with_error(&error),
    }
}

fn exit_with_error(error: &CliError) -> std::process::ExitCode {
    let _ = writeln!(io::stderr(), "error: {error}");
    std::process::ExitCode::from(error.exit_code().as_u8())
}

/// Route library-level traces (reqwest, tokio) to stderr; application events
/// go through the JSON logger instead.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}
