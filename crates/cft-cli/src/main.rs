//! cft-deploy CLI
//!
//! Validates, resolves and creates stacks described by declarative manifests.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use commands::Backend;
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug {
        Level::DEBUG
    } else if cli.error {
        Level::ERROR
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(cli.debug)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| CliError::user(format!("Failed to set tracing subscriber: {}", e)))?;
    tracing::debug!("Debug logging enabled");

    let backend = Backend::open(cli.stacks.as_deref(), cli.profile.as_deref())?;
    execute_command(cli.command, &backend)
}

fn execute_command(cmd: Commands, backend: &Backend) -> Result<()> {
    match cmd {
        Commands::Validate {
            manifest,
            parameters,
        } => commands::run_validate(backend, &manifest, &parameters),
        Commands::Resolve {
            manifest,
            parameters,
            json,
        } => commands::run_resolve(backend, &manifest, &parameters, json),
        Commands::Create {
            manifest,
            parameters,
        } => commands::run_create(backend, &manifest, &parameters),
        Commands::EstimateCost { manifest } => commands::run_estimate_cost(backend, &manifest),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_error_user() {
        let error = CliError::user("test error");
        assert_eq!(format!("{}", error), "test error");
    }

    #[test]
    fn test_core_error_is_transparent() {
        let error: CliError = cft_core::Error::ConflictingTemplateSource.into();
        assert_eq!(
            error.to_string(),
            cft_core::Error::ConflictingTemplateSource.to_string()
        );
    }
}
