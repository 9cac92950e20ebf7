//! # emonHub CLI
//!
//! Entry point: loads the configuration, then either prints it or runs the
//! hub until interrupted.

mod cli;
mod commands;
mod error;

use std::process::ExitCode;

use clap::Parser;
use config_loader::{ConfigSource, FileConfigSource};
use tracing::info;

use cli::Cli;
use error::{CliError, Result};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if cli.version {
        println!("emonHub {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    match execute(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "emonHub failed");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: &Cli) -> Result<()> {
    let source = open_config(cli)?;

    if cli.show_settings {
        return commands::show_settings(source.current_settings());
    }

    let stats = commands::run_hub(cli, source).await?;
    info!(%stats, "emonHub stopped");
    Ok(())
}

/// Load the configuration and inject `--console-log`
fn open_config(cli: &Cli) -> Result<FileConfigSource> {
    let path = &cli.config_file;
    if !path.is_file() {
        return Err(CliError::config_not_found(path.display().to_string()));
    }

    let mut source = FileConfigSource::open(path)
        .map_err(|e| CliError::config_invalid(path.display().to_string(), e))?;
    if cli.console_log {
        source.set_console_log(true);
    }
    Ok(source)
}
