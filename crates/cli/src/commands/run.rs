//! Hub run implementation.

use anyhow::Context;
use config_loader::{ConfigSource, FileConfigSource};
use contracts::{HubSettings, LogLevel};
use hub::{DispatcherFactory, ExitFlag, Factories, Hub, HubOptions, HubStats, ListenerFactory, ShutdownController};
use observability::{LogLevelController, LogTarget};
use tracing::{error, info};

use crate::cli::Cli;
use crate::error::{CliError, Result};

/// Every built-in listener and dispatcher type
pub fn builtin_factories() -> Factories {
    Factories::new(
        ListenerFactory::new().with_all(listeners::builtin()),
        DispatcherFactory::new().with_all(dispatcher::builtin()),
    )
}

/// Where logs go for these hub settings
pub fn log_target(settings: &HubSettings) -> Result<LogTarget> {
    if settings.console_log {
        return Ok(LogTarget::Console);
    }
    settings
        .logfile
        .as_ref()
        .map(LogTarget::file)
        .ok_or_else(|| CliError::startup("no logfile configured, set hub.logfile or use --console-log"))
}

fn init_logging(settings: &HubSettings) -> Result<LogLevelController> {
    let target = log_target(settings)?;
    let level: LogLevel = settings.loglevel.parse().map_err(CliError::startup)?;
    observability::init_logging(&target, level)
        .context("Failed to initialize logging")
        .map_err(|e| CliError::startup(format!("{e:#}")))
}

/// Run the hub until a shutdown signal, then close it
///
/// The hub is opened, driven and closed on a blocking thread; the async side
/// only listens for signals.
pub async fn run_hub(args: &Cli, source: FileConfigSource) -> Result<HubStats> {
    let logging = init_logging(&source.current_settings().hub)?;

    if let Some(port) = args.metrics_port() {
        observability::init_metrics_only(port)
            .map_err(|e| CliError::startup(format!("{e:#}")))?;
        info!("Metrics endpoint available on port {}", port);
    }

    let exit = ExitFlag::new();
    let shutdown = ShutdownController::install(exit.clone())?;
    let options = HubOptions {
        poll_interval: args.poll_interval(),
    };

    let outcome = tokio::task::spawn_blocking(move || -> Result<HubStats> {
        let mut hub = Hub::new(Box::new(source), builtin_factories(), logging, options)
            .map_err(CliError::startup)?
            .with_exit_flag(exit);

        if let Err(e) = hub.run() {
            error!(error = %e, "Hub stopped");
            return Err(CliError::runtime(e));
        }
        hub.close().map_err(CliError::runtime)
    })
    .await;

    shutdown.uninstall();

    match outcome {
        Ok(result) => result,
        Err(e) => Err(CliError::runtime(format!("hub thread failed: {e}"))),
    }
}
