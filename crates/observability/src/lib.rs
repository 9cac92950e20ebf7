//! # Observability
//!
//! Process-wide logging and hub metrics.
//!
//! ## Features
//!
//! - Logger created once at startup, writing either to stderr or to a
//!   size-bounded rotating file ([`LogTarget`])
//! - Runtime verbosity changes through [`LogLevelController`], without
//!   recreating the sink
//! - Hub metrics via the `metrics` facade, optional Prometheus exporter
//!
//! ## Example
//!
//! ```ignore
//! use observability::{init_logging, LogTarget};
//!
//! let mut logging = init_logging(&LogTarget::Console, LogLevel::Info)?;
//! // Only logs "Logging level set to DEBUG" when the level actually changes
//! logging.set_level(LogLevel::Debug);
//! ```

mod level;
pub mod metrics;
mod rotating;

use anyhow::{Context, Result};
use contracts::LogLevel;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, reload, util::SubscriberInitExt, Layer};

pub use crate::level::{level_filter, LevelSink, LogLevelController};
pub use crate::metrics::{
    record_component_init_failure, record_iteration, record_reading_set, record_reconcile,
    record_registry_sizes,
};
pub use crate::rotating::RotatingFileWriter;
pub use tracing_subscriber::filter::LevelFilter;

/// Size bound of the log file before it is rotated (5000 KiB)
pub const DEFAULT_MAX_LOG_BYTES: u64 = 5000 * 1024;

/// Number of rotated log files kept next to the active one
pub const DEFAULT_LOG_BACKUPS: usize = 1;

/// Where log lines go; fixed for the process lifetime
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Everything goes to stderr
    Console,
    /// Size-bounded rotating file
    File {
        path: PathBuf,
        max_bytes: u64,
        backups: usize,
    },
}

impl LogTarget {
    /// Rotating file target with the default bounds
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File {
            path: path.into(),
            max_bytes: DEFAULT_MAX_LOG_BYTES,
            backups: DEFAULT_LOG_BACKUPS,
        }
    }
}

/// Install the process-wide subscriber
///
/// Must be called once; the returned controller is the only way to change the
/// verbosity afterwards.
pub fn init_logging(target: &LogTarget, initial: LogLevel) -> Result<LogLevelController> {
    let (level_layer, handle) = reload::Layer::new(level_filter(initial));

    let (fmt_layer, file_writer) = match target {
        LogTarget::Console => (
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .boxed(),
            None,
        ),
        LogTarget::File {
            path,
            max_bytes,
            backups,
        } => {
            let writer = RotatingFileWriter::open(path, *max_bytes, *backups)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            (
                fmt::layer()
                    .with_writer(writer.clone())
                    .with_ansi(false)
                    .with_target(false)
                    .boxed(),
                Some(writer),
            )
        }
    };

    tracing_subscriber::registry()
        .with(level_layer)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    tracing::debug!(target = ?target, level = %initial, "Logging initialized");

    Ok(LogLevelController::new(Box::new(handle), initial).with_file_writer(file_writer))
}

/// Initialize the Prometheus exporter only
///
/// Must run inside a tokio runtime.
pub fn init_metrics_only(port: u16) -> Result<()> {
    let builder = PrometheusBuilder::new();
    builder
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .context("Failed to install Prometheus recorder")?;

    tracing::info!(port = port, "Prometheus metrics endpoint initialized");
    Ok(())
}
