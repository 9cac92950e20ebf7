//! CLI argument definitions using clap.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// emonHub - telemetry gateway from listeners to dispatchers
#[derive(Parser, Debug)]
#[command(
    name = "emonhub",
    author,
    about = "OpenEnergyMonitor emonHub",
    long_about = "Collects readings from configured listeners and forwards them to \n\
                  configured dispatchers. The configuration file is watched and \n\
                  applied while running.",
    disable_version_flag = true
)]
pub struct Cli {
    /// Configuration file (TOML or JSON)
    #[arg(long, default_value = "emonhub.toml", env = "EMONHUB_CONFIG")]
    pub config_file: PathBuf,

    /// Log to STDERR instead of the configured logfile
    #[arg(long)]
    pub console_log: bool,

    /// Show settings and exit (for debugging purposes)
    #[arg(long)]
    pub show_settings: bool,

    /// Display version number and exit
    #[arg(long)]
    pub version: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "EMONHUB_METRICS_PORT")]
    pub metrics_port: u16,

    /// Sleep between hub iterations, in milliseconds
    #[arg(long, default_value = "200", env = "EMONHUB_POLL_INTERVAL_MS")]
    pub poll_interval_ms: u64,
}

impl Cli {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Metrics port, if enabled
    pub fn metrics_port(&self) -> Option<u16> {
        (self.metrics_port != 0).then_some(self.metrics_port)
    }
}
