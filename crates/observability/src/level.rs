//! Runtime log level control

use anyhow::{anyhow, Result};
use contracts::LogLevel;
use tracing::{error, info};
use tracing_subscriber::{filter::LevelFilter, reload, Registry};

use crate::RotatingFileWriter;

/// Map a hub level onto a tracing filter
///
/// `CRITICAL` has no tracing counterpart and filters like `ERROR`.
pub fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Warning => LevelFilter::WARN,
        LogLevel::Error | LogLevel::Critical => LevelFilter::ERROR,
    }
}

/// Something whose verbosity filter can be swapped at runtime
pub trait LevelSink: Send {
    /// Replace the active filter
    fn apply(&self, filter: LevelFilter) -> Result<()>;
}

impl LevelSink for reload::Handle<LevelFilter, Registry> {
    fn apply(&self, filter: LevelFilter) -> Result<()> {
        self.reload(filter)
            .map_err(|e| anyhow!("failed to reload log filter: {e}"))
    }
}

/// Handle over the process-wide logger
///
/// Created once at startup and handed to the hub; the sink is never recreated,
/// only its filter is swapped.
pub struct LogLevelController {
    sink: Box<dyn LevelSink>,
    current: LogLevel,
    file_writer: Option<RotatingFileWriter>,
}

impl LogLevelController {
    /// Controller over `sink`, whose filter currently matches `initial`
    pub fn new(sink: Box<dyn LevelSink>, initial: LogLevel) -> Self {
        Self {
            sink,
            current: initial,
            file_writer: None,
        }
    }

    /// Controller that tracks the level without any subscriber behind it
    pub fn detached(initial: LogLevel) -> Self {
        Self::new(Box::new(DetachedSink), initial)
    }

    pub(crate) fn with_file_writer(mut self, file_writer: Option<RotatingFileWriter>) -> Self {
        self.file_writer = file_writer;
        self
    }

    /// Currently effective level
    pub fn current(&self) -> LogLevel {
        self.current
    }

    /// Change the level if it differs from the effective one
    ///
    /// Returns true when the filter was changed. Requesting the current level
    /// touches neither the sink nor the log.
    pub fn set_level(&mut self, level: LogLevel) -> bool {
        if level == self.current {
            return false;
        }

        if let Err(e) = self.sink.apply(level_filter(level)) {
            error!(error = %e, level = %level, "Could not change logging level");
            return false;
        }

        self.current = level;
        info!("Logging level set to {level}");
        true
    }

    /// Change the level from its configuration name
    ///
    /// An unknown name is logged and leaves the level unchanged.
    pub fn set_level_by_name(&mut self, name: &str) -> bool {
        match name.parse::<LogLevel>() {
            Ok(level) => self.set_level(level),
            Err(_) => {
                error!("Logging level {name} invalid");
                false
            }
        }
    }

    /// Flush and release the log file, if any
    pub fn shutdown(&mut self) {
        if let Some(writer) = self.file_writer.take() {
            if let Err(e) = writer.sync() {
                eprintln!("emonhub: failed to flush log file: {e}");
            }
        }
    }
}

impl std::fmt::Debug for LogLevelController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogLevelController")
            .field("current", &self.current)
            .field("file", &self.file_writer.as_ref().map(RotatingFileWriter::path))
            .finish()
    }
}

struct DetachedSink;

impl LevelSink for DetachedSink {
    fn apply(&self, _filter: LevelFilter) -> Result<()> {
        Ok(())
    }
}
