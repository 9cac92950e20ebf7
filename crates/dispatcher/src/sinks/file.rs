//! FileDispatcher - appends reading sets to a file as JSON lines

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use contracts::{settings, ContractError, Dispatcher, InitError, ReadingSet, Settings};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::DispatcherError;
use crate::metrics::DispatchMetrics;

/// One line of output
#[derive(Serialize)]
struct Line<'a> {
    dispatcher: &'a str,
    readings: &'a ReadingSet,
}

/// Dispatcher that writes buffered reading sets to disk on flush
#[derive(Debug)]
pub struct FileDispatcher {
    name: String,
    path: PathBuf,
    file: File,
    pending: Vec<ReadingSet>,
    metrics: Arc<DispatchMetrics>,
}

impl FileDispatcher {
    /// Registered type name
    pub const TYPE_NAME: &'static str = "file";

    /// Open (or create) the output file in append mode
    pub fn open(name: impl Into<String>, path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            name: name.into(),
            path,
            file,
            pending: Vec::new(),
            metrics: Arc::new(DispatchMetrics::new()),
        })
    }

    /// Create from init settings (for factory)
    pub fn from_settings(name: &str, init: &Settings) -> Result<Self, InitError> {
        let path = settings::get_str(init, "path")
            .map_err(|e| InitError::from_contract(name, e))?
            .ok_or_else(|| InitError::new(name, "missing 'path' setting"))?;

        Self::open(name, path).map_err(|e| InitError::new(name, format!("cannot open '{path}': {e}")))
    }

    pub(crate) fn construct(
        name: &str,
        init: &Settings,
    ) -> Result<Box<dyn Dispatcher>, InitError> {
        Ok(Box::new(Self::from_settings(name, init)?))
    }

    /// Output file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Shared counters
    pub fn metrics(&self) -> Arc<DispatchMetrics> {
        Arc::clone(&self.metrics)
    }

    fn write_pending(&self) -> Result<usize, DispatcherError> {
        let mut writer = BufWriter::new(&self.file);
        for readings in &self.pending {
            let line = Line {
                dispatcher: &self.name,
                readings,
            };
            serde_json::to_writer(&mut writer, &line)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(self.pending.len())
    }
}

impl Dispatcher for FileDispatcher {
    fn name(&self) -> &str {
        &self.name
    }

    fn add(&mut self, readings: &ReadingSet) -> Result<(), ContractError> {
        self.pending.push(readings.clone());
        self.metrics.inc_added();
        Ok(())
    }

    #[instrument(name = "file_dispatcher_flush", skip(self), fields(dispatcher = %self.name))]
    fn flush(&mut self) -> Result<(), ContractError> {
        if self.pending.is_empty() {
            return Ok(());
        }

        match self.write_pending() {
            Ok(count) => {
                self.pending.clear();
                self.metrics.inc_flushed(count as u64);
                debug!(dispatcher = %self.name, count, "Reading sets written");
                Ok(())
            }
            Err(e) => {
                self.metrics.inc_failures();
                Err(e.into_contract(&self.name))
            }
        }
    }

    fn apply_runtime_settings(&mut self, _runtime: &Settings) -> Result<(), ContractError> {
        Ok(())
    }
}
