//! LogDispatcher - logs reading sets via tracing

use std::sync::Arc;

use contracts::{ContractError, Dispatcher, InitError, ReadingSet, Settings};
use tracing::{info, instrument};

use crate::metrics::DispatchMetrics;

/// Dispatcher that logs every reading set
#[derive(Debug)]
pub struct LogDispatcher {
    name: String,
    metrics: Arc<DispatchMetrics>,
}

impl LogDispatcher {
    /// Registered type name
    pub const TYPE_NAME: &'static str = "log";

    /// Create a new LogDispatcher with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metrics: Arc::new(DispatchMetrics::new()),
        }
    }

    pub(crate) fn construct(
        name: &str,
        _init: &Settings,
    ) -> Result<Box<dyn Dispatcher>, InitError> {
        Ok(Box::new(Self::new(name)))
    }

    /// Shared counters
    pub fn metrics(&self) -> Arc<DispatchMetrics> {
        Arc::clone(&self.metrics)
    }
}

impl Dispatcher for LogDispatcher {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "log_dispatcher_add", skip(self, readings), fields(dispatcher = %self.name))]
    fn add(&mut self, readings: &ReadingSet) -> Result<(), ContractError> {
        for (node, fields) in readings.by_node() {
            info!(dispatcher = %self.name, node = %node, values = ?fields, "Reading set received");
        }
        self.metrics.inc_added();
        self.metrics.inc_flushed(1);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ContractError> {
        // Nothing is buffered
        Ok(())
    }

    fn apply_runtime_settings(&mut self, _runtime: &Settings) -> Result<(), ContractError> {
        Ok(())
    }
}
