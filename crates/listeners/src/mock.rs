//! Mock listener
//!
//! Generates synthetic readings for testing and development without hardware.
//!
//! init settings:
//! - `node`: node identifier (default `"10"`)
//! - `fields`: field identifiers (default `["power1"]`)
//!
//! runtime settings:
//! - `interval_ms`: time between reading sets (default 1000)
//! - `value`: value of the first field, following fields count up from it (default 100.0)

use std::time::{Duration, Instant};

use contracts::{
    settings, ContractError, InitError, Listener, Reading, ReadingSet, Settings,
};
use tracing::{debug, trace};

const DEFAULT_NODE: &str = "10";
const DEFAULT_FIELD: &str = "power1";
const DEFAULT_INTERVAL_MS: u64 = 1000;
const DEFAULT_VALUE: f64 = 100.0;

/// Listener producing synthetic readings
#[derive(Debug)]
pub struct MockListener {
    name: String,
    node: String,
    fields: Vec<String>,
    interval: Duration,
    value: f64,
    last_emit: Option<Instant>,
    pending: Option<ReadingSet>,
    emitted: u64,
}

impl MockListener {
    /// Registered type name
    pub const TYPE_NAME: &'static str = "mock";

    /// Create a mock listener from init settings
    pub fn from_settings(name: &str, init: &Settings) -> Result<Self, InitError> {
        let node = settings::get_str(init, "node")
            .map_err(|e| InitError::from_contract(name, e))?
            .unwrap_or(DEFAULT_NODE)
            .to_string();
        let fields = settings::get_str_list(init, "fields")
            .map_err(|e| InitError::from_contract(name, e))?
            .unwrap_or_else(|| vec![DEFAULT_FIELD.to_string()]);

        if fields.is_empty() {
            return Err(InitError::new(name, "'fields' cannot be empty"));
        }

        Ok(Self {
            name: name.to_string(),
            node,
            fields,
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            value: DEFAULT_VALUE,
            last_emit: None,
            pending: None,
            emitted: 0,
        })
    }

    pub(crate) fn construct(
        name: &str,
        init: &Settings,
    ) -> Result<Box<dyn Listener>, InitError> {
        Ok(Box::new(Self::from_settings(name, init)?))
    }

    /// Interval between reading sets
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of reading sets generated so far
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    fn generate(&self) -> ReadingSet {
        self.fields
            .iter()
            .enumerate()
            .map(|(idx, field)| Reading::new(self.node.clone(), field.clone(), self.value + idx as f64))
            .collect()
    }

    fn is_due(&self, now: Instant) -> bool {
        self.last_emit
            .is_none_or(|last| now.duration_since(last) >= self.interval)
    }
}

impl Listener for MockListener {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&mut self) -> Result<(), ContractError> {
        let now = Instant::now();
        if self.is_due(now) {
            self.pending = Some(self.generate());
            self.last_emit = Some(now);
            self.emitted += 1;
            trace!(listener = %self.name, emitted = self.emitted, "mock readings generated");
        }
        Ok(())
    }

    fn read(&mut self) -> Result<Option<ReadingSet>, ContractError> {
        Ok(self.pending.take())
    }

    fn apply_runtime_settings(&mut self, runtime: &Settings) -> Result<(), ContractError> {
        let ms = settings::get_u64(runtime, "interval_ms")?.unwrap_or(DEFAULT_INTERVAL_MS);
        self.interval = Duration::from_millis(ms);
        self.value = settings::get_f64(runtime, "value")?.unwrap_or(DEFAULT_VALUE);
        Ok(())
    }

    fn close(&mut self) -> Result<(), ContractError> {
        self.pending = None;
        debug!(listener = %self.name, emitted = self.emitted, "MockListener closed");
        Ok(())
    }
}
