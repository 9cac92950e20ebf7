//! Hub - the poll loop
//!
//! One iteration:
//! 1. reconcile if the configuration source reports a change
//! 2. run and read every listener, fanning each reading set out to every dispatcher
//! 3. flush every dispatcher once
//! 4. sleep for the poll interval

use std::thread;
use std::time::Duration;

use contracts::{ConfigSource, Dispatcher, Listener};
use observability::{record_iteration, record_reading_set, record_registry_sizes, LogLevelController};
use tracing::{debug, error, info, instrument};

use crate::error::Result;
use crate::factory::Factories;
use crate::reconcile::{ReconcileReport, Reconciler};
use crate::registry::ComponentRegistry;
use crate::shutdown::ExitFlag;
use crate::stats::HubStats;

/// Default sleep between iterations
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Hub tuning
#[derive(Debug, Clone)]
pub struct HubOptions {
    /// Sleep at the end of every iteration
    pub poll_interval: Duration,
}

impl Default for HubOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Orchestrates listeners and dispatchers against a live configuration
pub struct Hub {
    source: Box<dyn ConfigSource>,
    factories: Factories,
    listeners: ComponentRegistry<dyn Listener>,
    dispatchers: ComponentRegistry<dyn Dispatcher>,
    logging: LogLevelController,
    options: HubOptions,
    exit: ExitFlag,
    stats: HubStats,
}

impl Hub {
    /// Open the hub and reconcile the initial configuration
    ///
    /// Fails on anything but a per-component construction error.
    #[instrument(name = "hub_open", skip_all)]
    pub fn new(
        source: Box<dyn ConfigSource>,
        factories: Factories,
        logging: LogLevelController,
        options: HubOptions,
    ) -> Result<Self> {
        info!("EmonHub {}", env!("CARGO_PKG_VERSION"));
        info!("Opening hub...");

        let mut hub = Self {
            source,
            factories,
            listeners: ComponentRegistry::new(),
            dispatchers: ComponentRegistry::new(),
            logging,
            options,
            exit: ExitFlag::new(),
            stats: HubStats::new(),
        };
        hub.reconcile()?;
        Ok(hub)
    }

    /// Share an externally owned exit flag, e.g. one a signal handler raises
    pub fn with_exit_flag(mut self, exit: ExitFlag) -> Self {
        self.exit = exit;
        self
    }

    /// Token that stops [`run`](Self::run) after the current iteration
    pub fn exit_flag(&self) -> ExitFlag {
        self.exit.clone()
    }

    pub fn stats(&self) -> &HubStats {
        &self.stats
    }

    pub fn listener_names(&self) -> Vec<String> {
        self.listeners.names().map(str::to_string).collect()
    }

    pub fn dispatcher_names(&self) -> Vec<String> {
        self.dispatchers.names().map(str::to_string).collect()
    }

    pub fn logging(&self) -> &LogLevelController {
        &self.logging
    }

    /// Apply the source's current configuration
    pub fn reconcile(&mut self) -> Result<ReconcileReport> {
        let desired = self.source.current_settings();
        let report = Reconciler::new(&self.factories).reconcile(
            desired,
            &mut self.listeners,
            &mut self.dispatchers,
            &mut self.logging,
        )?;

        self.stats.reconciliations += 1;
        record_registry_sizes(self.listeners.len(), self.dispatchers.len());
        if !report.is_unchanged() {
            debug!(?report, "Configuration reconciled");
        }
        Ok(report)
    }

    /// Execute exactly one iteration, without sleeping
    pub fn run_once(&mut self) -> Result<()> {
        if self.source.poll_for_changes() {
            self.reconcile()?;
        }

        for (name, listener) in self.listeners.iter_mut() {
            listener.run()?;
            let Some(readings) = listener.read()? else {
                continue;
            };

            record_reading_set(name, readings.len());
            self.stats.reading_sets += 1;
            self.stats.readings += readings.len() as u64;

            for (_, dispatcher) in self.dispatchers.iter_mut() {
                dispatcher.add(&readings)?;
            }
        }

        for (_, dispatcher) in self.dispatchers.iter_mut() {
            dispatcher.flush()?;
        }

        self.stats.iterations += 1;
        record_iteration();
        Ok(())
    }

    /// Iterate until the exit flag is raised
    ///
    /// The flag is checked before each iteration. Any component error ends the
    /// loop and is returned.
    pub fn run(&mut self) -> Result<()> {
        while !self.exit.is_requested() {
            self.run_once()?;
            if !self.options.poll_interval.is_zero() {
                thread::sleep(self.options.poll_interval);
            }
        }
        debug!(iterations = self.stats.iterations, "Exit requested");
        Ok(())
    }

    /// Close every listener in registry order, then release logging
    ///
    /// All listeners are closed even if one fails; the first failure is returned.
    pub fn close(mut self) -> Result<HubStats> {
        let mut first_error = None;
        for (name, listener) in self.listeners.iter_mut() {
            if let Err(e) = listener.close() {
                error!(listener = %name, error = %e, "Could not close listener");
                first_error.get_or_insert(e);
            }
        }

        info!(stats = %self.stats, "Exiting hub...");
        self.logging.shutdown();

        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(self.stats),
        }
    }
}
