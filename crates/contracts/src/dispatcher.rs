//! Dispatcher trait - hub output interface
//!
//! Dispatchers accumulate reading sets with [`Dispatcher::add`] and forward
//! them to their sink on [`Dispatcher::flush`], which the hub calls exactly
//! once per poll iteration. There is no close capability: a dispatcher is
//! simply dropped when it leaves the configuration.

use crate::{Constructor, ContractError, ReadingSet, Settings};

/// Output adapter
pub trait Dispatcher: Send {
    /// Configured name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Queue a reading set
    fn add(&mut self, readings: &ReadingSet) -> Result<(), ContractError>;

    /// Forward queued data to the sink
    fn flush(&mut self) -> Result<(), ContractError>;

    /// Apply runtime settings
    ///
    /// Called on every reconciliation pass, must be idempotent.
    fn apply_runtime_settings(&mut self, settings: &Settings) -> Result<(), ContractError>;
}

/// Constructor registered under a dispatcher `type` name
///
/// Receives the configured name and the init settings.
pub type DispatcherConstructor = Constructor<dyn Dispatcher>;
