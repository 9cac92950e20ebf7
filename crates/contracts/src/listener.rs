//! Listener trait - hub input interface
//!
//! Listeners adapt an external data source (serial port, message bus,
//! socket...) into [`ReadingSet`]s. The hub drives every listener from a single
//! control thread, so each call is expected to return quickly: a blocking
//! call delays every other listener and every dispatcher flush.

use crate::{Constructor, ContractError, ReadingSet, Settings};

/// Input adapter
pub trait Listener: Send {
    /// Configured name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Advance internal state, e.g. maintain a connection or drain a socket
    fn run(&mut self) -> Result<(), ContractError>;

    /// Take the readings completed since the last call
    ///
    /// Returns `None` when no complete data is available.
    fn read(&mut self) -> Result<Option<ReadingSet>, ContractError>;

    /// Apply runtime settings
    ///
    /// Called on every reconciliation pass, must be idempotent.
    fn apply_runtime_settings(&mut self, settings: &Settings) -> Result<(), ContractError>;

    /// Release external resources
    fn close(&mut self) -> Result<(), ContractError>;
}

/// Constructor registered under a listener `type` name
///
/// Receives the configured name and the init settings.
pub type ListenerConstructor = Constructor<dyn Listener>;
