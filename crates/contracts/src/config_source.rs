//! ConfigSource trait - desired state supplier

use crate::HubConfiguration;

/// Supplies the desired configuration and reports external changes
pub trait ConfigSource: Send {
    /// Latest accepted configuration snapshot
    fn current_settings(&self) -> &HubConfiguration;

    /// Check for external changes
    ///
    /// Returns true when [`ConfigSource::current_settings`] now holds a new
    /// snapshot that should be reconciled.
    fn poll_for_changes(&mut self) -> bool;
}
