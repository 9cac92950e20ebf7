//! Hub metrics
//!
//! Recorded through the `metrics` facade; without an installed recorder every
//! call is a no-op.

use metrics::{counter, gauge};

/// Record one completed poll iteration
pub fn record_iteration() {
    counter!("emonhub_iterations_total").increment(1);
}

/// Record a reading set produced by a listener
pub fn record_reading_set(listener: &str, readings: usize) {
    counter!(
        "emonhub_reading_sets_total",
        "listener" => listener.to_string()
    )
    .increment(1);
    counter!(
        "emonhub_readings_total",
        "listener" => listener.to_string()
    )
    .increment(readings as u64);
}

/// Record the live registry sizes
pub fn record_registry_sizes(listeners: usize, dispatchers: usize) {
    gauge!("emonhub_listeners_active").set(listeners as f64);
    gauge!("emonhub_dispatchers_active").set(dispatchers as f64);
}

/// Record a reconciliation pass
pub fn record_reconcile() {
    counter!("emonhub_reconcile_total").increment(1);
}

/// Record a component whose construction failed
pub fn record_component_init_failure(role: &str) {
    counter!(
        "emonhub_component_init_failures_total",
        "role" => role.to_string()
    )
    .increment(1);
}
