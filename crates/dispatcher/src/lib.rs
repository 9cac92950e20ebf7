//! # Dispatcher
//!
//! Built-in hub output adapters.
//!
//! - `log`: logs every reading set
//! - `file`: appends JSON lines to a file on flush
//! - `emoncms`: buffers reading sets and posts them to an emoncms server
//!
//! Every dispatcher receives each reading set through `add` and is flushed
//! once per hub iteration.

pub mod error;
pub mod metrics;
pub mod sinks;

pub use contracts::{Dispatcher, ReadingSet};
pub use error::DispatcherError;
pub use metrics::{DispatchMetrics, MetricsSnapshot};
pub use sinks::{EmoncmsDispatcher, FileDispatcher, LogDispatcher};

use contracts::DispatcherConstructor;

/// Type names and constructors of the built-in dispatchers
pub fn builtin() -> Vec<(&'static str, DispatcherConstructor)> {
    vec![
        (LogDispatcher::TYPE_NAME, LogDispatcher::construct as DispatcherConstructor),
        (FileDispatcher::TYPE_NAME, FileDispatcher::construct as DispatcherConstructor),
        (EmoncmsDispatcher::TYPE_NAME, EmoncmsDispatcher::construct as DispatcherConstructor),
    ]
}
