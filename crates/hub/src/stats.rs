//! Hub run statistics

use std::fmt;
use std::time::{Duration, Instant};

/// Counters collected by the poll loop
#[derive(Debug, Clone)]
pub struct HubStats {
    /// Completed poll iterations
    pub iterations: u64,

    /// Reading sets received from listeners
    pub reading_sets: u64,

    /// Individual readings received from listeners
    pub readings: u64,

    /// Reconciliation passes, including the initial one
    pub reconciliations: u64,

    started: Instant,
}

impl HubStats {
    pub(crate) fn new() -> Self {
        Self {
            iterations: 0,
            reading_sets: 0,
            readings: 0,
            reconciliations: 0,
            started: Instant::now(),
        }
    }

    /// Time since the hub was opened
    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }
}

impl fmt::Display for HubStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} iterations, {} reading sets ({} readings), {} reconciliations in {:.1}s",
            self.iterations,
            self.reading_sets,
            self.readings,
            self.reconciliations,
            self.uptime().as_secs_f64()
        )
    }
}
