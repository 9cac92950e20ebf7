//! Reading - Listener output
//!
//! A reading is one `(node, field, value)` telemetry sample. Node and field
//! identifiers are opaque strings.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One telemetry sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Node identifier (e.g. "10")
    pub node: String,

    /// Field identifier (e.g. "power1")
    pub field: String,

    /// Sampled value
    pub value: f64,
}

impl Reading {
    /// Create a reading
    pub fn new(node: impl Into<String>, field: impl Into<String>, value: f64) -> Self {
        Self {
            node: node.into(),
            field: field.into(),
            value,
        }
    }
}

/// Readings produced by one listener poll
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReadingSet {
    readings: Vec<Reading>,
}

impl ReadingSet {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set holding exactly one reading
    pub fn single(node: impl Into<String>, field: impl Into<String>, value: f64) -> Self {
        Self {
            readings: vec![Reading::new(node, field, value)],
        }
    }

    /// Append a reading
    pub fn push(&mut self, reading: Reading) {
        self.readings.push(reading);
    }

    /// Number of readings
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// True when no readings are held
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Keep only the readings matching `keep`
    pub fn retain(&mut self, keep: impl FnMut(&Reading) -> bool) {
        self.readings.retain(keep);
    }

    /// Iterate over readings in production order
    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.readings.iter()
    }

    /// Group fields per node
    ///
    /// Nodes and fields keep their first-seen order; a repeated
    /// `(node, field)` keeps the last value.
    pub fn by_node(&self) -> IndexMap<&str, IndexMap<&str, f64>> {
        let mut grouped: IndexMap<&str, IndexMap<&str, f64>> = IndexMap::new();
        for reading in &self.readings {
            grouped
                .entry(reading.node.as_str())
                .or_default()
                .insert(reading.field.as_str(), reading.value);
        }
        grouped
    }
}

impl FromIterator<Reading> for ReadingSet {
    fn from_iter<I: IntoIterator<Item = Reading>>(iter: I) -> Self {
        Self {
            readings: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ReadingSet {
    type Item = &'a Reading;
    type IntoIter = std::slice::Iter<'a, Reading>;

    fn into_iter(self) -> Self::IntoIter {
        self.readings.iter()
    }
}
