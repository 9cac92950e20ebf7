//! HubConfiguration - ConfigSource output
//!
//! Desired state of the hub: hub-level settings plus the named listeners and
//! dispatchers that should be running.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::Settings;

/// Complete desired configuration snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HubConfiguration {
    /// Hub-level settings
    #[serde(default)]
    pub hub: HubSettings,

    /// Listener name -> specification
    #[serde(default)]
    pub listeners: IndexMap<String, ComponentSpec>,

    /// Dispatcher name -> specification
    #[serde(default)]
    pub dispatchers: IndexMap<String, ComponentSpec>,
}

/// Hub-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubSettings {
    /// Log level name (DEBUG|INFO|WARNING|ERROR|CRITICAL)
    #[serde(default = "default_loglevel")]
    pub loglevel: String,

    /// Log file used when not logging to the console
    #[serde(default)]
    pub logfile: Option<PathBuf>,

    /// Log to stderr instead of `logfile`
    #[serde(default)]
    pub console_log: bool,
}

fn default_loglevel() -> String {
    "INFO".to_string()
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            loglevel: default_loglevel(),
            logfile: None,
            console_log: false,
        }
    }
}

/// Specification of one listener or dispatcher
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentSpec {
    /// Registered implementation name
    #[serde(rename = "type")]
    pub component_type: String,

    /// Applied once, at construction
    #[serde(default)]
    pub init_settings: Settings,

    /// Re-applied on every reconciliation pass
    #[serde(default)]
    pub runtime_settings: Settings,
}

impl ComponentSpec {
    /// Spec with empty settings
    pub fn new(component_type: impl Into<String>) -> Self {
        Self {
            component_type: component_type.into(),
            init_settings: Settings::new(),
            runtime_settings: Settings::new(),
        }
    }

    /// Builder-style init settings
    pub fn with_init(mut self, init_settings: Settings) -> Self {
        self.init_settings = init_settings;
        self
    }

    /// Builder-style runtime settings
    pub fn with_runtime(mut self, runtime_settings: Settings) -> Self {
        self.runtime_settings = runtime_settings;
        self
    }
}

impl HubConfiguration {
    /// Add or replace a listener spec
    pub fn with_listener(mut self, name: impl Into<String>, spec: ComponentSpec) -> Self {
        self.listeners.insert(name.into(), spec);
        self
    }

    /// Add or replace a dispatcher spec
    pub fn with_dispatcher(mut self, name: impl Into<String>, spec: ComponentSpec) -> Self {
        self.dispatchers.insert(name.into(), spec);
        self
    }
}
