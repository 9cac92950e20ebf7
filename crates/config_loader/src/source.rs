//! ConfigSource implementations
//!
//! - [`FileConfigSource`]: configuration file, reloaded when its modification time changes
//! - [`MemoryConfigSource`]: in-memory snapshot replaced through a [`MemoryConfigHandle`]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

use contracts::{ConfigSource, ContractError, HubConfiguration};
use tracing::{debug, error, info, instrument};

use crate::ConfigLoader;

/// Configuration file watched by modification time
///
/// A file that fails to read, parse or validate on reload is reported and
/// ignored: the previous snapshot stays in effect.
#[derive(Debug)]
pub struct FileConfigSource {
    path: PathBuf,
    settings: HubConfiguration,
    last_modified: Option<SystemTime>,
    console_log_override: Option<bool>,
}

impl FileConfigSource {
    /// Load the configuration file
    ///
    /// # Errors
    /// Any load error is returned: at startup an unreadable configuration is fatal.
    #[instrument(name = "file_config_source_open", skip_all)]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ContractError> {
        let path = path.as_ref().to_path_buf();
        let last_modified = modified_time(&path);
        let settings = ConfigLoader::load_from_path(&path)?;

        debug!(
            listeners = settings.listeners.len(),
            dispatchers = settings.dispatchers.len(),
            "configuration loaded"
        );

        Ok(Self {
            path,
            settings,
            last_modified,
            console_log_override: None,
        })
    }

    /// Path of the watched file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Force `hub.console_log`, now and on every later reload
    pub fn set_console_log(&mut self, console_log: bool) {
        self.console_log_override = Some(console_log);
        self.settings.hub.console_log = console_log;
    }

    fn reload(&mut self) -> Result<bool, ContractError> {
        let mut settings = ConfigLoader::load_from_path(&self.path)?;
        if let Some(console_log) = self.console_log_override {
            settings.hub.console_log = console_log;
        }

        if settings == self.settings {
            debug!("configuration file touched without changes");
            return Ok(false);
        }

        self.settings = settings;
        Ok(true)
    }
}

impl ConfigSource for FileConfigSource {
    fn current_settings(&self) -> &HubConfiguration {
        &self.settings
    }

    fn poll_for_changes(&mut self) -> bool {
        let modified = modified_time(&self.path);
        if modified == self.last_modified {
            return false;
        }
        self.last_modified = modified;

        match self.reload() {
            Ok(changed) => {
                if changed {
                    info!(path = %self.path.display(), "configuration changed");
                }
                changed
            }
            Err(e) => {
                error!(
                    path = %self.path.display(),
                    error = %e,
                    "couldn't get settings, keeping previous configuration"
                );
                false
            }
        }
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// In-memory configuration source
///
/// The initial snapshot counts as already applied; every
/// [`MemoryConfigHandle::replace`] is reported once by `poll_for_changes`.
#[derive(Debug)]
pub struct MemoryConfigSource {
    current: HubConfiguration,
    pending: Arc<Mutex<Option<HubConfiguration>>>,
}

/// Cloneable handle used to publish new snapshots to a [`MemoryConfigSource`]
#[derive(Debug, Clone)]
pub struct MemoryConfigHandle {
    pending: Arc<Mutex<Option<HubConfiguration>>>,
}

impl MemoryConfigSource {
    /// Create a source holding `initial`
    pub fn new(initial: HubConfiguration) -> Self {
        Self {
            current: initial,
            pending: Arc::new(Mutex::new(None)),
        }
    }

    /// Handle for publishing new snapshots
    pub fn handle(&self) -> MemoryConfigHandle {
        MemoryConfigHandle {
            pending: Arc::clone(&self.pending),
        }
    }
}

impl MemoryConfigHandle {
    /// Publish a new snapshot; the latest one wins if several are queued
    pub fn replace(&self, config: HubConfiguration) {
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = Some(config);
    }
}

impl ConfigSource for MemoryConfigSource {
    fn current_settings(&self) -> &HubConfiguration {
        &self.current
    }

    fn poll_for_changes(&mut self) -> bool {
        let next = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match next {
            Some(config) => {
                self.current = config;
                true
            }
            None => false,
        }
    }
}
