//! Layered error definitions
//!
//! Categorized by source: config / settings / listener / dispatcher

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    /// A settings entry has the wrong shape
    #[error("invalid setting '{key}': {message}")]
    InvalidSetting { key: String, message: String },

    // ===== Component Errors =====
    /// Listener failed while running or reading
    #[error("listener '{listener}' error: {message}")]
    Listener { listener: String, message: String },

    /// Dispatcher failed while adding or flushing
    #[error("dispatcher '{dispatcher}' error: {message}")]
    Dispatcher { dispatcher: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create invalid setting error
    pub fn invalid_setting(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSetting {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create listener error
    pub fn listener(listener: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Listener {
            listener: listener.into(),
            message: message.into(),
        }
    }

    /// Create dispatcher error
    pub fn dispatcher(dispatcher: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Dispatcher {
            dispatcher: dispatcher.into(),
            message: message.into(),
        }
    }
}

/// Construction failure of a single listener or dispatcher.
///
/// This is the only failure the reconciler absorbs: the component is left out
/// of its registry and construction is retried on the next pass.
#[derive(Debug, Error)]
#[error("failed to initialise '{name}': {message}")]
pub struct InitError {
    /// Configured component name
    pub name: String,
    /// Human readable cause
    pub message: String,
}

impl InitError {
    /// Create a construction failure for `name`
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Wrap a settings or IO error raised while constructing `name`
    pub fn from_contract(name: impl Into<String>, err: ContractError) -> Self {
        Self::new(name, err.to_string())
    }
}
