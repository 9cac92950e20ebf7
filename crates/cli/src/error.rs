//! Error types for CLI operations.

use thiserror::Error;

/// Fatal errors, printed to stderr before exiting non-zero
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration could not be read or validated
    #[error("Invalid configuration file {path}: {message}")]
    ConfigInvalid { path: String, message: String },

    /// Hub construction failed
    #[error("Could not start emonHub: {message}")]
    Startup { message: String },

    /// The hub loop stopped on an error
    #[error("emonHub stopped: {message}")]
    Runtime { message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn config_invalid(path: impl Into<String>, message: impl ToString) -> Self {
        Self::ConfigInvalid {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn startup(message: impl ToString) -> Self {
        Self::Startup {
            message: message.to_string(),
        }
    }

    pub fn runtime(message: impl ToString) -> Self {
        Self::Runtime {
            message: message.to_string(),
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
