//! Hub error types

use contracts::ContractError;
use thiserror::Error;

use crate::registry::Role;

/// Errors that stop the hub
///
/// Per-component construction failures are not represented here: the
/// reconciler logs them and retries on the next pass.
#[derive(Debug, Error)]
pub enum HubError {
    /// `type` names no registered implementation
    #[error("{role} '{name}': unknown type '{component_type}'")]
    UnknownType {
        role: Role,
        name: String,
        component_type: String,
    },

    /// A live component failed
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl HubError {
    pub(crate) fn unknown_type(role: Role, name: &str, component_type: &str) -> Self {
        Self::UnknownType {
            role,
            name: name.to_string(),
            component_type: component_type.to_string(),
        }
    }
}

/// Result type for hub operations
pub type Result<T> = std::result::Result<T, HubError>;
