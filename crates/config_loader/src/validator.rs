//! Configuration validation
//!
//! Rules:
//! - listener and dispatcher names are not empty
//! - every component has a non-empty `type`
//! - `hub.loglevel` is a known level name
//!
//! Whether a `type` is actually registered is decided by the hub factories at
//! reconciliation time, not here.

use contracts::{ComponentSpec, ContractError, HubConfiguration, LogLevel};

/// Validate a HubConfiguration
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &HubConfiguration) -> Result<(), ContractError> {
    validate_loglevel(config)?;
    validate_components("listeners", &config.listeners)?;
    validate_components("dispatchers", &config.dispatchers)?;
    Ok(())
}

/// Validate the hub log level name
fn validate_loglevel(config: &HubConfiguration) -> Result<(), ContractError> {
    config.hub.loglevel.parse::<LogLevel>().map(|_| ())
}

/// Validate names and types of one component role
fn validate_components<'a>(
    role: &str,
    components: impl IntoIterator<Item = (&'a String, &'a ComponentSpec)>,
) -> Result<(), ContractError> {
    for (name, spec) in components {
        if name.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("{role}[\"{name}\"]"),
                "component name cannot be empty",
            ));
        }
        if spec.component_type.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("{role}.{name}.type"),
                "type cannot be empty",
            ));
        }
    }
    Ok(())
}
