//! `--show-settings` implementation.

use config_loader::{ConfigLoader, HubConfiguration};

use crate::error::{CliError, Result};

/// Render the effective settings as TOML
pub fn render_settings(settings: &HubConfiguration) -> Result<String> {
    ConfigLoader::to_toml(settings).map_err(|e| CliError::config_invalid("<settings>", e))
}

/// Print the effective settings
pub fn show_settings(settings: &HubConfiguration) -> Result<()> {
    println!("{}", render_settings(settings)?);
    Ok(())
}
