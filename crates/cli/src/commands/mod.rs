//! Command implementations.

mod run;
mod show;

pub use run::run_hub;
pub use show::show_settings;
