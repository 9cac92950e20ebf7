//! # Contracts
//!
//! Frozen interface contracts, defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Component model
//! - A [`Listener`] produces [`ReadingSet`]s from an external data source
//! - A [`Dispatcher`] accumulates reading sets and forwards them on `flush`
//! - A [`ConfigSource`] supplies the desired [`HubConfiguration`] and a change flag

mod config_source;
mod dispatcher;
mod error;
mod hub_config;
mod listener;
mod log_level;
mod reading;
pub mod settings;

pub use config_source::ConfigSource;
pub use dispatcher::{Dispatcher, DispatcherConstructor};
pub use error::*;
pub use hub_config::*;
pub use listener::{Listener, ListenerConstructor};
pub use log_level::LogLevel;
pub use reading::{Reading, ReadingSet};
pub use settings::{Constructor, Settings};
