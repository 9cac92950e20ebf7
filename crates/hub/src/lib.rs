//! # Hub
//!
//! The orchestration core.
//!
//! - [`ComponentRegistry`]: live instances per role, keyed by name
//! - [`ComponentFactory`]: static `type` to constructor tables
//! - [`Reconciler`]: converges the registries onto the desired configuration
//! - [`Hub`]: the poll loop driving data from listeners to dispatchers
//! - [`ExitFlag`] / [`ShutdownController`]: signal-driven cooperative exit
//!
//! ```ignore
//! let factories = Factories::new(
//!     ListenerFactory::new().with_all(listeners::builtin()),
//!     DispatcherFactory::new().with_all(dispatcher::builtin()),
//! );
//! let mut hub = Hub::new(source, factories, logging, HubOptions::default())?;
//! hub.run()?;
//! hub.close()?;
//! ```

pub mod error;
pub mod factory;
mod hub;
pub mod reconcile;
pub mod registry;
pub mod shutdown;
mod stats;

pub use error::{HubError, Result};
pub use factory::{ComponentFactory, DispatcherFactory, Factories, ListenerFactory};
pub use hub::{Hub, HubOptions, DEFAULT_POLL_INTERVAL};
pub use reconcile::{ReconcileReport, Reconciler, RoleReport};
pub use registry::{ComponentRegistry, Role};
pub use shutdown::{ExitFlag, ShutdownController, ShutdownSignals};
pub use stats::HubStats;
