//! Reconciler - converges live registries onto a desired configuration
//!
//! Per role, and independently of the other role:
//! 1. names missing from the registry are constructed from their `type`
//! 2. every desired name still present gets its runtime settings reapplied
//! 3. names no longer desired are retired (listeners are closed first)
//!
//! A construction failure leaves the name absent so the next pass retries it.
//! A persisting name whose `type` changed keeps its existing instance.

use contracts::{
    ComponentSpec, ContractError, Dispatcher, HubConfiguration, Listener, Settings,
};
use indexmap::IndexMap;
use observability::{record_component_init_failure, record_reconcile, LogLevelController};
use tracing::{error, info, instrument};

use crate::error::{HubError, Result};
use crate::factory::{ComponentFactory, Factories};
use crate::registry::{ComponentRegistry, Role};

/// Role-specific behaviour the reconciler needs from an instance
pub(crate) trait Managed {
    const ROLE: Role;

    fn apply_settings(&mut self, runtime: &Settings) -> std::result::Result<(), ContractError>;

    /// Release the instance before it is dropped
    fn retire(&mut self) -> std::result::Result<(), ContractError>;
}

impl Managed for dyn Listener {
    const ROLE: Role = Role::Listener;

    fn apply_settings(&mut self, runtime: &Settings) -> std::result::Result<(), ContractError> {
        self.apply_runtime_settings(runtime)
    }

    fn retire(&mut self) -> std::result::Result<(), ContractError> {
        self.close()
    }
}

impl Managed for dyn Dispatcher {
    const ROLE: Role = Role::Dispatcher;

    fn apply_settings(&mut self, runtime: &Settings) -> std::result::Result<(), ContractError> {
        self.apply_runtime_settings(runtime)
    }

    fn retire(&mut self) -> std::result::Result<(), ContractError> {
        Ok(())
    }
}

/// What a pass changed for one role
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleReport {
    /// Names constructed during the pass
    pub created: Vec<String>,
    /// Names whose construction failed
    pub failed: Vec<String>,
    /// Names retired during the pass
    pub removed: Vec<String>,
}

impl RoleReport {
    pub fn is_unchanged(&self) -> bool {
        self.created.is_empty() && self.failed.is_empty() && self.removed.is_empty()
    }
}

/// Outcome of one reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub listeners: RoleReport,
    pub dispatchers: RoleReport,
    /// Whether the log level changed
    pub level_changed: bool,
}

impl ReconcileReport {
    pub fn is_unchanged(&self) -> bool {
        self.listeners.is_unchanged() && self.dispatchers.is_unchanged() && !self.level_changed
    }
}

/// Applies desired configurations to the live registries
pub struct Reconciler<'a> {
    factories: &'a Factories,
}

impl<'a> Reconciler<'a> {
    pub fn new(factories: &'a Factories) -> Self {
        Self { factories }
    }

    /// Run one pass
    ///
    /// Order: log level, dispatchers, listeners.
    #[instrument(
        name = "hub_reconcile",
        skip_all,
        fields(listeners = desired.listeners.len(), dispatchers = desired.dispatchers.len())
    )]
    pub fn reconcile(
        &self,
        desired: &HubConfiguration,
        listeners: &mut ComponentRegistry<dyn Listener>,
        dispatchers: &mut ComponentRegistry<dyn Dispatcher>,
        logging: &mut LogLevelController,
    ) -> Result<ReconcileReport> {
        let level_changed = logging.set_level_by_name(&desired.hub.loglevel);

        let dispatchers = reconcile_role(&self.factories.dispatchers, &desired.dispatchers, dispatchers)?;
        let listeners = reconcile_role(&self.factories.listeners, &desired.listeners, listeners)?;

        record_reconcile();

        Ok(ReconcileReport {
            listeners,
            dispatchers,
            level_changed,
        })
    }
}

fn reconcile_role<T: Managed + ?Sized>(
    factory: &ComponentFactory<T>,
    desired: &IndexMap<String, ComponentSpec>,
    registry: &mut ComponentRegistry<T>,
) -> Result<RoleReport> {
    let role = T::ROLE;
    let mut report = RoleReport::default();

    for (name, spec) in desired {
        if !registry.contains(name) {
            let constructor = factory
                .get(&spec.component_type)
                .ok_or_else(|| HubError::unknown_type(role, name, &spec.component_type))?;

            info!("Creating {} '{}'", spec.component_type, name);
            match constructor(name, &spec.init_settings) {
                Ok(instance) => {
                    registry.insert(name.clone(), instance);
                    report.created.push(name.clone());
                }
                Err(e) => {
                    error!(role = %role, "{e}");
                    record_component_init_failure(role.as_str());
                    report.failed.push(name.clone());
                    continue;
                }
            }
        }

        if let Some(instance) = registry.get_mut(name) {
            instance.apply_settings(&spec.runtime_settings)?;
        }
    }

    let stale: Vec<String> = registry
        .names()
        .filter(|name| !desired.contains_key(*name))
        .map(str::to_string)
        .collect();

    for name in stale {
        if let Some(mut instance) = registry.remove(&name) {
            instance.retire()?;
            info!("Deleting {role} '{name}'");
            report.removed.push(name);
        }
    }

    Ok(report)
}
