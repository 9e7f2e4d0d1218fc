//! Factories installed in the scope maps
//!
//! One factory is created per binding while the injector is configured and
//! lives as long as the injector. Only singleton cells mutate afterwards.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::constructor::instantiate;
use super::instance::{Instance, Projection};
use super::key::{ScopeKey, TypeKey};
use super::provider::{ErasedProvider, ProviderContext};
use super::Injector;
use crate::error::{InjectorError, Result};

/// Produces the instance for a bound type; `None` means the factory ran but
/// had nothing to give
pub(crate) trait Factory: Send + Sync {
    fn get(&self, injector: &Injector) -> Result<Option<Instance>>;
}

/// Always hands out the same pre-built value
pub(crate) struct InstanceFactory {
    instance: Instance,
}

impl InstanceFactory {
    pub(crate) fn new(instance: Instance) -> Self {
        Self { instance }
    }
}

impl Factory for InstanceFactory {
    fn get(&self, _injector: &Injector) -> Result<Option<Instance>> {
        Ok(Some(self.instance.clone()))
    }
}

/// How a singleton cell gets filled
pub(crate) enum Provision {
    /// User-supplied provider closure
    Custom(ErasedProvider),
    /// Constructor injection of the binding's target type
    Construct { target: TypeKey },
}

/// Builds its value on first use, then returns that value forever
///
/// The lock is held while the provider runs, so concurrent first calls
/// wait and then observe the one value. A failed provider leaves the cell
/// empty and the next call tries again.
pub(crate) struct SingletonFactory {
    bound: TypeKey,
    scope: ScopeKey,
    provision: Provision,
    cell: Mutex<Option<Instance>>,
}

impl SingletonFactory {
    pub(crate) fn new(bound: TypeKey, scope: ScopeKey, provision: Provision) -> Self {
        Self {
            bound,
            scope,
            provision,
            cell: Mutex::new(None),
        }
    }

    fn provide(&self, injector: &Injector) -> Result<Option<Instance>> {
        match &self.provision {
            Provision::Custom(provider) => {
                let cx = ProviderContext::new(injector, &self.scope);
                provider(&cx).map_err(|e| InjectorError::instantiation(self.bound, e))
            }
            Provision::Construct { target } => instantiate(injector, *target, &self.scope).map(Some),
        }
    }
}

impl Factory for SingletonFactory {
    fn get(&self, injector: &Injector) -> Result<Option<Instance>> {
        let mut cell = self.cell.lock();
        if let Some(instance) = cell.as_ref() {
            return Ok(Some(instance.clone()));
        }

        match self.provide(injector) {
            Ok(Some(instance)) => {
                debug!(type_name = self.bound.name(), scope = %self.scope, "singleton created");
                *cell = Some(instance.clone());
                Ok(Some(instance))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                warn!(
                    type_name = self.bound.name(),
                    scope = %self.scope,
                    error = %e,
                    "singleton provider failed, will retry on next resolution"
                );
                Err(e)
            }
        }
    }
}

/// Views a shared singleton through another type (`bind::<A>().to::<C>()`)
pub(crate) struct AliasFactory {
    inner: Arc<SingletonFactory>,
    project: Projection,
}

impl AliasFactory {
    pub(crate) fn new(inner: Arc<SingletonFactory>, project: Projection) -> Self {
        Self { inner, project }
    }
}

impl Factory for AliasFactory {
    fn get(&self, injector: &Injector) -> Result<Option<Instance>> {
        Ok(self
            .inner
            .get(injector)?
            .and_then(|instance| (self.project)(&instance)))
    }
}

/// Hands out the injector itself
pub(crate) struct SelfFactory {
    view: fn(Arc<Injector>) -> Instance,
}

impl SelfFactory {
    pub(crate) fn new(view: fn(Arc<Injector>) -> Instance) -> Self {
        Self { view }
    }
}

impl Factory for SelfFactory {
    fn get(&self, injector: &Injector) -> Result<Option<Instance>> {
        Ok(injector.handle().map(self.view))
    }
}
