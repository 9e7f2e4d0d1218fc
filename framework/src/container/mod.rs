//! The injector: binding registry and resolution engine
//!
//! This module provides:
//! - Instance bindings: a fixed value per type
//! - Singletons: built lazily, once, by constructor injection or a provider
//! - Aliases: bind a trait object to a concrete type sharing one singleton
//! - Scopes: named partitions of the singleton cache, with fallback to the
//!   default scope
//! - Implicit construction of unbound types that expose a constructor
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use weave::{injectable, Injector};
//!
//! pub struct Config {
//!     pub name: &'static str,
//! }
//!
//! pub struct Greeter {
//!     config: Arc<Config>,
//! }
//!
//! #[injectable]
//! impl Greeter {
//!     pub fn new(config: Arc<Config>) -> Self {
//!         Self { config }
//!     }
//! }
//!
//! let injector = Injector::create(|binder| {
//!     binder.bind::<Config>().to_instance(Config { name: "weave" });
//! })
//! .unwrap();
//!
//! // Greeter is not bound; it is built from its constructor
//! let greeter = injector.get_instance::<Greeter>().unwrap();
//! assert_eq!(greeter.config.name, "weave");
//! ```

pub mod binder;
pub mod constructor;
pub(crate) mod factory;
pub mod graph;
pub mod instance;
pub mod key;
pub mod provider;
pub(crate) mod scope;

pub use binder::{AliasBuilder, Binder, BindingBuilder, Module};
pub use constructor::{Arguments, Constructor, ConstructorEntry, Injectable};
pub use graph::InstanceRecord;
pub use instance::{Implements, Instance};
pub use key::{ScopeKey, TypeKey};
pub use provider::{IntoProvided, ProviderContext};

use std::sync::{Arc, Weak};

use tracing::{debug, trace};

use crate::config::InjectorConfig;
use crate::error::{InjectorError, Result};
use binder::Binding;
use constructor::ConstructorRegistry;
use factory::{AliasFactory, InstanceFactory, Provision, SelfFactory, SingletonFactory};
use graph::Recorder;
use scope::ScopeRegistry;

/// The injector as a dependency
///
/// Object-safe view of [`Injector`]. Resolving `dyn Resolver` yields a
/// handle that holds the injector weakly, so a singleton may keep it without
/// keeping the injector alive. Resolving `Injector` yields the injector
/// itself; a singleton holding that `Arc` forms a reference cycle and the
/// injector is never freed.
pub trait Resolver: Send + Sync {
    /// Resolve `key` in `scope`, type-erased
    fn resolve(&self, scope: &ScopeKey, key: TypeKey) -> Result<Instance>;

    /// Object-graph diagram lines; only the frame unless debug is on
    fn dump(&self) -> Vec<String>;
}

impl dyn Resolver {
    /// Resolve `T` in the default scope
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        self.get_in::<T>(ScopeKey::DEFAULT)
    }

    /// Resolve `T` in `scope`
    pub fn get_in<T: ?Sized + Send + Sync + 'static>(
        &self,
        scope: impl Into<ScopeKey>,
    ) -> Result<Arc<T>> {
        let scope = scope.into();
        let key = TypeKey::of::<T>();
        self.resolve(&scope, key)?
            .downcast::<T>()
            .ok_or_else(|| InjectorError::null_resolution(key, &scope))
    }
}

/// Resolution engine
///
/// Built once from a configuration pass, then shared (`Arc<Injector>`) and
/// queried from any thread. Binding topology never changes after creation;
/// only singleton cells fill in.
pub struct Injector {
    this: Weak<Injector>,
    resolver: Arc<dyn Resolver>,
    scopes: ScopeRegistry,
    constructors: ConstructorRegistry,
    recorder: Option<Recorder>,
}

impl Injector {
    /// Build an injector from a configuration closure
    ///
    /// Fails on the first invalid or duplicate binding.
    pub fn create<F>(configure: F) -> Result<Arc<Injector>>
    where
        F: FnOnce(&mut Binder),
    {
        Self::create_with(InjectorConfig::default(), configure)
    }

    /// Build an injector with explicit settings
    pub fn create_with<F>(config: InjectorConfig, configure: F) -> Result<Arc<Injector>>
    where
        F: FnOnce(&mut Binder),
    {
        let mut scopes = ScopeRegistry::new();
        scopes.install(
            &ScopeKey::DEFAULT,
            TypeKey::of::<Injector>(),
            Arc::new(SelfFactory::new(|injector| Instance::new(injector))),
        )?;
        scopes.install(
            &ScopeKey::DEFAULT,
            TypeKey::of::<dyn Resolver>(),
            Arc::new(SelfFactory::new(|injector| {
                Instance::new(injector.resolver.clone())
            })),
        )?;

        let mut binder = Binder::new();
        configure(&mut binder);
        let (bindings, constructors) = binder.into_parts();
        for binding in bindings {
            add_binding(&mut scopes, binding)?;
        }

        debug!(debug = config.debug, "injector created");
        Ok(Arc::new_cyclic(|this| Injector {
            this: this.clone(),
            resolver: Arc::new(ResolverHandle {
                injector: this.clone(),
            }),
            scopes,
            constructors,
            recorder: config.debug.then(Recorder::default),
        }))
    }

    /// Resolve `T` in the default scope
    pub fn get_instance<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        self.get_instance_in::<T>(ScopeKey::DEFAULT)
    }

    /// Resolve `T` in `scope`, falling back to the default scope
    pub fn get_instance_in<T: ?Sized + Send + Sync + 'static>(
        &self,
        scope: impl Into<ScopeKey>,
    ) -> Result<Arc<T>> {
        let scope = scope.into();
        let key = TypeKey::of::<T>();
        self.resolve(&scope, key)?
            .downcast::<T>()
            .ok_or_else(|| InjectorError::null_resolution(key, &scope))
    }

    /// Resolve `key` in `scope`, type-erased
    ///
    /// Explicit binding in `scope`, then in the default scope, then implicit
    /// construction through the type's first constructor.
    pub fn resolve(&self, scope: &ScopeKey, key: TypeKey) -> Result<Instance> {
        if let Some(factory) = self.scopes.lookup(scope, &key) {
            trace!(type_name = key.name(), %scope, "resolving bound type");
            let instance = factory
                .get(self)?
                .ok_or_else(|| InjectorError::null_resolution(key, scope))?;
            self.record(key, &instance, true);
            return Ok(instance);
        }

        if self.constructors.lookup(&key).is_some() {
            trace!(type_name = key.name(), %scope, "resolving unbound type implicitly");
            let instance = constructor::instantiate(self, key, scope)
                .map_err(|e| InjectorError::unresolved(key, scope, e))?;
            self.record(key, &instance, false);
            return Ok(instance);
        }

        Err(InjectorError::not_constructible(key, scope))
    }

    /// Whether `T` has an explicit binding visible from `scope`
    pub fn is_bound<T: ?Sized + 'static>(&self, scope: impl Into<ScopeKey>) -> bool {
        self.scopes.lookup(&scope.into(), &TypeKey::of::<T>()).is_some()
    }

    /// Scopes that received at least one binding, default first
    pub fn scopes(&self) -> Vec<ScopeKey> {
        self.scopes.scope_keys()
    }

    pub fn is_debug(&self) -> bool {
        self.recorder.is_some()
    }

    /// Everything resolved so far; empty unless debug is on
    pub fn records(&self) -> Vec<InstanceRecord> {
        self.recorder
            .as_ref()
            .map(Recorder::records)
            .unwrap_or_default()
    }

    /// Render the resolved object graph as PlantUML lines
    pub fn dump(&self) -> Vec<String> {
        graph::render(&self.records())
    }

    pub(crate) fn handle(&self) -> Option<Arc<Injector>> {
        self.this.upgrade()
    }

    pub(crate) fn constructors(&self) -> &ConstructorRegistry {
        &self.constructors
    }

    fn record(&self, requested: TypeKey, instance: &Instance, explicit: bool) {
        // Records keep their instance alive; the injector must not keep itself
        if instance.concrete_type() == TypeKey::of::<Injector>() {
            return;
        }
        if let Some(recorder) = &self.recorder {
            let dependencies = match self.constructors.lookup(&instance.concrete_type()) {
                Some([only]) => only.params().to_vec(),
                _ => Vec::new(),
            };
            recorder.record(requested, instance, explicit, dependencies);
        }
    }
}

impl Resolver for Injector {
    fn resolve(&self, scope: &ScopeKey, key: TypeKey) -> Result<Instance> {
        Injector::resolve(self, scope, key)
    }

    fn dump(&self) -> Vec<String> {
        Injector::dump(self)
    }
}

/// What `dyn Resolver` resolves to
struct ResolverHandle {
    injector: Weak<Injector>,
}

impl Resolver for ResolverHandle {
    fn resolve(&self, scope: &ScopeKey, key: TypeKey) -> Result<Instance> {
        self.injector
            .upgrade()
            .ok_or_else(|| InjectorError::dropped(key))?
            .resolve(scope, key)
    }

    fn dump(&self) -> Vec<String> {
        self.injector
            .upgrade()
            .map(|injector| injector.dump())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for Injector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Injector")
            .field("scopes", &self.scopes.scope_keys())
            .field("debug", &self.is_debug())
            .finish()
    }
}

/// Turn one configured binding into factories in its scope
fn add_binding(scopes: &mut ScopeRegistry, binding: Binding) -> Result<()> {
    let Binding {
        source,
        target,
        instance,
        provider,
        singleton,
        scope,
        project,
    } = binding;

    if let Some(instance) = instance {
        debug!(type_name = source.name(), %scope, "instance binding");
        return scopes.install(&scope, source, Arc::new(InstanceFactory::new(instance)));
    }

    if !singleton {
        return Err(InjectorError::unsupported_binding(
            source,
            &scope,
            "only instance and singleton bindings are supported",
        ));
    }

    let provision = match provider {
        Some((provides, _)) if provides != target => {
            return Err(InjectorError::unsupported_binding(
                source,
                &scope,
                "the provider does not produce the alias target; call to_provider after to",
            ))
        }
        Some((_, provider)) => Provision::Custom(provider),
        None => Provision::Construct { target },
    };

    debug!(
        type_name = source.name(),
        target = target.name(),
        %scope,
        "singleton binding"
    );
    let factory = Arc::new(SingletonFactory::new(source, scope.clone(), provision));
    match project {
        Some(project) => {
            scopes.install(&scope, source, Arc::new(AliasFactory::new(factory.clone(), project)))?;
            scopes.install(&scope, target, factory)
        }
        None => scopes.install(&scope, source, factory),
    }
}

#[cfg(test)]
mod tests;
