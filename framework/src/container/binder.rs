//! Binding configuration
//!
//! A [`Binder`] collects bindings during one configuration pass. Nothing takes
//! effect until the pass completes and the injector reads them in order.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use weave::{implements, Binder, Injector};
//!
//! pub trait Clock: Send + Sync {
//!     fn now(&self) -> u64;
//! }
//!
//! #[derive(weave::Injectable)]
//! pub struct FixedClock;
//!
//! impl Clock for FixedClock {
//!     fn now(&self) -> u64 {
//!         42
//!     }
//! }
//!
//! implements!(FixedClock => dyn Clock);
//!
//! let injector = Injector::create(|binder: &mut Binder| {
//!     binder.bind::<dyn Clock>().to::<FixedClock>().as_singleton();
//!     binder.bind::<String>().to_instance("request-scoped".to_string());
//! })
//! .unwrap();
//!
//! let clock = injector.get_instance::<dyn Clock>().unwrap();
//! let concrete = injector.get_instance::<FixedClock>().unwrap();
//! assert_eq!(clock.now(), 42);
//! assert!(std::ptr::eq(
//!     Arc::as_ptr(&clock) as *const (),
//!     Arc::as_ptr(&concrete) as *const (),
//! ));
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use super::constructor::{ConstructorRegistry, Injectable};
use super::instance::{project, Implements, Instance, Projection};
use super::key::{ScopeKey, TypeKey};
use super::provider::{erase, ErasedProvider, IntoProvided, ProviderContext};

/// How one abstract type resolves, as configured
pub(crate) struct Binding {
    pub(crate) source: TypeKey,
    pub(crate) target: TypeKey,
    pub(crate) instance: Option<Instance>,
    /// Provider plus the type it produces
    pub(crate) provider: Option<(TypeKey, ErasedProvider)>,
    pub(crate) singleton: bool,
    pub(crate) scope: ScopeKey,
    /// Present when `target` differs from `source`
    pub(crate) project: Option<Projection>,
}

impl Binding {
    fn new(source: TypeKey) -> Self {
        Self {
            source,
            target: source,
            instance: None,
            provider: None,
            singleton: false,
            scope: ScopeKey::DEFAULT,
            project: None,
        }
    }
}

/// Ordered collection of bindings for one configuration pass
#[derive(Default)]
pub struct Binder {
    bindings: Vec<Binding>,
    constructors: ConstructorRegistry,
}

impl Binder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a binding for `T` in the default scope
    ///
    /// `T` may be a trait object (`dyn Trait`).
    pub fn bind<T: ?Sized + Send + Sync + 'static>(&mut self) -> BindingBuilder<'_, T> {
        self.bindings.push(Binding::new(TypeKey::of::<T>()));
        let index = self.bindings.len() - 1;
        BindingBuilder {
            binding: &mut self.bindings[index],
            _marker: PhantomData,
        }
    }

    /// Make `T` constructible by this injector even when it was not linked
    /// in through `inventory`
    pub fn register<T: Injectable>(&mut self) -> &mut Self {
        self.constructors.register::<T>();
        self
    }

    /// Let another module add its bindings here
    pub fn install<M: Module + ?Sized>(&mut self, module: &M) -> &mut Self {
        module.configure(self);
        self
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub(crate) fn into_parts(self) -> (Vec<Binding>, ConstructorRegistry) {
        (self.bindings, self.constructors)
    }
}

/// Chainable handle on the binding most recently started with [`Binder::bind`]
pub struct BindingBuilder<'a, T: ?Sized> {
    binding: &'a mut Binding,
    _marker: PhantomData<fn() -> Arc<T>>,
}

impl<'a, T: ?Sized + Send + Sync + 'static> BindingBuilder<'a, T> {
    /// Resolve `T` through a singleton of `C`; both `T` and `C` then resolve
    /// to the same object
    pub fn to<C: Implements<T>>(self) -> AliasBuilder<'a, T, C> {
        let target = TypeKey::of::<C>();
        self.binding.target = target;
        self.binding.project = if target == self.binding.source {
            None
        } else {
            Some(project::<T, C>)
        };
        AliasBuilder {
            binding: self.binding,
            _marker: PhantomData,
        }
    }

    /// Always resolve `T` to this value
    pub fn to_instance(self, instance: impl Into<Arc<T>>) {
        self.binding.instance = Some(Instance::new(instance.into()));
    }

    /// Build `T` with a custom provider instead of its constructor
    ///
    /// Only takes effect together with [`as_singleton`](Self::as_singleton).
    pub fn to_provider<F, R>(self, provider: F) -> Self
    where
        F: Fn(&ProviderContext<'_>) -> R + Send + Sync + 'static,
        R: IntoProvided<T>,
    {
        self.binding.provider = Some((TypeKey::of::<T>(), erase::<T, F, R>(provider)));
        self
    }

    /// Create one instance lazily and share it
    pub fn as_singleton(self) {
        self.binding.singleton = true;
    }

    /// Install the binding in `scope` instead of the default scope
    pub fn for_scope(self, scope: impl Into<ScopeKey>) -> Self {
        self.binding.scope = scope.into();
        self
    }
}

/// Builder for `bind::<T>().to::<C>()`
///
/// An alias always resolves through a singleton of `C`, so there is no
/// `to_instance` here:
///
/// ```compile_fail
/// use std::sync::Arc;
/// use weave::Injector;
///
/// Injector::create(|binder| {
///     binder.bind::<String>().to::<String>().to_instance("fixed".to_string());
/// });
/// ```
pub struct AliasBuilder<'a, T: ?Sized, C> {
    binding: &'a mut Binding,
    _marker: PhantomData<fn() -> (Arc<T>, Arc<C>)>,
}

impl<'a, T: ?Sized + Send + Sync + 'static, C: Implements<T>> AliasBuilder<'a, T, C> {
    /// Build the shared `C` with a custom provider
    pub fn to_provider<F, R>(self, provider: F) -> Self
    where
        F: Fn(&ProviderContext<'_>) -> R + Send + Sync + 'static,
        R: IntoProvided<C>,
    {
        self.binding.provider = Some((TypeKey::of::<C>(), erase::<C, F, R>(provider)));
        self
    }

    /// Create one `C` lazily and share it under both keys
    pub fn as_singleton(self) {
        self.binding.singleton = true;
    }

    /// Install the binding in `scope` instead of the default scope
    pub fn for_scope(self, scope: impl Into<ScopeKey>) -> Self {
        self.binding.scope = scope.into();
        self
    }
}

/// A reusable unit of configuration
///
/// # Example
/// ```rust
/// use weave::{Binder, Injector, Module};
///
/// struct Settings;
///
/// impl Module for Settings {
///     fn configure(&self, binder: &mut Binder) {
///         binder.bind::<u16>().to_instance(8080_u16);
///     }
/// }
///
/// let injector = Injector::create(|binder| {
///     binder.install(&Settings);
/// })
/// .unwrap();
/// assert_eq!(*injector.get_instance::<u16>().unwrap(), 8080);
/// ```
pub trait Module {
    fn configure(&self, binder: &mut Binder);
}

impl<F: Fn(&mut Binder)> Module for F {
    fn configure(&self, binder: &mut Binder) {
        self(binder)
    }
}
