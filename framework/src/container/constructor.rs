//! Constructor descriptors and implicit construction
//!
//! Rust has no runtime reflection, so every constructible type describes its
//! public constructors up front: an ordered list of parameter types plus a
//! function that builds the value from resolved arguments. Descriptors come
//! from `#[injectable]` / `#[derive(Injectable)]`, which register them with
//! `inventory` at link time, or from [`Binder::register`](super::Binder::register).

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use tracing::trace;

use super::instance::Instance;
use super::key::{ScopeKey, TypeKey};
use super::Injector;
use crate::error::{BoxError, InjectorError, Result};

type Invoke = Arc<dyn Fn(&mut Arguments) -> std::result::Result<Instance, BoxError> + Send + Sync>;

/// One public constructor of a type
#[derive(Clone)]
pub struct Constructor {
    name: &'static str,
    params: Vec<TypeKey>,
    invoke: Invoke,
}

impl Constructor {
    /// Describe a constructor producing `T`
    ///
    /// `build` pulls its arguments from [`Arguments`] in the same order as
    /// `params`.
    ///
    /// # Example
    /// ```rust
    /// use std::sync::Arc;
    /// use weave::{Constructor, TypeKey};
    ///
    /// struct Greeting(Arc<String>);
    ///
    /// let ctor = Constructor::new::<Greeting, _>(
    ///     "Greeting::new",
    ///     vec![TypeKey::of::<String>()],
    ///     |args| Ok(Greeting(args.next::<String>()?)),
    /// );
    /// assert_eq!(ctor.params().len(), 1);
    /// ```
    pub fn new<T, F>(name: &'static str, params: Vec<TypeKey>, build: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&mut Arguments) -> std::result::Result<T, BoxError> + Send + Sync + 'static,
    {
        Self {
            name,
            params,
            invoke: Arc::new(move |args: &mut Arguments| {
                build(args).map(|value| Instance::new(Arc::new(value)))
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn params(&self) -> &[TypeKey] {
        &self.params
    }

    fn invoke(&self, target: TypeKey, values: Vec<Instance>) -> std::result::Result<Instance, BoxError> {
        let mut args = Arguments {
            target,
            values: values.into_iter(),
            position: 0,
        };
        (self.invoke)(&mut args)
    }
}

impl std::fmt::Debug for Constructor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Constructor")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish()
    }
}

/// Resolved constructor arguments, consumed in parameter order
pub struct Arguments {
    target: TypeKey,
    values: std::vec::IntoIter<Instance>,
    position: usize,
}

impl Arguments {
    /// Take the next argument as an `Arc<T>`
    pub fn next<T: ?Sized + Send + Sync + 'static>(&mut self) -> std::result::Result<Arc<T>, BoxError> {
        let position = self.position;
        self.position += 1;

        let value = self.values.next().ok_or_else(|| {
            format!("Missing argument #{} for '{}'", position, self.target)
        })?;

        value.downcast::<T>().ok_or_else(|| {
            format!(
                "Argument #{} for '{}' is not a '{}'",
                position,
                self.target,
                std::any::type_name::<T>()
            )
            .into()
        })
    }
}

/// A type the injector can build from its constructors
///
/// Usually derived: see `#[injectable]` and `#[derive(Injectable)]`.
pub trait Injectable: Send + Sync + 'static {
    /// Public constructors in declaration order; the first one is used
    fn constructors() -> Vec<Constructor>;
}

/// Link-time registration record emitted by the injectable macros
pub struct ConstructorEntry {
    pub key: fn() -> TypeKey,
    pub constructors: fn() -> Vec<Constructor>,
}

impl ConstructorEntry {
    pub const fn of<T: Injectable>() -> Self {
        Self {
            key: TypeKey::of::<T>,
            constructors: T::constructors,
        }
    }
}

inventory::collect!(ConstructorEntry);

/// Descriptors from every `ConstructorEntry` linked into the binary
fn linked() -> &'static HashMap<TypeKey, Vec<Constructor>> {
    static LINKED: OnceLock<HashMap<TypeKey, Vec<Constructor>>> = OnceLock::new();

    LINKED.get_or_init(|| {
        let mut registry: HashMap<TypeKey, Vec<Constructor>> = HashMap::new();
        for entry in inventory::iter::<ConstructorEntry> {
            registry
                .entry((entry.key)())
                .or_default()
                .extend((entry.constructors)());
        }
        registry
    })
}

/// Constructor lookup for one injector: its own registrations first, then
/// the link-time ones
#[derive(Default)]
pub(crate) struct ConstructorRegistry {
    local: HashMap<TypeKey, Vec<Constructor>>,
}

impl ConstructorRegistry {
    pub(crate) fn register<T: Injectable>(&mut self) {
        self.local.insert(TypeKey::of::<T>(), T::constructors());
    }

    /// Constructors of `key`, `None` when it has no public constructor
    pub(crate) fn lookup(&self, key: &TypeKey) -> Option<&[Constructor]> {
        self.local
            .get(key)
            .or_else(|| linked().get(key))
            .map(Vec::as_slice)
            .filter(|constructors| !constructors.is_empty())
    }
}

/// Build `target` with its first declared constructor, resolving every
/// parameter through `injector` in `scope`
///
/// Multiple constructors are not disambiguated.
pub(crate) fn instantiate(injector: &Injector, target: TypeKey, scope: &ScopeKey) -> Result<Instance> {
    let constructor = injector
        .constructors()
        .lookup(&target)
        .and_then(|constructors| constructors.first())
        .ok_or_else(|| InjectorError::instantiation(target, "no public constructor registered"))?;

    trace!(
        type_name = target.name(),
        constructor = constructor.name(),
        %scope,
        "instantiating"
    );

    let mut values = Vec::with_capacity(constructor.params().len());
    for param in constructor.params() {
        let value = injector
            .resolve(scope, *param)
            .map_err(|e| InjectorError::instantiation(target, e))?;
        values.push(value);
    }

    constructor
        .invoke(target, values)
        .map_err(|e| InjectorError::instantiation(target, e))
}
