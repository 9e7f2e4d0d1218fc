//! Type-erased instances and the upcasting capability used by aliases

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use super::key::TypeKey;

/// A resolved object, type-erased
///
/// Holds an `Arc<T>` for some possibly unsized `T`. Two instances are the
/// same object when they point at the same allocation, so an `Arc<Concrete>`
/// and the `Arc<dyn Abstract>` upcast from it compare equal.
#[derive(Clone)]
pub struct Instance {
    value: Arc<dyn Any + Send + Sync>,
    address: usize,
    concrete: TypeKey,
}

impl Instance {
    pub fn new<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        let address = Arc::as_ptr(&value) as *const () as usize;
        Self {
            value: Arc::new(value),
            address,
            concrete: TypeKey::of::<T>(),
        }
    }

    /// Recover the typed handle, `None` when the instance holds another type
    pub fn downcast<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.value.downcast_ref::<Arc<T>>().cloned()
    }

    /// The type the object was created as, before any upcast
    pub fn concrete_type(&self) -> TypeKey {
        self.concrete
    }

    pub fn same_as(&self, other: &Instance) -> bool {
        self.address == other.address
    }

    /// Keep the original concrete type when re-wrapping an upcast view
    pub(crate) fn with_concrete(mut self, concrete: TypeKey) -> Self {
        self.concrete = concrete;
        self
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type", &self.concrete.name())
            .field("address", &format_args!("{:#x}", self.address))
            .finish()
    }
}

/// `Self` can stand in for `A`
///
/// Required by `bind::<A>().to::<C>()`. Every sized type implements itself;
/// trait-object upcasts are declared with [`implements!`](crate::implements)
/// or the `#[service(...)]` attribute.
pub trait Implements<A: ?Sized>: Send + Sync + 'static {
    fn upcast(this: Arc<Self>) -> Arc<A>;
}

impl<T: Send + Sync + 'static> Implements<T> for T {
    fn upcast(this: Arc<Self>) -> Arc<T> {
        this
    }
}

/// Signature of the view installed under an alias key
pub(crate) type Projection = fn(&Instance) -> Option<Instance>;

/// View an instance of `C` as an `A`
pub(crate) fn project<A, C>(instance: &Instance) -> Option<Instance>
where
    A: ?Sized + Send + Sync + 'static,
    C: Implements<A>,
{
    instance
        .downcast::<C>()
        .map(|concrete| Instance::new(<C as Implements<A>>::upcast(concrete)))
        .map(|view| view.with_concrete(instance.concrete_type()))
}

/// Declare that a concrete type implements one or more trait objects
///
/// # Example
/// ```rust
/// use weave::implements;
///
/// pub trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// pub struct English;
///
/// impl Greeter for English {
///     fn greet(&self) -> String {
///         "hello".into()
///     }
/// }
///
/// implements!(English => dyn Greeter);
/// ```
#[macro_export]
macro_rules! implements {
    ($concrete:ty => $($abstract:ty),+ $(,)?) => {
        $(
            impl $crate::Implements<$abstract> for $concrete {
                fn upcast(this: ::std::sync::Arc<Self>) -> ::std::sync::Arc<$abstract> {
                    this
                }
            }
        )+
    };
}
