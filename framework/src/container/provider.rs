//! Providers: custom construction logic for a binding
//!
//! A provider is a closure that receives a [`ProviderContext`] and returns
//! the instance. It may return any of:
//! - `Arc<T>`
//! - `Option<Arc<T>>`, where `None` means "nothing produced"
//! - `Result<Arc<T>, E>` or `Result<Option<Arc<T>>, E>` for fallible setup
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use weave::Injector;
//!
//! let injector = Injector::create(|binder| {
//!     binder.bind::<u16>().to_instance(8080_u16);
//!     binder
//!         .bind::<String>()
//!         .to_provider(|cx| -> Result<Arc<String>, weave::InjectorError> {
//!             let port = cx.get::<u16>()?;
//!             Ok(Arc::new(format!("127.0.0.1:{}", port)))
//!         })
//!         .as_singleton();
//! })
//! .unwrap();
//!
//! assert_eq!(*injector.get_instance::<String>().unwrap(), "127.0.0.1:8080");
//! ```

use std::sync::Arc;

use super::instance::Instance;
use super::key::{ScopeKey, TypeKey};
use super::Injector;
use crate::error::{BoxError, InjectorError, Result};

/// What a provider sees while it runs
pub struct ProviderContext<'a> {
    injector: &'a Injector,
    scope: &'a ScopeKey,
}

impl<'a> ProviderContext<'a> {
    pub(crate) fn new(injector: &'a Injector, scope: &'a ScopeKey) -> Self {
        Self { injector, scope }
    }

    pub fn injector(&self) -> &'a Injector {
        self.injector
    }

    /// Scope of the binding being provided
    pub fn scope(&self) -> &'a ScopeKey {
        self.scope
    }

    /// Resolve a dependency in the binding's scope
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        let instance = self.injector.resolve(self.scope, TypeKey::of::<T>())?;
        instance
            .downcast::<T>()
            .ok_or_else(|| InjectorError::null_resolution(TypeKey::of::<T>(), self.scope))
    }
}

/// Values a provider closure may return
pub trait IntoProvided<T: ?Sized> {
    fn into_provided(self) -> std::result::Result<Option<Arc<T>>, BoxError>;
}

impl<T: ?Sized> IntoProvided<T> for Arc<T> {
    fn into_provided(self) -> std::result::Result<Option<Arc<T>>, BoxError> {
        Ok(Some(self))
    }
}

impl<T: ?Sized> IntoProvided<T> for Option<Arc<T>> {
    fn into_provided(self) -> std::result::Result<Option<Arc<T>>, BoxError> {
        Ok(self)
    }
}

impl<T: ?Sized, E: Into<BoxError>> IntoProvided<T> for std::result::Result<Arc<T>, E> {
    fn into_provided(self) -> std::result::Result<Option<Arc<T>>, BoxError> {
        self.map(Some).map_err(Into::into)
    }
}

impl<T: ?Sized, E: Into<BoxError>> IntoProvided<T> for std::result::Result<Option<Arc<T>>, E> {
    fn into_provided(self) -> std::result::Result<Option<Arc<T>>, BoxError> {
        self.map_err(Into::into)
    }
}

/// Provider with its output type erased
pub(crate) type ErasedProvider = Arc<
    dyn Fn(&ProviderContext<'_>) -> std::result::Result<Option<Instance>, BoxError> + Send + Sync,
>;

pub(crate) fn erase<T, F, R>(provider: F) -> ErasedProvider
where
    T: ?Sized + Send + Sync + 'static,
    F: Fn(&ProviderContext<'_>) -> R + Send + Sync + 'static,
    R: IntoProvided<T>,
{
    Arc::new(move |cx: &ProviderContext<'_>| {
        provider(cx)
            .into_provided()
            .map(|provided| provided.map(Instance::new))
    })
}
