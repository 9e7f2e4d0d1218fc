//! Procedural macros for the weave injector
//!
//! This crate provides:
//! - `#[derive(Injectable)]` for structs assembled from `#[inject]` fields
//! - `#[injectable]` for impl blocks whose associated functions are the
//!   public constructors
//! - `#[service]` for traits resolved as trait objects

use proc_macro::TokenStream;

mod injectable;
mod service;

/// Derive a single constructor from the struct's fields
///
/// Fields marked `#[inject]` must be `Arc<T>` and are resolved from the
/// injector; every other field is filled with `Default::default()`.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use weave::Injectable;
///
/// #[derive(Injectable)]
/// pub struct Mailer {
///     #[inject]
///     transport: Arc<dyn Transport>,
///     sent: AtomicUsize,
/// }
/// ```
#[proc_macro_derive(Injectable, attributes(inject))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    injectable::derive_impl(input)
}

/// Expose the public constructors of an inherent impl block
///
/// Every `pub fn` without a receiver that returns `Self` (or
/// `Result<Self, E>`) becomes a constructor, in declaration order. Each
/// parameter must be an `Arc<T>`. Mark helpers with `#[injectable(skip)]`
/// to keep them out.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use weave::injectable;
///
/// pub struct Greeter {
///     config: Arc<Config>,
/// }
///
/// #[injectable]
/// impl Greeter {
///     pub fn new(config: Arc<Config>) -> Self {
///         Self { config }
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn injectable(attr: TokenStream, input: TokenStream) -> TokenStream {
    injectable::constructors_impl(attr, input)
}

/// Mark a trait as a service
///
/// Adds `Send + Sync + 'static` to its supertraits. Listing implementations
/// declares each of them usable as `dyn Trait`, so that
/// `bind::<dyn Trait>().to::<Impl>()` compiles.
///
/// # Example
///
/// ```rust,ignore
/// use weave::service;
///
/// #[service(RedisCache, MemoryCache)]
/// pub trait CacheStore {
///     fn get(&self, key: &str) -> Option<String>;
/// }
/// ```
#[proc_macro_attribute]
pub fn service(attr: TokenStream, input: TokenStream) -> TokenStream {
    service::service_impl(attr, input)
}
