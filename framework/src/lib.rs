//! weave: a small object-graph composition engine
//!
//! Describe how abstract types map to implementations, then ask an
//! [`Injector`] for fully-assembled objects. Singletons are built lazily
//! and shared; named scopes partition the singleton cache and fall back to
//! the default scope for anything they do not bind themselves.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use weave::{injectable, service, Injector};
//!
//! #[service(Console)]
//! pub trait Output {
//!     fn write(&self, line: &str) -> String;
//! }
//!
//! #[derive(weave::Injectable)]
//! pub struct Console;
//!
//! impl Output for Console {
//!     fn write(&self, line: &str) -> String {
//!         format!("> {}", line)
//!     }
//! }
//!
//! pub struct Reporter {
//!     output: Arc<dyn Output>,
//! }
//!
//! #[injectable]
//! impl Reporter {
//!     pub fn new(output: Arc<dyn Output>) -> Self {
//!         Self { output }
//!     }
//! }
//!
//! let injector = Injector::create(|binder| {
//!     binder.bind::<dyn Output>().to::<Console>().as_singleton();
//! })
//! .unwrap();
//!
//! let reporter = injector.get_instance::<Reporter>().unwrap();
//! assert_eq!(reporter.output.write("ready"), "> ready");
//! ```

extern crate self as weave;

pub mod config;
pub mod container;
pub mod error;

pub use config::InjectorConfig;
pub use container::{
    AliasBuilder, Arguments, Binder, BindingBuilder, Constructor, ConstructorEntry, Implements,
    Injectable, Injector, Instance, InstanceRecord, IntoProvided, Module, ProviderContext, Resolver,
    ScopeKey, TypeKey,
};
pub use error::{BoxError, InjectorError, Result};

// Used by the code the macros generate
pub use inventory;

pub use weave_macros::{injectable, service, Injectable};
