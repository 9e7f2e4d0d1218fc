//! Injector error types
//!
//! Configuration errors (`DuplicateBinding`, `UnsupportedBinding`) abort
//! [`Injector::create`](crate::Injector::create). Everything else surfaces
//! from resolution, synchronously, to the caller of `get_instance`.

use thiserror::Error;

use crate::container::{ScopeKey, TypeKey};

/// Boxed error returned by providers and constructors
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used throughout the crate
pub type Result<T, E = InjectorError> = std::result::Result<T, E>;

/// Everything that can go wrong while configuring or resolving
///
/// # Example
///
/// ```rust
/// use weave::{Injector, InjectorError};
///
/// let result = Injector::create(|binder| {
///     binder.bind::<Vec<u8>>().to_instance(vec![1_u8]);
///     binder.bind::<Vec<u8>>().to_instance(vec![2_u8]);
/// });
///
/// assert!(matches!(result, Err(InjectorError::DuplicateBinding { .. })));
/// ```
#[derive(Debug, Error)]
pub enum InjectorError {
    /// Two bindings claim the same type in the same scope
    #[error("Binding for '{type_name}' already exists in scope {scope}")]
    DuplicateBinding {
        type_name: &'static str,
        scope: ScopeKey,
    },

    /// A binding that is neither a fixed instance nor a singleton
    #[error("Unsupported binding for '{type_name}' in scope {scope}: {reason}")]
    UnsupportedBinding {
        type_name: &'static str,
        scope: ScopeKey,
        reason: &'static str,
    },

    /// No binding anywhere and no registered constructor to fall back on
    #[error(
        "Type '{type_name}' was not bound for scope {scope} and has no public constructor. \
         Have you configured the injector correctly?"
    )]
    NotConstructible {
        type_name: &'static str,
        scope: ScopeKey,
    },

    /// No binding anywhere and implicit construction failed
    #[error(
        "Type '{type_name}' was not bound for scope {scope} and could not be constructed \
         implicitly. Have you configured the injector correctly?"
    )]
    Unresolved {
        type_name: &'static str,
        scope: ScopeKey,
        #[source]
        source: Box<InjectorError>,
    },

    /// A factory ran but produced nothing usable
    #[error("Factory for '{type_name}' in scope {scope} produced no instance")]
    NullResolution {
        type_name: &'static str,
        scope: ScopeKey,
    },

    /// A `dyn Resolver` handle outlived its injector
    #[error("Cannot resolve '{type_name}': the injector has been dropped")]
    Dropped { type_name: &'static str },

    /// A constructor, a provider, or one of their dependencies failed
    #[error("Failed to instantiate '{type_name}'")]
    Instantiation {
        type_name: &'static str,
        #[source]
        source: BoxError,
    },
}

impl InjectorError {
    pub fn duplicate_binding(key: TypeKey, scope: &ScopeKey) -> Self {
        Self::DuplicateBinding {
            type_name: key.name(),
            scope: scope.clone(),
        }
    }

    pub fn unsupported_binding(key: TypeKey, scope: &ScopeKey, reason: &'static str) -> Self {
        Self::UnsupportedBinding {
            type_name: key.name(),
            scope: scope.clone(),
            reason,
        }
    }

    pub fn not_constructible(key: TypeKey, scope: &ScopeKey) -> Self {
        Self::NotConstructible {
            type_name: key.name(),
            scope: scope.clone(),
        }
    }

    pub fn unresolved(key: TypeKey, scope: &ScopeKey, source: InjectorError) -> Self {
        Self::Unresolved {
            type_name: key.name(),
            scope: scope.clone(),
            source: Box::new(source),
        }
    }

    pub fn null_resolution(key: TypeKey, scope: &ScopeKey) -> Self {
        Self::NullResolution {
            type_name: key.name(),
            scope: scope.clone(),
        }
    }

    pub fn dropped(key: TypeKey) -> Self {
        Self::Dropped {
            type_name: key.name(),
        }
    }

    pub fn instantiation(key: TypeKey, source: impl Into<BoxError>) -> Self {
        Self::Instantiation {
            type_name: key.name(),
            source: source.into(),
        }
    }

    /// The type the failing operation was about
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::DuplicateBinding { type_name, .. }
            | Self::UnsupportedBinding { type_name, .. }
            | Self::NotConstructible { type_name, .. }
            | Self::Unresolved { type_name, .. }
            | Self::NullResolution { type_name, .. }
            | Self::Dropped { type_name }
            | Self::Instantiation { type_name, .. } => type_name,
        }
    }

    /// Whether the type could not be resolved at all
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Self::NotConstructible { .. } | Self::Unresolved { .. })
    }

    /// Whether this error can only come out of `Injector::create`
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::DuplicateBinding { .. } | Self::UnsupportedBinding { .. }
        )
    }
}
