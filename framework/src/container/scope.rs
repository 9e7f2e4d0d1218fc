//! Scope registry: scope key -> type key -> factory

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::factory::Factory;
use super::key::{ScopeKey, TypeKey};
use crate::error::{InjectorError, Result};

type Factories = HashMap<TypeKey, Arc<dyn Factory>>;

/// Per-scope factory maps
///
/// Filled while the injector is configured and read-only afterwards, so
/// lookups need no locking. The default scope always exists.
pub(crate) struct ScopeRegistry {
    scopes: HashMap<ScopeKey, Factories>,
}

impl ScopeRegistry {
    pub(crate) fn new() -> Self {
        let mut scopes = HashMap::new();
        scopes.insert(ScopeKey::DEFAULT, Factories::new());
        Self { scopes }
    }

    /// Install `factory` under `key`, creating the scope on first use
    ///
    /// Fails when the key is already taken in that scope.
    pub(crate) fn install(
        &mut self,
        scope: &ScopeKey,
        key: TypeKey,
        factory: Arc<dyn Factory>,
    ) -> Result<()> {
        let factories = self.scopes.entry(scope.clone()).or_insert_with(|| {
            debug!(%scope, "scope created");
            Factories::new()
        });

        match factories.entry(key) {
            Entry::Occupied(_) => Err(InjectorError::duplicate_binding(key, scope)),
            Entry::Vacant(slot) => {
                slot.insert(factory);
                Ok(())
            }
        }
    }

    /// Factory for `key` in `scope`, falling back to the default scope
    pub(crate) fn lookup(&self, scope: &ScopeKey, key: &TypeKey) -> Option<&Arc<dyn Factory>> {
        self.scopes
            .get(scope)
            .and_then(|factories| factories.get(key))
            .or_else(|| self.scopes.get(&ScopeKey::DEFAULT)?.get(key))
    }

    /// Every scope with at least one binding, default first
    pub(crate) fn scope_keys(&self) -> Vec<ScopeKey> {
        let mut keys: Vec<ScopeKey> = self
            .scopes
            .keys()
            .filter(|key| !key.is_default())
            .cloned()
            .collect();
        keys.sort();
        keys.insert(0, ScopeKey::DEFAULT);
        keys
    }
}
