use std::collections::BTreeMap;
use std::sync::Arc;

use pricefeed_core::{PollError, ProviderAdapter, ProviderKey};

/// Provider key to adapter table.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    adapters: BTreeMap<ProviderKey, Arc<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `adapter` under its key.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if the key is already taken; the existing
    /// adapter is kept.
    pub fn register(&mut self, adapter: Arc<dyn ProviderAdapter>) -> Result<(), PollError> {
        let key = adapter.key();
        if self.adapters.contains_key(&key) {
            return Err(PollError::InvalidConfig(format!(
                "duplicate provider key: {key}"
            )));
        }
        self.adapters.insert(key, adapter);
        Ok(())
    }

    /// Adapter registered as `api`.
    ///
    /// # Errors
    /// Returns `UnknownProvider` if nothing is registered under `api`.
    pub fn lookup(&self, api: &str) -> Result<Arc<dyn ProviderAdapter>, PollError> {
        self.adapters
            .iter()
            .find(|(k, _)| k.matches(api))
            .map(|(_, a)| Arc::clone(a))
            .ok_or_else(|| PollError::UnknownProvider(api.to_string()))
    }

    /// Whether `api` names a registered provider.
    #[must_use]
    pub fn contains(&self, api: &str) -> bool {
        self.adapters.keys().any(|k| k.matches(api))
    }

    /// Registered keys in order.
    pub fn keys(&self) -> impl Iterator<Item = ProviderKey> + '_ {
        self.adapters.keys().copied()
    }

    /// Registered adapters ordered by key.
    pub fn adapters(&self) -> impl Iterator<Item = &Arc<dyn ProviderAdapter>> {
        self.adapters.values()
    }

    /// Number of providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Whether no provider is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.adapters.keys()).finish()
    }
}
