//! Subtype-to-provider registry.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use refresh_engine::{Provider, ProviderFactory};

use crate::config::{load_providers, parse_providers, ProvidersConfig};
use crate::error::ConfigError;
use crate::http::FlexibleHttpProvider;

/// Providers by credential subtype. Lookup is exact: there is no default
/// provider.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn Provider>>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut subtypes: Vec<&String> = self.providers.keys().collect();
        subtypes.sort();
        f.debug_struct("ProviderRegistry")
            .field("subtypes", &subtypes)
            .finish()
    }
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build HTTP providers for every configured subtype.
    pub fn from_config(config: ProvidersConfig, http: reqwest::Client) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        for (subtype, spec) in config {
            let provider = FlexibleHttpProvider::new(subtype.clone(), spec, http.clone())?;
            registry.register(subtype, Arc::new(provider));
        }
        tracing::info!(providers = registry.len(), "provider registry loaded");
        Ok(registry)
    }

    pub fn from_yaml_str(yaml: &str, http: reqwest::Client) -> Result<Self, ConfigError> {
        Self::from_config(parse_providers(yaml)?, http)
    }

    pub fn from_file(path: &Path, http: reqwest::Client) -> Result<Self, ConfigError> {
        Self::from_config(load_providers(path)?, http)
    }

    /// Register or replace the provider for `subtype`.
    pub fn register(&mut self, subtype: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(subtype.into(), provider);
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl ProviderFactory for ProviderRegistry {
    fn resolve(&self, subtype: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(subtype).cloned()
    }
}
