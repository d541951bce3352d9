//! Application State

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chat_core::{ChatError, ProviderKind, Result, ToolCallLoop, ToolExecutor, ToolRegistry};
use chat_providers::{Provider, ProviderConfig};

use crate::config::ServerConfig;

/// A configured provider and the settings it was built from
pub struct ProviderSlot {
    pub config: ProviderConfig,
    pub provider: Arc<Provider>,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Tool loop over the shared, read-only registry
    pub tool_loop: Arc<ToolCallLoop>,

    /// Providers with credentials available
    pub providers: Arc<HashMap<ProviderKind, ProviderSlot>>,

    pub default_provider: ProviderKind,

    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(
        config: &ServerConfig,
        registry: ToolRegistry,
        provider_configs: Vec<ProviderConfig>,
    ) -> Result<Self> {
        let mut providers = HashMap::new();
        for provider_config in provider_configs {
            let provider = Provider::from_config(provider_config.clone())?;
            providers.insert(
                provider_config.kind,
                ProviderSlot {
                    config: provider_config,
                    provider: Arc::new(provider),
                },
            );
        }

        let executor = ToolExecutor::new(Arc::new(registry));

        Ok(Self {
            tool_loop: Arc::new(ToolCallLoop::new(executor, config.loop_config.clone())),
            providers: Arc::new(providers),
            default_provider: config.default_provider,
            request_timeout: config.request_timeout,
        })
    }

    /// Provider configurations found in the environment
    pub fn providers_from_env() -> Vec<ProviderConfig> {
        ProviderKind::ALL
            .into_iter()
            .filter_map(|kind| match ProviderConfig::from_env(kind) {
                Ok(config) => Some(config),
                Err(e) => {
                    tracing::debug!(provider = %kind, error = %e, "provider not configured");
                    None
                }
            })
            .collect()
    }

    /// Configured providers in a stable order
    pub fn configured(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|kind| self.providers.contains_key(kind))
            .collect()
    }

    /// Adapter for one request, honouring a per-request model override
    pub fn provider(&self, kind: ProviderKind, model: Option<&str>) -> Result<Arc<Provider>> {
        let slot = self
            .providers
            .get(&kind)
            .ok_or_else(|| ChatError::Config(format!("{kind} is not configured on this server")))?;

        match model.map(str::trim).filter(|m| !m.is_empty()) {
            Some(model) if model != slot.config.model => {
                let config = slot.config.clone().with_model(model);
                Ok(Arc::new(Provider::from_config(config)?))
            }
            _ => Ok(slot.provider.clone()),
        }
    }
}
