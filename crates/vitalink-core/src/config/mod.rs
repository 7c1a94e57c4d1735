//! Gateway configuration

pub mod env_loader;

use std::time::Duration;

use crate::llm::provider_types::{ProviderEndpoint, ProviderKind};

pub use env_loader::{init_registry, load_breaker_config, load_from_env};

/// Configuration for the AI gateway
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Primary model, tried first on every request
    pub primary_model: ProviderEndpoint,
    /// Fallback models, tried in order when the primary fails
    pub fallback_models: Vec<ProviderEndpoint>,
    /// Whether completed responses are cached
    pub cache_enabled: bool,
    /// How long a cached response stays valid
    pub cache_ttl: Duration,
    /// Maximum cached responses before oldest eviction
    pub cache_max_entries: usize,
    /// Per-provider request deadline
    pub request_timeout: Duration,
    /// Whether the provider chain runs under a circuit breaker
    pub breaker_enabled: bool,
    /// Ollama server address
    pub ollama_base_url: String,
    /// Override for api.openai.com (compatible gateways)
    pub openai_base_url: Option<String>,
    /// Override for api.anthropic.com
    pub anthropic_base_url: Option<String>,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            primary_model: ProviderEndpoint::new(ProviderKind::Ollama, "llama3.2"),
            fallback_models: Vec::new(),
            cache_enabled: true,
            cache_ttl: Duration::from_secs(300),
            cache_max_entries: 100,
            request_timeout: Duration::from_secs(30),
            breaker_enabled: true,
            ollama_base_url: "http://localhost:11434".to_string(),
            openai_base_url: None,
            anthropic_base_url: None,
            openai_api_key: None,
            anthropic_api_key: None,
        }
    }
}

impl GatewayConfig {
    /// Set the primary model
    pub fn with_primary_model(mut self, model: ProviderEndpoint) -> Self {
        self.primary_model = model;
        self
    }

    /// Set the fallback models
    pub fn with_fallback_models(mut self, models: Vec<ProviderEndpoint>) -> Self {
        self.fallback_models = models;
        self
    }

    /// Enable or disable response caching
    pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    /// Set the cache TTL
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Set the per-provider request deadline
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Enable or disable circuit breaker protection
    pub fn with_breaker_enabled(mut self, enabled: bool) -> Self {
        self.breaker_enabled = enabled;
        self
    }

    /// Primary model followed by the fallbacks, in try order
    pub fn chain(&self) -> Vec<ProviderEndpoint> {
        let mut chain = Vec::with_capacity(1 + self.fallback_models.len());
        chain.push(self.primary_model.clone());
        chain.extend(self.fallback_models.iter().cloned());
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_starts_with_primary() {
        let config = GatewayConfig::default().with_fallback_models(vec![
            ProviderEndpoint::new(ProviderKind::OpenAI, "gpt-4o-mini"),
        ]);
        let chain = config.chain();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].kind, ProviderKind::Ollama);
        assert_eq!(chain[1].kind, ProviderKind::OpenAI);
    }
}
