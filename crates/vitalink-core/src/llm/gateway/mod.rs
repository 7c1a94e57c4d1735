//! Provider gateway: cache, circuit breaker and fallback chain
//!
//! Request flow for a synchronous chat:
//! cache lookup, then the circuit breaker admitting one pass over the
//! provider chain, then cache fill. Streaming requests go to the primary
//! provider only and degrade to a single-chunk stream when it cannot
//! serve them.

pub mod insights;


use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::cache::ResponseCache;
use crate::config::GatewayConfig;
use crate::error::{VitalinkError, VitalinkResult};
use crate::llm::messages::{ChatMessage, ChatResponse};
use crate::llm::provider_types::{ProviderEndpoint, ProviderKind};
use crate::llm::providers::{
    AnthropicProvider, ChatProvider, OllamaProvider, OpenAIProvider, ProviderInstance,
};
use crate::llm::streaming::{ChatStream, single_chunk_stream};
use crate::recovery::circuit_breaker::{
    CircuitBreaker, CircuitBreakerRegistry, CircuitBreakerStats, dependency,
};

/// AI gateway over an ordered provider chain
#[derive(Debug)]
pub struct ProviderGateway {
    chain: Vec<ProviderInstance>,
    cache: Option<ResponseCache>,
    breaker: Option<Arc<CircuitBreaker>>,
    call_timeout: Duration,
}

impl ProviderGateway {
    /// Create a gateway over an ordered chain; the first provider is the
    /// primary. No cache and no breaker until configured.
    pub fn new(chain: Vec<ProviderInstance>) -> Self {
        Self {
            chain,
            cache: None,
            breaker: None,
            call_timeout: Duration::from_secs(30),
        }
    }

    /// Attach a response cache
    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Attach a circuit breaker guarding the whole chain
    pub fn with_breaker(mut self, breaker: Arc<CircuitBreaker>) -> Self {
        self.breaker = Some(breaker);
        self
    }

    /// Set the per-provider deadline
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Build a gateway from configuration, taking its breaker from the
    /// shared registry.
    pub fn from_config(
        config: &GatewayConfig,
        registry: &CircuitBreakerRegistry,
    ) -> VitalinkResult<Self> {
        let http_client = Client::builder().timeout(config.request_timeout).build()?;

        let mut chain = Vec::new();
        for endpoint in config.chain() {
            chain.push(build_provider(&endpoint, config, http_client.clone())?);
        }

        let mut gateway = Self::new(chain).with_call_timeout(config.request_timeout);
        if config.cache_enabled {
            gateway = gateway.with_cache(ResponseCache::new(
                config.cache_ttl,
                config.cache_max_entries,
            ));
        }
        if config.breaker_enabled {
            gateway = gateway.with_breaker(registry.get(dependency::AI));
        }
        Ok(gateway)
    }

    /// Name of the primary provider
    pub fn provider_name(&self) -> &str {
        self.chain.first().map(|p| p.name()).unwrap_or("none")
    }

    /// Model the primary provider serves
    pub fn model_name(&self) -> &str {
        self.chain.first().map(|p| p.model()).unwrap_or("none")
    }

    /// Breaker statistics, if a breaker is attached
    pub fn breaker_stats(&self) -> Option<CircuitBreakerStats> {
        self.breaker.as_ref().map(|b| b.stats())
    }

    /// Drop all cached responses
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
        }
    }

    /// Whether any provider in the chain is reachable
    pub async fn is_available(&self) -> bool {
        for provider in &self.chain {
            if provider.is_available().await {
                return true;
            }
        }
        false
    }

    /// Synchronous chat through cache, breaker and fallback chain
    pub async fn chat_sync(&self, messages: &[ChatMessage]) -> VitalinkResult<ChatResponse> {
        let cache_key = self.cache.as_ref().map(|cache| {
            let key = ResponseCache::cache_key(messages);
            if let Some(hit) = cache.get(&key) {
                if let Ok(response) = serde_json::from_str::<ChatResponse>(&hit) {
                    tracing::debug!(provider = %response.provider, "cache hit");
                    return (key, Some(response));
                }
            }
            (key, None)
        });
        if let Some((_, Some(response))) = &cache_key {
            return Ok(response.clone());
        }

        let response = match &self.breaker {
            Some(breaker) => breaker.execute(|| self.try_chain(messages)).await?,
            None => self.try_chain(messages).await?,
        };

        if let (Some(cache), Some((key, _))) = (&self.cache, cache_key) {
            if let Ok(serialized) = serde_json::to_string(&response) {
                cache.put(key, serialized);
            }
        }
        Ok(response)
    }

    /// Streaming chat from the primary provider.
    ///
    /// Falls back to the synchronous path (including its fallback chain)
    /// wrapped as a single-chunk stream when the primary cannot stream.
    pub async fn chat(&self, messages: &[ChatMessage]) -> VitalinkResult<ChatStream> {
        if let Some(primary) = self.chain.first() {
            if primary.supports_streaming() {
                match primary.chat_stream(messages).await {
                    Ok(stream) => return Ok(stream),
                    Err(error) => {
                        tracing::warn!(
                            provider = primary.name(),
                            error = %error,
                            "streaming failed, degrading to synchronous chat"
                        );
                    }
                }
            }
        }

        let response = self.chat_sync(messages).await?;
        Ok(single_chunk_stream(response.content))
    }

    /// One pass over the chain. Each provider gets the per-call deadline;
    /// the error that finally surfaces is the last provider's.
    async fn try_chain(&self, messages: &[ChatMessage]) -> VitalinkResult<ChatResponse> {
        let mut last_error = VitalinkError::unavailable("no AI providers configured");

        for provider in &self.chain {
            let attempt = tokio::time::timeout(self.call_timeout, provider.chat(messages)).await;
            let error = match attempt {
                Ok(Ok(response)) => {
                    tracing::debug!(provider = provider.name(), "chat served");
                    return Ok(response);
                }
                Ok(Err(error)) => error,
                Err(_) => {
                    VitalinkError::timeout(provider.name(), self.call_timeout.as_secs())
                }
            };
            tracing::warn!(
                provider = provider.name(),
                error = %error,
                "provider failed, trying next in chain"
            );
            last_error = error;
        }

        Err(last_error)
    }
}

fn build_provider(
    endpoint: &ProviderEndpoint,
    config: &GatewayConfig,
    http_client: Client,
) -> VitalinkResult<ProviderInstance> {
    match endpoint.kind {
        ProviderKind::Ollama => Ok(ProviderInstance::Ollama(OllamaProvider::with_base_url(
            &endpoint.model,
            &config.ollama_base_url,
            http_client,
        ))),
        ProviderKind::OpenAI => {
            let api_key = config.openai_api_key.clone().ok_or_else(|| {
                VitalinkError::config_with_context(
                    "OPENAI_API_KEY is not set",
                    format!("required for model '{}'", endpoint),
                )
            })?;
            let mut provider = OpenAIProvider::new(&endpoint.model, api_key, http_client);
            if let Some(base_url) = &config.openai_base_url {
                provider = provider.with_base_url(base_url);
            }
            Ok(ProviderInstance::OpenAI(provider))
        }
        ProviderKind::Anthropic => {
            let api_key = config.anthropic_api_key.clone().ok_or_else(|| {
                VitalinkError::config_with_context(
                    "ANTHROPIC_API_KEY is not set",
                    format!("required for model '{}'", endpoint),
                )
            })?;
            let mut provider = AnthropicProvider::new(&endpoint.model, api_key, http_client);
            if let Some(base_url) = &config.anthropic_base_url {
                provider = provider.with_base_url(base_url);
            }
            Ok(ProviderInstance::Anthropic(provider))
        }
    }
}
