//! Provider trait and unified enum

use async_trait::async_trait;

use crate::error::VitalinkResult;
use crate::llm::messages::{ChatMessage, ChatResponse};
use crate::llm::streaming::ChatStream;

/// Unified interface over every AI provider
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Canonical provider name, as it appears in config and logs
    fn name(&self) -> &str;

    /// Model this provider instance is bound to
    fn model(&self) -> &str;

    /// Send a synchronous chat completion request
    async fn chat(&self, messages: &[ChatMessage]) -> VitalinkResult<ChatResponse>;

    /// Send a streaming chat completion request
    async fn chat_stream(&self, messages: &[ChatMessage]) -> VitalinkResult<ChatStream>;

    /// Cheap reachability check, used before committing to a provider
    async fn is_available(&self) -> bool;

    /// Whether [`chat_stream`](Self::chat_stream) produces true incremental
    /// output (rather than a degraded single-chunk stream)
    fn supports_streaming(&self) -> bool;
}

/// Unified enum wrapping all provider implementations, so a fallback chain
/// can hold heterogeneous providers without boxing.
#[derive(Debug)]
pub enum ProviderInstance {
    Ollama(super::OllamaProvider),
    OpenAI(super::OpenAIProvider),
    Anthropic(super::AnthropicProvider),
    #[cfg(test)]
    Mock(super::mock::MockProvider),
}

#[async_trait]
impl ChatProvider for ProviderInstance {
    fn name(&self) -> &str {
        match self {
            Self::Ollama(p) => p.name(),
            Self::OpenAI(p) => p.name(),
            Self::Anthropic(p) => p.name(),
            #[cfg(test)]
            Self::Mock(p) => p.name(),
        }
    }

    fn model(&self) -> &str {
        match self {
            Self::Ollama(p) => p.model(),
            Self::OpenAI(p) => p.model(),
            Self::Anthropic(p) => p.model(),
            #[cfg(test)]
            Self::Mock(p) => p.model(),
        }
    }

    async fn chat(&self, messages: &[ChatMessage]) -> VitalinkResult<ChatResponse> {
        match self {
            Self::Ollama(p) => p.chat(messages).await,
            Self::OpenAI(p) => p.chat(messages).await,
            Self::Anthropic(p) => p.chat(messages).await,
            #[cfg(test)]
            Self::Mock(p) => p.chat(messages).await,
        }
    }

    async fn chat_stream(&self, messages: &[ChatMessage]) -> VitalinkResult<ChatStream> {
        match self {
            Self::Ollama(p) => p.chat_stream(messages).await,
            Self::OpenAI(p) => p.chat_stream(messages).await,
            Self::Anthropic(p) => p.chat_stream(messages).await,
            #[cfg(test)]
            Self::Mock(p) => p.chat_stream(messages).await,
        }
    }

    async fn is_available(&self) -> bool {
        match self {
            Self::Ollama(p) => p.is_available().await,
            Self::OpenAI(p) => p.is_available().await,
            Self::Anthropic(p) => p.is_available().await,
            #[cfg(test)]
            Self::Mock(p) => p.is_available().await,
        }
    }

    fn supports_streaming(&self) -> bool {
        match self {
            Self::Ollama(p) => p.supports_streaming(),
            Self::OpenAI(p) => p.supports_streaming(),
            Self::Anthropic(p) => p.supports_streaming(),
            #[cfg(test)]
            Self::Mock(p) => p.supports_streaming(),
        }
    }
}
