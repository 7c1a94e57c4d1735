//! Anthropic provider
//!
//! Speaks the messages API. System messages are lifted into the top-level
//! `system` field since the messages array only accepts user and assistant
//! turns. Served non-streaming; `chat_stream` degrades to a single chunk.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::instrument;

use super::provider_trait::ChatProvider;
use super::provider_http_error;
use crate::error::{VitalinkError, VitalinkResult};
use crate::llm::messages::{ChatMessage, ChatResponse, MessageRole};
use crate::llm::streaming::{ChatStream, single_chunk_stream};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Anthropic messages API
#[derive(Debug)]
pub struct AnthropicProvider {
    model: String,
    api_key: String,
    base_url: String,
    max_tokens: u32,
    http_client: Client,
}

impl AnthropicProvider {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>, http_client: Client) -> Self {
        Self {
            model: model.into(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            http_client,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Point at a compatible gateway instead of api.anthropic.com
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn request_body(&self, messages: &[ChatMessage]) -> Value {
        let system: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == MessageRole::System)
            .map(|m| m.content.as_str())
            .collect();
        let turns: Vec<Value> = messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .map(|m| json!({"role": m.role.as_str(), "content": m.content}))
            .collect();

        let mut body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": turns,
        });
        if !system.is_empty() {
            body["system"] = json!(system.join("\n\n"));
        }
        body
    }
}

#[async_trait]
impl ChatProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, messages), fields(model = %self.model), level = "debug")]
    async fn chat(&self, messages: &[ChatMessage]) -> VitalinkResult<ChatResponse> {
        let url = format!("{}/v1/messages", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&self.request_body(messages))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(provider_http_error(self.name(), status.as_u16(), &body));
        }

        let body: Value = response.json().await?;
        let content = body["content"]
            .get(0)
            .and_then(|block| block["text"].as_str())
            .ok_or_else(|| {
                VitalinkError::provider(self.name(), "response missing content[0].text")
            })?;
        Ok(ChatResponse::new(content, &self.model, self.name()))
    }

    /// Degrades to a single chunk carrying the full response
    async fn chat_stream(&self, messages: &[ChatMessage]) -> VitalinkResult<ChatStream> {
        let response = self.chat(messages).await?;
        Ok(single_chunk_stream(response.content))
    }

    async fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn supports_streaming(&self) -> bool {
        false
    }
}
