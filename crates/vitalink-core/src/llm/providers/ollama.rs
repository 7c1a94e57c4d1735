//! Ollama provider, via its OpenAI-compatible endpoint

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::instrument;

use super::openai_stream::openai_sse_stream;
use super::provider_trait::ChatProvider;
use super::{parse_openai_response, provider_http_error};
use crate::error::VitalinkResult;
use crate::llm::messages::{ChatMessage, ChatResponse};
use crate::llm::streaming::ChatStream;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Local Ollama server
#[derive(Debug)]
pub struct OllamaProvider {
    model: String,
    base_url: String,
    http_client: Client,
}

impl OllamaProvider {
    pub fn new(model: impl Into<String>, http_client: Client) -> Self {
        Self::with_base_url(model, DEFAULT_BASE_URL, http_client)
    }

    pub fn with_base_url(
        model: impl Into<String>,
        base_url: impl Into<String>,
        http_client: Client,
    ) -> Self {
        Self {
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        }
    }

    fn request_body(&self, messages: &[ChatMessage], stream: bool) -> Value {
        json!({
            "model": self.model,
            "messages": messages,
            "stream": stream,
        })
    }
}

#[async_trait]
impl ChatProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, messages), fields(model = %self.model), level = "debug")]
    async fn chat(&self, messages: &[ChatMessage]) -> VitalinkResult<ChatResponse> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .json(&self.request_body(messages, false))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(provider_http_error(self.name(), status.as_u16(), &body));
        }

        let body: Value = response.json().await?;
        let content = parse_openai_response(self.name(), body)?;
        Ok(ChatResponse::new(content, &self.model, self.name()))
    }

    async fn chat_stream(&self, messages: &[ChatMessage]) -> VitalinkResult<ChatStream> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .json(&self.request_body(messages, true))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(provider_http_error(self.name(), status.as_u16(), &body));
        }

        Ok(openai_sse_stream(response.bytes_stream()))
    }

    /// Probe the local server's tag listing; any response means it is up
    async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self.http_client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(error) => {
                tracing::debug!(error = %error, "ollama availability probe failed");
                false
            }
        }
    }

    fn supports_streaming(&self) -> bool {
        true
    }
}
