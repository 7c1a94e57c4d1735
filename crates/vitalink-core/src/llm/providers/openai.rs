//! OpenAI provider

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

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// OpenAI chat completions API
#[derive(Debug)]
pub struct OpenAIProvider {
    model: String,
    api_key: String,
    base_url: String,
    http_client: Client,
}

impl OpenAIProvider {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>, http_client: Client) -> Self {
        Self {
            model: model.into(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            http_client,
        }
    }

    /// Point at a compatible gateway instead of api.openai.com
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn request_body(&self, messages: &[ChatMessage], stream: bool) -> Value {
        json!({
            "model": self.model,
            "messages": messages,
            "stream": stream,
        })
    }

    async fn post_chat(&self, body: &Value) -> VitalinkResult<reqwest::Response> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(provider_http_error(self.name(), status.as_u16(), &body));
        }
        Ok(response)
    }
}

#[async_trait]
impl ChatProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, messages), fields(model = %self.model), level = "debug")]
    async fn chat(&self, messages: &[ChatMessage]) -> VitalinkResult<ChatResponse> {
        let response = self.post_chat(&self.request_body(messages, false)).await?;
        let body: Value = response.json().await?;
        let content = parse_openai_response(self.name(), body)?;
        Ok(ChatResponse::new(content, &self.model, self.name()))
    }

    async fn chat_stream(&self, messages: &[ChatMessage]) -> VitalinkResult<ChatStream> {
        let response = self.post_chat(&self.request_body(messages, true)).await?;
        Ok(openai_sse_stream(response.bytes_stream()))
    }

    /// No remote probe; a configured key is the availability signal
    async fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn supports_streaming(&self) -> bool {
        true
    }
}
