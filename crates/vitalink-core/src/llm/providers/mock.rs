//! Scriptable in-memory provider for gateway tests

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::provider_trait::ChatProvider;
use crate::error::{VitalinkError, VitalinkResult};
use crate::llm::messages::{ChatMessage, ChatResponse};
use crate::llm::streaming::{ChatStream, single_chunk_stream};

/// Provider that returns a canned response or a canned error and counts
/// how many times it was invoked.
#[derive(Debug)]
pub struct MockProvider {
    name: String,
    model: String,
    response: Option<String>,
    error: Option<VitalinkError>,
    available: bool,
    streaming: bool,
    delay: Option<Duration>,
    calls: Arc<AtomicU32>,
}

impl MockProvider {
    /// A provider that always succeeds with `response`
    pub fn ok(name: &str, response: &str) -> Self {
        Self {
            name: name.to_string(),
            model: format!("{}-model", name),
            response: Some(response.to_string()),
            error: None,
            available: true,
            streaming: true,
            delay: None,
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    /// A provider that always fails with `error`
    pub fn failing(name: &str, error: VitalinkError) -> Self {
        Self {
            name: name.to_string(),
            model: format!("{}-model", name),
            response: None,
            error: Some(error),
            available: true,
            streaming: true,
            delay: None,
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Sleep before answering, to exercise timeout paths
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn without_streaming(mut self) -> Self {
        self.streaming = false;
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Handle to the invocation counter
    pub fn call_counter(&self) -> Arc<AtomicU32> {
        self.calls.clone()
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn chat(&self, _messages: &[ChatMessage]) -> VitalinkResult<ChatResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match (&self.response, &self.error) {
            (Some(response), _) => Ok(ChatResponse::new(response, &self.model, &self.name)),
            (None, Some(error)) => Err(error.clone()),
            (None, None) => Err(VitalinkError::provider(&self.name, "mock not scripted")),
        }
    }

    async fn chat_stream(&self, messages: &[ChatMessage]) -> VitalinkResult<ChatStream> {
        let response = self.chat(messages).await?;
        Ok(single_chunk_stream(response.content))
    }

    async fn is_available(&self) -> bool {
        self.available
    }

    fn supports_streaming(&self) -> bool {
        self.streaming
    }
}
