//! AI provider implementations

pub mod anthropic;
pub mod ollama;
pub mod openai;
pub mod openai_stream;
pub mod provider_trait;

#[cfg(test)]
pub mod mock;

pub use anthropic::AnthropicProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAIProvider;
pub use provider_trait::{ChatProvider, ProviderInstance};

use serde_json::Value;

use crate::error::{VitalinkError, VitalinkResult};

/// Extract `choices[0].message.content` from an OpenAI-compatible response.
///
/// Ollama serves the same shape through its compatibility endpoint, so both
/// providers parse here.
pub(crate) fn parse_openai_response(provider: &str, body: Value) -> VitalinkResult<String> {
    body["choices"]
        .get(0)
        .and_then(|choice| choice["message"]["content"].as_str())
        .map(str::to_string)
        .ok_or_else(|| {
            VitalinkError::provider(provider, "response missing choices[0].message.content")
        })
}

/// Build a provider error from a non-success HTTP response, truncating the
/// body so upstream error pages never flood the logs.
pub(crate) fn provider_http_error(provider: &str, status: u16, body: &str) -> VitalinkError {
    const MAX_BODY: usize = 300;
    let detail = body.trim();
    let detail: String = if detail.len() > MAX_BODY {
        let mut end = MAX_BODY;
        while !detail.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &detail[..end])
    } else {
        detail.to_string()
    };
    VitalinkError::provider_with_status(provider, detail, status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_openai_shape() {
        let body = json!({
            "choices": [{"message": {"role": "assistant", "content": "answer"}}]
        });
        assert_eq!(parse_openai_response("openai", body).unwrap(), "answer");
    }

    #[test]
    fn missing_content_is_a_provider_error() {
        let body = json!({"choices": []});
        let error = parse_openai_response("ollama", body).unwrap_err();
        assert!(matches!(error, VitalinkError::Provider { .. }));
    }

    #[test]
    fn long_error_bodies_are_truncated() {
        let body = "x".repeat(1000);
        let error = provider_http_error("openai", 502, &body);
        let message = error.to_string();
        assert!(message.len() < 500);
        match error {
            VitalinkError::Provider { status_code, .. } => {
                assert_eq!(status_code, Some(502));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
