//! Provider identity and endpoint parsing
//!
//! Model identifiers arrive from configuration as `provider/model` strings
//! (e.g. `ollama/llama3.2`). They are parsed once into a typed
//! [`ProviderEndpoint`] so the rest of the crate never string-matches on
//! provider names.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VitalinkError;

/// Supported AI providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Local Ollama server, OpenAI-compatible API
    Ollama,
    /// OpenAI chat completions API
    OpenAI,
    /// Anthropic messages API
    Anthropic,
}

impl ProviderKind {
    /// Canonical lowercase name, as used in config strings and logs
    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::Ollama => "ollama",
            ProviderKind::OpenAI => "openai",
            ProviderKind::Anthropic => "anthropic",
        }
    }

    /// Whether this provider supports server-sent-event streaming
    pub fn streaming_capable(&self) -> bool {
        match self {
            ProviderKind::Ollama | ProviderKind::OpenAI => true,
            // Anthropic is served non-streaming here; callers degrade
            ProviderKind::Anthropic => false,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProviderKind {
    type Err = VitalinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(ProviderKind::Ollama),
            "openai" => Ok(ProviderKind::OpenAI),
            "anthropic" => Ok(ProviderKind::Anthropic),
            other => Err(VitalinkError::config_with_context(
                format!("unknown AI provider '{}'", other),
                "expected one of: ollama, openai, anthropic",
            )),
        }
    }
}

/// A provider paired with the model it should serve
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderEndpoint {
    pub kind: ProviderKind,
    pub model: String,
}

impl ProviderEndpoint {
    pub fn new(kind: ProviderKind, model: impl Into<String>) -> Self {
        Self {
            kind,
            model: model.into(),
        }
    }
}

impl FromStr for ProviderEndpoint {
    type Err = VitalinkError;

    /// Parse `provider/model`. The model part may itself contain slashes
    /// (e.g. `openai/ft:gpt-4o/org`), so only the first one splits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (provider, model) = s.split_once('/').ok_or_else(|| {
            VitalinkError::config_with_context(
                format!("malformed model identifier '{}'", s),
                "expected 'provider/model', e.g. 'ollama/llama3.2'",
            )
        })?;
        let model = model.trim();
        if model.is_empty() {
            return Err(VitalinkError::config_with_context(
                format!("malformed model identifier '{}'", s),
                "model name is empty",
            ));
        }
        Ok(Self {
            kind: provider.parse()?,
            model: model.to_string(),
        })
    }
}

impl std::fmt::Display for ProviderEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.kind, self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_model_pairs() {
        let endpoint: ProviderEndpoint = "ollama/llama3.2".parse().unwrap();
        assert_eq!(endpoint.kind, ProviderKind::Ollama);
        assert_eq!(endpoint.model, "llama3.2");

        let endpoint: ProviderEndpoint = "anthropic/claude-3-5-haiku-20241022".parse().unwrap();
        assert_eq!(endpoint.kind, ProviderKind::Anthropic);
    }

    #[test]
    fn provider_name_is_case_insensitive() {
        let endpoint: ProviderEndpoint = "OpenAI/gpt-4o-mini".parse().unwrap();
        assert_eq!(endpoint.kind, ProviderKind::OpenAI);
    }

    #[test]
    fn model_keeps_extra_slashes() {
        let endpoint: ProviderEndpoint = "openai/ft:gpt-4o/custom".parse().unwrap();
        assert_eq!(endpoint.model, "ft:gpt-4o/custom");
    }

    #[test]
    fn rejects_malformed_identifiers() {
        assert!("llama3.2".parse::<ProviderEndpoint>().is_err());
        assert!("ollama/".parse::<ProviderEndpoint>().is_err());
        assert!("mystery/model".parse::<ProviderEndpoint>().is_err());
    }

    #[test]
    fn display_round_trips() {
        let endpoint = ProviderEndpoint::new(ProviderKind::OpenAI, "gpt-4o-mini");
        let parsed: ProviderEndpoint = endpoint.to_string().parse().unwrap();
        assert_eq!(parsed, endpoint);
    }
}
