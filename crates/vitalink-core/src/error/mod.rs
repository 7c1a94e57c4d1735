//! Unified error types for the Vitalink core

use thiserror::Error;

/// Result type alias for Vitalink core operations
pub type VitalinkResult<T> = Result<T, VitalinkError>;

/// Main error type for the resilience layer and AI gateway.
///
/// The four caller-facing variants are `Unavailable`, `Provider`, `Timeout`
/// and `CircuitOpen`; callers branch on them to decide user-facing messaging.
/// `Unavailable` and `CircuitOpen` are safe-to-retry-later conditions, while
/// `Provider` retryability depends on the underlying cause.
#[derive(Error, Debug, Clone)]
pub enum VitalinkError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },

    /// A specific provider rejected or errored on a request
    #[error("Provider '{provider}' error: {message}")]
    Provider {
        provider: String,
        message: String,
        status_code: Option<u16>,
    },

    /// HTTP transport errors outside a provider exchange
    #[error("HTTP error: {message}")]
    Http {
        message: String,
        status_code: Option<u16>,
    },

    /// Per-call deadline exceeded
    #[error("Provider '{provider}' timed out after {seconds}s")]
    Timeout { provider: String, seconds: u64 },

    /// Circuit breaker rejected the call without attempting it
    #[error("Circuit breaker open for component: {component}")]
    CircuitOpen { component: String },

    /// No provider in the chain is reachable
    #[error("AI service unavailable: {message}")]
    Unavailable { message: String },

    /// Cache errors
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// Operation was cancelled by the caller
    #[error("Operation was cancelled")]
    Cancelled,

    /// Generic error
    #[error("Error: {message}")]
    Other { message: String },
}

impl VitalinkError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: None,
        }
    }

    /// Create a configuration error with additional context
    pub fn config_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Create a provider error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
            status_code: None,
        }
    }

    /// Create a provider error carrying the HTTP status
    pub fn provider_with_status(
        provider: impl Into<String>,
        message: impl Into<String>,
        status_code: u16,
    ) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
            status_code: Some(status_code),
        }
    }

    /// Create an HTTP transport error
    pub fn http(message: impl Into<String>) -> Self {
        Self::Http {
            message: message.into(),
            status_code: None,
        }
    }

    /// Create a timeout error
    pub fn timeout(provider: impl Into<String>, seconds: u64) -> Self {
        Self::Timeout {
            provider: provider.into(),
            seconds,
        }
    }

    /// Create an unavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Create a cache error
    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// HTTP status carried by this error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Provider { status_code, .. } | Self::Http { status_code, .. } => *status_code,
            _ => None,
        }
    }

    /// Whether this error means "try again later" rather than "request is bad"
    pub fn is_retry_later(&self) -> bool {
        matches!(
            self,
            Self::Unavailable { .. } | Self::CircuitOpen { .. } | Self::Timeout { .. }
        )
    }
}

impl From<reqwest::Error> for VitalinkError {
    fn from(err: reqwest::Error) -> Self {
        let status_code = err.status().map(|s| s.as_u16());
        Self::Http {
            message: err.to_string(),
            status_code,
        }
    }
}

impl From<serde_json::Error> for VitalinkError {
    fn from(err: serde_json::Error) -> Self {
        Self::Other {
            message: format!("JSON error: {}", err),
        }
    }
}
