//! Resilience building blocks for unreliable dependencies
//!
//! This module provides:
//! - Error classification (transient vs permanent)
//! - Retry with exponential backoff
//! - Circuit breaker pattern for failing dependencies

pub mod circuit_breaker;
pub mod retry;

pub use circuit_breaker::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerRegistry, CircuitBreakerStats, CircuitState,
};
pub use retry::{RetryPolicy, retry_with_policy, retry_with_policy_cancellable};

use crate::error::VitalinkError;

/// Error classification for recovery decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Transient errors that may succeed on retry
    Transient,
    /// Permanent errors that will not succeed on retry
    Permanent,
    /// Unknown errors
    Unknown,
}

/// Classify an error for retry decisions.
///
/// Network-class failures (connection refused/reset, DNS failures, timeouts,
/// 502/503/504 statuses) are transient; auth and validation failures are
/// permanent.
pub fn classify_error(error: &VitalinkError) -> ErrorClass {
    match error {
        VitalinkError::Timeout { .. } => ErrorClass::Transient,
        VitalinkError::Http {
            status_code: Some(code),
            ..
        }
        | VitalinkError::Provider {
            status_code: Some(code),
            ..
        } => match code {
            502 | 503 | 504 => ErrorClass::Transient,
            401 | 403 | 404 | 400 | 422 => ErrorClass::Permanent,
            _ => ErrorClass::Unknown,
        },
        VitalinkError::Http { message, .. } | VitalinkError::Provider { message, .. } => {
            classify_message(message)
        }
        VitalinkError::Unavailable { .. } => ErrorClass::Transient,
        VitalinkError::CircuitOpen { .. } => ErrorClass::Transient,
        VitalinkError::Cancelled => ErrorClass::Permanent,
        VitalinkError::Config { .. } => ErrorClass::Permanent,
        VitalinkError::Cache { .. } | VitalinkError::Other { .. } => ErrorClass::Unknown,
    }
}

fn classify_message(message: &str) -> ErrorClass {
    let msg = message.to_lowercase();
    if msg.contains("connection refused")
        || msg.contains("connection reset")
        || msg.contains("dns")
        || msg.contains("timeout")
        || msg.contains("timed out")
        || msg.contains("502")
        || msg.contains("503")
        || msg.contains("504")
    {
        ErrorClass::Transient
    } else if msg.contains("401") || msg.contains("403") || msg.contains("invalid") {
        ErrorClass::Permanent
    } else {
        ErrorClass::Unknown
    }
}

/// Default retryability predicate: only network-class failures retry.
pub fn is_network_retryable(error: &VitalinkError) -> bool {
    classify_error(error) == ErrorClass::Transient
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_network_errors_as_transient() {
        assert_eq!(
            classify_error(&VitalinkError::http("connection refused")),
            ErrorClass::Transient
        );
        assert_eq!(
            classify_error(&VitalinkError::provider_with_status("openai", "bad gateway", 502)),
            ErrorClass::Transient
        );
        assert_eq!(
            classify_error(&VitalinkError::timeout("ollama", 30)),
            ErrorClass::Transient
        );
    }

    #[test]
    fn classifies_auth_errors_as_permanent() {
        assert_eq!(
            classify_error(&VitalinkError::provider_with_status("openai", "unauthorized", 401)),
            ErrorClass::Permanent
        );
        assert_eq!(
            classify_error(&VitalinkError::config("missing key")),
            ErrorClass::Permanent
        );
    }

    #[test]
    fn default_predicate_rejects_non_network_errors() {
        assert!(is_network_retryable(&VitalinkError::http("dns lookup failed")));
        assert!(!is_network_retryable(&VitalinkError::provider(
            "anthropic",
            "model produced malformed output"
        )));
    }
}
