//! Vitalink Core Library
//!
//! Resilience layer for the Vitalink health platform: circuit breakers and
//! retry for flaky dependencies, plus a cached, fallback-capable gateway
//! over the AI providers that power insights and summaries.

pub mod cache;
pub mod config;
pub mod error;
pub mod llm;
pub mod recovery;
pub mod types;

// Re-export commonly used types
pub use cache::ResponseCache;
pub use config::GatewayConfig;
pub use error::{VitalinkError, VitalinkResult};
pub use llm::{ChatMessage, ChatResponse, ChatStream, MessageRole, ProviderGateway};
pub use recovery::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerRegistry, CircuitBreakerStats,
    CircuitState, RetryPolicy, retry_with_policy,
};
pub use types::{HealthMetric, SummaryPeriod};
