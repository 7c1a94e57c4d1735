//! End-to-end gateway scenarios over the public API
//!
//! Network-facing cases point the Ollama provider at a closed local port, so
//! every call fails fast with a real transport error and no server is needed.

use std::time::Duration;

use vitalink_core::config::GatewayConfig;
use vitalink_core::llm::ProviderGateway;
use vitalink_core::llm::provider_types::{ProviderEndpoint, ProviderKind};
use vitalink_core::recovery::circuit_breaker::{
    CircuitBreakerConfig, CircuitBreakerRegistry, dependency,
};
use vitalink_core::{ChatMessage, CircuitState, RetryPolicy, VitalinkError, retry_with_policy};

fn offline_config() -> GatewayConfig {
    let mut config = GatewayConfig::default()
        .with_request_timeout(Duration::from_secs(2))
        .with_cache_enabled(false);
    // Discard port, nothing listens there
    config.ollama_base_url = "http://127.0.0.1:9".to_string();
    config
}

#[tokio::test]
async fn from_config_wires_primary_identity() {
    let registry = CircuitBreakerRegistry::new();
    let gateway = ProviderGateway::from_config(&GatewayConfig::default(), &registry).unwrap();

    assert_eq!(gateway.provider_name(), "ollama");
    assert_eq!(gateway.model_name(), "llama3.2");
    assert!(gateway.breaker_stats().is_some());
}

#[tokio::test]
async fn breaker_can_be_disabled_by_config() {
    let registry = CircuitBreakerRegistry::new();
    let config = GatewayConfig::default().with_breaker_enabled(false);
    let gateway = ProviderGateway::from_config(&config, &registry).unwrap();
    assert!(gateway.breaker_stats().is_none());
}

#[tokio::test]
async fn missing_api_key_is_a_config_error() {
    let registry = CircuitBreakerRegistry::new();
    let config = GatewayConfig::default()
        .with_primary_model(ProviderEndpoint::new(ProviderKind::OpenAI, "gpt-4o-mini"));

    let error = ProviderGateway::from_config(&config, &registry).unwrap_err();
    assert!(matches!(error, VitalinkError::Config { .. }));
}

#[tokio::test]
async fn unreachable_provider_surfaces_transport_error() {
    let registry = CircuitBreakerRegistry::new();
    let gateway = ProviderGateway::from_config(&offline_config(), &registry).unwrap();

    let error = gateway
        .chat_sync(&[ChatMessage::user("hello")])
        .await
        .unwrap_err();
    assert!(
        matches!(error, VitalinkError::Http { .. } | VitalinkError::Timeout { .. }),
        "unexpected error: {:?}",
        error
    );
}

#[tokio::test]
async fn unreachable_provider_reports_unavailable() {
    let registry = CircuitBreakerRegistry::new();
    let gateway = ProviderGateway::from_config(&offline_config(), &registry).unwrap();
    assert!(!gateway.is_available().await);
}

#[tokio::test]
async fn repeated_failures_trip_the_shared_breaker() {
    let registry = CircuitBreakerRegistry::new();
    registry.get_with_config(
        dependency::AI,
        CircuitBreakerConfig::default().with_failure_threshold(2),
    );
    let gateway = ProviderGateway::from_config(&offline_config(), &registry).unwrap();
    let messages = [ChatMessage::user("hello")];

    assert!(gateway.chat_sync(&messages).await.is_err());
    assert!(gateway.chat_sync(&messages).await.is_err());

    let breaker = registry.get(dependency::AI);
    assert_eq!(breaker.state(), CircuitState::Open);

    let error = gateway.chat_sync(&messages).await.unwrap_err();
    assert!(matches!(error, VitalinkError::CircuitOpen { .. }));
}

#[tokio::test]
async fn retry_composes_with_breaker_protected_calls() {
    let registry = CircuitBreakerRegistry::new();
    let breaker = registry.get_with_config(
        "storage",
        CircuitBreakerConfig::default().with_failure_threshold(10),
    );
    let policy = RetryPolicy::default()
        .with_max_retries(2)
        .with_initial_delay(Duration::from_millis(1));

    let attempts = std::sync::Arc::new(std::sync::atomic::AtomicU32::new(0));
    let attempts_clone = attempts.clone();
    let result = retry_with_policy(&policy, || {
        let breaker = breaker.clone();
        let attempts = attempts_clone.clone();
        async move {
            breaker
                .execute(|| async move {
                    if attempts.fetch_add(1, std::sync::atomic::Ordering::SeqCst) < 2 {
                        Err(VitalinkError::http("connection reset"))
                    } else {
                        Ok("recovered")
                    }
                })
                .await
        }
    })
    .await;

    assert_eq!(result.unwrap(), "recovered");
    let stats = breaker.stats();
    assert_eq!(stats.total_calls, 3);
    assert_eq!(stats.total_failures, 2);
}
