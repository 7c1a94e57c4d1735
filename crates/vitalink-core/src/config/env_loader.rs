//! Environment-variable configuration loading
//!
//! All gateway settings live under the `VITALINK_AI_` prefix; per-dependency
//! circuit breaker overrides under `VITALINK_CB_<DEP>_`. Unset variables fall
//! back to defaults, malformed values are hard errors.

use std::time::Duration;

use super::GatewayConfig;
use crate::error::{VitalinkError, VitalinkResult};
use crate::llm::provider_types::ProviderEndpoint;
use crate::recovery::circuit_breaker::{
    CircuitBreakerConfig, CircuitBreakerRegistry, dependency,
};

/// Load gateway configuration from the process environment
pub fn load_from_env() -> VitalinkResult<GatewayConfig> {
    let mut config = GatewayConfig::default();

    if let Some(model) = read_var("VITALINK_AI_MODEL") {
        config.primary_model = model.parse()?;
    }
    if let Some(models) = read_var("VITALINK_AI_FALLBACK_MODELS") {
        config.fallback_models = parse_model_list(&models)?;
    }
    if let Some(value) = read_var("VITALINK_AI_CACHE_ENABLED") {
        config.cache_enabled = parse_bool("VITALINK_AI_CACHE_ENABLED", &value)?;
    }
    if let Some(value) = read_var("VITALINK_AI_CACHE_TTL_SECS") {
        config.cache_ttl = Duration::from_secs(parse_u64("VITALINK_AI_CACHE_TTL_SECS", &value)?);
    }
    if let Some(value) = read_var("VITALINK_AI_CACHE_MAX_ENTRIES") {
        config.cache_max_entries =
            parse_u64("VITALINK_AI_CACHE_MAX_ENTRIES", &value)? as usize;
    }
    if let Some(value) = read_var("VITALINK_AI_TIMEOUT_SECS") {
        config.request_timeout =
            Duration::from_secs(parse_u64("VITALINK_AI_TIMEOUT_SECS", &value)?);
    }
    if let Some(value) = read_var("VITALINK_AI_BREAKER_ENABLED") {
        config.breaker_enabled = parse_bool("VITALINK_AI_BREAKER_ENABLED", &value)?;
    }
    if let Some(url) = read_var("VITALINK_OLLAMA_BASE_URL") {
        config.ollama_base_url = url;
    }
    config.openai_base_url = read_var("VITALINK_OPENAI_BASE_URL");
    config.anthropic_base_url = read_var("VITALINK_ANTHROPIC_BASE_URL");
    config.openai_api_key = read_var("OPENAI_API_KEY");
    config.anthropic_api_key = read_var("ANTHROPIC_API_KEY");

    tracing::debug!(
        primary = %config.primary_model,
        fallbacks = config.fallback_models.len(),
        cache = config.cache_enabled,
        breaker = config.breaker_enabled,
        "gateway configuration loaded"
    );
    Ok(config)
}

/// Load breaker config for one dependency, applying any
/// `VITALINK_CB_<DEP>_*` overrides on top of the defaults.
pub fn load_breaker_config(dep: &str) -> VitalinkResult<CircuitBreakerConfig> {
    let prefix = format!("VITALINK_CB_{}", dep.to_ascii_uppercase());
    let mut config = CircuitBreakerConfig::default();

    let threshold_var = format!("{}_FAILURE_THRESHOLD", prefix);
    if let Some(value) = read_var(&threshold_var) {
        config.failure_threshold = parse_u32(&threshold_var, &value)?;
    }
    let success_var = format!("{}_SUCCESS_THRESHOLD", prefix);
    if let Some(value) = read_var(&success_var) {
        config.success_threshold = parse_u32(&success_var, &value)?;
    }
    let reset_var = format!("{}_RESET_TIMEOUT_SECS", prefix);
    if let Some(value) = read_var(&reset_var) {
        config.reset_timeout = Duration::from_secs(parse_u64(&reset_var, &value)?);
    }
    let call_var = format!("{}_CALL_TIMEOUT_SECS", prefix);
    if let Some(value) = read_var(&call_var) {
        config.call_timeout = Duration::from_secs(parse_u64(&call_var, &value)?);
    }

    Ok(config)
}

/// Build the process-wide breaker registry, pre-registering the well-known
/// dependencies with their per-dependency overrides.
pub fn init_registry() -> VitalinkResult<CircuitBreakerRegistry> {
    let registry = CircuitBreakerRegistry::new();
    for dep in [
        dependency::AI,
        dependency::OURA_API,
        dependency::DEVICE_API,
        dependency::STORAGE,
    ] {
        registry.get_with_config(dep, load_breaker_config(dep)?);
    }
    Ok(registry)
}

fn read_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parse a comma-separated list of `provider/model` identifiers
pub(crate) fn parse_model_list(value: &str) -> VitalinkResult<Vec<ProviderEndpoint>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

pub(crate) fn parse_bool(var: &str, value: &str) -> VitalinkResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(VitalinkError::config_with_context(
            format!("invalid boolean '{}'", other),
            var,
        )),
    }
}

pub(crate) fn parse_u64(var: &str, value: &str) -> VitalinkResult<u64> {
    value.trim().parse().map_err(|_| {
        VitalinkError::config_with_context(format!("invalid integer '{}'", value), var)
    })
}

pub(crate) fn parse_u32(var: &str, value: &str) -> VitalinkResult<u32> {
    value.trim().parse().map_err(|_| {
        VitalinkError::config_with_context(format!("invalid integer '{}'", value), var)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider_types::ProviderKind;

    #[test]
    fn parses_model_lists() {
        let models =
            parse_model_list("openai/gpt-4o-mini, anthropic/claude-3-5-haiku-20241022").unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(models[0].kind, ProviderKind::OpenAI);
        assert_eq!(models[1].kind, ProviderKind::Anthropic);
    }

    #[test]
    fn empty_list_entries_are_skipped() {
        let models = parse_model_list("openai/gpt-4o-mini,,").unwrap();
        assert_eq!(models.len(), 1);
    }

    #[test]
    fn bad_model_in_list_is_an_error() {
        assert!(parse_model_list("openai/gpt-4o-mini,nonsense").is_err());
    }

    #[test]
    fn boolean_spellings() {
        for value in ["1", "true", "YES", "On"] {
            assert!(parse_bool("VAR", value).unwrap());
        }
        for value in ["0", "false", "No", "OFF"] {
            assert!(!parse_bool("VAR", value).unwrap());
        }
        assert!(parse_bool("VAR", "maybe").is_err());
    }

    #[test]
    fn integer_errors_name_the_variable() {
        let error = parse_u64("VITALINK_AI_TIMEOUT_SECS", "soon").unwrap_err();
        match error {
            VitalinkError::Config { context, .. } => {
                assert_eq!(context.as_deref(), Some("VITALINK_AI_TIMEOUT_SECS"));
            }
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn breaker_overrides_apply_per_dependency() {
        // Unique name so parallel tests cannot collide on the variable
        unsafe {
            std::env::set_var("VITALINK_CB_ENV_LOADER_TEST_FAILURE_THRESHOLD", "9");
        }
        let config = load_breaker_config("env_loader_test").unwrap();
        assert_eq!(config.failure_threshold, 9);
        assert_eq!(config.success_threshold, 2);
        unsafe {
            std::env::remove_var("VITALINK_CB_ENV_LOADER_TEST_FAILURE_THRESHOLD");
        }
    }
}
