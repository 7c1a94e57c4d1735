//! Registry of named circuit breakers, one per external dependency
//!
//! The registry is constructed once at process start and handed to every
//! component that needs resilience; nothing in this crate holds a global.

use std::sync::Arc;

use super::breaker::CircuitBreaker;
use super::types::{CircuitBreakerConfig, CircuitBreakerStats};

/// Well-known dependency names used across the platform
pub mod dependency {
    /// AI provider chain
    pub const AI: &str = "ai";
    /// Oura ring cloud API
    pub const OURA_API: &str = "oura_api";
    /// Device integration API (Fitbit, Garmin, ...)
    pub const DEVICE_API: &str = "device_api";
    /// Primary data store
    pub const STORAGE: &str = "storage";
}

/// Collection of circuit breakers keyed by dependency name
pub struct CircuitBreakerRegistry {
    breakers: dashmap::DashMap<String, Arc<CircuitBreaker>>,
    default_config: CircuitBreakerConfig,
}

impl CircuitBreakerRegistry {
    /// Create a registry with default breaker config
    pub fn new() -> Self {
        Self::with_config(CircuitBreakerConfig::default())
    }

    /// Create a registry with a custom default config
    pub fn with_config(config: CircuitBreakerConfig) -> Self {
        Self {
            breakers: dashmap::DashMap::new(),
            default_config: config,
        }
    }

    /// Get or create the breaker for a dependency
    pub fn get(&self, name: &str) -> Arc<CircuitBreaker> {
        self.breakers
            .entry(name.to_string())
            .or_insert_with(|| {
                Arc::new(CircuitBreaker::with_config(
                    name,
                    self.default_config.clone(),
                ))
            })
            .clone()
    }

    /// Get or create with a dependency-specific config
    pub fn get_with_config(&self, name: &str, config: CircuitBreakerConfig) -> Arc<CircuitBreaker> {
        self.breakers
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(CircuitBreaker::with_config(name, config)))
            .clone()
    }

    /// Names of all registered breakers
    pub fn names(&self) -> Vec<String> {
        self.breakers.iter().map(|e| e.key().clone()).collect()
    }

    /// Stats for every breaker, for the health-status endpoint
    pub fn all_stats(&self) -> Vec<(String, CircuitBreakerStats)> {
        self.breakers
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().stats()))
            .collect()
    }

    /// Operator recovery across the board
    pub fn reset_all(&self) {
        for entry in self.breakers.iter() {
            entry.value().reset();
        }
    }
}

impl Default for CircuitBreakerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
