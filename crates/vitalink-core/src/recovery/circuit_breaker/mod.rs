//! Circuit breaker for protecting calls to unreliable dependencies
//!
//! One breaker guards one named dependency (AI provider chain, third-party
//! health API, device integration, storage). State transitions follow the
//! classic three-state machine: CLOSED counts consecutive failures, OPEN
//! fails fast until a reset window elapses, HALF_OPEN probes recovery.

mod breaker;
mod registry;
mod types;

pub use breaker::CircuitBreaker;
pub use registry::{CircuitBreakerRegistry, dependency};
pub use types::{CircuitBreakerConfig, CircuitBreakerStats, CircuitState};
