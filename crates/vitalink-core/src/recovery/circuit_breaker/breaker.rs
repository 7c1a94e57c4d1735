//! Circuit breaker implementation

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;

use super::types::{CircuitBreakerConfig, CircuitBreakerStats, CircuitState};
use crate::error::{VitalinkError, VitalinkResult};

/// Mutable window state, guarded as one unit so every admission decision and
/// outcome record is an atomic read-then-update.
#[derive(Debug)]
struct Window {
    state: CircuitState,
    consecutive_failures: u32,
    consecutive_successes: u32,
    last_failure: Option<Instant>,
}

/// Circuit breaker guarding one named dependency.
///
/// Admission decisions and state transitions are serialized under a mutex;
/// the guarded operations themselves run concurrently outside the lock, so
/// many calls may be in flight at once. Lifetime counters are atomics and are
/// never reset by state transitions.
#[derive(Debug)]
pub struct CircuitBreaker {
    /// Dependency name (for logging and registry lookup)
    name: String,
    config: CircuitBreakerConfig,
    window: Mutex<Window>,
    total_calls: AtomicU64,
    total_failures: AtomicU64,
    total_successes: AtomicU64,
}

impl CircuitBreaker {
    /// Create a breaker with default config
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, CircuitBreakerConfig::default())
    }

    /// Create a breaker with custom config
    pub fn with_config(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            window: Mutex::new(Window {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                consecutive_successes: 0,
                last_failure: None,
            }),
            total_calls: AtomicU64::new(0),
            total_failures: AtomicU64::new(0),
            total_successes: AtomicU64::new(0),
        }
    }

    /// Get the dependency name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current state. An expired OPEN window transitions to HALF_OPEN here,
    /// the same way an admitted call would observe it.
    pub fn state(&self) -> CircuitState {
        let mut window = self.window.lock();
        self.maybe_begin_probe(&mut window);
        window.state
    }

    /// Execute an operation under breaker protection.
    ///
    /// Increments the lifetime call counter unconditionally. A rejected call
    /// returns [`VitalinkError::CircuitOpen`] without invoking the operation.
    /// An admitted operation runs under the configured call deadline; an
    /// overrun is abandoned and counted as a failure. Errors from the
    /// operation are re-raised unchanged.
    pub async fn execute<T, F, Fut>(&self, operation: F) -> VitalinkResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = VitalinkResult<T>>,
    {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        self.admit()?;

        match tokio::time::timeout(self.config.call_timeout, operation()).await {
            Ok(Ok(value)) => {
                self.record_success();
                Ok(value)
            }
            Ok(Err(error)) => {
                self.record_failure();
                Err(error)
            }
            Err(_) => {
                self.record_failure();
                Err(VitalinkError::timeout(
                    &self.name,
                    self.config.call_timeout.as_secs(),
                ))
            }
        }
    }

    /// Like [`execute`](Self::execute), but substitutes `fallback` instead of
    /// failing when the breaker rejects the call while OPEN.
    pub async fn execute_with_fallback<T, F, Fut, FB>(
        &self,
        operation: F,
        fallback: FB,
    ) -> VitalinkResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = VitalinkResult<T>>,
        FB: FnOnce() -> T,
    {
        match self.execute(operation).await {
            Err(VitalinkError::CircuitOpen { .. }) => {
                tracing::debug!(circuit = %self.name, "circuit open, serving fallback");
                Ok(fallback())
            }
            other => other,
        }
    }

    /// Decide whether a call may proceed. OPEN rejects unless the reset
    /// window has elapsed since the last failure, in which case the breaker
    /// moves to HALF_OPEN and this call goes through as the probe.
    fn admit(&self) -> VitalinkResult<()> {
        let mut window = self.window.lock();
        self.maybe_begin_probe(&mut window);
        match window.state {
            CircuitState::Closed | CircuitState::HalfOpen => Ok(()),
            CircuitState::Open => Err(VitalinkError::CircuitOpen {
                component: self.name.clone(),
            }),
        }
    }

    /// Record a successful operation
    pub fn record_success(&self) {
        self.total_successes.fetch_add(1, Ordering::Relaxed);

        let mut window = self.window.lock();
        match window.state {
            CircuitState::Closed => {
                window.consecutive_failures = 0;
                window.consecutive_successes += 1;
            }
            CircuitState::HalfOpen => {
                window.consecutive_successes += 1;
                if window.consecutive_successes >= self.config.success_threshold {
                    window.state = CircuitState::Closed;
                    window.consecutive_failures = 0;
                    window.consecutive_successes = 0;
                    tracing::info!(circuit = %self.name, "circuit breaker closed after recovery");
                }
            }
            // Success landing while open: a call admitted before the trip
            CircuitState::Open => {}
        }
    }

    /// Record a failed operation
    pub fn record_failure(&self) {
        self.total_failures.fetch_add(1, Ordering::Relaxed);

        let mut window = self.window.lock();
        window.last_failure = Some(Instant::now());
        match window.state {
            CircuitState::Closed => {
                window.consecutive_successes = 0;
                window.consecutive_failures += 1;
                if window.consecutive_failures >= self.config.failure_threshold {
                    window.state = CircuitState::Open;
                    window.consecutive_successes = 0;
                    tracing::warn!(
                        circuit = %self.name,
                        failures = window.consecutive_failures,
                        "circuit breaker opened"
                    );
                }
            }
            CircuitState::HalfOpen => {
                // One failed probe re-opens, no threshold
                window.state = CircuitState::Open;
                window.consecutive_failures = 0;
                window.consecutive_successes = 0;
                tracing::warn!(circuit = %self.name, "probe failed, circuit breaker re-opened");
            }
            CircuitState::Open => {}
        }
    }

    fn maybe_begin_probe(&self, window: &mut Window) {
        if window.state != CircuitState::Open {
            return;
        }
        let elapsed = match window.last_failure {
            Some(at) => at.elapsed() >= self.config.reset_timeout,
            None => true,
        };
        if elapsed {
            window.state = CircuitState::HalfOpen;
            window.consecutive_failures = 0;
            window.consecutive_successes = 0;
            tracing::info!(circuit = %self.name, "circuit breaker transitioning to half-open");
        }
    }

    /// Statistics snapshot
    pub fn stats(&self) -> CircuitBreakerStats {
        let window = self.window.lock();
        CircuitBreakerStats {
            state: window.state,
            consecutive_failures: window.consecutive_failures,
            consecutive_successes: window.consecutive_successes,
            last_failure: window.last_failure,
            total_calls: self.total_calls.load(Ordering::Relaxed),
            total_failures: self.total_failures.load(Ordering::Relaxed),
            total_successes: self.total_successes.load(Ordering::Relaxed),
        }
    }

    /// Operator recovery: force CLOSED and zero the window counters.
    /// Lifetime totals stay monotonic.
    pub fn reset(&self) {
        let mut window = self.window.lock();
        window.state = CircuitState::Closed;
        window.consecutive_failures = 0;
        window.consecutive_successes = 0;
        window.last_failure = None;
        tracing::info!(circuit = %self.name, "circuit breaker manually reset");
    }

    /// Force OPEN, e.g. for maintenance on a dependency
    pub fn trip(&self) {
        let mut window = self.window.lock();
        window.state = CircuitState::Open;
        window.last_failure = Some(Instant::now());
        window.consecutive_successes = 0;
        tracing::warn!(circuit = %self.name, "circuit breaker manually tripped");
    }
}
