//! Retry with exponential backoff for transient failures

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::{VitalinkError, VitalinkResult};

/// Retryability predicate over errors
pub type RetryPredicate = Arc<dyn Fn(&VitalinkError) -> bool + Send + Sync>;

/// Policy governing a single retried call. Pure configuration, no shared state.
///
/// # Example
/// ```
/// use vitalink_core::recovery::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::default()
///     .with_max_retries(5)
///     .with_initial_delay(Duration::from_millis(200))
///     .with_max_delay(Duration::from_secs(10));
/// ```
#[derive(Clone)]
pub struct RetryPolicy {
    /// Maximum number of retries after the initial attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound on the inter-attempt delay
    pub max_delay: Duration,
    /// Multiplier applied to the delay after each failed attempt
    pub backoff_multiplier: f64,
    /// Predicate deciding whether an error is worth retrying.
    /// Defaults to [`crate::recovery::is_network_retryable`] when unset.
    is_retryable: Option<RetryPredicate>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            is_retryable: None,
        }
    }
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_retries", &self.max_retries)
            .field("initial_delay", &self.initial_delay)
            .field("max_delay", &self.max_delay)
            .field("backoff_multiplier", &self.backoff_multiplier)
            .field("custom_predicate", &self.is_retryable.is_some())
            .finish()
    }
}

impl RetryPolicy {
    /// Create a policy with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a policy that never retries
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Set the maximum number of retries
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the delay before the first retry
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the maximum inter-attempt delay
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the backoff multiplier
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Set a custom retryability predicate
    pub fn with_retryable<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&VitalinkError) -> bool + Send + Sync + 'static,
    {
        self.is_retryable = Some(Arc::new(predicate));
        self
    }

    fn should_retry(&self, error: &VitalinkError) -> bool {
        match &self.is_retryable {
            Some(predicate) => predicate(error),
            None => crate::recovery::is_network_retryable(error),
        }
    }

    fn next_delay(&self, current: Duration) -> Duration {
        current.mul_f64(self.backoff_multiplier).min(self.max_delay)
    }
}

/// Execute an operation with retry and exponential backoff.
///
/// Attempt 0 runs immediately; a failed attempt sleeps for the current delay
/// and doubles it (bounded by `max_delay`) before trying again. Total attempts
/// are `max_retries + 1`. A non-retryable error, or exhaustion, propagates the
/// last error unchanged.
pub async fn retry_with_policy<T, F, Fut>(policy: &RetryPolicy, mut operation: F) -> VitalinkResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = VitalinkResult<T>>,
{
    retry_inner(policy, &mut operation, None).await
}

/// Like [`retry_with_policy`], but aborts between attempts when the token fires.
///
/// Cancellation during a backoff sleep surfaces [`VitalinkError::Cancelled`].
pub async fn retry_with_policy_cancellable<T, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
    cancel: CancellationToken,
) -> VitalinkResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = VitalinkResult<T>>,
{
    retry_inner(policy, &mut operation, Some(cancel)).await
}

async fn retry_inner<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &mut F,
    cancel: Option<CancellationToken>,
) -> VitalinkResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = VitalinkResult<T>>,
{
    let mut delay = policy.initial_delay;

    for attempt in 0..=policy.max_retries {
        if let Some(token) = &cancel {
            if token.is_cancelled() {
                return Err(VitalinkError::Cancelled);
            }
        }

        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::info!(attempt, "request succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) => {
                if attempt >= policy.max_retries {
                    warn!(
                        attempts = policy.max_retries + 1,
                        error = %error,
                        "all retry attempts exhausted"
                    );
                    return Err(error);
                }
                if !policy.should_retry(&error) {
                    warn!(error = %error, "non-retryable error, giving up");
                    return Err(error);
                }

                warn!(
                    attempt = attempt + 1,
                    max_attempts = policy.max_retries + 1,
                    delay_secs = delay.as_secs_f64(),
                    error = %error,
                    "retrying after failure"
                );

                match &cancel {
                    Some(token) => {
                        tokio::select! {
                            _ = token.cancelled() => return Err(VitalinkError::Cancelled),
                            _ = sleep(delay) => {}
                        }
                    }
                    None => sleep(delay).await,
                }
                delay = policy.next_delay(delay);
            }
        }
    }

    unreachable!("retry loop always returns from its final attempt")
}
