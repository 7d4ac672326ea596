//! Resilient poll executor.
//!
//! # Responsibilities
//! - Run one asynchronous operation until it yields a value
//! - Bound every attempt by a timeout and the whole loop by a deadline
//! - Retry only outcomes classified as retryable, sleeping between attempts
//! - Report each retry to an explicit observer
//!
//! # Design Decisions
//! - Waits use tokio timers; nothing blocks the scheduler thread
//! - All state (attempt counter, deadline) is local to one `run` call
//! - No sleep after the final attempt
//! - Only read operations are wrapped; publishing is never retried here

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

use crate::observability::metrics;
use crate::resilience::backoff::{with_jitter, DelayStrategy};
use crate::resilience::timeouts::{attempt_limit, run_bounded};

/// Result of a single poll attempt.
#[derive(Debug)]
pub enum PollOutcome<T, E> {
    /// The value is available.
    Ready(T),
    /// Not there yet; try again later.
    NotYetAvailable(String),
    /// The attempt failed. Retried only if `E::is_retryable`.
    Failed(E),
}

/// Errors that know whether another attempt may succeed.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Bounded retry configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Upper bound on attempts, including the first. At least 1.
    pub max_attempts: u32,
    pub delay: DelayStrategy,
    /// Add 0-10% random jitter to each delay.
    pub jitter: bool,
    pub per_attempt_timeout: Option<Duration>,
    pub overall_timeout: Option<Duration>,
}

impl RetryPolicy {
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay: DelayStrategy::fixed(delay),
            jitter: false,
            per_attempt_timeout: None,
            overall_timeout: None,
        }
    }

    pub fn exponential(max_attempts: u32, base: Duration) -> Self {
        Self {
            max_attempts,
            delay: DelayStrategy::exponential(base),
            jitter: false,
            per_attempt_timeout: None,
            overall_timeout: None,
        }
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.per_attempt_timeout = Some(timeout);
        self
    }

    pub fn with_overall_timeout(mut self, timeout: Duration) -> Self {
        self.overall_timeout = Some(timeout);
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay after attempt `attempt` (1-based) failed.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let delay = self.delay.delay_for(attempt);
        if self.jitter {
            with_jitter(delay)
        } else {
            delay
        }
    }
}

impl Default for RetryPolicy {
    /// One-second fixed polling for up to a minute.
    fn default() -> Self {
        Self::fixed(50, Duration::from_secs(1))
            .with_attempt_timeout(Duration::from_secs(10))
            .with_overall_timeout(Duration::from_secs(60))
    }
}

/// Reported to the observer before each wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryEvent {
    /// The attempt that just failed (1-based).
    pub attempt: u32,
    /// How long the executor will wait before the next attempt.
    pub delay: Duration,
    pub reason: String,
}

pub type RetryObserver = Arc<dyn Fn(&RetryEvent) + Send + Sync>;

/// Failures surfaced by the executor.
#[derive(Debug, Error)]
pub enum PollError<E> {
    /// The overall deadline passed.
    #[error("gave up after {attempts} attempts: deadline of {elapsed:?} exceeded")]
    Timeout { attempts: u32, elapsed: Duration },

    /// An attempt failed in a way retrying cannot fix.
    #[error("attempt {attempt} failed permanently: {source}")]
    NonRetryable { attempt: u32, source: E },

    /// Every attempt was used without a result.
    #[error("no result after {attempts} attempts; last reason: {last_reason}")]
    RetriesExhausted { attempts: u32, last_reason: String },
}

impl<E> PollError<E> {
    /// Number of times the operation was invoked.
    pub fn attempts(&self) -> u32 {
        match self {
            PollError::Timeout { attempts, .. } => *attempts,
            PollError::NonRetryable { attempt, .. } => *attempt,
            PollError::RetriesExhausted { attempts, .. } => *attempts,
        }
    }
}

/// Wraps an operation with bounded retry, backoff and cancellation.
#[derive(Clone)]
pub struct PollExecutor {
    policy: RetryPolicy,
    label: String,
    observer: Option<RetryObserver>,
}

impl PollExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            label: "poll".to_string(),
            observer: None,
        }
    }

    /// Name used in logs and metrics, e.g. the resource being polled.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Register a callback invoked with every retry.
    pub fn on_retry<F>(mut self, observer: F) -> Self
    where
        F: Fn(&RetryEvent) + Send + Sync + 'static,
    {
        self.observer = Some(Arc::new(observer));
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Invoke `op` until it yields a value, fails permanently, runs out of
    /// attempts, or the overall deadline passes.
    ///
    /// `op` receives the 1-based attempt number.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, PollError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = PollOutcome<T, E>>,
        E: Retryable + fmt::Display,
    {
        let start = Instant::now();
        let deadline = self.policy.overall_timeout.map(|t| start + t);
        let max_attempts = self.policy.max_attempts.max(1);
        let mut last_reason = String::new();

        for attempt in 1..=max_attempts {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Err(self.timed_out(attempt - 1, start));
            }

            metrics::record_poll_attempt(&self.label);
            let limit = attempt_limit(self.policy.per_attempt_timeout, deadline);

            let reason = match run_bounded(limit, op(attempt)).await {
                Some(PollOutcome::Ready(value)) => {
                    tracing::debug!(target_resource = %self.label, attempt, "Poll succeeded");
                    metrics::record_poll_outcome(&self.label, "ready");
                    return Ok(value);
                }
                Some(PollOutcome::NotYetAvailable(reason)) => reason,
                Some(PollOutcome::Failed(err)) if err.is_retryable() => err.to_string(),
                Some(PollOutcome::Failed(err)) => {
                    tracing::warn!(target_resource = %self.label, attempt, error = %err, "Poll failed permanently");
                    metrics::record_poll_outcome(&self.label, "non_retryable");
                    return Err(PollError::NonRetryable {
                        attempt,
                        source: err,
                    });
                }
                None => format!("attempt timed out after {:?}", limit.unwrap_or_default()),
            };
            last_reason = reason;

            if attempt == max_attempts {
                break;
            }

            let mut delay = self.policy.delay_for(attempt);
            if let Some(deadline) = deadline {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    return Err(self.timed_out(attempt, start));
                }
                delay = delay.min(remaining);
            }

            let event = RetryEvent {
                attempt,
                delay,
                reason: last_reason.clone(),
            };
            tracing::info!(
                target_resource = %self.label,
                attempt = event.attempt,
                delay = ?event.delay,
                reason = %event.reason,
                "Retrying poll"
            );
            if let Some(observer) = &self.observer {
                observer(&event);
            }

            tokio::time::sleep(delay).await;
        }

        tracing::warn!(target_resource = %self.label, attempts = max_attempts, reason = %last_reason, "Poll retries exhausted");
        metrics::record_poll_outcome(&self.label, "exhausted");
        Err(PollError::RetriesExhausted {
            attempts: max_attempts,
            last_reason,
        })
    }

    fn timed_out<E>(&self, attempts: u32, start: Instant) -> PollError<E> {
        let elapsed = start.elapsed();
        tracing::warn!(target_resource = %self.label, attempts, elapsed = ?elapsed, "Poll deadline exceeded");
        metrics::record_poll_outcome(&self.label, "timeout");
        PollError::Timeout { attempts, elapsed }
    }
}

/// Run `op` under `policy` without an observer.
pub async fn poll_until<T, E, F, Fut>(policy: &RetryPolicy, op: F) -> Result<T, PollError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = PollOutcome<T, E>>,
    E: Retryable + fmt::Display,
{
    PollExecutor::new(policy.clone()).run(op).await
}
