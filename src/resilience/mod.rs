//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Read from gateway:
//!     → retries.rs (PollExecutor: attempt loop, classification)
//!     → timeouts.rs (bound each attempt by its timeout and the deadline)
//!     → On retryable outcome: backoff.rs (fixed or exponential delay)
//!     → observer callback + tracing event, then non-blocking sleep
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every attempt has a deadline when configured
//! - Retries only for idempotent reads; publishing happens once
//! - 404/425 mean "not there yet"; other 4xx fail fast

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use backoff::DelayStrategy;
pub use retries::{
    poll_until, PollError, PollExecutor, PollOutcome, RetryEvent, RetryPolicy, Retryable,
};
