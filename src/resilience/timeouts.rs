//! Timeout enforcement for single attempts.
//!
//! Every attempt is bounded by the tighter of its own timeout and whatever is
//! left of the overall deadline.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

/// Time an attempt starting now may run for, if bounded at all.
pub fn attempt_limit(per_attempt: Option<Duration>, deadline: Option<Instant>) -> Option<Duration> {
    let remaining = deadline.map(|d| d.saturating_duration_since(Instant::now()));
    match (per_attempt, remaining) {
        (Some(a), Some(r)) => Some(a.min(r)),
        (Some(a), None) => Some(a),
        (None, Some(r)) => Some(r),
        (None, None) => None,
    }
}

/// Drive `fut` to completion, or return `None` once `limit` elapses.
///
/// The future is dropped on timeout, cancelling any in-flight request.
pub async fn run_bounded<F: Future>(limit: Option<Duration>, fut: F) -> Option<F::Output> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut).await.ok(),
        None => Some(fut.await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_attempt_limit_takes_tighter_bound() {
        let deadline = Instant::now() + Duration::from_secs(3);
        assert_eq!(
            attempt_limit(Some(Duration::from_secs(10)), Some(deadline)),
            Some(Duration::from_secs(3))
        );
        assert_eq!(
            attempt_limit(Some(Duration::from_secs(1)), Some(deadline)),
            Some(Duration::from_secs(1))
        );
        assert_eq!(attempt_limit(None, None), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_bounded_cancels_slow_future() {
        let slow = tokio::time::sleep(Duration::from_secs(5));
        assert!(run_bounded(Some(Duration::from_secs(1)), slow).await.is_none());

        let fast = async { 7 };
        assert_eq!(run_bounded(Some(Duration::from_secs(1)), fast).await, Some(7));
        assert_eq!(run_bounded(None, async { 8 }).await, Some(8));
    }
}
