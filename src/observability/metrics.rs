//! Metrics collection.
//!
//! # Metrics
//! - `relay_poll_attempts_total` (counter): attempts by polled resource
//! - `relay_poll_outcomes_total` (counter): final outcome by resource
//!   (ready, non_retryable, exhausted, timeout)
//! - `relay_scenarios_total` (counter): scenario runs by result
//! - `relay_scenario_duration_seconds` (histogram): end-to-end latency

use std::time::Instant;

pub fn record_poll_attempt(target: &str) {
    metrics::counter!("relay_poll_attempts_total", "target" => target.to_string()).increment(1);
}

pub fn record_poll_outcome(target: &str, outcome: &'static str) {
    metrics::counter!(
        "relay_poll_outcomes_total",
        "target" => target.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_scenario(passed: bool, start: Instant) {
    let result = if passed { "passed" } else { "failed" };
    metrics::counter!("relay_scenarios_total", "result" => result).increment(1);
    metrics::histogram!("relay_scenario_duration_seconds").record(start.elapsed().as_secs_f64());
}
