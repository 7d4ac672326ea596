//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate endpoints parse as http(s) URLs
//! - Validate value ranges (attempts >= 1, non-zero delays, timeout ordering)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: RelayConfig → Result<(), Vec<ValidationError>>

use std::fmt;
use std::time::Duration;

use reqwest::header::HeaderName;
use url::Url;

use crate::config::schema::RelayConfig;
use crate::resilience::DelayStrategy;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

fn check_http_url(field: &'static str, raw: &str, errors: &mut Vec<ValidationError>) {
    if raw.trim().is_empty() {
        errors.push(ValidationError::new(field, "must be set"));
        return;
    }
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported URL {url}; expected http(s) with a host"),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL: {e}"))),
    }
}

/// Check a loaded configuration for semantic errors.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_http_url("gateway.url", &config.gateway.url, &mut errors);
    check_http_url("vault.uri", &config.vault.uri, &mut errors);
    check_http_url("vault.authority_host", &config.vault.authority_host, &mut errors);

    let namespace = config.gateway.namespace.trim_matches('/');
    if namespace.is_empty() || namespace.contains('/') {
        errors.push(ValidationError::new(
            "gateway.namespace",
            "must be a single non-empty path segment",
        ));
    }
    if HeaderName::from_bytes(config.gateway.subscription_header.as_bytes()).is_err() {
        errors.push(ValidationError::new(
            "gateway.subscription_header",
            "is not a valid HTTP header name",
        ));
    }
    if config.gateway.request_timeout_secs == 0 {
        errors.push(ValidationError::new("gateway.request_timeout_secs", "must be > 0"));
    }
    if config.vault.subscription_key_secret.trim().is_empty() {
        errors.push(ValidationError::new("vault.subscription_key_secret", "must be set"));
    }
    if config.vault.request_timeout_secs == 0 {
        errors.push(ValidationError::new("vault.request_timeout_secs", "must be > 0"));
    }

    let polling = &config.polling;
    if polling.max_attempts == 0 {
        errors.push(ValidationError::new("polling.max_attempts", "must be >= 1"));
    }
    let zero_delay = match polling.delay {
        DelayStrategy::Fixed { delay } => delay == Duration::ZERO,
        DelayStrategy::Exponential { base, .. } => base == Duration::ZERO,
    };
    if zero_delay {
        errors.push(ValidationError::new("polling.delay", "must be > 0"));
    }
    if polling.attempt_timeout_ms == Some(0) {
        errors.push(ValidationError::new("polling.attempt_timeout_ms", "must be > 0"));
    }
    if polling.overall_timeout_ms == Some(0) {
        errors.push(ValidationError::new("polling.overall_timeout_ms", "must be > 0"));
    }
    if let (Some(attempt), Some(overall)) = (polling.attempt_timeout_ms, polling.overall_timeout_ms) {
        if attempt > overall {
            errors.push(ValidationError::new(
                "polling.attempt_timeout_ms",
                format!("{attempt} exceeds overall_timeout_ms {overall}"),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
