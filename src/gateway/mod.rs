//! Gateway API client.
//!
//! # Data Flow
//! ```text
//! GatewayConfig + subscription key
//!     → client.rs (immutable header set, shared connection pool)
//!     → POST /{namespace}/messages
//!     → GET  /{namespace}/table-entities/{id} | /{namespace}/blobs/{id}
//! ```
//!
//! Every call is one round trip. Retrying reads is the poll executor's job;
//! `poll_json` only classifies a single attempt.

pub mod client;

use reqwest::StatusCode;
use thiserror::Error;

use crate::resilience::Retryable;

pub use client::GatewayClient;

/// Errors from a single gateway round trip.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("gateway returned {status}: {body}")]
    Http { status: StatusCode, body: String },

    #[error("unexpected response body: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// A failure status carrying what looks like a success payload.
    #[error("gateway returned {status} with a success-shaped body")]
    Ambiguous { status: StatusCode },

    #[error("invalid gateway URL: {0}")]
    InvalidUrl(String),

    #[error("invalid header: {0}")]
    InvalidHeader(String),
}

impl Retryable for GatewayError {
    fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Transport(_) => true,
            GatewayError::Http { status, .. } => is_pending_status(*status) || status.is_server_error(),
            _ => false,
        }
    }
}

/// Statuses meaning "the record is not there yet".
pub(crate) fn is_pending_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 404 | 425)
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn http(code: u16) -> GatewayError {
        GatewayError::Http {
            status: StatusCode::from_u16(code).unwrap(),
            body: String::new(),
        }
    }

    #[test]
    fn test_retryable_statuses() {
        for code in [404, 425, 500, 502, 503, 504] {
            assert!(http(code).is_retryable(), "{code} should be retryable");
        }
        for code in [400, 401, 403, 409, 429] {
            assert!(!http(code).is_retryable(), "{code} should be fatal");
        }
    }

    #[test]
    fn test_other_errors_are_fatal() {
        let decode = serde_json::from_str::<u32>("nope").unwrap_err();
        assert!(!GatewayError::Deserialization(decode).is_retryable());
        assert!(!GatewayError::Ambiguous {
            status: StatusCode::BAD_REQUEST
        }
        .is_retryable());
        assert!(!GatewayError::InvalidHeader("x".into()).is_retryable());
    }
}
