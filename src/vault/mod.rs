//! Secret resolution subsystem.
//!
//! # Data Flow
//! ```text
//! VaultConfig + credential variables
//!     → auth.rs (static bearer or OAuth2 client-credentials token)
//!     → client.rs (GET {vault}/secrets/{name}?api-version=7.4)
//!     → secret value handed to the gateway client
//! ```
//!
//! # Security Constraints
//! - Secret values and client secrets are never logged or printed by Debug
//! - Nothing is retried here; the caller decides
//! - Credentials come only from the environment the binaries pass in

pub mod auth;
pub mod client;

use reqwest::StatusCode;
use thiserror::Error;

pub use auth::{ClientCredentials, VaultCredential};
pub use client::{resolve_secret, VaultClient};

/// Errors that can occur while resolving a secret.
#[derive(Debug, Error)]
pub enum VaultError {
    /// The vault has no secret with that name.
    #[error("secret '{name}' not found")]
    SecretNotFound { name: String },

    /// Credentials were rejected by the vault or the token endpoint.
    #[error("authentication rejected ({status})")]
    AuthFailure { status: StatusCode },

    /// No usable credential could be built.
    #[error("credential error: {0}")]
    Credentials(String),

    /// Network failure or server-side error.
    #[error("vault unavailable: {0}")]
    Unavailable(String),

    /// The response did not look like a secret bundle or token.
    #[error("malformed vault response: {0}")]
    Malformed(String),

    /// The secret name or vault address cannot form a request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

pub type VaultResult<T> = Result<T, VaultError>;
