//! Key Vault REST client.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use crate::config::VaultConfig;
use crate::vault::auth::VaultCredential;
use crate::vault::{VaultError, VaultResult};

const SECRETS_API_VERSION: &str = "7.4";

#[derive(Deserialize)]
struct SecretBundle {
    value: Option<String>,
}

/// Resolves named secrets from one vault.
#[derive(Clone)]
pub struct VaultClient {
    http: reqwest::Client,
    vault_uri: Url,
    credential: VaultCredential,
}

impl VaultClient {
    /// Create a client with its own connection pool.
    pub fn new(vault_uri: &str, credential: VaultCredential, timeout: Duration) -> VaultResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VaultError::InvalidRequest(format!("failed to build HTTP client: {e}")))?;
        Self::with_http_client(http, vault_uri, credential)
    }

    pub fn from_config(config: &VaultConfig, credential: VaultCredential) -> VaultResult<Self> {
        Self::new(
            &config.uri,
            credential,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Create a client on an existing connection pool.
    pub fn with_http_client(
        http: reqwest::Client,
        vault_uri: &str,
        credential: VaultCredential,
    ) -> VaultResult<Self> {
        let mut vault_uri = Url::parse(vault_uri)
            .map_err(|e| VaultError::InvalidRequest(format!("invalid vault URI '{vault_uri}': {e}")))?;
        if !vault_uri.path().ends_with('/') {
            let path = format!("{}/", vault_uri.path());
            vault_uri.set_path(&path);
        }

        Ok(Self {
            http,
            vault_uri,
            credential,
        })
    }

    pub fn vault_uri(&self) -> &Url {
        &self.vault_uri
    }

    fn secret_url(&self, secret_name: &str) -> VaultResult<Url> {
        let valid = !secret_name.is_empty()
            && secret_name.len() <= 127
            && secret_name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !valid {
            return Err(VaultError::InvalidRequest(format!(
                "'{secret_name}' is not a valid secret name"
            )));
        }

        let mut url = self
            .vault_uri
            .join(&format!("secrets/{secret_name}"))
            .map_err(|e| VaultError::InvalidRequest(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("api-version", SECRETS_API_VERSION);
        Ok(url)
    }

    /// Fetch the current value of `secret_name`.
    pub async fn resolve(&self, secret_name: &str) -> VaultResult<String> {
        let url = self.secret_url(secret_name)?;
        let token = self.credential.bearer(&self.http).await?;

        tracing::info!(vault = %self.vault_uri, secret = %secret_name, "Resolving secret");

        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| VaultError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let err = status_error(status, secret_name);
            tracing::warn!(secret = %secret_name, status = %status, error = %err, "Secret lookup failed");
            return Err(err);
        }

        let bundle: SecretBundle = response
            .json()
            .await
            .map_err(|e| VaultError::Malformed(e.to_string()))?;
        bundle
            .value
            .ok_or_else(|| VaultError::Malformed(format!("secret '{secret_name}' has no value")))
    }
}

impl std::fmt::Debug for VaultClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultClient")
            .field("vault_uri", &self.vault_uri.as_str())
            .field("credential", &self.credential)
            .finish()
    }
}

/// Map a non-success vault status to an error.
pub(crate) fn status_error(status: StatusCode, secret_name: &str) -> VaultError {
    match status.as_u16() {
        404 => VaultError::SecretNotFound {
            name: secret_name.to_string(),
        },
        401 | 403 => VaultError::AuthFailure { status },
        _ => VaultError::Unavailable(format!("vault returned {status}")),
    }
}

/// One-shot resolve on an existing connection pool.
pub async fn resolve_secret(
    http: &reqwest::Client,
    vault_uri: &str,
    credential: VaultCredential,
    secret_name: &str,
) -> VaultResult<String> {
    VaultClient::with_http_client(http.clone(), vault_uri, credential)?
        .resolve(secret_name)
        .await
}
