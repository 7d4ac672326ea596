//! Bearer tokens for vault access.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

use crate::config::VaultConfig;
use crate::vault::{VaultError, VaultResult};

pub const ENV_STATIC_TOKEN: &str = "AZURE_KEY_VAULT_TOKEN";
pub const ENV_TENANT_ID: &str = "AZURE_TENANT_ID";
pub const ENV_CLIENT_ID: &str = "AZURE_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";
pub const ENV_AUTHORITY_HOST: &str = "AZURE_AUTHORITY_HOST";

/// Service-principal settings for the client-credentials flow.
#[derive(Clone)]
pub struct ClientCredentials {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
    pub authority_host: String,
}

impl ClientCredentials {
    fn token_endpoint(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority_host.trim_end_matches('/'),
            self.tenant_id
        )
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("scope", &self.scope)
            .field("authority_host", &self.authority_host)
            .finish_non_exhaustive()
    }
}

/// How the resolver authenticates to the vault.
#[derive(Clone)]
pub enum VaultCredential {
    /// A pre-acquired bearer token.
    StaticToken(String),
    /// Service principal exchanged for a token on each resolve.
    ClientCredentials(ClientCredentials),
}

impl fmt::Debug for VaultCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VaultCredential::StaticToken(_) => f.write_str("StaticToken(<redacted>)"),
            VaultCredential::ClientCredentials(c) => f.debug_tuple("ClientCredentials").field(c).finish(),
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl VaultCredential {
    /// Pick a credential from variables: a static token wins, otherwise the
    /// tenant/client/secret triple is required.
    pub fn from_vars(vars: &HashMap<String, String>, vault: &VaultConfig) -> VaultResult<Self> {
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(token) = get(ENV_STATIC_TOKEN) {
            return Ok(Self::StaticToken(token));
        }

        let require = |key: &str| {
            get(key).ok_or_else(|| {
                VaultError::Credentials(format!(
                    "set {ENV_STATIC_TOKEN}, or {ENV_TENANT_ID}, {ENV_CLIENT_ID} and {ENV_CLIENT_SECRET} ({key} missing)"
                ))
            })
        };

        Ok(Self::ClientCredentials(ClientCredentials {
            tenant_id: require(ENV_TENANT_ID)?,
            client_id: require(ENV_CLIENT_ID)?,
            client_secret: require(ENV_CLIENT_SECRET)?,
            scope: vault.scope.clone(),
            authority_host: get(ENV_AUTHORITY_HOST).unwrap_or_else(|| vault.authority_host.clone()),
        }))
    }

    /// `from_vars` over the process environment.
    pub fn from_env(vault: &VaultConfig) -> VaultResult<Self> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars, vault)
    }

    /// Obtain a bearer token for the next vault request.
    pub async fn bearer(&self, http: &reqwest::Client) -> VaultResult<String> {
        match self {
            VaultCredential::StaticToken(token) => Ok(token.clone()),
            VaultCredential::ClientCredentials(creds) => request_access_token(http, creds).await,
        }
    }
}

/// OAuth2 client-credentials grant against the configured authority.
pub async fn request_access_token(
    http: &reqwest::Client,
    creds: &ClientCredentials,
) -> VaultResult<String> {
    let params = [
        ("client_id", creds.client_id.as_str()),
        ("client_secret", creds.client_secret.as_str()),
        ("scope", creds.scope.as_str()),
        ("grant_type", "client_credentials"),
    ];

    let response = http
        .post(creds.token_endpoint())
        .form(&params)
        .send()
        .await
        .map_err(|e| VaultError::Unavailable(format!("token request failed: {e}")))?;

    let status = response.status();
    if matches!(status.as_u16(), 400 | 401 | 403) {
        tracing::warn!(tenant = %creds.tenant_id, client_id = %creds.client_id, status = %status, "Token request rejected");
        return Err(VaultError::AuthFailure { status });
    }
    if !status.is_success() {
        return Err(VaultError::Unavailable(format!("token endpoint returned {status}")));
    }

    let payload: TokenResponse = response
        .json()
        .await
        .map_err(|e| VaultError::Malformed(format!("token response: {e}")))?;

    tracing::debug!(tenant = %creds.tenant_id, "Acquired vault access token");
    Ok(payload.access_token)
}
