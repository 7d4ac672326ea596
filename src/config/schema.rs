//! Configuration schema definitions.
//!
//! All types derive Serde traits so the whole structure can come from a TOML
//! file; environment variables are layered on top by the loader.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::PARTITION_KEY;
use crate::resilience::{DelayStrategy, RetryPolicy};

/// Root configuration, built once at startup and passed to constructors.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RelayConfig {
    /// Gateway the scenario publishes through and reads back from.
    pub gateway: GatewayConfig,

    /// Vault holding the gateway subscription key.
    pub vault: VaultConfig,

    /// Which assertions the scenario runs.
    pub scenario: ScenarioConfig,

    /// Poll executor settings.
    pub polling: PollingConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Gateway client configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct GatewayConfig {
    /// Base URL, e.g. "https://contoso.azure-api.net".
    pub url: String,

    /// Path segment every API lives under.
    pub namespace: String,

    /// Header carrying the subscription key.
    pub subscription_header: String,

    /// Ask the gateway to emit request traces.
    pub trace: bool,

    /// Timeout for a single HTTP round trip in seconds.
    pub request_timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            namespace: PARTITION_KEY.to_string(),
            subscription_header: "Subscription-Key".to_string(),
            trace: false,
            request_timeout_secs: 30,
        }
    }
}

/// Vault configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct VaultConfig {
    /// Vault base URI, e.g. "https://contoso.vault.azure.net/".
    pub uri: String,

    /// Name of the secret holding the gateway subscription key.
    pub subscription_key_secret: String,

    /// OAuth2 authority used for the client-credentials flow.
    pub authority_host: String,

    /// Token scope requested for vault access.
    pub scope: String,

    /// Timeout for vault and token requests in seconds.
    pub request_timeout_secs: u64,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            uri: String::new(),
            subscription_key_secret: "apim-master-subscription-key".to_string(),
            authority_host: "https://login.microsoftonline.com".to_string(),
            scope: "https://vault.azure.net/.default".to_string(),
            request_timeout_secs: 15,
        }
    }
}

/// Scenario switches.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Check the table entity written by the function app.
    pub include_function_app: bool,

    /// Check the blob written by the logic app.
    pub include_logic_app: bool,

    /// Message text published when none is given.
    pub message: String,

    /// Provenance every fetched record must carry.
    pub expected_via: String,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            include_function_app: false,
            include_logic_app: false,
            message: "Hello, world!".to_string(),
            expected_via: "Service Bus".to_string(),
        }
    }
}

/// Poll executor configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PollingConfig {
    /// Maximum attempts per polled resource.
    pub max_attempts: u32,

    /// Wait between attempts.
    pub delay: DelayStrategy,

    /// Add up to 10% jitter to each wait.
    pub jitter: bool,

    /// Timeout for one attempt in milliseconds.
    pub attempt_timeout_ms: Option<u64>,

    /// Deadline for the whole poll in milliseconds.
    pub overall_timeout_ms: Option<u64>,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            max_attempts: 50,
            delay: DelayStrategy::fixed(Duration::from_secs(1)),
            jitter: false,
            attempt_timeout_ms: Some(10_000),
            overall_timeout_ms: Some(60_000),
        }
    }
}

impl PollingConfig {
    /// Build the executor policy.
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            delay: self.delay,
            jitter: self.jitter,
            per_attempt_timeout: self.attempt_timeout_ms.map(Duration::from_millis),
            overall_timeout: self.overall_timeout_ms.map(Duration::from_millis),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_matches_polling_defaults() {
        let policy = PollingConfig::default().to_policy();
        assert_eq!(policy, RetryPolicy::default());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: RelayConfig = toml::from_str(
            r#"
            [gateway]
            url = "https://contoso.azure-api.net"

            [polling]
            max_attempts = 5
            [polling.delay]
            strategy = "exponential"
            base = 200
            "#,
        )
        .unwrap();

        assert_eq!(config.gateway.namespace, "aisquick-sample");
        assert_eq!(config.polling.max_attempts, 5);
        assert_eq!(
            config.polling.delay,
            DelayStrategy::exponential(Duration::from_millis(200))
        );
        assert_eq!(config.polling.overall_timeout_ms, Some(60_000));
        assert_eq!(config.vault.subscription_key_secret, "apim-master-subscription-key");
    }
}
