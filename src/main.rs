//! relay-sample: end-to-end check of the messaging relay.
//!
//! ```text
//!   config (TOML, env, azd)
//!        │
//!        ▼
//!   ┌─────────┐  subscription key   ┌─────────┐  POST /messages
//!   │  vault  │ ──────────────────▶ │ gateway │ ───────────────▶ broker ─▶ function app ─▶ table
//!   └─────────┘                     │ client  │                         └▶ logic app ────▶ blob
//!                                   └────┬────┘
//!                                        │ GET /table-entities/{id}, /blobs/{id}
//!                                        ▼
//!                                 poll executor ─▶ assertions ─▶ report
//! ```
//!
//! Usage: `relay-sample [message]`. Exits with status 1 when the scenario
//! fails.

use std::time::Duration;

use relay_sample::config::{load_config, LoadOptions};
use relay_sample::observability::logging::init_logging;
use relay_sample::scenario::{ScenarioOptions, ScenarioRunner};
use relay_sample::vault::{VaultClient, VaultCredential};
use relay_sample::GatewayClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&LoadOptions::from_process())?;
    if let Err(e) = init_logging(&config.observability) {
        eprintln!("logging already initialized: {e}");
    }

    tracing::info!(
        gateway = %config.gateway.url,
        include_function_app = config.scenario.include_function_app,
        include_logic_app = config.scenario.include_logic_app,
        "relay-sample v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let message = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config.scenario.message.clone());

    // One pool for vault and gateway traffic.
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.gateway.request_timeout_secs))
        .build()?;

    let credential = VaultCredential::from_env(&config.vault)?;
    let vault = VaultClient::with_http_client(http.clone(), &config.vault.uri, credential)?;
    let subscription_key = vault.resolve(&config.vault.subscription_key_secret).await?;

    let gateway = GatewayClient::with_http_client(http, &config.gateway, &subscription_key)?;
    let runner = ScenarioRunner::new(gateway, ScenarioOptions::from_config(&config));

    match runner.run(&message).await {
        Ok(report) => {
            println!("{report}");
            Ok(())
        }
        Err(e) => {
            eprintln!("Scenario failed: {e}");
            std::process::exit(1);
        }
    }
}
