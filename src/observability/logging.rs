//! Structured logging.
//!
//! Installs a `tracing` subscriber once per process. The filter comes from
//! `RUST_LOG` when set, otherwise from the configured level.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Default directives when neither `RUST_LOG` nor config says otherwise.
pub const DEFAULT_FILTER: &str = "relay_sample=info,reqwest=warn";

/// Build the filter for the given config.
pub fn build_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directives = if config.log_level.trim().is_empty() {
            DEFAULT_FILTER.to_string()
        } else {
            format!("relay_sample={},reqwest=warn", config.log_level.trim())
        };
        EnvFilter::new(directives)
    })
}

/// Initialize the global subscriber.
///
/// Returns an error if a subscriber was already installed.
pub fn init_logging(
    config: &ObservabilityConfig,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    let registry = tracing_subscriber::registry().with(build_filter(config));

    if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .try_init()
    }
}
