//! Configuration loading from file and environment.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::azd::load_azd_environment;
use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

pub const ENV_GATEWAY_URL: &str = "AZURE_API_MANAGEMENT_GATEWAY_URL";
pub const ENV_KEY_VAULT_URI: &str = "AZURE_KEY_VAULT_URI";
pub const ENV_INCLUDE_FUNCTION_APP: &str = "INCLUDE_FUNCTION_APP";
pub const ENV_INCLUDE_LOGIC_APP: &str = "INCLUDE_LOGIC_APP";
pub const ENV_SECRET_NAME: &str = "APIM_SUBSCRIPTION_KEY_SECRET_NAME";
pub const ENV_NAMESPACE: &str = "RELAY_NAMESPACE";
pub const ENV_SUBSCRIPTION_HEADER: &str = "RELAY_SUBSCRIPTION_HEADER";
pub const ENV_LOG_LEVEL: &str = "RELAY_LOG_LEVEL";
pub const ENV_CONFIG_FILE: &str = "RELAY_CONFIG";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing required setting {0}")]
    Missing(&'static str),

    #[error("Invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Where configuration comes from.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Optional TOML file; falls back to `RELAY_CONFIG`.
    pub config_path: Option<PathBuf>,
    /// Directory to start the azd `.azure` search from. `None` disables it.
    pub azd_search_from: Option<PathBuf>,
}

impl LoadOptions {
    /// File from `RELAY_CONFIG` plus azd discovery from the working directory.
    pub fn from_process() -> Self {
        Self {
            config_path: std::env::var_os(ENV_CONFIG_FILE).map(PathBuf::from),
            azd_search_from: std::env::current_dir().ok(),
        }
    }
}

/// Load a TOML file without validating it.
pub fn load_config_file(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Load, layer and validate configuration.
///
/// Order, later wins: TOML file, process environment, azd environment file.
/// Without a TOML file the gateway URL, vault URI and both include flags
/// are required from the environment.
pub fn load_config(options: &LoadOptions) -> Result<RelayConfig, ConfigError> {
    let (mut config, from_file) = match &options.config_path {
        Some(path) => (load_config_file(path)?, true),
        None => (RelayConfig::default(), false),
    };

    let mut vars: HashMap<String, String> = std::env::vars().collect();
    if let Some(start) = &options.azd_search_from {
        if let Some(azd) = load_azd_environment(start)? {
            vars.extend(azd);
        }
    }

    apply_env(&mut config, &vars, !from_file)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::debug!(
        gateway = %config.gateway.url,
        vault = %config.vault.uri,
        include_function_app = config.scenario.include_function_app,
        include_logic_app = config.scenario.include_logic_app,
        "Configuration loaded"
    );
    Ok(config)
}

/// Overlay recognized variables onto `config`.
///
/// With `require` set, missing core settings are errors instead of keeping
/// whatever `config` already holds.
pub fn apply_env(
    config: &mut RelayConfig,
    vars: &HashMap<String, String>,
    require: bool,
) -> Result<(), ConfigError> {
    let get = |key: &'static str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

    match get(ENV_GATEWAY_URL) {
        Some(url) => config.gateway.url = url.to_string(),
        None if require => return Err(ConfigError::Missing(ENV_GATEWAY_URL)),
        None => {}
    }
    match get(ENV_KEY_VAULT_URI) {
        Some(uri) => config.vault.uri = uri.to_string(),
        None if require => return Err(ConfigError::Missing(ENV_KEY_VAULT_URI)),
        None => {}
    }
    match get(ENV_INCLUDE_FUNCTION_APP) {
        Some(raw) => config.scenario.include_function_app = parse_bool(ENV_INCLUDE_FUNCTION_APP, raw)?,
        None if require => return Err(ConfigError::Missing(ENV_INCLUDE_FUNCTION_APP)),
        None => {}
    }
    match get(ENV_INCLUDE_LOGIC_APP) {
        Some(raw) => config.scenario.include_logic_app = parse_bool(ENV_INCLUDE_LOGIC_APP, raw)?,
        None if require => return Err(ConfigError::Missing(ENV_INCLUDE_LOGIC_APP)),
        None => {}
    }

    if let Some(name) = get(ENV_SECRET_NAME) {
        config.vault.subscription_key_secret = name.to_string();
    }
    if let Some(namespace) = get(ENV_NAMESPACE) {
        config.gateway.namespace = namespace.to_string();
    }
    if let Some(header) = get(ENV_SUBSCRIPTION_HEADER) {
        config.gateway.subscription_header = header.to_string();
    }
    if let Some(level) = get(ENV_LOG_LEVEL) {
        config.observability.log_level = level.to_string();
    }

    Ok(())
}

/// Parse a boolean setting, tolerating the usual spellings.
pub fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
        }),
    }
}
