//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional TOML file (RELAY_CONFIG / --config)
//!     → loader.rs (parse & deserialize)
//!     → process environment overlay
//!     → azd.rs (.azure/<env>/.env overlay, when found)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//!     → passed by reference into client constructors
//! ```
//!
//! # Design Decisions
//! - Config is read once at process start; clients never read the environment
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod azd;
pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError, LoadOptions};
pub use schema::{
    GatewayConfig, ObservabilityConfig, PollingConfig, RelayConfig, ScenarioConfig, VaultConfig,
};
pub use validation::ValidationError;
