//! End-to-end client for the sample messaging relay.
//!
//! Publishes a message through the gateway, waits for the function app and
//! logic app to persist it, and checks what they wrote. Also contains the
//! pure message handler the function app runs.

pub mod config;
pub mod gateway;
pub mod handler;
pub mod model;
pub mod observability;
pub mod resilience;
pub mod scenario;
pub mod vault;

pub use config::schema::RelayConfig;
pub use gateway::GatewayClient;
pub use scenario::{ScenarioReport, ScenarioRunner};
