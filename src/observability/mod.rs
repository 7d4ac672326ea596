//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (poll attempt/outcome counters, scenario results)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → any `metrics` recorder the embedding process installs
//! ```
//!
//! # Design Decisions
//! - Structured fields, never interpolated secrets
//! - `RUST_LOG` wins over the configured level
//! - Metrics are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
