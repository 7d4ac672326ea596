//! End-to-end workflow scenario.
//!
//! # Data Flow
//! ```text
//! message text
//!     → GatewayClient::publish_message (exactly once)
//!     → id
//!     → PollExecutor("table-entities") → assertions   [include_function_app]
//!     → PollExecutor("blobs")          → assertions   [include_logic_app]
//!     → ScenarioReport
//! ```

pub mod assertions;
pub mod runner;

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::gateway::GatewayError;
use crate::model::{BlobRecord, TableEntityRecord};
use crate::resilience::PollError;

pub use runner::{ScenarioOptions, ScenarioRunner};

/// A record the scenario reads back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// Written by the function app's table binding.
    TableEntity,
    /// Written by the logic app.
    Blob,
}

impl Target {
    /// Gateway collection the record is served from.
    pub fn collection(self) -> &'static str {
        match self {
            Target::TableEntity => "table-entities",
            Target::Blob => "blobs",
        }
    }

    pub fn path(self, id: &str) -> String {
        format!("{}/{id}", self.collection())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Target::TableEntity => "table entity",
            Target::Blob => "blob",
        })
    }
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("publish failed: {0}")]
    Publish(#[source] GatewayError),

    #[error("publish returned an empty id")]
    EmptyId,

    #[error("{target} never became available: {source}")]
    Poll {
        target: Target,
        #[source]
        source: PollError<GatewayError>,
    },

    #[error("{target} field '{field}' mismatch: expected {expected:?}, got {actual:?}")]
    Mismatch {
        target: Target,
        field: &'static str,
        expected: String,
        actual: String,
    },
}

/// What a successful run checked.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioReport {
    pub id: String,
    pub message: String,
    pub table_entity: Option<TableEntityRecord>,
    pub blob: Option<BlobRecord>,
    pub elapsed: Duration,
}

impl ScenarioReport {
    pub fn checked(&self) -> Vec<Target> {
        let mut targets = Vec::new();
        if self.table_entity.is_some() {
            targets.push(Target::TableEntity);
        }
        if self.blob.is_some() {
            targets.push(Target::Blob);
        }
        targets
    }
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Published {:?} as {}", self.message, self.id)?;
        if let Some(entity) = &self.table_entity {
            writeln!(
                f,
                "  table entity ok: {}/{} via {}",
                entity.partition_key, entity.row_key, entity.via
            )?;
        }
        if let Some(blob) = &self.blob {
            writeln!(f, "  blob ok: {} via {}", blob.id, blob.via)?;
        }
        if self.checked().is_empty() {
            writeln!(f, "  no read-back targets enabled")?;
        }
        write!(f, "Completed in {:.2?}", self.elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_paths() {
        assert_eq!(Target::TableEntity.path("abc123"), "table-entities/abc123");
        assert_eq!(Target::Blob.path("abc123"), "blobs/abc123");
    }

    #[test]
    fn test_mismatch_names_field() {
        let err = ScenarioError::Mismatch {
            target: Target::TableEntity,
            field: "via",
            expected: "Service Bus".into(),
            actual: "Event Hub".into(),
        };
        assert_eq!(
            err.to_string(),
            r#"table entity field 'via' mismatch: expected "Service Bus", got "Event Hub""#
        );
    }

    #[test]
    fn test_report_lists_checked_targets() {
        let report = ScenarioReport {
            id: "abc123".into(),
            message: "Hello, world!".into(),
            table_entity: None,
            blob: Some(BlobRecord {
                id: "abc123".into(),
                message: "Hello, world!".into(),
                via: "Service Bus".into(),
            }),
            elapsed: Duration::from_millis(1500),
        };
        assert_eq!(report.checked(), vec![Target::Blob]);
        let rendered = report.to_string();
        assert!(rendered.contains("blob ok: abc123 via Service Bus"));
        assert!(!rendered.contains("table entity ok"));
    }
}
