//! Field checks on records read back from the gateway.

use crate::model::{BlobRecord, TableEntityRecord, PARTITION_KEY};
use crate::scenario::{ScenarioError, Target};

/// What every record must contain.
#[derive(Debug, Clone, Copy)]
pub struct Expected<'a> {
    pub id: &'a str,
    pub message: &'a str,
    pub via: &'a str,
}

fn expect_field(target: Target, field: &'static str, expected: &str, actual: &str) -> Result<(), ScenarioError> {
    if expected == actual {
        return Ok(());
    }
    Err(ScenarioError::Mismatch {
        target,
        field,
        expected: expected.to_string(),
        actual: actual.to_string(),
    })
}

pub fn check_table_entity(record: &TableEntityRecord, expected: Expected<'_>) -> Result<(), ScenarioError> {
    let target = Target::TableEntity;
    expect_field(target, "partitionKey", PARTITION_KEY, &record.partition_key)?;
    expect_field(target, "rowKey", expected.id, &record.row_key)?;
    expect_field(target, "message", expected.message, &record.message)?;
    expect_field(target, "via", expected.via, &record.via)
}

pub fn check_blob(record: &BlobRecord, expected: Expected<'_>) -> Result<(), ScenarioError> {
    let target = Target::Blob;
    expect_field(target, "id", expected.id, &record.id)?;
    expect_field(target, "message", expected.message, &record.message)?;
    expect_field(target, "via", expected.via, &record.via)
}
