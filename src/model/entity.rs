//! Persisted representations of a relayed message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::message::Message;

/// Partition every sample record lands in.
pub const PARTITION_KEY: &str = "aisquick-sample";

/// A row in the sample table, addressed by (partition_key, row_key).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableEntityRecord {
    pub partition_key: String,
    /// The message id, hyphenated lowercase.
    pub row_key: String,
    pub message: String,
    #[serde(default)]
    pub via: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Opaque concurrency token assigned by the store.
    #[serde(default, alias = "odata.etag", skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

impl TableEntityRecord {
    /// Key pair identifying this record in the table.
    pub fn key(&self) -> (&str, &str) {
        (&self.partition_key, &self.row_key)
    }
}

impl From<Message> for TableEntityRecord {
    fn from(message: Message) -> Self {
        Self {
            partition_key: PARTITION_KEY.to_string(),
            row_key: message.id.to_string(),
            message: message.message,
            via: message.via,
            timestamp: None,
            etag: None,
        }
    }
}

/// Blob written by the workflow path, as returned by `GET /blobs/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobRecord {
    pub id: String,
    pub message: String,
    #[serde(default)]
    pub via: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_message() {
        let msg = Message::new("Hello, world!", "Service Bus");
        let id = msg.id.to_string();
        let record = TableEntityRecord::from(msg);
        assert_eq!(record.key(), (PARTITION_KEY, id.as_str()));
        assert_eq!(record.message, "Hello, world!");
        assert_eq!(record.via, "Service Bus");
        assert!(record.timestamp.is_none());
    }

    #[test]
    fn test_record_accepts_store_metadata() {
        let json = r#"{
            "partitionKey": "aisquick-sample",
            "rowKey": "abc123",
            "message": "Hello, world!",
            "via": "Service Bus",
            "timestamp": "2025-05-01T10:00:00Z",
            "odata.etag": "W/\"datetime'2025-05-01T10%3A00%3A00Z'\""
        }"#;
        let record: TableEntityRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.row_key, "abc123");
        assert!(record.timestamp.is_some());
        assert!(record.etag.as_deref().unwrap().starts_with("W/"));
    }
}
