//! Messages flowing through the broker and the publish endpoint.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A message delivered by the broker trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub message: String,
    /// Provenance label, e.g. "Service Bus". Older publishers omit it.
    #[serde(default)]
    pub via: String,
}

impl Message {
    /// Create a message with a fresh v4 id.
    pub fn new(message: impl Into<String>, via: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: message.into(),
            via: via.into(),
        }
    }
}

/// Body of `POST /{namespace}/messages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishMessageRequest {
    pub message: String,
}

impl PublishMessageRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response of `POST /{namespace}/messages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishMessageResponse {
    pub id: String,
}
