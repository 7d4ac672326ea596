//! Trigger bindings the host invokes the handler through.

use serde::{Deserialize, Serialize};

use crate::handler::{handle, HandlerError};
use crate::model::{Message, TableEntityRecord};

/// Broker binding a message arrived on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Trigger {
    ServiceBus { topic: String, subscription: String },
    EventHub { hub: String, consumer_group: String },
}

impl Trigger {
    /// Service Bus topic subscription used by the function app.
    pub fn service_bus() -> Self {
        Self::ServiceBus {
            topic: "aisquick-sample".to_string(),
            subscription: "function-app".to_string(),
        }
    }

    /// Event Hub consumer group used by the function app.
    pub fn event_hub() -> Self {
        Self::EventHub {
            hub: "aisquick-sample".to_string(),
            consumer_group: "function-app".to_string(),
        }
    }

    /// Provenance label recorded in the `via` field.
    pub fn via(&self) -> &'static str {
        match self {
            Trigger::ServiceBus { .. } => "Service Bus",
            Trigger::EventHub { .. } => "Event Hub",
        }
    }

    /// Decode a raw delivery body and run the handler on it.
    ///
    /// Messages published without a `via` are stamped with this trigger's label.
    pub fn handle_payload(&self, payload: &[u8]) -> Result<TableEntityRecord, HandlerError> {
        let mut message: Message = serde_json::from_slice(payload)?;
        if message.via.is_empty() {
            message.via = self.via().to_string();
        }

        tracing::debug!(trigger = ?self, id = %message.id, "Dispatching delivery");
        handle(message)
    }
}

impl Default for Trigger {
    fn default() -> Self {
        Self::service_bus()
    }
}
