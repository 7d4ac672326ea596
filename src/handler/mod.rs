//! Message-trigger handler.
//!
//! # Data Flow
//! ```text
//! broker delivery (host-controlled)
//!     → trigger.rs (payload → Message, provenance label)
//!     → handle() (log, map to TableEntityRecord)
//!     → host table-output binding writes the record
//! ```
//!
//! # Design Decisions
//! - The handler is a pure function; acknowledgement and completion belong to the host
//! - Both Service Bus and Event Hub triggers share one mapping

pub mod trigger;

use thiserror::Error;
use tracing::info;

use crate::model::{Message, TableEntityRecord};

pub use trigger::Trigger;

/// Errors returned to the host, which decides whether to redeliver.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Payload was not a valid message.
    #[error("invalid message payload: {0}")]
    Deserialize(#[from] serde_json::Error),

    /// Message text was blank.
    #[error("message {0} has no content")]
    EmptyMessage(uuid::Uuid),
}

/// Map one delivered message into the table entity written by the host.
pub fn handle(message: Message) -> Result<TableEntityRecord, HandlerError> {
    if message.message.trim().is_empty() {
        return Err(HandlerError::EmptyMessage(message.id));
    }

    info!(
        id = %message.id,
        via = %message.via,
        message = %message.message,
        "Received message"
    );

    Ok(TableEntityRecord::from(message))
}
