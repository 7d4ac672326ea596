//! Wire and storage types shared by the handler and the scenario client.
//!
//! # Data Flow
//! ```text
//! PublishMessageRequest ──POST /messages──▶ gateway ──▶ broker topic
//!                                                         │
//!                        Message (id, message, via) ◀─────┘
//!                            → handler::handle
//!                            → TableEntityRecord (written by host binding)
//!
//! GET /table-entities/{id} → TableEntityRecord
//! GET /blobs/{id}          → BlobRecord
//! ```
//!
//! # Design Decisions
//! - JSON is camelCase on the wire
//! - One canonical partition key; legacy "sample" tables are not read

pub mod entity;
pub mod message;

pub use entity::{BlobRecord, TableEntityRecord, PARTITION_KEY};
pub use message::{Message, PublishMessageRequest, PublishMessageResponse};
