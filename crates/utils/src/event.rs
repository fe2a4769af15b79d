//! Inbound event model.
//!
//! One event carries one or more message records, each naming a stored
//! message and the recipients whose receipt rule fired for it. Recipient
//! order is preserved; the dispatcher processes it as-is.

use serde::{Deserialize, Serialize};

/// An inbound-message event, as delivered by the invoking platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Message records, processed in order.
    #[serde(alias = "Records")]
    pub records: Vec<MessageRecord>,
}

/// One received message and the recipients that triggered its receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    /// Identifier of the stored raw message.
    pub message_id: String,

    /// Recipient addresses, in the order they appear in the event.
    pub recipients: Vec<String>,
}
