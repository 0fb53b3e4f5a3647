//! Direct and order-scoped chat events.
//!
//! Chat events are forwarded to clients as they happen and are never stored
//! as notifications.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "messageID")]
    pub message_id: String,
    #[serde(rename = "peerID")]
    pub peer_id: String,
    /// Empty for direct messages.
    #[serde(rename = "orderID")]
    pub order_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub read: bool,
    pub outgoing: bool,
    pub message: String,
}

impl Default for ChatMessage {
    fn default() -> Self {
        Self {
            message_id: String::new(),
            peer_id: String::new(),
            order_id: String::new(),
            timestamp: OffsetDateTime::UNIX_EPOCH,
            read: false,
            outgoing: false,
            message: String::new(),
        }
    }
}

/// The remote peer read messages up to and including `message_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRead {
    #[serde(rename = "messageID")]
    pub message_id: String,
    #[serde(rename = "peerID")]
    pub peer_id: String,
    #[serde(rename = "orderID")]
    pub order_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTyping {
    #[serde(rename = "peerID")]
    pub peer_id: String,
    #[serde(rename = "orderID")]
    pub order_id: String,
}
