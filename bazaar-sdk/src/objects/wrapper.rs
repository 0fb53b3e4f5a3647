//! Envelopes handed to delivery sinks.
//!
//! Every message pushed to a client is a JSON object with exactly one key
//! naming the class of the payload:
//!
//! ```json
//! {"notification": {"notificationID": "...", "type": "NewOrder", ...}}
//! {"chatMessage": {"messageID": "...", ...}}
//! {"messageRead": {...}}
//! {"messageTyping": {...}}
//! {"wallet": {"block": {...}}}
//! {"walletUpdate": {"BTC": {...}}}
//! {"status": "publishing"}
//! ```

use serde::{Deserialize, Serialize};

use super::chat::{ChatMessage, ChatRead, ChatTyping};
use super::notification::Notification;
use super::wallet::{BlockReceived, SpendFromPaymentAddress, TransactionReceived, WalletUpdate};

/// Single-key envelope discriminating the payload class.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Wrapper {
    Notification(Notification),
    ChatMessage(ChatMessage),
    MessageRead(ChatRead),
    MessageTyping(ChatTyping),
    Wallet(WalletMessage),
    WalletUpdate(WalletUpdate),
    Status(PublishStatus),
}

impl Wrapper {
    /// The envelope key, for logging.
    pub fn key(&self) -> &'static str {
        match self {
            Wrapper::Notification(_) => "notification",
            Wrapper::ChatMessage(_) => "chatMessage",
            Wrapper::MessageRead(_) => "messageRead",
            Wrapper::MessageTyping(_) => "messageTyping",
            Wrapper::Wallet(_) => "wallet",
            Wrapper::WalletUpdate(_) => "walletUpdate",
            Wrapper::Status(_) => "status",
        }
    }
}

/// Chain activity nested under the `wallet` key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WalletMessage {
    Block(BlockReceived),
    Transaction(TransactionReceived),
    /// Outgoing funds share the `transaction` key with incoming ones.
    #[serde(rename = "transaction")]
    Spend(SpendFromPaymentAddress),
}

/// Progress of publishing our public data, nested under the `status` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PublishStatus {
    #[serde(rename = "publishing")]
    Publishing,
    #[serde(rename = "publish complete")]
    Complete,
    #[serde(rename = "error publishing")]
    Error,
}

impl std::fmt::Display for PublishStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishStatus::Publishing => write!(f, "publishing"),
            PublishStatus::Complete => write!(f, "publish complete"),
            PublishStatus::Error => write!(f, "error publishing"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::orders::NewOrder;

    #[test]
    fn test_envelope_keys() {
        let cases = [
            (Wrapper::Notification(NewOrder::default().into()), "notification"),
            (Wrapper::ChatMessage(ChatMessage::default()), "chatMessage"),
            (Wrapper::MessageRead(ChatRead::default()), "messageRead"),
            (Wrapper::MessageTyping(ChatTyping::default()), "messageTyping"),
            (
                Wrapper::Wallet(WalletMessage::Block(BlockReceived::default())),
                "wallet",
            ),
            (Wrapper::WalletUpdate(WalletUpdate::default()), "walletUpdate"),
            (Wrapper::Status(PublishStatus::Complete), "status"),
        ];

        for (wrapper, key) in cases {
            assert_eq!(wrapper.key(), key);
            let json = serde_json::to_value(&wrapper).unwrap();
            let object = json.as_object().unwrap();
            assert_eq!(object.len(), 1);
            assert!(object.contains_key(key), "missing {key} in {json}");
        }
    }

    #[test]
    fn test_nested_wallet_and_status_shapes() {
        let json = serde_json::to_value(Wrapper::Wallet(WalletMessage::Transaction(
            TransactionReceived::default(),
        )))
        .unwrap();
        assert!(json["wallet"]["transaction"].is_object());

        let json = serde_json::to_value(Wrapper::Wallet(WalletMessage::Spend(
            SpendFromPaymentAddress {
                currency_code: "BCH".to_string(),
                ..Default::default()
            },
        )))
        .unwrap();
        assert_eq!(json["wallet"]["transaction"]["currencyCode"], "BCH");

        let json = serde_json::to_value(Wrapper::Status(PublishStatus::Error)).unwrap();
        assert_eq!(json, serde_json::json!({"status": "error publishing"}));
    }
}
