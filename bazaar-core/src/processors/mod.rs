//! Event processors.
//!
//! - `Notifier`: Receives notification, chat, wallet and publish-status
//!   events from the bus, persists notifications, delivers wrapped messages

pub mod notifier;

pub use notifier::{
    DeliveryError, NotificationEvent, Notifier, NotifierError, NotifierStarted, NotifyFn,
    PassthroughEvent, chat_kinds, notification_kinds, status_kinds, wallet_kinds,
};
