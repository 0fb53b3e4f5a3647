//! In-process event bus.
//!
//! Events are routed by their concrete Rust type. A publisher calls
//! [`EventBus::emit`] with any value implementing [`Event`]; every
//! [`Subscription`] that named that type gets a shared [`Envelope`] in its
//! own bounded queue.
//!
//! # Event Flow
//!
//! 1. Wallets, order handling, networking and the publisher emit the
//!    payload types from `bazaar_sdk::objects`
//! 2. The `Notifier` subscribes to the notification, chat, wallet and
//!    publish-status sets
//! 3. Notification-class events are stamped, persisted, and delivered;
//!    the rest are wrapped and delivered as-is

pub mod bus;
pub mod catalog;
pub mod error;
pub mod kind;
pub mod options;
pub mod subscription;

pub use bus::EventBus;
pub use error::BusError;
pub use kind::{Envelope, Event, IntoKinds, Kind};
pub use options::{DEFAULT_CHANNEL_BUFFER, SubscriptionOpt, buf_size, filter, match_fields};
pub use subscription::Subscription;
