//! The persisted notification catalog.
//!
//! [`Notification`] is the closed set of events that are stored as
//! notification records and pushed to clients under the `notification` key.
//! The variant name doubles as the type tag written into the event's `typ`
//! field, so the tag table is part of the client-facing contract:
//!
//! | Variant | Tag |
//! |---|---|
//! | `NewOrder` | `"NewOrder"` |
//! | `OrderFunded` | `"OrderFunded"` |
//! | `...` | same as the variant |
//! | `Unfollow` | `"Unfollow"` |

use serde::Serialize;
use thiserror::Error;

use super::orders::{
    DisputeAccepted, DisputeClose, DisputeOpen, DisputeUpdate, NewOrder, OrderCancel,
    OrderCompletion, OrderConfirmation, OrderDeclined, OrderFulfillment, OrderFunded,
    OrderPaymentReceived, Refund, VendorFinalizedPayment,
};
use super::social::{Follow, Unfollow};

/// Errors returned when turning a stored record back into a [`Notification`].
#[derive(Debug, Error)]
pub enum NotificationDecodeError {
    #[error("unknown notification type: {0}")]
    UnknownType(String),

    #[error("invalid notification payload: {0}")]
    Json(#[from] serde_json::Error),
}

macro_rules! notification_catalog {
    ($($kind:ident),+ $(,)?) => {
        /// A notification-class event.
        ///
        /// Serializes as the bare inner event, so `{"notification": n}` shows
        /// the event's own fields.
        #[derive(Debug, Clone, PartialEq, Serialize)]
        #[serde(untagged)]
        pub enum Notification {
            $($kind($kind),)+
        }

        impl Notification {
            /// Every tag in catalog order.
            pub const TAGS: &'static [&'static str] = &[$(stringify!($kind),)+];

            /// The human-readable kind tag.
            pub fn tag(&self) -> &'static str {
                match self {
                    $(Self::$kind(_) => stringify!($kind),)+
                }
            }

            /// The notification id; empty until [`stamp`](Self::stamp) is called.
            pub fn id(&self) -> &str {
                match self {
                    $(Self::$kind(event) => &event.id,)+
                }
            }

            /// The `typ` field as currently set on the inner event.
            pub fn typ(&self) -> &str {
                match self {
                    $(Self::$kind(event) => &event.typ,)+
                }
            }

            /// Writes `id` and the kind tag into the inner event.
            pub fn stamp(&mut self, id: impl Into<String>) {
                let tag = self.tag();
                match self {
                    $(Self::$kind(event) => {
                        event.id = id.into();
                        event.typ = tag.to_owned();
                    })+
                }
            }

            /// Decodes a serialized event given its tag.
            pub fn from_tagged_json(tag: &str, json: &[u8]) -> Result<Self, NotificationDecodeError> {
                match tag {
                    $(stringify!($kind) => Ok(Self::$kind(serde_json::from_slice(json)?)),)+
                    other => Err(NotificationDecodeError::UnknownType(other.to_owned())),
                }
            }
        }

        $(
            impl From<$kind> for Notification {
                fn from(event: $kind) -> Self {
                    Self::$kind(event)
                }
            }
        )+
    };
}

notification_catalog!(
    NewOrder,
    OrderFunded,
    OrderPaymentReceived,
    OrderConfirmation,
    OrderDeclined,
    OrderCancel,
    Refund,
    OrderFulfillment,
    OrderCompletion,
    DisputeOpen,
    DisputeUpdate,
    DisputeClose,
    DisputeAccepted,
    VendorFinalizedPayment,
    Follow,
    Unfollow,
);
