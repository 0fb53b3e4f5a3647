pub mod chat;
pub mod network;
pub mod notification;
pub mod orders;
pub mod social;
pub mod wallet;
pub mod wrapper;

pub use chat::{ChatMessage, ChatRead, ChatTyping};
pub use network::{
    PeerConnected, PeerDisconnected, PublishFinished, PublishStarted, PublishingError,
    TrackerFollow, TrackerPeerConnected, TrackerPeerDisconnected, TrackerStarted, TrackerUnfollow,
};
pub use notification::{Notification, NotificationDecodeError};
pub use orders::{
    BuyerDisputeExpiry, BuyerDisputeTimeout, DisputeAccepted, DisputeClose, DisputeOpen,
    DisputeUpdate, ModeratorDisputeExpiry, NewOrder, OrderCancel, OrderCompletion,
    OrderConfirmation, OrderDeclined, OrderFulfillment, OrderFunded, OrderPaymentReceived, Refund,
    VendorDisputeTimeout, VendorFinalizedPayment,
};
pub use social::{Follow, ModeratorAdd, ModeratorRemove, Unfollow};
pub use wallet::{
    AddressRequestResponse, BlockInfo, BlockReceived, IncomingTransaction, SpendFromPaymentAddress,
    TransactionReceived, WalletInfo, WalletTransaction, WalletUpdate,
};
pub use wrapper::{PublishStatus, WalletMessage, Wrapper};

use serde::{Deserialize, Serialize};

/// Listing image references attached to order events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub tiny: String,
    pub small: String,
}

/// Price of the listing an order was placed against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPrice {
    /// Amount in the smallest unit of `currency_code`, as a decimal string.
    pub amount: String,
    pub currency_code: String,
    pub price_modifier: f32,
}
