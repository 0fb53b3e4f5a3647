//! [`Event`] implementations for the node's payload types.
//!
//! Each type exposes its scalar fields to `match_fields` under their Rust
//! names. Nested values such as thumbnails and prices are not exposed.

use bazaar_sdk::objects::{
    AddressRequestResponse, BlockReceived, BuyerDisputeExpiry, BuyerDisputeTimeout, ChatMessage,
    ChatRead, ChatTyping, DisputeAccepted, DisputeClose, DisputeOpen, DisputeUpdate, Follow,
    IncomingTransaction, ModeratorAdd, ModeratorDisputeExpiry, ModeratorRemove, NewOrder,
    OrderCancel, OrderCompletion, OrderConfirmation, OrderDeclined, OrderFulfillment, OrderFunded,
    OrderPaymentReceived, PeerConnected, PeerDisconnected, PublishFinished, PublishStarted,
    PublishingError, Refund, SpendFromPaymentAddress, TrackerFollow, TrackerPeerConnected, TrackerPeerDisconnected,
    TrackerStarted, TrackerUnfollow, TransactionReceived, Unfollow, VendorDisputeTimeout,
    VendorFinalizedPayment, WalletUpdate,
};

use super::kind::Event;

macro_rules! impl_event {
    ($($kind:ty { $($field:ident),* $(,)? }),+ $(,)?) => {
        $(
            impl Event for $kind {
                #[allow(unused_variables)]
                fn field(&self, name: &str) -> Option<String> {
                    match name {
                        $(stringify!($field) => Some(self.$field.to_string()),)*
                        _ => None,
                    }
                }
            }
        )+
    };
}

impl_event! {
    NewOrder { id, typ, buyer_handle, buyer_id, listing_type, order_id, slug, title },
    OrderFunded { id, typ, buyer_handle, buyer_id, listing_type, order_id, slug, title },
    OrderPaymentReceived { id, typ, order_id, funding_total, coin_type },
    OrderConfirmation { id, typ, order_id, vendor_handle, vendor_id },
    OrderDeclined { id, typ, order_id, vendor_handle, vendor_id },
    OrderCancel { id, typ, order_id, buyer_handle, buyer_id },
    Refund { id, typ, order_id, vendor_handle, vendor_id },
    OrderFulfillment { id, typ, order_id, vendor_handle, vendor_id },
    OrderCompletion { id, typ, order_id, buyer_handle, buyer_id },
    DisputeOpen { id, typ, order_id, disputer_id, disputer_handle, disputee_id, disputee_handle },
    DisputeUpdate {
        id, typ, order_id, disputer_id, disputer_handle, disputee_id, disputee_handle, buyer,
    },
    DisputeClose { id, typ, order_id, other_party_id, other_party_handle, buyer },
    DisputeAccepted { id, typ, order_id, other_party_id, other_party_handle, buyer },
    VendorFinalizedPayment { id, typ, order_id },
    VendorDisputeTimeout { order_id, expires_in },
    BuyerDisputeTimeout { order_id, expires_in },
    BuyerDisputeExpiry { order_id, expires_in },
    ModeratorDisputeExpiry { case_id, expires_in },
    Follow { id, typ, peer_id },
    Unfollow { id, typ, peer_id },
    ModeratorAdd { peer_id },
    ModeratorRemove { peer_id },
    ChatMessage { message_id, peer_id, order_id, read, outgoing, message },
    ChatRead { message_id, peer_id, order_id },
    ChatTyping { peer_id, order_id },
    PeerConnected { peer },
    PeerDisconnected { peer },
    TrackerStarted {},
    TrackerPeerConnected { peer },
    TrackerPeerDisconnected { peer },
    TrackerFollow { peer },
    TrackerUnfollow { peer },
    PublishStarted { id },
    PublishFinished { id },
    PublishingError { error },
    WalletUpdate {},
    IncomingTransaction { wallet, txid, value, address, status, order_id, confirmations, height },
    AddressRequestResponse { peer_id, address, coin },
}

impl Event for TransactionReceived {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "currency_code" => Some(self.currency_code.clone()),
            "txid" => Some(self.transaction.txid.clone()),
            "value" => Some(self.transaction.value.clone()),
            "height" => Some(self.transaction.height.to_string()),
            _ => None,
        }
    }
}

impl Event for SpendFromPaymentAddress {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "currency_code" => Some(self.currency_code.clone()),
            "txid" => Some(self.transaction.txid.clone()),
            "value" => Some(self.transaction.value.clone()),
            "height" => Some(self.transaction.height.to_string()),
            _ => None,
        }
    }
}

impl Event for BlockReceived {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "currency_code" => Some(self.currency_code.clone()),
            "block_id" => Some(self.block.block_id.clone()),
            "height" => Some(self.block.height.to_string()),
            _ => None,
        }
    }
}
