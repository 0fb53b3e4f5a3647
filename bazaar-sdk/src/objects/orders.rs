//! Order and dispute lifecycle events.
//!
//! Every event a user is notified about carries an `id` and a `typ`. Both are
//! empty when the event is published; the notifier fills them in before the
//! event is stored and delivered, so clients see them as `notificationID` and
//! `type`.

use serde::{Deserialize, Serialize};

use super::{ListingPrice, Thumbnail};

/// A buyer placed an order on one of our listings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    #[serde(rename = "notificationID")]
    pub id: String,
    #[serde(rename = "type")]
    pub typ: String,
    pub buyer_handle: String,
    #[serde(rename = "buyerID")]
    pub buyer_id: String,
    pub listing_type: String,
    #[serde(rename = "orderID")]
    pub order_id: String,
    pub price: ListingPrice,
    pub slug: String,
    pub thumbnail: Thumbnail,
    pub title: String,
}

/// An order we sold has been fully funded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFunded {
    #[serde(rename = "notificationID")]
    pub id: String,
    #[serde(rename = "type")]
    pub typ: String,
    pub buyer_handle: String,
    #[serde(rename = "buyerID")]
    pub buyer_id: String,
    pub listing_type: String,
    #[serde(rename = "orderID")]
    pub order_id: String,
    pub price: ListingPrice,
    pub slug: String,
    pub thumbnail: Thumbnail,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPaymentReceived {
    #[serde(rename = "notificationID")]
    pub id: String,
    #[serde(rename = "type")]
    pub typ: String,
    #[serde(rename = "orderID")]
    pub order_id: String,
    pub funding_total: String,
    pub coin_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    #[serde(rename = "notificationID")]
    pub id: String,
    #[serde(rename = "type")]
    pub typ: String,
    #[serde(rename = "orderID")]
    pub order_id: String,
    pub thumbnail: Thumbnail,
    pub vendor_handle: String,
    #[serde(rename = "vendorID")]
    pub vendor_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDeclined {
    #[serde(rename = "notificationID")]
    pub id: String,
    #[serde(rename = "type")]
    pub typ: String,
    #[serde(rename = "orderID")]
    pub order_id: String,
    pub thumbnail: Thumbnail,
    pub vendor_handle: String,
    #[serde(rename = "vendorID")]
    pub vendor_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCancel {
    #[serde(rename = "notificationID")]
    pub id: String,
    #[serde(rename = "type")]
    pub typ: String,
    #[serde(rename = "orderID")]
    pub order_id: String,
    pub thumbnail: Thumbnail,
    pub buyer_handle: String,
    #[serde(rename = "buyerID")]
    pub buyer_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Refund {
    #[serde(rename = "notificationID")]
    pub id: String,
    #[serde(rename = "type")]
    pub typ: String,
    #[serde(rename = "orderID")]
    pub order_id: String,
    pub thumbnail: Thumbnail,
    pub vendor_handle: String,
    #[serde(rename = "vendorID")]
    pub vendor_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFulfillment {
    #[serde(rename = "notificationID")]
    pub id: String,
    #[serde(rename = "type")]
    pub typ: String,
    #[serde(rename = "orderID")]
    pub order_id: String,
    pub thumbnail: Thumbnail,
    pub vendor_handle: String,
    #[serde(rename = "vendorID")]
    pub vendor_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCompletion {
    #[serde(rename = "notificationID")]
    pub id: String,
    #[serde(rename = "type")]
    pub typ: String,
    #[serde(rename = "orderID")]
    pub order_id: String,
    pub thumbnail: Thumbnail,
    pub buyer_handle: String,
    #[serde(rename = "buyerID")]
    pub buyer_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisputeOpen {
    #[serde(rename = "notificationID")]
    pub id: String,
    #[serde(rename = "type")]
    pub typ: String,
    #[serde(rename = "orderID")]
    pub order_id: String,
    pub thumbnail: Thumbnail,
    #[serde(rename = "disputerID")]
    pub disputer_id: String,
    pub disputer_handle: String,
    #[serde(rename = "disputeeID")]
    pub disputee_id: String,
    pub disputee_handle: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisputeUpdate {
    #[serde(rename = "notificationID")]
    pub id: String,
    #[serde(rename = "type")]
    pub typ: String,
    #[serde(rename = "orderID")]
    pub order_id: String,
    pub thumbnail: Thumbnail,
    #[serde(rename = "disputerID")]
    pub disputer_id: String,
    pub disputer_handle: String,
    #[serde(rename = "disputeeID")]
    pub disputee_id: String,
    pub disputee_handle: String,
    pub buyer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisputeClose {
    #[serde(rename = "notificationID")]
    pub id: String,
    #[serde(rename = "type")]
    pub typ: String,
    #[serde(rename = "orderID")]
    pub order_id: String,
    pub thumbnail: Thumbnail,
    #[serde(rename = "otherPartyID")]
    pub other_party_id: String,
    pub other_party_handle: String,
    pub buyer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisputeAccepted {
    #[serde(rename = "notificationID")]
    pub id: String,
    #[serde(rename = "type")]
    pub typ: String,
    #[serde(rename = "orderID")]
    pub order_id: String,
    pub thumbnail: Thumbnail,
    #[serde(rename = "otherPartyID")]
    pub other_party_id: String,
    pub other_party_handle: String,
    pub buyer: String,
}

/// The vendor released escrowed funds without waiting for the buyer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorFinalizedPayment {
    #[serde(rename = "notificationID")]
    pub id: String,
    #[serde(rename = "type")]
    pub typ: String,
    #[serde(rename = "orderID")]
    pub order_id: String,
}

/// A sale will soon stop being disputable. `expires_in` is in hours.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorDisputeTimeout {
    #[serde(rename = "purchaseOrderID")]
    pub order_id: String,
    pub expires_in: u64,
    pub thumbnail: Thumbnail,
}

/// A purchase will soon stop being disputable. `expires_in` is in hours.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerDisputeTimeout {
    #[serde(rename = "orderID")]
    pub order_id: String,
    pub expires_in: u64,
    pub thumbnail: Thumbnail,
}

/// An open dispute on one of our purchases is about to expire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerDisputeExpiry {
    #[serde(rename = "orderID")]
    pub order_id: String,
    pub expires_in: u64,
    pub thumbnail: Thumbnail,
}

/// A case we moderate will soon be resolved automatically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeratorDisputeExpiry {
    #[serde(rename = "disputeCaseID")]
    pub case_id: String,
    pub expires_in: u64,
    pub thumbnail: Thumbnail,
}
