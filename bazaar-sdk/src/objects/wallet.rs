//! Wallet and chain events.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A transaction as reported by one of the node's wallets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletTransaction {
    pub txid: String,
    /// Net value in the wallet's base unit, as a decimal string. Negative
    /// for outgoing transactions.
    pub value: String,
    pub height: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl Default for WalletTransaction {
    fn default() -> Self {
        Self {
            txid: String::new(),
            value: String::new(),
            height: 0,
            timestamp: OffsetDateTime::UNIX_EPOCH,
        }
    }
}

/// A transaction relevant to one of our wallets was seen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceived {
    #[serde(flatten)]
    pub transaction: WalletTransaction,
    pub currency_code: String,
}

/// Funds left one of our payment addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendFromPaymentAddress {
    #[serde(flatten)]
    pub transaction: WalletTransaction,
    pub currency_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockInfo {
    pub block_id: String,
    pub height: u64,
    pub prev_block_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub block_time: OffsetDateTime,
}

impl Default for BlockInfo {
    fn default() -> Self {
        Self {
            block_id: String::new(),
            height: 0,
            prev_block_id: String::new(),
            block_time: OffsetDateTime::UNIX_EPOCH,
        }
    }
}

/// A wallet connected a new block to its best chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockReceived {
    #[serde(flatten)]
    pub block: BlockInfo,
    pub currency_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletInfo {
    #[serde(rename = "confirmed")]
    pub confirmed_balance: String,
    #[serde(rename = "unconfirmed")]
    pub unconfirmed_balance: String,
    #[serde(rename = "height")]
    pub chain_height: u64,
}

/// Balances of every wallet, keyed by currency code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletUpdate(pub BTreeMap<String, WalletInfo>);

/// A payment to one of our addresses, as shown in the transaction list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingTransaction {
    pub wallet: String,
    pub txid: String,
    pub value: i64,
    pub address: String,
    pub status: String,
    pub memo: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub confirmations: i32,
    #[serde(rename = "orderId")]
    pub order_id: String,
    pub thumbnail: String,
    pub height: i32,
    pub can_bump_fee: bool,
}

impl Default for IncomingTransaction {
    fn default() -> Self {
        Self {
            wallet: String::new(),
            txid: String::new(),
            value: 0,
            address: String::new(),
            status: String::new(),
            memo: String::new(),
            timestamp: OffsetDateTime::UNIX_EPOCH,
            confirmations: 0,
            order_id: String::new(),
            thumbnail: String::new(),
            height: 0,
            can_bump_fee: false,
        }
    }
}

/// A peer answered our request for one of its payment addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRequestResponse {
    #[serde(rename = "peerID")]
    pub peer_id: String,
    pub address: String,
    pub coin: String,
}
