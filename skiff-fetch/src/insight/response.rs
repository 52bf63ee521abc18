//! Types associated with the backend's RPC and HTTP requests.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::wire::NodeTx;

/// Height-bound and paging options of a `getAddressHistory` call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryOptions {
    /// Lower block height bound, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,
    /// Upper block height bound, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<u32>,
    /// First item index of the requested window.
    pub from: u32,
    /// Past-the-end item index of the requested window.
    pub to: u32,
    /// Whether unconfirmed activity is included. Always requested true, so
    /// mempool matches appear in every page.
    pub query_mempool: bool,
}

/// Response to a `getAddressHistory` call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetAddressHistoryResponse {
    /// Total number of matching items the backend currently knows of.
    ///
    /// Revised as pages are fetched; the latest reported value is
    /// authoritative.
    pub total_count: u32,
    /// Items of the requested window.
    #[serde(default)]
    pub items: Vec<AddressHistoryItem>,
}

/// One matching transaction of an address-history page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AddressHistoryItem {
    /// Watched addresses the transaction touches, with their involvement.
    #[serde(default)]
    pub addresses: HashMap<String, AddressActivity>,
    /// The transaction, in the node-native encoding.
    pub tx: NodeTx,
    /// Block height; absent or negative while unconfirmed.
    #[serde(default)]
    pub height: Option<i64>,
    /// Block timestamp; absent while unconfirmed.
    #[serde(default)]
    pub timestamp: Option<u32>,
}

impl AddressHistoryItem {
    /// Block height of the item, preferring the item-level field over the
    /// embedded transaction's.
    pub fn height(&self) -> Option<i64> {
        self.height.or(self.tx.height)
    }

    /// Block timestamp of the item, with the same preference.
    pub fn timestamp(&self) -> Option<u32> {
        self.timestamp.or(self.tx.block_timestamp)
    }
}

/// Where an address appears within a matching transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressActivity {
    /// Indexes of the inputs spending from the address.
    #[serde(default)]
    pub input_indexes: Vec<u32>,
    /// Indexes of the outputs paying to the address.
    #[serde(default)]
    pub output_indexes: Vec<u32>,
}

/// Response to a block-hash-by-height query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHashResponse {
    /// Hash of the block at the requested height, hex in display order.
    pub block_hash: String,
}

/// The backend's current indexing position. Polled, never cached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatus {
    /// Height of the latest block the backend has indexed.
    pub height: u32,
}
