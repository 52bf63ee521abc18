//! Backend transaction wire formats and their adapters.
//!
//! Two distinct representations arrive from the backend: the node-native
//! format pushed over the socket channel and embedded in `getAddressHistory`
//! items, and the index-service-compatible format served by the Insight HTTP
//! API. Both normalise into [`bitcoin::Transaction`]; parsed-address records
//! normalise into [`bitcoin::Address`].

use std::str::FromStr;

use bitcoin::Txid;

pub mod address;
pub mod error;
pub mod index_service;
pub mod node;

pub use address::WireAddress;
pub use error::ConvertError;
pub use index_service::{InsightScript, InsightTx, InsightTxIn, InsightTxOut};
pub use node::{AddressTxEvent, NodeTx, NodeTxIn, NodeTxOut};

/// Clamps a backend-reported height to a real chain height.
///
/// Backends report unconfirmed activity with an absent or negative height;
/// both mean the same thing past the wire boundary.
pub fn normalized_height(raw: Option<i64>) -> Option<u32> {
    raw.and_then(|height| u32::try_from(height).ok())
}

/// Parses a display-order hex transaction id into internal byte order.
pub(crate) fn parse_txid(hash: &str) -> Result<Txid, ConvertError> {
    Txid::from_str(hash).map_err(|_| ConvertError::InvalidTxid(hash.to_string()))
}

pub(crate) fn default_sequence() -> u32 {
    u32::MAX
}
