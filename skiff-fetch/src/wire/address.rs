//! Parsed-address records and their adapter to encoded addresses.

use bitcoin::hashes::Hash;
use bitcoin::{Address, PubkeyHash, ScriptBuf, ScriptHash};
use serde::{Deserialize, Serialize};
use skiff_common::Network;

use crate::wire::ConvertError;

/// A parsed address as the backend describes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireAddress {
    /// Hash-160 payload, hex.
    pub hash: String,
    /// Backend network tag (`livenet` / `testnet`).
    pub network: String,
    /// Address type tag (`pubkeyhash` / `scripthash`).
    #[serde(rename = "type")]
    pub kind: String,
}

impl WireAddress {
    /// Encodes this record into an address on the `configured` network.
    ///
    /// The record's own network tag is decoded as boundary validation only:
    /// an unrecognised tag, a recognised tag naming the other network, and an
    /// unrecognised type tag are all hard failures. Guessing here could
    /// attribute funds to an address on the wrong chain.
    pub fn to_address(&self, configured: Network) -> Result<Address, ConvertError> {
        let tagged = Network::from_wire_tag(&self.network)?;
        if tagged != configured {
            return Err(ConvertError::NetworkMismatch {
                found: tagged,
                configured,
            });
        }

        let payload = hex::decode(&self.hash)?;
        let script = match self.kind.as_str() {
            "pubkeyhash" => ScriptBuf::new_p2pkh(&PubkeyHash::from_slice(&payload)?),
            "scripthash" => ScriptBuf::new_p2sh(&ScriptHash::from_slice(&payload)?),
            other => return Err(ConvertError::UnsupportedAddressType(other.to_string())),
        };

        Ok(Address::from_script(&script, configured.to_bitcoin())?)
    }
}
