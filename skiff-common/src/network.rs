//! Network type for Skiff configuration.

use serde::{Deserialize, Serialize};

/// Bitcoin network a backend serves.
///
/// Backend records tag their network with the backend's own vocabulary
/// (`livenet` / `testnet`); this enum is the decoded, validated form. The
/// configured network is the single authority for address encoding: record
/// tags are only ever decoded to check them against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// The production Bitcoin network.
    Livenet,
    /// The Bitcoin test network.
    Testnet,
}

/// A network tag this build does not recognise.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported network: {0:?}")]
pub struct UnsupportedNetwork(pub String);

impl Network {
    /// Decodes a backend wire tag.
    ///
    /// Unrecognised tags are a hard failure: guessing the network risks
    /// encoding addresses for the wrong chain.
    pub fn from_wire_tag(tag: &str) -> Result<Self, UnsupportedNetwork> {
        match tag {
            "livenet" => Ok(Network::Livenet),
            "testnet" => Ok(Network::Testnet),
            other => Err(UnsupportedNetwork(other.to_string())),
        }
    }

    /// The backend's wire tag for this network.
    pub fn wire_tag(&self) -> &'static str {
        match self {
            Network::Livenet => "livenet",
            Network::Testnet => "testnet",
        }
    }

    /// The equivalent `bitcoin` crate network parameter.
    pub fn to_bitcoin(self) -> bitcoin::Network {
        match self {
            Network::Livenet => bitcoin::Network::Bitcoin,
            Network::Testnet => bitcoin::Network::Testnet,
        }
    }
}
