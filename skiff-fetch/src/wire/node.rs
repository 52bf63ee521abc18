//! The node-native transaction format.
//!
//! This is the representation the backend pushes over the socket channel and
//! embeds in `getAddressHistory` items: satoshi integer values, raw-hex
//! scripts, previous outputs referenced by display-order txid plus index.

use bitcoin::{
    absolute, transaction, Amount, OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Txid,
    Witness,
};
use serde::{Deserialize, Serialize};

use crate::wire::{parse_txid, ConvertError};

/// A transaction in the backend node's native encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTx {
    /// Transaction id, hex in display order.
    pub hash: String,
    /// Transaction version.
    pub version: u32,
    /// Raw locktime.
    #[serde(default)]
    pub lock_time: u32,
    /// Inputs, in consensus order.
    pub inputs: Vec<NodeTxIn>,
    /// Outputs, in consensus order.
    pub outputs: Vec<NodeTxOut>,
    /// Block height; absent or negative while unconfirmed.
    #[serde(default)]
    pub height: Option<i64>,
    /// Block timestamp; absent while unconfirmed.
    #[serde(default)]
    pub block_timestamp: Option<u32>,
}

/// An input of a [`NodeTx`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTxIn {
    /// Id of the transaction whose output is being spent, hex in display
    /// order.
    pub prev_tx_id: String,
    /// Index of the spent output in that transaction.
    pub output_index: u32,
    /// Signature script, raw hex. Empty in neutered transactions.
    #[serde(default)]
    pub script: String,
    /// Raw sequence number.
    #[serde(default = "crate::wire::default_sequence")]
    pub sequence_number: u32,
}

/// An output of a [`NodeTx`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTxOut {
    /// Output value in satoshis.
    pub satoshis: u64,
    /// Output script, raw hex.
    #[serde(default)]
    pub script: String,
}

/// A live `address/transaction` push event.
///
/// One event is emitted per watched address a transaction touches; the same
/// transaction may therefore arrive several times under different addresses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressTxEvent {
    /// The watched address the transaction touches.
    pub address: String,
    /// True when the backend is announcing a double-spend replacement of a
    /// previously seen transaction.
    #[serde(default)]
    pub rejected: bool,
    /// Block height; absent or negative while unconfirmed.
    #[serde(default)]
    pub height: Option<i64>,
    /// Block timestamp; absent while unconfirmed.
    #[serde(default)]
    pub timestamp: Option<u32>,
    /// The transaction, in the node-native encoding.
    pub tx: NodeTx,
}

impl NodeTx {
    /// The backend-reported transaction id, parsed into internal byte order.
    pub fn txid(&self) -> Result<Txid, ConvertError> {
        parse_txid(&self.hash)
    }

    /// Converts into the canonical transaction representation.
    ///
    /// With `neutered` set, input scripts are replaced with empty scripts:
    /// signing data is not needed for accounting and is not trusted from an
    /// indexing service. The backend-reported id stays authoritative either
    /// way; a neutered transaction no longer hashes to it.
    pub fn to_transaction(&self, neutered: bool) -> Result<Transaction, ConvertError> {
        let input = self
            .inputs
            .iter()
            .map(|txin| {
                let script_sig = if neutered {
                    ScriptBuf::new()
                } else {
                    ScriptBuf::from_bytes(hex::decode(&txin.script)?)
                };
                Ok(TxIn {
                    previous_output: OutPoint {
                        txid: parse_txid(&txin.prev_tx_id)?,
                        vout: txin.output_index,
                    },
                    script_sig,
                    sequence: Sequence(txin.sequence_number),
                    witness: Witness::default(),
                })
            })
            .collect::<Result<Vec<_>, ConvertError>>()?;

        let output = self
            .outputs
            .iter()
            .map(|txout| {
                Ok(TxOut {
                    value: Amount::from_sat(txout.satoshis),
                    script_pubkey: ScriptBuf::from_bytes(hex::decode(&txout.script)?),
                })
            })
            .collect::<Result<Vec<_>, ConvertError>>()?;

        Ok(Transaction {
            version: transaction::Version(self.version as i32),
            lock_time: absolute::LockTime::from_consensus(self.lock_time),
            input,
            output,
        })
    }
}
