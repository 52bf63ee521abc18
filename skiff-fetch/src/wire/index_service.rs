//! The index-service-compatible transaction format.
//!
//! Served by the Insight HTTP API: decimal-string BTC values, `vin`/`vout`
//! arrays, scripts nested as objects with a hex field.

use bitcoin::{
    absolute, transaction, Amount, Denomination, OutPoint, ScriptBuf, Sequence, Transaction, TxIn,
    TxOut, Txid, Witness,
};
use serde::{Deserialize, Serialize};

use crate::wire::{parse_txid, ConvertError};

/// A transaction in the index-service encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightTx {
    /// Transaction id, hex in display order.
    pub txid: String,
    /// Transaction version.
    pub version: u32,
    /// Raw locktime.
    #[serde(default)]
    pub locktime: u32,
    /// Inputs, in consensus order.
    pub vin: Vec<InsightTxIn>,
    /// Outputs, in consensus order.
    pub vout: Vec<InsightTxOut>,
    /// Block height; absent or negative while unconfirmed.
    #[serde(default, rename = "blockheight")]
    pub block_height: Option<i64>,
    /// Block timestamp; absent while unconfirmed.
    #[serde(default)]
    pub time: Option<u32>,
}

/// An input of an [`InsightTx`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightTxIn {
    /// Id of the transaction whose output is being spent; absent on
    /// coinbase inputs.
    #[serde(default)]
    pub txid: Option<String>,
    /// Index of the spent output in that transaction.
    #[serde(default)]
    pub vout: u32,
    /// Signature script.
    #[serde(default, rename = "scriptSig")]
    pub script_sig: Option<InsightScript>,
    /// Coinbase payload, present on coinbase inputs only.
    #[serde(default)]
    pub coinbase: Option<String>,
    /// Raw sequence number.
    #[serde(default = "crate::wire::default_sequence")]
    pub sequence: u32,
}

/// A script nested as an object with a hex field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightScript {
    /// Raw script hex.
    #[serde(default)]
    pub hex: String,
}

/// An output of an [`InsightTx`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightTxOut {
    /// Output value as a decimal BTC string, e.g. `"0.00030000"`.
    pub value: String,
    /// Output index.
    #[serde(default)]
    pub n: u32,
    /// Output script.
    #[serde(default, rename = "scriptPubKey")]
    pub script_pub_key: InsightScript,
}

impl InsightTx {
    /// The backend-reported transaction id, parsed into internal byte order.
    pub fn txid(&self) -> Result<Txid, ConvertError> {
        parse_txid(&self.txid)
    }

    /// Converts into the canonical transaction representation.
    ///
    /// Coinbase inputs carry no previous-output reference and convert to the
    /// null outpoint.
    pub fn to_transaction(&self) -> Result<Transaction, ConvertError> {
        let input = self
            .vin
            .iter()
            .map(|txin| {
                let previous_output = match &txin.txid {
                    Some(txid) => OutPoint {
                        txid: parse_txid(txid)?,
                        vout: txin.vout,
                    },
                    None => OutPoint::null(),
                };
                let script_sig = match &txin.script_sig {
                    Some(script) => ScriptBuf::from_bytes(hex::decode(&script.hex)?),
                    None => ScriptBuf::new(),
                };
                Ok(TxIn {
                    previous_output,
                    script_sig,
                    sequence: Sequence(txin.sequence),
                    witness: Witness::default(),
                })
            })
            .collect::<Result<Vec<_>, ConvertError>>()?;

        let output = self
            .vout
            .iter()
            .map(|txout| {
                Ok(TxOut {
                    value: Amount::from_str_in(&txout.value, Denomination::Bitcoin)?,
                    script_pubkey: ScriptBuf::from_bytes(hex::decode(&txout.script_pub_key.hex)?),
                })
            })
            .collect::<Result<Vec<_>, ConvertError>>()?;

        Ok(Transaction {
            version: transaction::Version(self.version as i32),
            lock_time: absolute::LockTime::from_consensus(self.locktime),
            input,
            output,
        })
    }
}
