//! Core wallet-facing data types.

use std::collections::HashSet;
use std::sync::Arc;

use bitcoin::{Transaction, Txid};

/// A canonical transaction together with the chain metadata the backend
/// reported the first time it was observed.
///
/// Created once per distinct transaction id, then always served from the
/// [`TransactionCache`](crate::cache::TransactionCache); never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionInfo {
    /// The transaction id as reported by the backend.
    ///
    /// Authoritative even though input scripts may have been neutered away,
    /// which changes what the transaction itself would hash to.
    pub id: Txid,
    /// The canonical transaction.
    pub tx: Transaction,
    /// Block height; `None` while unconfirmed.
    pub height: Option<u32>,
    /// Block timestamp; `None` while unconfirmed.
    pub timestamp: Option<u32>,
}

impl TransactionInfo {
    /// Ids of the transactions referenced by each input, in input order.
    ///
    /// Used to resolve spent-output values against the full transaction set.
    pub fn input_ids(&self) -> impl Iterator<Item = Txid> + '_ {
        self.tx.input.iter().map(|txin| txin.previous_output.txid)
    }
}

/// One observation of a transaction touching watched addresses.
///
/// Ephemeral: a fresh match is built per observation event even when it
/// wraps a cached [`TransactionInfo`].
#[derive(Debug, Clone)]
pub struct TransactionMatch {
    /// The observed transaction.
    pub info: Arc<TransactionInfo>,
    /// Watched addresses the transaction touches.
    pub addresses: HashSet<String>,
    /// True when the backend announced this as a double-spend replacement.
    /// Callers decide whether to exclude such matches from accounting.
    pub rejected: bool,
}
