//! Wallet impact derivation.
//!
//! Classifies every observed transaction against the wallet's two address
//! chains, orders the result chronologically, and folds a running balance
//! across it. Runs over the completed transaction set and produces a fresh
//! ledger each time; nothing here is incremental or cached.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use bitcoin::{Address, Network, TxOut, Txid};

use crate::types::TransactionInfo;

/// Membership capability over a wallet address chain.
///
/// The external chain holds receive addresses, the internal chain change
/// addresses; derivation itself lives with the wallet layer.
pub trait AddressChain {
    /// True when the chain has derived `address`.
    fn contains(&self, address: &str) -> bool;
}

impl AddressChain for HashSet<String> {
    fn contains(&self, address: &str) -> bool {
        HashSet::contains(self, address)
    }
}

/// How a transaction moved the wallet's balance.
///
/// The variant order doubles as the tie-break for transactions sharing a
/// block height, which carry no finer ordering signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ImpactKind {
    /// Net inflow from outside the wallet.
    Incoming,
    /// Funds moved entirely within the watched chains.
    Internal,
    /// Net outflow to outside the wallet.
    Outgoing,
}

/// The derived effect of one transaction on the wallet.
#[derive(Debug, Clone)]
pub struct TransactionImpact {
    /// Transaction id.
    pub id: Txid,
    /// Block height; `None` while unconfirmed.
    pub height: Option<u32>,
    /// Block timestamp; `None` while unconfirmed.
    pub timestamp: Option<u32>,
    /// Classification of the movement.
    pub kind: ImpactKind,
    /// Signed balance delta in satoshis: credited owned outputs minus
    /// debited owned inputs.
    pub value: i64,
    /// Wallet balance immediately after this transaction in chronological
    /// order.
    pub balance: i64,
    /// Outputs of interest: the actual recipients for outgoing payments,
    /// the receiving outputs for incoming ones. Empty for internal moves.
    pub targets: Vec<TxOut>,
}

/// Derives the ordered impact ledger of `transactions`.
///
/// Orders ascending by height (unconfirmed last) with the
/// [`ImpactKind`] precedence as tie-break, folds the running balance in
/// that order, then returns the ledger newest-first with the
/// chronologically computed balances retained.
pub fn derive_impacts(
    transactions: &[Arc<TransactionInfo>],
    external: &impl AddressChain,
    internal: &impl AddressChain,
    network: Network,
) -> Vec<TransactionImpact> {
    let by_id: HashMap<Txid, &Arc<TransactionInfo>> = transactions
        .iter()
        .map(|info| (info.id, info))
        .collect();

    let mut impacts: Vec<TransactionImpact> = transactions
        .iter()
        .map(|info| analyze_transaction(info, &by_id, external, internal, network))
        .collect();

    impacts.sort_by_key(|impact| (impact.height.unwrap_or(u32::MAX), impact.kind));

    let mut balance = 0i64;
    for impact in &mut impacts {
        balance += impact.value;
        impact.balance = balance;
    }

    impacts.reverse();
    impacts
}

/// Classifies one transaction against the ownership chains.
///
/// `balance` is left at zero; the ledger fold fills it in.
fn analyze_transaction(
    info: &TransactionInfo,
    by_id: &HashMap<Txid, &Arc<TransactionInfo>>,
    external: &impl AddressChain,
    internal: &impl AddressChain,
    network: Network,
) -> TransactionImpact {
    let mut value = 0i64;
    let mut debits = 0usize;

    for txin in &info.tx.input {
        let Some(previous) = by_id.get(&txin.previous_output.txid) else {
            continue;
        };
        let Some(spent) = previous.tx.output.get(txin.previous_output.vout as usize) else {
            continue;
        };
        if let Some(address) = output_address(spent, network) {
            if external.contains(&address) || internal.contains(&address) {
                value -= spent.value.to_sat() as i64;
                debits += 1;
            }
        }
    }

    let mut external_credits = Vec::new();
    let mut internal_credits = Vec::new();
    let mut foreign = Vec::new();
    for txout in &info.tx.output {
        match output_address(txout, network) {
            Some(address) if external.contains(&address) => {
                value += txout.value.to_sat() as i64;
                external_credits.push(txout.clone());
            }
            Some(address) if internal.contains(&address) => {
                value += txout.value.to_sat() as i64;
                internal_credits.push(txout.clone());
            }
            _ => foreign.push(txout.clone()),
        }
    }

    let all_inputs_debit = debits == info.tx.input.len();
    let all_outputs_credit = foreign.is_empty();

    let (kind, targets) = if all_inputs_debit && all_outputs_credit {
        (ImpactKind::Internal, Vec::new())
    } else if value > 0 {
        // Change-only incoming (e.g. a self-payment routed through change)
        // falls back to the internal chain's outputs.
        let targets = if external_credits.is_empty() {
            internal_credits
        } else {
            external_credits
        };
        (ImpactKind::Incoming, targets)
    } else {
        (ImpactKind::Outgoing, foreign)
    };

    TransactionImpact {
        id: info.id,
        height: info.height,
        timestamp: info.timestamp,
        kind,
        value,
        balance: 0,
        targets,
    }
}

/// Renders an output's owning address, when its script has an address form
/// on `network`.
fn output_address(txout: &TxOut, network: Network) -> Option<String> {
    Address::from_script(&txout.script_pubkey, network)
        .ok()
        .map(|address| address.to_string())
}
