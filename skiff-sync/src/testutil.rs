//! Scripted transport doubles and fixtures for client and pagination tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::broadcast;

use skiff_fetch::insight::error::TransportError;
use skiff_fetch::insight::response::{
    AddressActivity, AddressHistoryItem, GetAddressHistoryResponse,
};
use skiff_fetch::insight::transport::{PushTransport, RpcReply};
use skiff_fetch::wire::{AddressTxEvent, NodeTx, NodeTxIn, NodeTxOut};

/// A push transport that replays scripted RPC replies and records every
/// call made against it.
pub(crate) struct MockTransport {
    pub(crate) replies: Mutex<HashMap<String, VecDeque<RpcReply>>>,
    pub(crate) calls: Mutex<Vec<(String, Vec<serde_json::Value>)>>,
    pub(crate) subscriptions: Mutex<Vec<(String, Vec<String>)>>,
    pub(crate) events: broadcast::Sender<AddressTxEvent>,
    pub(crate) errors: broadcast::Sender<Arc<TransportError>>,
    pub(crate) reconnections: broadcast::Sender<()>,
}

impl MockTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(MockTransport {
            replies: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            subscriptions: Mutex::new(Vec::new()),
            events: broadcast::channel(16).0,
            errors: broadcast::channel(16).0,
            reconnections: broadcast::channel(16).0,
        })
    }

    pub(crate) fn script(&self, method: &str, reply: RpcReply) {
        self.replies
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_default()
            .push_back(reply);
    }

    pub(crate) fn script_history(&self, total_count: u32, items: Vec<AddressHistoryItem>) {
        let response = GetAddressHistoryResponse { total_count, items };
        self.script(
            "getAddressHistory",
            RpcReply {
                error: None,
                result: serde_json::to_value(response).unwrap(),
            },
        );
    }
}

#[async_trait]
impl PushTransport for MockTransport {
    async fn subscribe(&self, event: &str, addresses: &[String]) -> Result<(), TransportError> {
        self.subscriptions
            .lock()
            .unwrap()
            .push((event.to_string(), addresses.to_vec()));
        Ok(())
    }

    async fn rpc(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<RpcReply, TransportError> {
        self.calls.lock().unwrap().push((method.to_string(), params));
        self.replies
            .lock()
            .unwrap()
            .get_mut(method)
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| TransportError::new(format!("no scripted reply for {method}")))
    }

    fn transaction_events(&self) -> broadcast::Receiver<AddressTxEvent> {
        self.events.subscribe()
    }

    fn errors(&self) -> broadcast::Receiver<Arc<TransportError>> {
        self.errors.subscribe()
    }

    fn reconnections(&self) -> broadcast::Receiver<()> {
        self.reconnections.subscribe()
    }
}

/// A minimal node-format transaction with a unique id derived from `tag`.
pub(crate) fn node_tx(tag: u8) -> NodeTx {
    NodeTx {
        hash: format!("{:064x}", u64::from(tag) + 1),
        version: 1,
        lock_time: 0,
        inputs: vec![NodeTxIn {
            prev_tx_id: format!("{:064x}", 0xfeed_u64),
            output_index: 0,
            script: String::new(),
            sequence_number: u32::MAX,
        }],
        outputs: vec![NodeTxOut {
            satoshis: 1_000,
            script: String::new(),
        }],
        height: None,
        block_timestamp: None,
    }
}

/// A history item for `address` wrapping [`node_tx`].
pub(crate) fn history_item(tag: u8, address: &str) -> AddressHistoryItem {
    let mut addresses = HashMap::new();
    addresses.insert(address.to_string(), AddressActivity::default());
    AddressHistoryItem {
        addresses,
        tx: node_tx(tag),
        height: Some(100 + i64::from(tag)),
        timestamp: Some(1_700_000_000),
    }
}

/// A live event for `address` wrapping [`node_tx`].
pub(crate) fn address_event(tag: u8, address: &str, rejected: bool) -> AddressTxEvent {
    AddressTxEvent {
        address: address.to_string(),
        rejected,
        height: None,
        timestamp: None,
        tx: node_tx(tag),
    }
}
