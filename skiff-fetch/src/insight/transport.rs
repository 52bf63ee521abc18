//! The push-channel capability the synchronization client is built over.
//!
//! The concrete socket implementation lives outside this workspace; the
//! client only depends on the capabilities named here. Reconnection is the
//! transport's own affair and is only ever observed, never initiated, from
//! this side.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::insight::error::TransportError;
use crate::wire::AddressTxEvent;

/// Event name carrying live address activity.
pub const ADDRESS_TRANSACTION_EVENT: &str = "address/transaction";

/// Reply envelope of an RPC-style message sent over the push channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RpcReply {
    /// Error payload, set when the backend rejected the call.
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    /// Result payload.
    #[serde(default)]
    pub result: serde_json::Value,
}

/// Capabilities required of the bidirectional push channel.
///
/// Feeds are push-driven and not consumer-paced; buffering and drop policy
/// under a slow consumer belong to the transport, which is why they surface
/// here as broadcast subscriptions.
#[async_trait]
pub trait PushTransport: Send + Sync + 'static {
    /// Sends a `subscribe` control message for `event` covering `addresses`.
    async fn subscribe(&self, event: &str, addresses: &[String]) -> Result<(), TransportError>;

    /// Sends an RPC-style `{method, params}` message and returns the reply
    /// envelope.
    async fn rpc(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<RpcReply, TransportError>;

    /// Subscribes to live address-transaction events.
    fn transaction_events(&self) -> broadcast::Receiver<AddressTxEvent>;

    /// Subscribes to transport-level errors.
    fn errors(&self) -> broadcast::Receiver<Arc<TransportError>>;

    /// Subscribes to reconnection notifications.
    ///
    /// Subscription state does not survive a reconnect; whoever observes one
    /// is responsible for resubscribing its addresses.
    fn reconnections(&self) -> broadcast::Receiver<()>;
}
