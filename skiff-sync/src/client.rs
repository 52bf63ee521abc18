//! The synchronization client.
//!
//! Owns the watched-address set, exposes the live feeds, and builds the
//! lookup operations atop the pagination engine and the wire adapters. The
//! client observes its transport; it never retries or reconnects on its own.

use std::collections::HashSet;
use std::sync::Arc;

use futures::{Stream, TryStreamExt};
use tokio::sync::{broadcast, mpsc, RwLock};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use skiff_common::ClientConfig;
use skiff_fetch::insight::{
    connector::InsightConnector,
    error::TransportError,
    response::SyncStatus,
    rpc::PushRpc,
    transport::{PushTransport, ADDRESS_TRANSACTION_EVENT},
};
use skiff_fetch::wire::{normalized_height, AddressTxEvent, ConvertError};

use crate::{
    cache::TransactionCache,
    error::SyncError,
    history::{page_stream, HeightRange, HistoryPage},
    ledger::{derive_impacts, AddressChain, TransactionImpact},
    types::{TransactionInfo, TransactionMatch},
};

/// Client synchronizing a set of watched addresses against one backend.
pub struct SyncClient<T> {
    transport: Arc<T>,
    rpc: PushRpc<T>,
    insight: Option<InsightConnector>,
    cache: TransactionCache,
    watched: RwLock<HashSet<String>>,
    config: ClientConfig,
}

impl<T: PushTransport> SyncClient<T> {
    /// Creates a client over `transport` with `config`.
    ///
    /// The auxiliary Insight connector is only constructed when the config
    /// names one; operations needing it fail with
    /// [`SyncError::CapabilityMissing`] otherwise.
    pub fn new(transport: Arc<T>, config: ClientConfig) -> Result<Self, SyncError> {
        let insight = config
            .insight
            .as_ref()
            .map(InsightConnector::new)
            .transpose()?;
        Ok(SyncClient {
            rpc: PushRpc::new(transport.clone()),
            transport,
            insight,
            cache: TransactionCache::new(),
            watched: RwLock::new(HashSet::new()),
            config,
        })
    }

    /// The transaction cache shared by this client's feeds and lookups.
    pub fn cache(&self) -> &TransactionCache {
        &self.cache
    }

    /// Extends the watched-address set.
    ///
    /// Idempotent: only addresses not already watched are forwarded to the
    /// transport subscription, so repeated calls never duplicate network
    /// subscriptions.
    pub async fn subscribe(&self, addresses: &[String]) -> Result<(), SyncError> {
        let mut watched = self.watched.write().await;
        let fresh: Vec<String> = addresses
            .iter()
            .filter(|address| !watched.contains(*address))
            .cloned()
            .collect();
        if fresh.is_empty() {
            return Ok(());
        }

        info!(count = fresh.len(), "subscribing new addresses");
        self.transport
            .subscribe(ADDRESS_TRANSACTION_EVENT, &fresh)
            .await?;
        watched.extend(fresh);
        Ok(())
    }

    /// The addresses currently watched.
    pub async fn watched(&self) -> HashSet<String> {
        self.watched.read().await.clone()
    }

    /// Opens the live notification feed.
    ///
    /// Every raw push event is normalised through the wire adapter and the
    /// transaction cache. A malformed event rejects that one item, never
    /// the feed. Dropping the returned feed releases the underlying
    /// listener.
    pub fn notifications(&self) -> NotificationFeed {
        let mut events = self.transport.transaction_events();
        let cache = self.cache.clone();
        let (feed_tx, feed_rx) = mpsc::channel(32);

        let task = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        let item = match_from_event(&cache, &event).map_err(SyncError::from);
                        if feed_tx.send(item).await.is_err() {
                            return;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "notification feed lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => return,
                }
            }
        });

        NotificationFeed {
            receiver: feed_rx,
            task,
        }
    }

    /// Transport-level errors, observed as they happen.
    ///
    /// Non-fatal by definition here: whether to tear down or reconnect is
    /// the caller's decision.
    pub fn errors(&self) -> broadcast::Receiver<Arc<TransportError>> {
        self.transport.errors()
    }

    /// Transport reconnections.
    ///
    /// Subscription state does not survive a reconnect; the caller is
    /// responsible for resubscribing its addresses.
    pub fn reconnections(&self) -> broadcast::Receiver<()> {
        self.transport.reconnections()
    }

    /// The paged history of `addresses` as a lazy page stream.
    pub fn lookup_transactions_stream(
        &self,
        addresses: Vec<String>,
        range: HeightRange,
    ) -> impl Stream<Item = Result<HistoryPage, SyncError>> {
        page_stream(
            self.rpc.clone(),
            self.cache.clone(),
            addresses,
            range,
            self.config.page_length,
        )
    }

    /// The full history of `addresses` as one resolved collection.
    ///
    /// Page order is preserved: earlier pages' items precede later ones'.
    pub async fn lookup_transactions(
        &self,
        addresses: Vec<String>,
        range: HeightRange,
    ) -> Result<Vec<TransactionMatch>, SyncError> {
        let pages: Vec<HistoryPage> = self
            .lookup_transactions_stream(addresses, range)
            .try_collect()
            .await?;
        Ok(pages.into_iter().flat_map(|page| page.items).collect())
    }

    /// Fetches one transaction's detail through the Insight path and
    /// interns it.
    pub async fn lookup_transaction(&self, txid: &str) -> Result<Arc<TransactionInfo>, SyncError> {
        let insight = self.insight.as_ref().ok_or(SyncError::CapabilityMissing)?;
        let wire_tx = insight.transaction(txid).await?;
        let id = wire_tx.txid()?;
        let info = self.cache.intern_or_build(id, || {
            Ok::<_, ConvertError>(TransactionInfo {
                id,
                tx: wire_tx.to_transaction()?,
                height: normalized_height(wire_tx.block_height),
                timestamp: wire_tx.time,
            })
        })?;
        Ok(info)
    }

    /// Broadcasts raw signed transaction bytes.
    ///
    /// Returns the backend-assigned transaction id, or surfaces the
    /// backend's rejection message.
    pub async fn send_transaction(&self, raw_hex: &str) -> Result<String, SyncError> {
        Ok(self.rpc.send_transaction(raw_hex).await?)
    }

    /// Returns the hash of the block at `height`.
    pub async fn lookup_block_hash(&self, height: u32) -> Result<String, SyncError> {
        let insight = self.insight.as_ref().ok_or(SyncError::CapabilityMissing)?;
        Ok(insight.block_hash(height).await?.block_hash)
    }

    /// Returns the backend's current sync status.
    pub async fn lookup_sync_status(&self) -> Result<SyncStatus, SyncError> {
        let insight = self.insight.as_ref().ok_or(SyncError::CapabilityMissing)?;
        Ok(insight.sync_status().await?)
    }

    /// Derives the ordered impact ledger over every transaction observed so
    /// far.
    pub fn derive_impacts(
        &self,
        external: &impl AddressChain,
        internal: &impl AddressChain,
    ) -> Vec<TransactionImpact> {
        derive_impacts(
            &self.cache.snapshot(),
            external,
            internal,
            self.config.network.to_bitcoin(),
        )
    }
}

/// Builds a match from one live push event, interning its transaction.
fn match_from_event(
    cache: &TransactionCache,
    event: &AddressTxEvent,
) -> Result<TransactionMatch, ConvertError> {
    let id = event.tx.txid()?;
    let info = cache.intern_or_build(id, || {
        Ok::<_, ConvertError>(TransactionInfo {
            id,
            tx: event.tx.to_transaction(true)?,
            height: normalized_height(event.height.or(event.tx.height)),
            timestamp: event.timestamp.or(event.tx.block_timestamp),
        })
    })?;

    let mut addresses = HashSet::new();
    addresses.insert(event.address.clone());
    Ok(TransactionMatch {
        info,
        addresses,
        rejected: event.rejected,
    })
}

/// Guard over the live notification feed.
///
/// Forward-only and not restartable once consumed. Dropping it aborts the
/// mapping task, which releases the underlying transport listener.
#[derive(Debug)]
pub struct NotificationFeed {
    receiver: mpsc::Receiver<Result<TransactionMatch, SyncError>>,
    task: JoinHandle<()>,
}

impl NotificationFeed {
    /// Receives the next match; `None` once the feed has ended.
    pub async fn recv(&mut self) -> Option<Result<TransactionMatch, SyncError>> {
        self.receiver.recv().await
    }
}

impl Drop for NotificationFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use skiff_common::Network;

    use super::*;
    use crate::testutil::{address_event, history_item, node_tx, MockTransport};

    const WATCHED: &str = "1111111111111111111114oLvT2";

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .try_init();
    }

    fn client(transport: Arc<MockTransport>) -> SyncClient<MockTransport> {
        SyncClient::new(transport, ClientConfig::new(Network::Livenet)).unwrap()
    }

    #[tokio::test]
    async fn subscribe_forwards_only_unwatched_addresses() {
        init_tracing();
        let transport = MockTransport::new();
        let client = client(transport.clone());

        client
            .subscribe(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        client
            .subscribe(&["b".to_string(), "c".to_string()])
            .await
            .unwrap();
        client.subscribe(&["a".to_string()]).await.unwrap();

        let subscriptions = transport.subscriptions.lock().unwrap();
        assert_eq!(subscriptions.len(), 2);
        assert_eq!(subscriptions[0].0, ADDRESS_TRANSACTION_EVENT);
        assert_eq!(subscriptions[0].1, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(subscriptions[1].1, vec!["c".to_string()]);
        assert_eq!(client.watched().await.len(), 3);
    }

    #[tokio::test]
    async fn notifications_are_normalised_and_flag_rejections() {
        let transport = MockTransport::new();
        let client = client(transport.clone());
        let mut feed = client.notifications();

        transport
            .events
            .send(address_event(1, WATCHED, false))
            .unwrap();
        transport
            .events
            .send(address_event(2, WATCHED, true))
            .unwrap();

        let first = feed.recv().await.unwrap().unwrap();
        assert!(!first.rejected);
        assert!(first.addresses.contains(WATCHED));
        // No chain metadata on the event: unconfirmed.
        assert_eq!(first.info.height, None);

        let second = feed.recv().await.unwrap().unwrap();
        assert!(second.rejected);
        assert_eq!(client.cache().len(), 2);
    }

    #[tokio::test]
    async fn live_and_historical_observations_intern_once() {
        let transport = MockTransport::new();
        let client = client(transport.clone());

        let mut feed = client.notifications();
        transport
            .events
            .send(address_event(7, WATCHED, false))
            .unwrap();
        let live = feed.recv().await.unwrap().unwrap();

        transport.script_history(1, vec![history_item(7, WATCHED)]);
        let matches = client
            .lookup_transactions(vec![WATCHED.to_string()], HeightRange::default())
            .await
            .unwrap();

        assert_eq!(matches.len(), 1);
        assert!(Arc::ptr_eq(&live.info, &matches[0].info));
        assert_eq!(client.cache().len(), 1);
        // The historical page did not rebuild the cached entry, so the
        // first observation's metadata stands.
        assert_eq!(matches[0].info.height, None);
    }

    #[tokio::test]
    async fn a_malformed_event_rejects_one_item_not_the_feed() {
        let transport = MockTransport::new();
        let client = client(transport.clone());
        let mut feed = client.notifications();

        let mut broken = address_event(3, WATCHED, false);
        broken.tx.hash = "not-hex".to_string();
        transport.events.send(broken).unwrap();
        transport
            .events
            .send(address_event(4, WATCHED, false))
            .unwrap();

        assert!(matches!(
            feed.recv().await.unwrap(),
            Err(SyncError::Convert(_))
        ));
        let next = feed.recv().await.unwrap().unwrap();
        assert_eq!(next.info.id, node_tx(4).txid().unwrap());
    }

    #[tokio::test]
    async fn transport_events_pass_through_untouched() {
        let transport = MockTransport::new();
        let client = client(transport.clone());

        let mut reconnections = client.reconnections();
        let mut errors = client.errors();

        transport.reconnections.send(()).unwrap();
        transport
            .errors
            .send(Arc::new(TransportError::ChannelClosed))
            .unwrap();

        reconnections.recv().await.unwrap();
        let observed = errors.recv().await.unwrap();
        assert!(matches!(*observed, TransportError::ChannelClosed));
    }

    #[tokio::test]
    async fn insight_operations_require_the_capability() {
        let transport = MockTransport::new();
        let client = client(transport);

        assert!(matches!(
            client.lookup_block_hash(1).await,
            Err(SyncError::CapabilityMissing)
        ));
        assert!(matches!(
            client.lookup_sync_status().await,
            Err(SyncError::CapabilityMissing)
        ));
        assert!(matches!(
            client.lookup_transaction("00").await,
            Err(SyncError::CapabilityMissing)
        ));
    }

    #[tokio::test]
    async fn send_transaction_surfaces_backend_rejections() {
        use skiff_fetch::insight::error::FetchError;
        use skiff_fetch::insight::transport::RpcReply;

        let transport = MockTransport::new();
        transport.script(
            "sendTransaction",
            RpcReply {
                error: None,
                result: serde_json::json!("cafebabe"),
            },
        );
        transport.script(
            "sendTransaction",
            RpcReply {
                error: Some(serde_json::json!({ "message": "66: insufficient priority" })),
                result: serde_json::Value::Null,
            },
        );

        let client = client(transport);
        assert_eq!(client.send_transaction("0100").await.unwrap(), "cafebabe");
        match client.send_transaction("0100").await {
            Err(SyncError::Fetch(FetchError::RejectedByBackend(message))) => {
                assert_eq!(message, "66: insufficient priority");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn derive_impacts_runs_over_the_cache_snapshot() {
        let transport = MockTransport::new();
        let client = client(transport.clone());

        transport.script_history(1, vec![history_item(9, WATCHED)]);
        client
            .lookup_transactions(vec![WATCHED.to_string()], HeightRange::default())
            .await
            .unwrap();

        let external: std::collections::HashSet<String> =
            [WATCHED.to_string()].into_iter().collect();
        let internal = std::collections::HashSet::new();
        let impacts = client.derive_impacts(&external, &internal);
        assert_eq!(impacts.len(), 1);
    }
}
