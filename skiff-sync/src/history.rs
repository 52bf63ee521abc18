//! Paged address-history fetching.
//!
//! The backend reports a running `totalCount` alongside every page and may
//! revise it while pages are being fetched; the walk always trusts the
//! latest reported value. State between pages is an explicit accumulator
//! threaded through a pure step, exposed as a lazy, forward-only page
//! stream and as a resolved collection.

use futures::Stream;

use skiff_fetch::insight::{
    response::{AddressHistoryItem, HistoryOptions},
    rpc::PushRpc,
    transport::PushTransport,
};
use skiff_fetch::wire::{normalized_height, ConvertError};

use crate::{
    cache::TransactionCache,
    error::SyncError,
    types::{TransactionInfo, TransactionMatch},
};

/// Window state carried between history pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    /// First item index of the last requested window.
    pub from: u32,
    /// Past-the-end item index of the last requested window.
    pub to: u32,
    /// Latest total item count the backend reported.
    pub total_count: u32,
}

impl PageState {
    /// Seed state: nothing fetched yet, total assumed to be one page so the
    /// first request covers `[0, page_length)`.
    pub fn seed(page_length: u32) -> Self {
        PageState {
            from: 0,
            to: 0,
            total_count: page_length,
        }
    }

    /// True once the fetched window has reached the reported total.
    pub fn exhausted(&self) -> bool {
        self.to >= self.total_count
    }

    /// The next window to request: `[to, min(to + page_length, total_count))`.
    pub fn next_window(&self, page_length: u32) -> (u32, u32) {
        (
            self.to,
            self.total_count.min(self.to.saturating_add(page_length)),
        )
    }
}

/// One resolved page of history matches.
#[derive(Debug, Clone)]
pub struct HistoryPage {
    /// Matches of this window, in backend order.
    pub items: Vec<TransactionMatch>,
    /// First item index of the window.
    pub from: u32,
    /// Past-the-end item index of the window.
    pub to: u32,
    /// The total count reported with this page.
    pub total_count: u32,
}

/// Block-height bounds of a history query, both inclusive.
///
/// Independent of the pagination window, which counts items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeightRange {
    /// Lower bound.
    pub start: Option<u32>,
    /// Upper bound.
    pub end: Option<u32>,
}

/// Walks the full history of `addresses` as a lazy page stream.
///
/// Forward-only and not restartable. Each page request completes or fails
/// as a unit; an error ends the stream after surfacing it.
pub(crate) fn page_stream<T: PushTransport>(
    rpc: PushRpc<T>,
    cache: TransactionCache,
    addresses: Vec<String>,
    range: HeightRange,
    page_length: u32,
) -> impl Stream<Item = Result<HistoryPage, SyncError>> {
    futures::stream::try_unfold(PageState::seed(page_length), move |state| {
        let rpc = rpc.clone();
        let cache = cache.clone();
        let addresses = addresses.clone();
        async move {
            if state.exhausted() {
                return Ok(None);
            }

            let (from, to) = state.next_window(page_length);
            let options = HistoryOptions {
                start: range.start,
                end: range.end,
                from,
                to,
                query_mempool: true,
            };
            let response = rpc.get_address_history(&addresses, &options).await?;

            // The seed assumed one page existed; an empty history only
            // becomes visible with the first reply.
            if response.total_count == 0 && response.items.is_empty() {
                return Ok(None);
            }

            let items = response
                .items
                .iter()
                .map(|item| match_from_history_item(&cache, item))
                .collect::<Result<Vec<_>, SyncError>>()?;

            let next = PageState {
                from,
                to,
                total_count: response.total_count,
            };
            Ok(Some((
                HistoryPage {
                    items,
                    from,
                    to,
                    total_count: response.total_count,
                },
                next,
            )))
        }
    })
}

/// Builds a match from one history item, interning its transaction.
pub(crate) fn match_from_history_item(
    cache: &TransactionCache,
    item: &AddressHistoryItem,
) -> Result<TransactionMatch, SyncError> {
    let id = item.tx.txid()?;
    let info = cache.intern_or_build(id, || {
        Ok::<_, ConvertError>(TransactionInfo {
            id,
            tx: item.tx.to_transaction(true)?,
            height: normalized_height(item.height()),
            timestamp: item.timestamp(),
        })
    })?;
    Ok(TransactionMatch {
        info,
        addresses: item.addresses.keys().cloned().collect(),
        rejected: false,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio_stream::StreamExt;

    use skiff_fetch::insight::rpc::PushRpc;

    use super::*;
    use crate::testutil::{history_item, MockTransport};

    #[test]
    fn seed_state_requests_one_page_from_zero() {
        let seed = PageState::seed(100);
        assert!(!seed.exhausted());
        assert_eq!(seed.next_window(100), (0, 100));
    }

    #[test]
    fn windows_are_clamped_to_the_latest_total() {
        let state = PageState {
            from: 0,
            to: 100,
            total_count: 150,
        };
        assert_eq!(state.next_window(100), (100, 150));

        let done = PageState {
            from: 100,
            to: 150,
            total_count: 150,
        };
        assert!(done.exhausted());
    }

    async fn collect_pages(
        transport: Arc<MockTransport>,
        page_length: u32,
    ) -> Vec<HistoryPage> {
        let stream = page_stream(
            PushRpc::new(transport),
            TransactionCache::new(),
            vec!["1111111111111111111114oLvT2".to_string()],
            HeightRange::default(),
            page_length,
        );
        let mut stream = Box::pin(stream);
        let mut pages = Vec::new();
        while let Some(page) = stream.next().await {
            pages.push(page.unwrap());
        }
        pages
    }

    #[tokio::test]
    async fn emits_one_page_per_window_until_the_total() {
        let transport = MockTransport::new();
        let items: Vec<_> = (0..7)
            .map(|tag| history_item(tag, "1111111111111111111114oLvT2"))
            .collect();
        transport.script_history(7, items[0..3].to_vec());
        transport.script_history(7, items[3..6].to_vec());
        transport.script_history(7, items[6..7].to_vec());

        let pages = collect_pages(transport.clone(), 3).await;
        assert_eq!(pages.len(), 3);
        assert_eq!(pages.iter().map(|p| p.items.len()).sum::<usize>(), 7);
        assert_eq!((pages[2].from, pages[2].to), (6, 7));

        // The engine asked for exactly the expected windows.
        let calls = transport.calls.lock().unwrap();
        let windows: Vec<(u64, u64)> = calls
            .iter()
            .map(|(_, params)| {
                let options = &params[1];
                (
                    options.get("from").unwrap().as_u64().unwrap(),
                    options.get("to").unwrap().as_u64().unwrap(),
                )
            })
            .collect();
        assert_eq!(windows, vec![(0, 3), (3, 6), (6, 7)]);
    }

    #[tokio::test]
    async fn concatenation_is_partition_invariant() {
        let items: Vec<_> = (0..7)
            .map(|tag| history_item(tag, "1111111111111111111114oLvT2"))
            .collect();

        let by_threes = MockTransport::new();
        by_threes.script_history(7, items[0..3].to_vec());
        by_threes.script_history(7, items[3..6].to_vec());
        by_threes.script_history(7, items[6..7].to_vec());

        let whole = MockTransport::new();
        whole.script_history(7, items.clone());

        let small_pages = collect_pages(by_threes, 3).await;
        let one_page = collect_pages(whole, 10).await;

        let small_ids: Vec<_> = small_pages
            .iter()
            .flat_map(|p| p.items.iter().map(|m| m.info.id))
            .collect();
        let whole_ids: Vec<_> = one_page
            .iter()
            .flat_map(|p| p.items.iter().map(|m| m.info.id))
            .collect();
        assert_eq!(small_ids, whole_ids);
        assert_eq!(small_ids.len(), 7);
    }

    #[tokio::test]
    async fn trusts_the_latest_reported_total() {
        let transport = MockTransport::new();
        let items: Vec<_> = (0..6)
            .map(|tag| history_item(tag, "1111111111111111111114oLvT2"))
            .collect();
        // The backend first believes there are 5 matches, then revises to 6
        // while the walk is in flight.
        transport.script_history(5, items[0..3].to_vec());
        transport.script_history(6, items[3..5].to_vec());
        transport.script_history(6, items[5..6].to_vec());

        let pages = collect_pages(transport.clone(), 3).await;
        assert_eq!(pages.len(), 3);
        assert_eq!(pages.iter().map(|p| p.items.len()).sum::<usize>(), 6);

        let calls = transport.calls.lock().unwrap();
        assert_eq!(calls.len(), 3);
        let last = &calls[2].1[1];
        assert_eq!(last.get("from").unwrap().as_u64(), Some(5));
        assert_eq!(last.get("to").unwrap().as_u64(), Some(6));
    }

    #[tokio::test]
    async fn an_empty_history_yields_no_pages() {
        let transport = MockTransport::new();
        transport.script_history(0, Vec::new());
        let pages = collect_pages(transport, 100).await;
        assert!(pages.is_empty());
    }

    #[tokio::test]
    async fn height_bounds_and_mempool_flag_ride_along() {
        let transport = MockTransport::new();
        transport.script_history(0, Vec::new());

        let stream = page_stream(
            PushRpc::new(transport.clone()),
            TransactionCache::new(),
            vec!["1111111111111111111114oLvT2".to_string()],
            HeightRange {
                start: Some(600_000),
                end: Some(650_000),
            },
            100,
        );
        let mut stream = Box::pin(stream);
        assert!(stream.next().await.is_none());

        let calls = transport.calls.lock().unwrap();
        let options = &calls[0].1[1];
        assert_eq!(options.get("start").unwrap().as_u64(), Some(600_000));
        assert_eq!(options.get("end").unwrap().as_u64(), Some(650_000));
        assert_eq!(options.get("queryMempool"), Some(&serde_json::json!(true)));
    }
}
