//! Identity-keyed interning of observed transactions.

use std::sync::Arc;

use bitcoin::Txid;
use dashmap::{mapref::entry::Entry, DashMap};

use crate::types::TransactionInfo;

/// Interns [`TransactionInfo`] values by transaction id.
///
/// Live notifications and historical pages may observe the same transaction
/// concurrently; the entry API holds the shard lock across the build, so a
/// given id is materialized at most once no matter how the observations
/// race. No eviction: entries live for the sync session.
#[derive(Debug, Default, Clone)]
pub struct TransactionCache {
    transactions: Arc<DashMap<Txid, Arc<TransactionInfo>>>,
}

impl TransactionCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        TransactionCache::default()
    }

    /// Returns the interned value for `id`, building and storing it with
    /// `build` on first observation.
    ///
    /// A failed build stores nothing; the next observation retries.
    pub fn intern_or_build<E>(
        &self,
        id: Txid,
        build: impl FnOnce() -> Result<TransactionInfo, E>,
    ) -> Result<Arc<TransactionInfo>, E> {
        match self.transactions.entry(id) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                let info = Arc::new(build()?);
                entry.insert(info.clone());
                Ok(info)
            }
        }
    }

    /// Returns the interned value for `id`, if present.
    pub fn get(&self, id: &Txid) -> Option<Arc<TransactionInfo>> {
        self.transactions.get(id).map(|entry| entry.value().clone())
    }

    /// Number of interned transactions.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// True while nothing has been interned.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// The completed-collection view: every interned transaction.
    ///
    /// Order is unspecified; consumers order by chain metadata.
    pub fn snapshot(&self) -> Vec<Arc<TransactionInfo>> {
        self.transactions
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}
