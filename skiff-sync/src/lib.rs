//! Skiff's synchronization and accounting core.
//!
//! Built over a pluggable push transport:
//! - [`SyncClient`] owns the watched-address set and exposes the live
//!   notification feed plus the paged history lookups, deduplicating every
//!   observation through a single-flight [`TransactionCache`].
//! - [`derive_impacts`] turns the completed transaction set into the
//!   wallet-level ledger: per-transaction classification and a running
//!   balance in stable chronological order.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod client;
pub mod error;
pub mod history;
pub mod ledger;
pub mod types;

pub use cache::TransactionCache;
pub use client::{NotificationFeed, SyncClient};
pub use error::SyncError;
pub use history::{HeightRange, HistoryPage, PageState};
pub use ledger::{derive_impacts, AddressChain, ImpactKind, TransactionImpact};
pub use types::{TransactionInfo, TransactionMatch};

#[cfg(test)]
pub(crate) mod testutil;
