//! The Insight-style backend surface.
//!
//! Holds the push-channel capability trait the synchronization client is
//! built over, a typed RPC client speaking the backend's `{method, params}`
//! message shape, and the connector for the optional auxiliary HTTP API.

pub mod connector;
pub mod error;
pub mod response;
pub mod rpc;
pub mod transport;

pub use connector::InsightConnector;
pub use error::{FetchError, TransportError};
pub use response::{
    AddressActivity, AddressHistoryItem, BlockHashResponse, GetAddressHistoryResponse,
    HistoryOptions, SyncStatus,
};
pub use rpc::PushRpc;
pub use transport::{PushTransport, RpcReply, ADDRESS_TRANSACTION_EVENT};
