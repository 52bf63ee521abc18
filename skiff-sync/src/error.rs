//! Hold error types for the synchronization client.

use skiff_fetch::insight::error::{FetchError, TransportError};
use skiff_fetch::wire::ConvertError;

/// Errors surfaced by the synchronization client.
///
/// Every variant rejects the specific pending operation only; a failure
/// never terminates the live notification feed or other in-flight
/// pagination.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Failure of a backend request.
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Failure of the underlying channel.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A backend record failed to convert into its canonical form.
    #[error("conversion error: {0}")]
    Convert(#[from] ConvertError),

    /// The operation needs the auxiliary Insight HTTP API, which this
    /// backend does not expose. Fatal for the call, harmless for every
    /// other operation.
    #[error("backend does not expose the auxiliary insight api")]
    CapabilityMissing,
}
