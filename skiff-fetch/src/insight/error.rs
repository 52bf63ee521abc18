//! Hold error types for the backend connectors.

/// General error type for transport-level failures of either backend channel.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Type for errors without an underlying source.
    #[error("transport error: {0}")]
    Message(String),

    /// Reqwest based errors.
    #[error("http request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// URL parse errors.
    #[error("invalid url: {0}")]
    UrlParse(#[from] url::ParseError),

    /// The push channel is no longer connected.
    #[error("push channel closed")]
    ChannelClosed,
}

impl TransportError {
    /// Constructor for errors without an underlying source.
    pub fn new(msg: impl Into<String>) -> Self {
        TransportError::Message(msg.into())
    }
}

/// Error type for requests made against the backend.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Failure of the underlying channel.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Non-success status from the auxiliary HTTP API.
    #[error("request failed with http status {0}")]
    RequestFailed(u16),

    /// The backend rejected the request at the RPC level, e.g. a raw
    /// transaction refused on broadcast.
    #[error("rejected by backend: {0}")]
    RejectedByBackend(String),

    /// A request or reply payload failed to encode or decode.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
