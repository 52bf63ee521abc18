//! Typed RPC client over the push channel.
//!
//! Mirrors the backend's `{method, params} -> {error?, result}` message
//! shape, decoding the reply envelope exactly once per call.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::insight::{
    error::FetchError,
    response::{GetAddressHistoryResponse, HistoryOptions},
    transport::PushTransport,
};

/// Typed RPC surface of a [`PushTransport`].
#[derive(Debug)]
pub struct PushRpc<T> {
    transport: Arc<T>,
}

impl<T> Clone for PushRpc<T> {
    fn clone(&self) -> Self {
        PushRpc {
            transport: self.transport.clone(),
        }
    }
}

impl<T: PushTransport> PushRpc<T> {
    /// Wraps a shared transport handle.
    pub fn new(transport: Arc<T>) -> Self {
        PushRpc { transport }
    }

    /// Sends an RPC message and decodes the reply envelope.
    async fn send_request<R: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<R, FetchError> {
        let reply = self.transport.rpc(method, params).await?;

        if let Some(error) = reply.error {
            if !error.is_null() {
                let message = error
                    .get("message")
                    .and_then(|message| message.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| error.to_string());
                return Err(FetchError::RejectedByBackend(message));
            }
        }

        Ok(serde_json::from_value(reply.result)?)
    }

    /// Returns one window of the history of `addresses`.
    pub async fn get_address_history(
        &self,
        addresses: &[String],
        options: &HistoryOptions,
    ) -> Result<GetAddressHistoryResponse, FetchError> {
        let params = vec![
            serde_json::to_value(addresses)?,
            serde_json::to_value(options)?,
        ];
        self.send_request("getAddressHistory", params).await
    }

    /// Submits raw signed transaction bytes.
    ///
    /// Returns the backend-assigned transaction id, or
    /// [`FetchError::RejectedByBackend`] with the backend's message.
    pub async fn send_transaction(&self, raw_hex: &str) -> Result<String, FetchError> {
        let params = vec![serde_json::to_value(raw_hex)?];
        self.send_request("sendTransaction", params).await
    }
}
