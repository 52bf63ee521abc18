//! Insight HTTP connector.
//!
//! The auxiliary REST surface some backends expose next to the push channel.
//! Serves block-hash, sync-status and single-transaction queries; any
//! non-success status is a hard failure for that request.

use std::time::Duration;

use reqwest::{Client, ClientBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use skiff_common::InsightConfig;

use crate::insight::{
    error::{FetchError, TransportError},
    response::{BlockHashResponse, SyncStatus},
};
use crate::wire::InsightTx;

/// Insight HTTP client config data.
#[derive(Debug, Clone)]
pub struct InsightConnector {
    base: Url,
    client: Client,
}

impl InsightConnector {
    /// Creates a connector for the configured endpoint.
    pub fn new(config: &InsightConfig) -> Result<Self, TransportError> {
        let base = Url::parse(&format!(
            "{}/{}/",
            config.endpoint.trim_end_matches('/'),
            config.path.trim_matches('/')
        ))?;

        let client = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(2))
            .timeout(Duration::from_secs(5))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(TransportError::Reqwest)?;

        Ok(InsightConnector { base, client })
    }

    /// Sends a GET request and decodes the JSON body.
    async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, FetchError> {
        let url = self.base.join(path).map_err(TransportError::from)?;
        debug!("insight request: {url}");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(TransportError::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::RequestFailed(status.as_u16()));
        }

        let body = response.bytes().await.map_err(TransportError::from)?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Returns the hash of the block at `height`.
    pub async fn block_hash(&self, height: u32) -> Result<BlockHashResponse, FetchError> {
        self.get_json(&format!("block-index/{height}")).await
    }

    /// Returns the backend's current sync status.
    pub async fn sync_status(&self) -> Result<SyncStatus, FetchError> {
        self.get_json("sync").await
    }

    /// Returns the transaction with id `txid` in the index-service encoding.
    pub async fn transaction(&self, txid: &str) -> Result<InsightTx, FetchError> {
        self.get_json(&format!("tx/{txid}")).await
    }
}
