//! Configuration types shared across Skiff crates.

use serde::{Deserialize, Serialize};

use crate::network::Network;

/// Location of a backend's auxiliary Insight HTTP API.
///
/// Optional capability: backends that do not serve the Insight REST surface
/// simply omit this from their client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightConfig {
    /// Base endpoint, e.g. `https://insight.example.com`.
    pub endpoint: String,
    /// Path prefix of the Insight API on the endpoint.
    #[serde(default = "default_insight_path")]
    pub path: String,
}

fn default_insight_path() -> String {
    "insight-api".to_string()
}

impl InsightConfig {
    /// Creates a config for `endpoint` with the conventional path prefix.
    pub fn new(endpoint: impl Into<String>) -> Self {
        InsightConfig {
            endpoint: endpoint.into(),
            path: default_insight_path(),
        }
    }
}

/// Configuration of a synchronization client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Network served by the backend.
    pub network: Network,
    /// Number of history items requested per page.
    #[serde(default = "default_page_length")]
    pub page_length: u32,
    /// Auxiliary Insight HTTP API, when the backend exposes one.
    #[serde(default)]
    pub insight: Option<InsightConfig>,
}

fn default_page_length() -> u32 {
    100
}

impl ClientConfig {
    /// Creates a config for `network` with the default page length and no
    /// auxiliary API.
    pub fn new(network: Network) -> Self {
        ClientConfig {
            network,
            page_length: default_page_length(),
            insight: None,
        }
    }
}
