//! Content store configuration.

use crate::digest::ContentDigest;
use crate::error::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Ordered list of storage backends plus the per-attempt timeout.
///
/// Loaded once at startup and never mutated.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Endpoints tried in order. The first one is the primary.
    pub endpoints: Vec<EndpointConfig>,

    /// Timeout for a single request to a single endpoint (milliseconds).
    pub request_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoints: vec![EndpointConfig::new("http://127.0.0.1:8787")],
            request_timeout_ms: 10_000,
        }
    }
}

impl StoreConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Rejects configurations the store cannot operate with.
    pub fn validate(&self) -> StoreResult<()> {
        if self.endpoints.is_empty() {
            return Err(StoreError::Config(
                "at least one storage endpoint is required".to_string(),
            ));
        }
        if self.request_timeout_ms == 0 {
            return Err(StoreError::Config(
                "request_timeout_ms must be greater than zero".to_string(),
            ));
        }
        for endpoint in &self.endpoints {
            let url = endpoint.base_url.trim();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(StoreError::Config(format!(
                    "endpoint must be an http(s) URL: {url:?}"
                )));
            }
        }
        Ok(())
    }
}

/// One HTTP storage backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Base URL, e.g. `https://store.example.net`.
    pub base_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<EndpointAuth>,
}

impl EndpointConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth: None,
        }
    }

    pub fn with_auth(mut self, auth: EndpointAuth) -> Self {
        self.auth = Some(auth);
        self
    }

    /// URL of the blob addressed by `digest` on this endpoint.
    pub fn blob_url(&self, digest: &ContentDigest) -> String {
        format!("{}/blobs/{digest}", self.base_url.trim_end_matches('/'))
    }
}

/// Credentials sent with every request to an endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EndpointAuth {
    Bearer { token: String },
    Basic { username: String, password: String },
}

impl fmt::Debug for EndpointAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearer { .. } => f.write_str("Bearer([REDACTED])"),
            Self::Basic { username, .. } => write!(f, "Basic({username}, [REDACTED])"),
        }
    }
}
