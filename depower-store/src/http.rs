//! HTTP content store with ordered endpoint fallback.
//!
//! Protocol, per endpoint:
//! - `PUT {base}/blobs/{digest}` with the raw bytes; any 2xx means stored.
//! - `GET {base}/blobs/{digest}`; 200 returns the bytes, 404 means absent.
//!
//! Endpoints are tried in configuration order. Each attempt has its own
//! timeout, and a failed attempt only moves on to the next endpoint. There is
//! no retry beyond one pass over the list.

use crate::config::{EndpointAuth, EndpointConfig, StoreConfig};
use crate::digest::ContentDigest;
use crate::error::{StoreError, StoreResult};
use crate::ContentStore;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

/// Outcome of a single GET attempt against one endpoint.
enum Fetch {
    Found(Vec<u8>),
    Missing,
    Failed(String),
}

/// Content store backed by one or more HTTP endpoints.
pub struct HttpContentStore {
    client: Client,
    endpoints: Vec<EndpointConfig>,
    timeout: Duration,
}

impl HttpContentStore {
    pub fn new(config: &StoreConfig) -> StoreResult<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| StoreError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoints: config.endpoints.clone(),
            timeout: config.request_timeout(),
        })
    }

    pub fn endpoints(&self) -> &[EndpointConfig] {
        &self.endpoints
    }

    fn authorize(request: RequestBuilder, auth: Option<&EndpointAuth>) -> RequestBuilder {
        match auth {
            Some(EndpointAuth::Bearer { token }) => request.bearer_auth(token),
            Some(EndpointAuth::Basic { username, password }) => {
                request.basic_auth(username, Some(password))
            }
            None => request,
        }
    }

    async fn put_to(
        &self,
        endpoint: &EndpointConfig,
        digest: &ContentDigest,
        bytes: &[u8],
    ) -> Result<(), String> {
        let request = self
            .client
            .put(endpoint.blob_url(digest))
            .timeout(self.timeout)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes.to_vec());

        let resp = Self::authorize(request, endpoint.auth.as_ref())
            .send()
            .await
            .map_err(|e| describe_transport_error(&e))?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(format!("HTTP {}", resp.status()))
        }
    }

    async fn get_from(&self, endpoint: &EndpointConfig, digest: &ContentDigest) -> Fetch {
        let request = self.client.get(endpoint.blob_url(digest)).timeout(self.timeout);

        let resp = match Self::authorize(request, endpoint.auth.as_ref()).send().await {
            Ok(resp) => resp,
            Err(e) => return Fetch::Failed(describe_transport_error(&e)),
        };

        match resp.status() {
            StatusCode::OK => match resp.bytes().await {
                Ok(body) => Fetch::Found(body.to_vec()),
                Err(e) => Fetch::Failed(describe_transport_error(&e)),
            },
            StatusCode::NOT_FOUND | StatusCode::GONE => Fetch::Missing,
            status => Fetch::Failed(format!("HTTP {status}")),
        }
    }
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "timed out".to_string()
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else {
        e.to_string()
    }
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn put(&self, bytes: &[u8]) -> StoreResult<ContentDigest> {
        let digest = ContentDigest::of(bytes);
        let mut failures = Vec::with_capacity(self.endpoints.len());

        for endpoint in &self.endpoints {
            match self.put_to(endpoint, &digest, bytes).await {
                Ok(()) => {
                    debug!(
                        "stored {} bytes as {digest} at {}",
                        bytes.len(),
                        endpoint.base_url
                    );
                    return Ok(digest);
                }
                Err(reason) => {
                    warn!("put {digest} to {} failed: {reason}", endpoint.base_url);
                    failures.push(format!("{}: {reason}", endpoint.base_url));
                }
            }
        }

        Err(StoreError::Unavailable(failures.join("; ")))
    }

    async fn get(&self, digest: &ContentDigest) -> StoreResult<Vec<u8>> {
        let mut failures = Vec::new();

        for endpoint in &self.endpoints {
            match self.get_from(endpoint, digest).await {
                Fetch::Found(bytes) => {
                    debug!(
                        "fetched {} bytes for {digest} from {}",
                        bytes.len(),
                        endpoint.base_url
                    );
                    return crate::verify_digest(digest, bytes).inspect_err(|_| {
                        warn!(
                            "endpoint {} served bytes not matching {digest}",
                            endpoint.base_url
                        );
                    });
                }
                Fetch::Missing => {
                    debug!("{digest} not present at {}", endpoint.base_url);
                }
                Fetch::Failed(reason) => {
                    warn!("get {digest} from {} failed: {reason}", endpoint.base_url);
                    failures.push(format!("{}: {reason}", endpoint.base_url));
                }
            }
        }

        if failures.is_empty() {
            Err(StoreError::NotFound(*digest))
        } else {
            Err(StoreError::Unavailable(failures.join("; ")))
        }
    }
}
