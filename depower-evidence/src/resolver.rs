//! Recipient public key lookup.
//!
//! How a maintainer identity is bound to a key is up to the integrating
//! system. The pipelines only need [`KeyResolver::resolve_public_key`].

use crate::error::{EvidenceError, EvidenceResult};
use async_trait::async_trait;
use depower_crypto::{public_key_from_base64, PublicKey};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Resolves a recipient identity to its current public key.
#[async_trait]
pub trait KeyResolver: Send + Sync {
    async fn resolve_public_key(&self, identity: &str) -> EvidenceResult<PublicKey>;
}

/// Fixed identity → key table, for tests and single-maintainer deployments.
#[derive(Clone, Default)]
pub struct StaticKeyResolver {
    keys: HashMap<String, PublicKey>,
}

impl StaticKeyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, identity: impl Into<String>, key: PublicKey) -> Self {
        self.keys.insert(identity.into(), key);
        self
    }

    pub fn insert(&mut self, identity: impl Into<String>, key: PublicKey) {
        self.keys.insert(identity.into(), key);
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[async_trait]
impl KeyResolver for StaticKeyResolver {
    async fn resolve_public_key(&self, identity: &str) -> EvidenceResult<PublicKey> {
        self.keys
            .get(identity)
            .cloned()
            .ok_or_else(|| EvidenceError::UnknownRecipient(identity.to_string()))
    }
}

#[derive(Deserialize)]
struct PublicKeyResponse {
    public_key: String,
}

/// Key registry client: `GET {base}/keys/{identity}` returning
/// `{ "public_key": "<base64>" }`.
pub struct HttpKeyResolver {
    client: Client,
    base_url: Url,
}

impl HttpKeyResolver {
    pub fn new(base_url: &str, timeout: Duration) -> EvidenceResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| EvidenceError::Config(format!("invalid key registry URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(EvidenceError::Config(format!(
                "key registry URL cannot be a base: {base_url}"
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EvidenceError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, base_url })
    }

    fn key_url(&self, identity: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("keys").push(identity);
        }
        url
    }
}

#[async_trait]
impl KeyResolver for HttpKeyResolver {
    async fn resolve_public_key(&self, identity: &str) -> EvidenceResult<PublicKey> {
        if identity.trim().is_empty() {
            return Err(EvidenceError::InvalidInput(
                "recipient identity is empty".to_string(),
            ));
        }

        let url = self.key_url(identity);
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| EvidenceError::KeyResolutionFailed(e.to_string()))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(EvidenceError::UnknownRecipient(identity.to_string()));
        }

        let data: PublicKeyResponse = resp
            .error_for_status()
            .map_err(|e| EvidenceError::KeyResolutionFailed(e.to_string()))?
            .json()
            .await
            .map_err(|e| EvidenceError::KeyResolutionFailed(format!("invalid response: {e}")))?;

        let key = public_key_from_base64(&data.public_key).map_err(|e| {
            EvidenceError::KeyResolutionFailed(format!("invalid public key for {identity}: {e}"))
        })?;

        debug!("resolved public key for {identity}");
        Ok(key)
    }
}
