//! Evidence service configuration.

use crate::error::{EvidenceError, EvidenceResult};
use crate::registration::DEFAULT_MAX_PHOTO_BYTES;
use depower_store::{EndpointConfig, StoreConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_STORE_ENDPOINTS: &str = "DEPOWER_STORE_ENDPOINTS";
pub const ENV_STORE_TIMEOUT_MS: &str = "DEPOWER_STORE_TIMEOUT_MS";
pub const ENV_KEY_REGISTRY_URL: &str = "DEPOWER_KEY_REGISTRY_URL";
pub const ENV_MAX_PHOTO_BYTES: &str = "DEPOWER_MAX_PHOTO_BYTES";

/// Configuration for [`EvidenceService`](crate::EvidenceService).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceConfig {
    /// Content store endpoints and timeout.
    pub store: StoreConfig,

    /// Base URL of the recipient key registry. Without it, keys must be
    /// supplied through a custom resolver.
    pub key_registry_url: Option<String>,

    /// Largest photo accepted for registration (bytes).
    pub max_photo_bytes: usize,
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            key_registry_url: None,
            max_photo_bytes: DEFAULT_MAX_PHOTO_BYTES,
        }
    }
}

impl EvidenceConfig {
    pub fn from_json_str(json: &str) -> EvidenceResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> EvidenceResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            EvidenceError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&contents)
    }

    /// Defaults overridden by `DEPOWER_*` environment variables.
    pub fn from_env() -> EvidenceResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> EvidenceResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_STORE_ENDPOINTS) {
            config.store.endpoints = raw
                .split(',')
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(EndpointConfig::new)
                .collect();
        }
        if let Some(raw) = lookup(ENV_STORE_TIMEOUT_MS) {
            config.store.request_timeout_ms = parse_number(ENV_STORE_TIMEOUT_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_KEY_REGISTRY_URL) {
            let url = raw.trim();
            if !url.is_empty() {
                config.key_registry_url = Some(url.to_string());
            }
        }
        if let Some(raw) = lookup(ENV_MAX_PHOTO_BYTES) {
            config.max_photo_bytes = parse_number(ENV_MAX_PHOTO_BYTES, &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> EvidenceResult<()> {
        self.store
            .validate()
            .map_err(|e| EvidenceError::Config(e.to_string()))?;
        if self.max_photo_bytes == 0 {
            return Err(EvidenceError::Config(
                "max_photo_bytes must be greater than zero".to_string(),
            ));
        }
        if let Some(url) = &self.key_registry_url {
            let url = url.trim();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(EvidenceError::Config(format!(
                    "key registry must be an http(s) URL: {url:?}"
                )));
            }
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> EvidenceResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| EvidenceError::Config(format!("{name} must be a number, got {raw:?}")))
}
