//! Entry point wiring the pipelines to a store and a key resolver.

use crate::config::EvidenceConfig;
use crate::disclosure::DisclosurePipeline;
use crate::error::{EvidenceError, EvidenceResult};
use crate::readings::ReadingLog;
use crate::registration::RegistrationPipeline;
use crate::resolver::{HttpKeyResolver, KeyResolver};
use crate::types::{
    AnchorRecord, DeviceProfile, DisclosureResult, EvidenceSubmission, GpsCoordinates,
    MeterReading, ReadingAnchor,
};
use depower_crypto::SecretKey;
use depower_store::{ContentStore, HttpContentStore};
use std::sync::Arc;
use tracing::info;

/// Owner and maintainer operations over one content store.
///
/// Cheap to clone; clones share the store and resolver.
#[derive(Clone)]
pub struct EvidenceService {
    registration: RegistrationPipeline,
    disclosure: DisclosurePipeline,
    readings: ReadingLog,
}

impl EvidenceService {
    pub fn new(store: Arc<dyn ContentStore>, resolver: Arc<dyn KeyResolver>) -> Self {
        Self {
            registration: RegistrationPipeline::new(store.clone(), resolver),
            disclosure: DisclosurePipeline::new(store.clone()),
            readings: ReadingLog::new(store),
        }
    }

    pub fn with_max_photo_bytes(mut self, limit: usize) -> Self {
        self.registration = self.registration.with_max_photo_bytes(limit);
        self
    }

    /// Builds an HTTP-backed service. Requires `key_registry_url`.
    pub fn from_config(config: &EvidenceConfig) -> EvidenceResult<Self> {
        config.validate()?;
        let registry_url = config.key_registry_url.as_deref().ok_or_else(|| {
            EvidenceError::Config("key_registry_url is required".to_string())
        })?;

        let store = HttpContentStore::new(&config.store)
            .map_err(|e| EvidenceError::Config(e.to_string()))?;
        let resolver = HttpKeyResolver::new(registry_url, config.store.request_timeout())?;
        info!(
            "evidence service using {} storage endpoint(s), key registry {registry_url}",
            store.endpoints().len()
        );

        Ok(Self::new(Arc::new(store), Arc::new(resolver)).with_max_photo_bytes(config.max_photo_bytes))
    }

    pub async fn register_evidence(
        &self,
        device_id: &str,
        photo: &[u8],
        gps: GpsCoordinates,
        recipient_identity: &str,
    ) -> EvidenceResult<AnchorRecord> {
        let submission = EvidenceSubmission::new(device_id, photo, gps, recipient_identity);
        self.registration.register(&submission).await
    }

    pub async fn register_evidence_with_profile(
        &self,
        device_id: &str,
        photo: &[u8],
        gps: GpsCoordinates,
        recipient_identity: &str,
        profile: &DeviceProfile,
    ) -> EvidenceResult<AnchorRecord> {
        let submission =
            EvidenceSubmission::new(device_id, photo, gps, recipient_identity).with_profile(profile);
        self.registration.register(&submission).await
    }

    pub async fn disclose_evidence(
        &self,
        anchor: &AnchorRecord,
        recipient_sk: &SecretKey,
    ) -> EvidenceResult<DisclosureResult> {
        self.disclosure.disclose(anchor, recipient_sk).await
    }

    pub async fn anchor_reading(&self, reading: &MeterReading) -> EvidenceResult<ReadingAnchor> {
        self.readings.anchor_reading(reading).await
    }

    pub async fn verify_reading(&self, anchor: &ReadingAnchor) -> EvidenceResult<MeterReading> {
        self.readings.verify_reading(anchor).await
    }

    pub fn registration(&self) -> &RegistrationPipeline {
        &self.registration
    }
}
