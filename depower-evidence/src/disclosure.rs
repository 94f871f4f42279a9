//! Maintainer-side disclosure: unwrap, fetch, decrypt, verify.

use crate::error::{EvidenceError, EvidenceResult};
use crate::hashing::{evidence_hash, EvidenceFields};
use crate::types::{AnchorRecord, DisclosureResult, EvidenceBundle, GpsCoordinates, BUNDLE_VERSION};
use depower_crypto::{decrypt, unwrap_key, SecretKey};
use depower_store::ContentStore;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Disclosure progress, logged at each transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisclosureStage {
    Start,
    KeyUnwrapped,
    ContentFetched,
    Decrypted,
    Verified,
    Done,
}

impl fmt::Display for DisclosureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::KeyUnwrapped => "key_unwrapped",
            Self::ContentFetched => "content_fetched",
            Self::Decrypted => "decrypted",
            Self::Verified => "verified",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Recovers and verifies the plaintext behind an [`AnchorRecord`].
///
/// The wrapped key is opened before anything is fetched, so a caller without
/// the recipient's secret key never touches the content store.
#[derive(Clone)]
pub struct DisclosurePipeline {
    store: Arc<dyn ContentStore>,
}

impl DisclosurePipeline {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    pub async fn disclose(
        &self,
        anchor: &AnchorRecord,
        recipient_sk: &SecretKey,
    ) -> EvidenceResult<DisclosureResult> {
        let device_id = anchor.device_id.as_str();
        let mut stage = DisclosureStage::Start;
        debug!("disclosure {device_id}: {stage}");

        let data_key =
            unwrap_key(&anchor.wrapped_key, recipient_sk).map_err(|_| EvidenceError::UnwrapFailed)?;
        stage = DisclosureStage::KeyUnwrapped;
        debug!("disclosure {device_id}: {stage}");

        let body = self
            .store
            .get(&anchor.content_digest)
            .await
            .map_err(EvidenceError::FetchFailed)?;
        let bundle: EvidenceBundle = serde_json::from_slice(&body)
            .map_err(|e| EvidenceError::TamperDetected(format!("malformed evidence bundle: {e}")))?;
        check_bundle(anchor, &bundle)?;
        stage = DisclosureStage::ContentFetched;
        debug!("disclosure {device_id}: {stage}");

        let photo = decrypt(&data_key, &bundle.encrypted_photo)
            .map_err(|_| EvidenceError::AuthenticationFailed)?;
        let location = decrypt(&data_key, &bundle.encrypted_location)
            .map_err(|_| EvidenceError::AuthenticationFailed)?;
        drop(data_key);
        let gps: GpsCoordinates = serde_json::from_slice(&location)
            .map_err(|e| EvidenceError::TamperDetected(format!("malformed location: {e}")))?;
        stage = DisclosureStage::Decrypted;
        debug!("disclosure {device_id}: {stage}");

        let recomputed = evidence_hash(&EvidenceFields {
            device_id,
            recipient_identity: &anchor.recipient_identity,
            timestamp_ms: anchor.timestamp.timestamp_millis(),
            content_digest: &anchor.content_digest,
            profile: bundle.profile.as_ref(),
            photo: &photo,
            gps: &gps,
        })
        .map_err(EvidenceError::HashFailed)?;
        if recomputed != anchor.integrity_hash {
            warn!("disclosure {device_id}: integrity hash mismatch");
            return Err(EvidenceError::TamperDetected(
                "integrity hash does not match the anchor".to_string(),
            ));
        }
        stage = DisclosureStage::Verified;
        debug!("disclosure {device_id}: {stage}");

        let result = DisclosureResult {
            device_id: anchor.device_id.clone(),
            photo,
            gps,
            profile: bundle.profile,
            verified: true,
        };
        stage = DisclosureStage::Done;
        debug!("disclosure {device_id}: {stage}");
        info!("disclosed evidence for {device_id} ({})", anchor.content_digest);
        Ok(result)
    }
}

fn check_bundle(anchor: &AnchorRecord, bundle: &EvidenceBundle) -> EvidenceResult<()> {
    if bundle.version != BUNDLE_VERSION {
        return Err(EvidenceError::TamperDetected(format!(
            "unsupported bundle version {}",
            bundle.version
        )));
    }
    if bundle.device_id != anchor.device_id {
        return Err(EvidenceError::TamperDetected(format!(
            "bundle is for device {}, anchor is for {}",
            bundle.device_id, anchor.device_id
        )));
    }
    if bundle.created_at_ms != anchor.timestamp.timestamp_millis() {
        return Err(EvidenceError::TamperDetected(
            "bundle timestamp does not match the anchor".to_string(),
        ));
    }
    Ok(())
}
