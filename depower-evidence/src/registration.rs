//! Owner-side registration: encrypt, wrap, upload, hash, anchor.

use crate::error::{EvidenceError, EvidenceResult};
use crate::hashing::{evidence_hash, EvidenceFields};
use crate::resolver::KeyResolver;
use crate::types::{AnchorRecord, EvidenceBundle, EvidenceSubmission, BUNDLE_VERSION};
use chrono::{DateTime, Utc};
use depower_crypto::{encrypt, wrap_key, PublicKey, SymmetricKey};
use depower_store::ContentStore;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Default upper bound on photo size (10 MiB).
pub const DEFAULT_MAX_PHOTO_BYTES: usize = 10 * 1024 * 1024;

/// Registration progress, logged at each transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistrationStage {
    Start,
    KeyGenerated,
    FieldsEncrypted,
    KeyWrapped,
    ContentUploaded,
    HashComputed,
    AnchorReady,
}

impl fmt::Display for RegistrationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::KeyGenerated => "key_generated",
            Self::FieldsEncrypted => "fields_encrypted",
            Self::KeyWrapped => "key_wrapped",
            Self::ContentUploaded => "content_uploaded",
            Self::HashComputed => "hash_computed",
            Self::AnchorReady => "anchor_ready",
        };
        f.write_str(name)
    }
}

/// Turns plaintext evidence into an [`AnchorRecord`].
///
/// Every call generates its own data key and timestamp, so registering the
/// same inputs twice yields two independent anchors.
#[derive(Clone)]
pub struct RegistrationPipeline {
    store: Arc<dyn ContentStore>,
    resolver: Arc<dyn KeyResolver>,
    max_photo_bytes: usize,
}

impl RegistrationPipeline {
    pub fn new(store: Arc<dyn ContentStore>, resolver: Arc<dyn KeyResolver>) -> Self {
        Self {
            store,
            resolver,
            max_photo_bytes: DEFAULT_MAX_PHOTO_BYTES,
        }
    }

    pub fn with_max_photo_bytes(mut self, limit: usize) -> Self {
        self.max_photo_bytes = limit;
        self
    }

    pub fn max_photo_bytes(&self) -> usize {
        self.max_photo_bytes
    }

    /// Registers evidence for the recipient named in the submission.
    pub async fn register(&self, submission: &EvidenceSubmission<'_>) -> EvidenceResult<AnchorRecord> {
        self.validate(submission)?;
        let recipient_pk = self
            .resolver
            .resolve_public_key(submission.recipient_identity)
            .await?;
        self.run(submission, &recipient_pk).await
    }

    /// Registers evidence for an already known recipient key.
    pub async fn register_for_key(
        &self,
        submission: &EvidenceSubmission<'_>,
        recipient_pk: &PublicKey,
    ) -> EvidenceResult<AnchorRecord> {
        self.validate(submission)?;
        self.run(submission, recipient_pk).await
    }

    fn validate(&self, submission: &EvidenceSubmission<'_>) -> EvidenceResult<()> {
        if submission.device_id.trim().is_empty() {
            return Err(EvidenceError::InvalidInput("device id is empty".to_string()));
        }
        if submission.recipient_identity.trim().is_empty() {
            return Err(EvidenceError::InvalidInput(
                "recipient identity is empty".to_string(),
            ));
        }
        if submission.photo.is_empty() {
            return Err(EvidenceError::EmptyPayload("photo"));
        }
        if submission.photo.len() > self.max_photo_bytes {
            return Err(EvidenceError::PayloadTooLarge {
                size: submission.photo.len(),
                limit: self.max_photo_bytes,
            });
        }
        submission.gps.validate()?;
        if let Some(profile) = submission.profile {
            profile.validate()?;
        }
        Ok(())
    }

    async fn run(
        &self,
        submission: &EvidenceSubmission<'_>,
        recipient_pk: &PublicKey,
    ) -> EvidenceResult<AnchorRecord> {
        let device_id = submission.device_id;
        let mut stage = RegistrationStage::Start;
        debug!("registration {device_id}: {stage}");

        let data_key = SymmetricKey::generate().map_err(EvidenceError::KeyGenFailed)?;
        stage = RegistrationStage::KeyGenerated;
        debug!("registration {device_id}: {stage}");

        let location = serde_json::to_vec(&submission.gps)?;
        let encrypted_photo =
            encrypt(&data_key, submission.photo).map_err(EvidenceError::EncryptionFailed)?;
        let encrypted_location =
            encrypt(&data_key, &location).map_err(EvidenceError::EncryptionFailed)?;
        stage = RegistrationStage::FieldsEncrypted;
        debug!("registration {device_id}: {stage}");

        let wrapped_key = wrap_key(&data_key, recipient_pk).map_err(EvidenceError::WrapFailed)?;
        drop(data_key);
        stage = RegistrationStage::KeyWrapped;
        debug!("registration {device_id}: {stage}");

        let timestamp = now_millis();
        let bundle = EvidenceBundle {
            version: BUNDLE_VERSION.to_string(),
            device_id: device_id.to_string(),
            profile: submission.profile.cloned(),
            encrypted_photo,
            encrypted_location,
            created_at_ms: timestamp.timestamp_millis(),
        };
        let body = serde_json::to_vec(&bundle)?;
        let content_digest = self
            .store
            .put(&body)
            .await
            .map_err(EvidenceError::UploadFailed)?;
        stage = RegistrationStage::ContentUploaded;
        debug!("registration {device_id}: {stage} ({content_digest})");

        let integrity_hash = evidence_hash(&EvidenceFields {
            device_id,
            recipient_identity: submission.recipient_identity,
            timestamp_ms: timestamp.timestamp_millis(),
            content_digest: &content_digest,
            profile: submission.profile,
            photo: submission.photo,
            gps: &submission.gps,
        })
        .map_err(EvidenceError::HashFailed)?;
        stage = RegistrationStage::HashComputed;
        debug!("registration {device_id}: {stage}");

        let anchor = AnchorRecord {
            device_id: device_id.to_string(),
            content_digest,
            wrapped_key,
            integrity_hash,
            recipient_identity: submission.recipient_identity.to_string(),
            timestamp,
        };
        stage = RegistrationStage::AnchorReady;
        debug!("registration {device_id}: {stage}");
        info!(
            "registered evidence for {device_id}: digest {}, hash {}",
            anchor.content_digest, anchor.integrity_hash
        );
        Ok(anchor)
    }
}

/// Current time truncated to whole milliseconds, the precision anchors carry.
fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_millis_has_no_sub_millisecond_part() {
        let ts = now_millis();
        assert_eq!(ts.timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn stage_names_are_snake_case() {
        assert_eq!(RegistrationStage::KeyGenerated.to_string(), "key_generated");
        assert_eq!(RegistrationStage::AnchorReady.to_string(), "anchor_ready");
    }
}
