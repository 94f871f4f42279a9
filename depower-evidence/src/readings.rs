//! Anchoring of plaintext meter readings.
//!
//! Readings are not confidential. They are stored as JSON and anchored the
//! same way as evidence so an auditor can detect edits after the fact.

use crate::error::{EvidenceError, EvidenceResult};
use crate::hashing::reading_hash;
use crate::types::{MeterReading, ReadingAnchor};
use depower_store::ContentStore;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct ReadingLog {
    store: Arc<dyn ContentStore>,
}

impl ReadingLog {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    pub async fn anchor_reading(&self, reading: &MeterReading) -> EvidenceResult<ReadingAnchor> {
        validate_reading(reading)?;

        let body = serde_json::to_vec(reading)?;
        let content_digest = self
            .store
            .put(&body)
            .await
            .map_err(EvidenceError::UploadFailed)?;
        let integrity_hash =
            reading_hash(reading, &content_digest).map_err(EvidenceError::HashFailed)?;

        debug!("anchored reading for {} ({content_digest})", reading.device_id);
        Ok(ReadingAnchor {
            device_id: reading.device_id.clone(),
            content_digest,
            integrity_hash,
            recorded_at: reading.recorded_at,
        })
    }

    /// Fetches the reading behind an anchor and checks it against the anchor.
    pub async fn verify_reading(&self, anchor: &ReadingAnchor) -> EvidenceResult<MeterReading> {
        let body = self
            .store
            .get(&anchor.content_digest)
            .await
            .map_err(EvidenceError::FetchFailed)?;
        let reading: MeterReading = serde_json::from_slice(&body)
            .map_err(|e| EvidenceError::TamperDetected(format!("malformed reading: {e}")))?;

        if reading.device_id != anchor.device_id || reading.recorded_at != anchor.recorded_at {
            return Err(EvidenceError::TamperDetected(
                "reading does not belong to this anchor".to_string(),
            ));
        }
        let recomputed =
            reading_hash(&reading, &anchor.content_digest).map_err(EvidenceError::HashFailed)?;
        if recomputed != anchor.integrity_hash {
            warn!("reading for {}: integrity hash mismatch", anchor.device_id);
            return Err(EvidenceError::TamperDetected(
                "integrity hash does not match the anchor".to_string(),
            ));
        }
        Ok(reading)
    }
}

fn validate_reading(reading: &MeterReading) -> EvidenceResult<()> {
    if reading.device_id.trim().is_empty() {
        return Err(EvidenceError::InvalidInput("device id is empty".to_string()));
    }
    let measured = [
        ("kwh", reading.kwh),
        ("voltage", reading.voltage),
        ("current", reading.current),
    ];
    for (name, value) in measured {
        if !value.is_finite() {
            return Err(EvidenceError::InvalidInput(format!("{name} must be finite, got {value}")));
        }
    }
    if reading.kwh < 0.0 {
        return Err(EvidenceError::InvalidInput(format!(
            "kwh must be non-negative, got {}",
            reading.kwh
        )));
    }
    if let Some(temperature) = reading.temperature_c {
        if !temperature.is_finite() {
            return Err(EvidenceError::InvalidInput(format!(
                "temperature must be finite, got {temperature}"
            )));
        }
    }
    Ok(())
}
