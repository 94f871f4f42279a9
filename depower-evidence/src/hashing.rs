//! Canonical field layouts for evidence and reading anchors.
//!
//! Field order here is part of the ledger format: changing it changes every
//! integrity hash, so new fields go at the end under a new record kind.

use crate::types::{DeviceProfile, GpsCoordinates, MeterReading};
use depower_crypto::{canonical_hash, CanonicalRecord, CryptoResult, IntegrityHash};
use depower_store::ContentDigest;

const EVIDENCE_KIND: &str = "device-evidence/v1";
const READING_KIND: &str = "meter-reading/v1";

/// Everything an evidence integrity hash commits to.
pub(crate) struct EvidenceFields<'a> {
    pub device_id: &'a str,
    pub recipient_identity: &'a str,
    pub timestamp_ms: i64,
    pub content_digest: &'a ContentDigest,
    pub profile: Option<&'a DeviceProfile>,
    pub photo: &'a [u8],
    pub gps: &'a GpsCoordinates,
}

pub(crate) fn evidence_hash(fields: &EvidenceFields<'_>) -> CryptoResult<IntegrityHash> {
    let record = CanonicalRecord::new(EVIDENCE_KIND)
        .str("device_id", fields.device_id)
        .str("recipient_identity", fields.recipient_identity)
        .i64("timestamp_ms", fields.timestamp_ms)
        .bytes("content_digest", fields.content_digest.as_bytes())
        .opt_str("device_type", fields.profile.map(|p| p.device_type.as_str()))
        .opt_f64("capacity_kw", fields.profile.map(|p| p.capacity_kw))
        .bytes("photo", fields.photo)
        .f64("latitude", fields.gps.latitude)
        .f64("longitude", fields.gps.longitude)
        .opt_f64("accuracy_m", fields.gps.accuracy_m)
        .opt_f64("altitude_m", fields.gps.altitude_m);
    canonical_hash(&record)
}

pub(crate) fn reading_hash(
    reading: &MeterReading,
    content_digest: &ContentDigest,
) -> CryptoResult<IntegrityHash> {
    let record = CanonicalRecord::new(READING_KIND)
        .str("device_id", &reading.device_id)
        .i64("recorded_at_ms", reading.recorded_at.timestamp_millis())
        .bytes("content_digest", content_digest.as_bytes())
        .f64("kwh", reading.kwh)
        .f64("voltage", reading.voltage)
        .f64("current", reading.current)
        .opt_f64("temperature_c", reading.temperature_c);
    canonical_hash(&record)
}
