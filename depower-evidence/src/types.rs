//! Evidence data model: inputs, the uploaded bundle, and ledger anchors.

use crate::error::{EvidenceError, EvidenceResult};
use chrono::{DateTime, Utc};
use depower_crypto::{Ciphertext, IntegrityHash, WrappedKey};
use depower_store::ContentDigest;
use serde::{Deserialize, Serialize};

/// Format version written into every evidence bundle.
pub const BUNDLE_VERSION: &str = "1.0";

/// GPS fix of the registered device.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GpsCoordinates {
    pub latitude: f64,
    pub longitude: f64,
    /// Horizontal accuracy in meters, when the receiver reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude_m: Option<f64>,
}

impl GpsCoordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_m: None,
            altitude_m: None,
        }
    }

    pub fn with_accuracy(mut self, meters: f64) -> Self {
        self.accuracy_m = Some(meters);
        self
    }

    pub fn with_altitude(mut self, meters: f64) -> Self {
        self.altitude_m = Some(meters);
        self
    }

    /// Latitude in [-90, 90] and longitude in [-180, 180], both finite.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    pub fn validate(&self) -> EvidenceResult<()> {
        if !self.is_valid() {
            return Err(EvidenceError::InvalidCoordinates {
                latitude: self.latitude,
                longitude: self.longitude,
            });
        }
        if let Some(accuracy) = self.accuracy_m {
            if !accuracy.is_finite() || accuracy < 0.0 {
                return Err(EvidenceError::InvalidInput(format!(
                    "accuracy must be a non-negative number of meters, got {accuracy}"
                )));
            }
        }
        if let Some(altitude) = self.altitude_m {
            if !altitude.is_finite() {
                return Err(EvidenceError::InvalidInput(format!(
                    "altitude must be finite, got {altitude}"
                )));
            }
        }
        Ok(())
    }
}

/// Public description of the registered generator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    /// e.g. "solar", "wind", "battery".
    pub device_type: String,
    /// Nameplate capacity in kilowatts.
    pub capacity_kw: f64,
}

impl DeviceProfile {
    pub fn new(device_type: impl Into<String>, capacity_kw: f64) -> Self {
        Self {
            device_type: device_type.into(),
            capacity_kw,
        }
    }

    pub fn validate(&self) -> EvidenceResult<()> {
        if self.device_type.trim().is_empty() {
            return Err(EvidenceError::InvalidInput("device type is empty".to_string()));
        }
        if !self.capacity_kw.is_finite() || self.capacity_kw < 0.0 {
            return Err(EvidenceError::InvalidInput(format!(
                "capacity must be a non-negative number of kW, got {}",
                self.capacity_kw
            )));
        }
        Ok(())
    }
}

/// Blob uploaded to the content store for one registration.
///
/// Only the profile and identifiers are readable; the photo and location are
/// ciphertext under the registration's data key.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EvidenceBundle {
    pub version: String,
    pub device_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<DeviceProfile>,
    pub encrypted_photo: Ciphertext,
    pub encrypted_location: Ciphertext,
    /// Milliseconds since the Unix epoch; equals the anchor timestamp.
    pub created_at_ms: i64,
}

/// What gets published to the ledger for one registration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnchorRecord {
    pub device_id: String,
    pub content_digest: ContentDigest,
    pub wrapped_key: WrappedKey,
    pub integrity_hash: IntegrityHash,
    pub recipient_identity: String,
    pub timestamp: DateTime<Utc>,
}

/// Plaintext recovered by the maintainer, already checked against the anchor.
#[derive(Clone, Debug, PartialEq)]
pub struct DisclosureResult {
    pub device_id: String,
    pub photo: Vec<u8>,
    pub gps: GpsCoordinates,
    pub profile: Option<DeviceProfile>,
    /// Always true: unverified plaintext is never returned.
    pub verified: bool,
}

/// One meter log entry from a registered device.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeterReading {
    pub device_id: String,
    /// Cumulative energy in kilowatt-hours.
    pub kwh: f64,
    pub voltage: f64,
    pub current: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_c: Option<f64>,
    pub recorded_at: DateTime<Utc>,
}

/// Ledger anchor for a plaintext meter reading.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReadingAnchor {
    pub device_id: String,
    pub content_digest: ContentDigest,
    pub integrity_hash: IntegrityHash,
    pub recorded_at: DateTime<Utc>,
}

/// Input to a registration. Borrows the photo so large images are not copied.
#[derive(Clone, Copy, Debug)]
pub struct EvidenceSubmission<'a> {
    pub device_id: &'a str,
    pub photo: &'a [u8],
    pub gps: GpsCoordinates,
    pub recipient_identity: &'a str,
    pub profile: Option<&'a DeviceProfile>,
}

impl<'a> EvidenceSubmission<'a> {
    pub fn new(
        device_id: &'a str,
        photo: &'a [u8],
        gps: GpsCoordinates,
        recipient_identity: &'a str,
    ) -> Self {
        Self {
            device_id,
            photo,
            gps,
            recipient_identity,
            profile: None,
        }
    }

    pub fn with_profile(mut self, profile: &'a DeviceProfile) -> Self {
        self.profile = Some(profile);
        self
    }
}
