//! Confidential device evidence for DePower registrations.
//!
//! An owner registers a generator with a photo and a GPS fix. Both are
//! encrypted under a fresh data key that is wrapped for one maintainer,
//! uploaded to a content-addressed store, and summarized in an
//! [`AnchorRecord`] for the ledger. The maintainer later discloses the
//! evidence with their secret key and gets back plaintext that has been
//! checked against the anchored integrity hash.
//!
//! ```text
//! register:  validate → key → encrypt → wrap → upload → hash → AnchorRecord
//! disclose:  AnchorRecord → unwrap → fetch → decrypt → verify → DisclosureResult
//! ```

pub mod config;
pub mod disclosure;
pub mod error;
mod hashing;
pub mod logging;
pub mod readings;
pub mod registration;
pub mod resolver;
pub mod service;
pub mod types;

pub use config::EvidenceConfig;
pub use disclosure::{DisclosurePipeline, DisclosureStage};
pub use error::{ErrorKind, EvidenceError, EvidenceResult};
pub use readings::ReadingLog;
pub use registration::{RegistrationPipeline, RegistrationStage, DEFAULT_MAX_PHOTO_BYTES};
pub use resolver::{HttpKeyResolver, KeyResolver, StaticKeyResolver};
pub use service::EvidenceService;
pub use types::{
    AnchorRecord, DeviceProfile, DisclosureResult, EvidenceBundle, EvidenceSubmission,
    GpsCoordinates, MeterReading, ReadingAnchor, BUNDLE_VERSION,
};
