//! Evidence pipeline error types.
//!
//! Each variant names the stage that failed. [`EvidenceError::kind`] folds
//! them into the coarse categories callers branch on.

use depower_crypto::CryptoError;
use depower_store::StoreError;
use thiserror::Error;

/// Result type for evidence operations.
pub type EvidenceResult<T> = Result<T, EvidenceError>;

/// Coarse error category for presentation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    CryptoFailure,
    StorageFailure,
    IntegrityFailure,
    AuthorizationFailure,
}

/// Errors raised by the registration, disclosure, and reading pipelines.
#[derive(Debug, Error)]
pub enum EvidenceError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid coordinates: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    #[error("empty payload: {0}")]
    EmptyPayload(&'static str),

    #[error("payload too large: {size} bytes exceeds limit of {limit}")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("no public key registered for recipient {0}")]
    UnknownRecipient(String),

    #[error("recipient key lookup failed: {0}")]
    KeyResolutionFailed(String),

    #[error("key generation failed: {0}")]
    KeyGenFailed(#[source] CryptoError),

    #[error("encryption failed: {0}")]
    EncryptionFailed(#[source] CryptoError),

    #[error("key wrap failed: {0}")]
    WrapFailed(#[source] CryptoError),

    #[error("upload failed: {0}")]
    UploadFailed(#[source] StoreError),

    #[error("integrity hash failed: {0}")]
    HashFailed(#[source] CryptoError),

    /// The caller's secret key does not open the anchored wrapped key.
    #[error("key unwrap failed")]
    UnwrapFailed,

    #[error("content fetch failed: {0}")]
    FetchFailed(#[source] StoreError),

    #[error("authentication failed while decrypting evidence")]
    AuthenticationFailed,

    #[error("tamper detected: {0}")]
    TamperDetected(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl EvidenceError {
    /// Category used to pick user-facing guidance.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_)
            | Self::InvalidCoordinates { .. }
            | Self::EmptyPayload(_)
            | Self::PayloadTooLarge { .. }
            | Self::UnknownRecipient(_)
            | Self::Serialization(_)
            | Self::Config(_) => ErrorKind::InvalidInput,
            Self::KeyGenFailed(_)
            | Self::EncryptionFailed(_)
            | Self::WrapFailed(_)
            | Self::AuthenticationFailed => ErrorKind::CryptoFailure,
            Self::KeyResolutionFailed(_) | Self::UploadFailed(_) | Self::FetchFailed(_) => {
                ErrorKind::StorageFailure
            }
            Self::HashFailed(_) | Self::TamperDetected(_) => ErrorKind::IntegrityFailure,
            Self::UnwrapFailed => ErrorKind::AuthorizationFailure,
        }
    }

    /// Short hint for the person operating the device or maintainer console.
    pub fn guidance(&self) -> &'static str {
        match self {
            Self::InvalidCoordinates { .. } => "re-acquire the device location and try again",
            Self::EmptyPayload(_) | Self::PayloadTooLarge { .. } => {
                "retake the device photo and try again"
            }
            Self::UnknownRecipient(_) => "check the maintainer identity",
            Self::KeyResolutionFailed(_) => "check connectivity to the key registry",
            Self::UploadFailed(_) | Self::FetchFailed(_) => "check connectivity to the content store",
            Self::UnwrapFailed => "this evidence was not shared with your key",
            Self::TamperDetected(_) | Self::HashFailed(_) => {
                "evidence failed verification; do not trust it"
            }
            _ => match self.kind() {
                ErrorKind::InvalidInput => "check the submitted values",
                _ => "retry the operation; report it if the problem persists",
            },
        }
    }
}
