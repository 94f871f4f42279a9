//! Content store error types.

use crate::digest::ContentDigest;
use thiserror::Error;

/// Result type for content store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while storing or retrieving content.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Every endpoint answered, and none of them holds the digest.
    #[error("content not found: {0}")]
    NotFound(ContentDigest),

    /// Retrieved bytes do not hash to the requested digest.
    #[error("digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch {
        expected: ContentDigest,
        actual: ContentDigest,
    },

    /// All configured endpoints failed or timed out.
    #[error("content store unavailable: {0}")]
    Unavailable(String),

    #[error("invalid content digest: {0}")]
    InvalidDigest(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}
