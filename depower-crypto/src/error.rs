//! Error types for the crypto layer.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur during encryption, key wrapping, or hashing.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The OS random source could not produce key or nonce material.
    #[error("random source unavailable: {0}")]
    Randomness(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Tag mismatch, truncated input, or malformed framing. Carries no detail
    /// so callers cannot tell which check failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// The wrapped key could not be opened with the supplied secret key.
    #[error("key unwrap failed")]
    UnwrapFailed,

    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("invalid key encoding: {0}")]
    InvalidKeyEncoding(String),

    #[error("canonical hashing failed: {0}")]
    HashFailed(String),
}
