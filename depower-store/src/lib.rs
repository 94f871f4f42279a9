//! Content-addressed storage for DePower evidence blobs.
//!
//! Blobs are addressed by the SHA-256 of their bytes. The digest returned by
//! [`ContentStore::put`] is the only handle to the data and doubles as its
//! integrity proof: [`ContentStore::get`] re-hashes whatever a backend returns
//! and refuses bytes that do not match.
//!
//! Two implementations are provided:
//! - [`HttpContentStore`]: ordered HTTP endpoints with per-attempt timeouts
//! - [`MemoryContentStore`]: process-local, for tests and offline use

pub mod config;
pub mod digest;
pub mod error;
pub mod http;
pub mod memory;

pub use config::{EndpointAuth, EndpointConfig, StoreConfig};
pub use digest::{ContentDigest, DIGEST_SIZE};
pub use error::{StoreError, StoreResult};
pub use http::HttpContentStore;
pub use memory::MemoryContentStore;

use async_trait::async_trait;

/// Content-addressed put/get.
///
/// Implementations must be idempotent: storing the same bytes twice yields
/// the same digest, and reads have no side effects.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Stores `bytes` and returns their digest.
    async fn put(&self, bytes: &[u8]) -> StoreResult<ContentDigest>;

    /// Retrieves the bytes for `digest`, verified against it.
    async fn get(&self, digest: &ContentDigest) -> StoreResult<Vec<u8>>;
}

/// Returns `bytes` only if they hash to `expected`.
pub(crate) fn verify_digest(expected: &ContentDigest, bytes: Vec<u8>) -> StoreResult<Vec<u8>> {
    let actual = ContentDigest::of(&bytes);
    if actual != *expected {
        return Err(StoreError::DigestMismatch {
            expected: *expected,
            actual,
        });
    }
    Ok(bytes)
}
