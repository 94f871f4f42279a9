//! In-process content store.
//!
//! Behaves like a single healthy endpoint. Tests can plant arbitrary bytes
//! under a digest to model a misbehaving backend, or take the store offline.

use crate::digest::ContentDigest;
use crate::error::{StoreError, StoreResult};
use crate::ContentStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// Thread-safe in-memory content store.
#[derive(Clone, Default)]
pub struct MemoryContentStore {
    blobs: Arc<RwLock<HashMap<ContentDigest, Vec<u8>>>>,
    offline: Arc<AtomicBool>,
    puts: Arc<AtomicUsize>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `bytes` under `digest` without checking that they match.
    pub async fn insert_raw(&self, digest: ContentDigest, bytes: Vec<u8>) {
        self.blobs.write().await.insert(digest, bytes);
    }

    /// While offline, every operation fails with [`StoreError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of successful `put` calls so far.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }

    fn check_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn put(&self, bytes: &[u8]) -> StoreResult<ContentDigest> {
        self.check_online()?;
        let digest = ContentDigest::of(bytes);
        // Same digest means same bytes, so an existing entry is left alone.
        self.blobs
            .write()
            .await
            .entry(digest)
            .or_insert_with(|| bytes.to_vec());
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(digest)
    }

    async fn get(&self, digest: &ContentDigest) -> StoreResult<Vec<u8>> {
        self.check_online()?;
        let bytes = self
            .blobs
            .read()
            .await
            .get(digest)
            .cloned()
            .ok_or(StoreError::NotFound(*digest))?;
        crate::verify_digest(digest, bytes)
    }
}
