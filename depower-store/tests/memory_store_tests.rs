use depower_store::{ContentDigest, ContentStore, MemoryContentStore, StoreError};

#[tokio::test]
async fn put_get_roundtrip() {
    let store = MemoryContentStore::new();
    let digest = store.put(b"bundle").await.unwrap();
    assert_eq!(digest, ContentDigest::of(b"bundle"));
    assert_eq!(store.get(&digest).await.unwrap(), b"bundle");
}

#[tokio::test]
async fn repeated_put_is_idempotent() {
    let store = MemoryContentStore::new();
    let a = store.put(b"same").await.unwrap();
    let b = store.put(b"same").await.unwrap();
    assert_eq!(a, b);
    assert_eq!(store.len().await, 1);
    assert_eq!(store.put_count(), 2);
}

#[tokio::test]
async fn missing_digest_is_not_found() {
    let store = MemoryContentStore::new();
    let digest = ContentDigest::of(b"absent");
    assert!(matches!(
        store.get(&digest).await,
        Err(StoreError::NotFound(d)) if d == digest
    ));
}

#[tokio::test]
async fn planted_bytes_fail_digest_check() {
    let store = MemoryContentStore::new();
    let digest = ContentDigest::of(b"original");
    store.insert_raw(digest, b"substituted".to_vec()).await;

    assert!(matches!(
        store.get(&digest).await,
        Err(StoreError::DigestMismatch { .. })
    ));
}

#[tokio::test]
async fn offline_store_is_unavailable() {
    let store = MemoryContentStore::new();
    let digest = store.put(b"before outage").await.unwrap();

    store.set_offline(true);
    assert!(matches!(
        store.put(b"during outage").await,
        Err(StoreError::Unavailable(_))
    ));
    assert!(matches!(
        store.get(&digest).await,
        Err(StoreError::Unavailable(_))
    ));

    store.set_offline(false);
    assert_eq!(store.get(&digest).await.unwrap(), b"before outage");
}

#[tokio::test]
async fn clones_share_contents() {
    let store = MemoryContentStore::new();
    let handle = store.clone();
    let digest = store.put(b"shared").await.unwrap();
    assert_eq!(handle.get(&digest).await.unwrap(), b"shared");
}
