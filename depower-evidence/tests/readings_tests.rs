use chrono::{TimeZone, Utc};
use depower_evidence::{
    EvidenceError, EvidenceService, MeterReading, ReadingAnchor, StaticKeyResolver,
};
use depower_store::{ContentStore, MemoryContentStore};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn service_over(store: &MemoryContentStore) -> EvidenceService {
    EvidenceService::new(Arc::new(store.clone()), Arc::new(StaticKeyResolver::new()))
}

fn reading() -> MeterReading {
    MeterReading {
        device_id: "DG-001".to_string(),
        kwh: 1523.75,
        voltage: 230.1,
        current: 12.4,
        temperature_c: Some(41.5),
        recorded_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 0).unwrap(),
    }
}

#[tokio::test]
async fn anchored_reading_verifies() {
    let store = MemoryContentStore::new();
    let service = service_over(&store);

    let anchor = service.anchor_reading(&reading()).await.unwrap();
    assert_eq!(anchor.device_id, "DG-001");
    assert_eq!(anchor.recorded_at, reading().recorded_at);

    let verified = service.verify_reading(&anchor).await.unwrap();
    assert_eq!(verified, reading());
}

#[tokio::test]
async fn same_reading_anchors_identically() {
    let store = MemoryContentStore::new();
    let service = service_over(&store);

    let a = service.anchor_reading(&reading()).await.unwrap();
    let b = service.anchor_reading(&reading()).await.unwrap();
    assert_eq!(a, b);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn reading_anchor_survives_json() {
    let store = MemoryContentStore::new();
    let service = service_over(&store);

    let anchor = service.anchor_reading(&reading()).await.unwrap();
    let json = serde_json::to_string(&anchor).unwrap();
    let restored: ReadingAnchor = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, anchor);
    service.verify_reading(&restored).await.unwrap();
}

#[tokio::test]
async fn edited_reading_is_detected() {
    let store = MemoryContentStore::new();
    let service = service_over(&store);
    let mut anchor = service.anchor_reading(&reading()).await.unwrap();

    let mut inflated = reading();
    inflated.kwh = 9999.0;
    anchor.content_digest = store
        .put(&serde_json::to_vec(&inflated).unwrap())
        .await
        .unwrap();

    let err = service.verify_reading(&anchor).await.unwrap_err();
    assert!(matches!(err, EvidenceError::TamperDetected(_)));
}

#[tokio::test]
async fn reading_from_other_device_is_detected() {
    let store = MemoryContentStore::new();
    let service = service_over(&store);
    let mut anchor = service.anchor_reading(&reading()).await.unwrap();
    anchor.device_id = "DG-002".to_string();

    let err = service.verify_reading(&anchor).await.unwrap_err();
    assert!(matches!(err, EvidenceError::TamperDetected(_)));
}

#[tokio::test]
async fn invalid_readings_are_rejected() {
    let store = MemoryContentStore::new();
    let service = service_over(&store);

    let mut negative = reading();
    negative.kwh = -1.0;
    let mut infinite = reading();
    infinite.voltage = f64::INFINITY;
    let mut nan_temp = reading();
    nan_temp.temperature_c = Some(f64::NAN);
    let mut anonymous = reading();
    anonymous.device_id = String::new();

    for bad in [negative, infinite, nan_temp, anonymous] {
        let err = service.anchor_reading(&bad).await.unwrap_err();
        assert!(matches!(err, EvidenceError::InvalidInput(_)), "{err}");
    }
    assert_eq!(store.put_count(), 0);
}

#[tokio::test]
async fn missing_reading_is_fetch_failure() {
    let store = MemoryContentStore::new();
    let service = service_over(&store);
    let anchor = service.anchor_reading(&reading()).await.unwrap();

    let empty = MemoryContentStore::new();
    let err = service_over(&empty).verify_reading(&anchor).await.unwrap_err();
    assert!(matches!(
        err,
        EvidenceError::FetchFailed(depower_store::StoreError::NotFound(_))
    ));
}
