use depower_evidence::{EvidenceConfig, EvidenceError};
use depower_store::EndpointAuth;
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::io::Write;

fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name: &str| vars.get(name).cloned()
}

#[test]
fn empty_environment_gives_defaults() {
    let config = EvidenceConfig::from_lookup(lookup_from(&[])).unwrap();
    let defaults = EvidenceConfig::default();
    assert_eq!(config.store.endpoints, defaults.store.endpoints);
    assert_eq!(config.store.request_timeout_ms, 10_000);
    assert_eq!(config.max_photo_bytes, defaults.max_photo_bytes);
    assert_eq!(config.key_registry_url, None);
}

#[test]
fn environment_overrides_every_field() {
    let config = EvidenceConfig::from_lookup(lookup_from(&[
        (
            "DEPOWER_STORE_ENDPOINTS",
            "https://ipfs-a.example.org, https://ipfs-b.example.org,",
        ),
        ("DEPOWER_STORE_TIMEOUT_MS", "2500"),
        ("DEPOWER_KEY_REGISTRY_URL", " https://keys.example.org "),
        ("DEPOWER_MAX_PHOTO_BYTES", "1048576"),
    ]))
    .unwrap();

    let urls: Vec<&str> = config
        .store
        .endpoints
        .iter()
        .map(|e| e.base_url.as_str())
        .collect();
    assert_eq!(urls, vec!["https://ipfs-a.example.org", "https://ipfs-b.example.org"]);
    assert_eq!(config.store.request_timeout_ms, 2500);
    assert_eq!(config.key_registry_url.as_deref(), Some("https://keys.example.org"));
    assert_eq!(config.max_photo_bytes, 1_048_576);
}

#[test]
fn non_numeric_timeout_is_config_error() {
    let err = EvidenceConfig::from_lookup(lookup_from(&[("DEPOWER_STORE_TIMEOUT_MS", "soon")]))
        .unwrap_err();
    assert!(matches!(err, EvidenceError::Config(ref msg) if msg.contains("DEPOWER_STORE_TIMEOUT_MS")));
}

#[test]
fn blank_endpoint_list_is_rejected() {
    let err = EvidenceConfig::from_lookup(lookup_from(&[("DEPOWER_STORE_ENDPOINTS", " , ")]))
        .unwrap_err();
    assert!(matches!(err, EvidenceError::Config(_)));
}

#[test]
fn zero_timeout_is_rejected() {
    let err = EvidenceConfig::from_lookup(lookup_from(&[("DEPOWER_STORE_TIMEOUT_MS", "0")]))
        .unwrap_err();
    assert!(matches!(err, EvidenceError::Config(_)));
}

#[test]
fn non_http_registry_is_rejected() {
    let err =
        EvidenceConfig::from_lookup(lookup_from(&[("DEPOWER_KEY_REGISTRY_URL", "ftp://keys")]))
            .unwrap_err();
    assert!(matches!(err, EvidenceError::Config(_)));
}

#[test]
fn loads_from_json_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "store": {{
                "endpoints": [
                    {{ "base_url": "https://primary.example.org" }},
                    {{
                        "base_url": "https://backup.example.org",
                        "auth": {{ "type": "bearer", "token": "secret-token" }}
                    }}
                ],
                "request_timeout_ms": 5000
            }},
            "key_registry_url": "https://keys.example.org"
        }}"#
    )
    .unwrap();

    let config = EvidenceConfig::from_file(file.path()).unwrap();
    assert_eq!(config.store.endpoints.len(), 2);
    assert_eq!(config.store.endpoints[0].auth, None);
    assert_eq!(
        config.store.endpoints[1].auth,
        Some(EndpointAuth::Bearer {
            token: "secret-token".to_string()
        })
    );
    assert_eq!(config.store.request_timeout_ms, 5000);
    assert_eq!(config.max_photo_bytes, EvidenceConfig::default().max_photo_bytes);
}

#[test]
fn missing_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = EvidenceConfig::from_file(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, EvidenceError::Config(_)));
}

#[test]
fn malformed_json_is_serialization_error() {
    let err = EvidenceConfig::from_json_str("{ not json").unwrap_err();
    assert!(matches!(err, EvidenceError::Serialization(_)));
}

#[test]
fn config_round_trips_through_json() {
    let config = EvidenceConfig {
        key_registry_url: Some("https://keys.example.org".to_string()),
        max_photo_bytes: 4096,
        ..EvidenceConfig::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    let restored = EvidenceConfig::from_json_str(&json).unwrap();
    assert_eq!(restored.key_registry_url, config.key_registry_url);
    assert_eq!(restored.max_photo_bytes, 4096);
    assert_eq!(restored.store.endpoints, config.store.endpoints);
}
