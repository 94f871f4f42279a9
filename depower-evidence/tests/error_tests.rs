use depower_crypto::CryptoError;
use depower_evidence::{ErrorKind, EvidenceError};
use depower_store::{ContentDigest, StoreError};
use pretty_assertions::assert_eq;
use std::error::Error;

#[test]
fn display_names_the_failing_stage() {
    let cases = [
        (
            EvidenceError::InvalidCoordinates {
                latitude: 95.0,
                longitude: -200.0,
            },
            "invalid coordinates: latitude 95, longitude -200",
        ),
        (EvidenceError::EmptyPayload("photo"), "empty payload: photo"),
        (
            EvidenceError::PayloadTooLarge { size: 11, limit: 10 },
            "payload too large: 11 bytes exceeds limit of 10",
        ),
        (EvidenceError::UnwrapFailed, "key unwrap failed"),
        (
            EvidenceError::UploadFailed(StoreError::Unavailable("offline".to_string())),
            "upload failed: content store unavailable: offline",
        ),
        (
            EvidenceError::TamperDetected("hash mismatch".to_string()),
            "tamper detected: hash mismatch",
        ),
    ];
    for (err, expected) in cases {
        assert_eq!(err.to_string(), expected);
    }
}

#[test]
fn every_variant_has_a_kind() {
    let digest = ContentDigest::of(b"x");
    let cases = [
        (EvidenceError::InvalidInput("x".into()), ErrorKind::InvalidInput),
        (EvidenceError::UnknownRecipient("m".into()), ErrorKind::InvalidInput),
        (EvidenceError::Config("x".into()), ErrorKind::InvalidInput),
        (
            EvidenceError::KeyGenFailed(CryptoError::Randomness("rng".into())),
            ErrorKind::CryptoFailure,
        ),
        (
            EvidenceError::EncryptionFailed(CryptoError::Encryption("x".into())),
            ErrorKind::CryptoFailure,
        ),
        (
            EvidenceError::WrapFailed(CryptoError::Encryption("x".into())),
            ErrorKind::CryptoFailure,
        ),
        (EvidenceError::AuthenticationFailed, ErrorKind::CryptoFailure),
        (
            EvidenceError::KeyResolutionFailed("timeout".into()),
            ErrorKind::StorageFailure,
        ),
        (
            EvidenceError::FetchFailed(StoreError::NotFound(digest)),
            ErrorKind::StorageFailure,
        ),
        (
            EvidenceError::HashFailed(CryptoError::HashFailed("nan".into())),
            ErrorKind::IntegrityFailure,
        ),
        (EvidenceError::UnwrapFailed, ErrorKind::AuthorizationFailure),
    ];
    for (err, kind) in cases {
        assert_eq!(err.kind(), kind, "{err}");
        assert!(!err.guidance().is_empty());
    }
}

#[test]
fn wrapped_errors_keep_their_source() {
    let err = EvidenceError::FetchFailed(StoreError::Unavailable("all endpoints failed".into()));
    let source = err.source().unwrap();
    assert_eq!(
        source.to_string(),
        "content store unavailable: all endpoints failed"
    );
}

#[test]
fn serde_errors_convert() {
    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err: EvidenceError = json_err.into();
    assert!(matches!(err, EvidenceError::Serialization(_)));
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn guidance_is_stage_specific() {
    assert_eq!(
        EvidenceError::UnwrapFailed.guidance(),
        "this evidence was not shared with your key"
    );
    assert_eq!(
        EvidenceError::KeyResolutionFailed("x".into()).guidance(),
        "check connectivity to the key registry"
    );
    assert_eq!(
        EvidenceError::TamperDetected("x".into()).guidance(),
        "evidence failed verification; do not trust it"
    );
}
