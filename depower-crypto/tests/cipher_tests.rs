//! Adversarial tests for ChaCha20-Poly1305 encryption of evidence fields.
//!
//! Covers wrong-key decryption, bit flips in the body and tag, nonce
//! corruption, truncation, and the compact byte framing.

use depower_crypto::{
    decrypt, decrypt_string, encrypt, encrypt_string, Ciphertext, CryptoError, SymmetricKey,
    NONCE_SIZE, TAG_SIZE,
};

fn key() -> SymmetricKey {
    SymmetricKey::generate().unwrap()
}

// ── Round Trip ──

#[test]
fn encrypt_decrypt_roundtrip() {
    let key = key();
    let encrypted = encrypt(&key, b"device photo bytes").unwrap();
    assert_eq!(decrypt(&key, &encrypted).unwrap(), b"device photo bytes");
}

#[test]
fn encrypt_decrypt_empty_plaintext() {
    let key = key();
    let encrypted = encrypt(&key, b"").unwrap();
    assert_eq!(encrypted.ciphertext.len(), TAG_SIZE);
    assert!(decrypt(&key, &encrypted).unwrap().is_empty());
}

#[test]
fn encrypt_decrypt_large_plaintext() {
    let key = key();
    let large = vec![0xAB; 1024 * 1024];
    let encrypted = encrypt(&key, &large).unwrap();
    assert_eq!(encrypted.plaintext_len(), large.len());
    assert_eq!(decrypt(&key, &encrypted).unwrap(), large);
}

#[test]
fn string_roundtrip() {
    let key = key();
    let encrypted = encrypt_string(&key, "22.547856,114.062996").unwrap();
    assert_eq!(
        decrypt_string(&key, &encrypted).unwrap(),
        "22.547856,114.062996"
    );
}

#[test]
fn encrypt_produces_unique_nonces() {
    let key = key();
    let a = encrypt(&key, b"same plaintext").unwrap();
    let b = encrypt(&key, b"same plaintext").unwrap();

    assert_ne!(a.nonce, b.nonce, "nonces must never repeat");
    assert_ne!(a.ciphertext, b.ciphertext);
    assert_eq!(decrypt(&key, &a).unwrap(), b"same plaintext");
    assert_eq!(decrypt(&key, &b).unwrap(), b"same plaintext");
}

// ── Wrong Key ──

#[test]
fn decrypt_with_wrong_key_fails_closed() {
    let encrypted = encrypt(&key(), b"sensitive location").unwrap();
    let err = decrypt(&key(), &encrypted).unwrap_err();
    assert!(matches!(err, CryptoError::AuthenticationFailed));
}

// ── Tampering ──

#[test]
fn every_bit_flip_in_body_and_tag_is_detected() {
    let key = key();
    let encrypted = encrypt(&key, b"photo").unwrap();

    for i in 0..encrypted.ciphertext.len() {
        for bit in 0..8 {
            let mut tampered = encrypted.clone();
            tampered.ciphertext[i] ^= 1 << bit;
            assert!(
                matches!(
                    decrypt(&key, &tampered),
                    Err(CryptoError::AuthenticationFailed)
                ),
                "flip of bit {bit} in byte {i} must be detected"
            );
        }
    }
}

#[test]
fn tag_flip_is_detected() {
    let key = key();
    let mut encrypted = encrypt(&key, b"integrity-protected data").unwrap();
    if let Some(byte) = encrypted.ciphertext.last_mut() {
        *byte ^= 0x80;
    }
    assert!(matches!(
        decrypt(&key, &encrypted),
        Err(CryptoError::AuthenticationFailed)
    ));
}

#[test]
fn wrong_nonce_fails() {
    let key = key();
    let mut encrypted = encrypt(&key, b"nonce-critical data").unwrap();
    encrypted.nonce[0] ^= 0xFF;
    assert!(decrypt(&key, &encrypted).is_err());
}

#[test]
fn appended_bytes_detected() {
    let key = key();
    let mut encrypted = encrypt(&key, b"original data").unwrap();
    encrypted.ciphertext.push(0xFF);
    assert!(decrypt(&key, &encrypted).is_err());
}

#[test]
fn swapped_ciphertexts_not_interchangeable() {
    let key = key();
    let a = encrypt(&key, b"message A").unwrap();
    let b = encrypt(&key, b"message B").unwrap();

    let franken = Ciphertext {
        nonce: a.nonce,
        ciphertext: b.ciphertext.clone(),
    };
    assert!(decrypt(&key, &franken).is_err());
}

// ── Truncation ──

#[test]
fn truncated_ciphertext_fails() {
    let key = key();
    let mut encrypted = encrypt(&key, b"data that will be truncated").unwrap();
    encrypted.ciphertext.truncate(5);
    assert!(matches!(
        decrypt(&key, &encrypted),
        Err(CryptoError::AuthenticationFailed)
    ));
}

#[test]
fn empty_ciphertext_fails() {
    let key = key();
    let mut encrypted = encrypt(&key, b"will be emptied").unwrap();
    encrypted.ciphertext.clear();
    assert!(matches!(
        decrypt(&key, &encrypted),
        Err(CryptoError::AuthenticationFailed)
    ));
}

// ── Framing ──

#[test]
fn compact_framing_roundtrip() {
    let key = key();
    let encrypted = encrypt(&key, b"framed").unwrap();
    let bytes = encrypted.to_bytes();
    assert_eq!(bytes.len(), NONCE_SIZE + 6 + TAG_SIZE);

    let parsed = Ciphertext::from_bytes(&bytes).unwrap();
    assert_eq!(parsed, encrypted);
    assert_eq!(decrypt(&key, &parsed).unwrap(), b"framed");
}

#[test]
fn short_frame_is_rejected() {
    let err = Ciphertext::from_bytes(&[0u8; NONCE_SIZE + TAG_SIZE - 1]).unwrap_err();
    assert!(matches!(err, CryptoError::AuthenticationFailed));
}

#[test]
fn json_uses_base64_body() {
    let key = key();
    let encrypted = encrypt(&key, b"serialize me").unwrap();

    let json = serde_json::to_value(&encrypted).unwrap();
    assert!(json["ciphertext"].is_string());

    let restored: Ciphertext = serde_json::from_value(json).unwrap();
    assert_eq!(decrypt(&key, &restored).unwrap(), b"serialize me");
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn encrypt_decrypt_always_roundtrips(plaintext in proptest::collection::vec(any::<u8>(), 0..2048)) {
            let key = SymmetricKey::generate().unwrap();
            let encrypted = encrypt(&key, &plaintext).unwrap();
            prop_assert_eq!(decrypt(&key, &encrypted).unwrap(), plaintext);
        }
    }
}
