//! Key wrapping for the designated maintainer.
//!
//! Uses X25519 key exchange + XSalsa20-Poly1305 to seal a per-registration
//! [`SymmetricKey`] for one recipient. Each wrap uses an ephemeral keypair
//! and a random nonce, so the same key wrapped twice never produces the same
//! bytes. Opening is authenticated: a wrong secret key or any modification of
//! the envelope fails with a single opaque [`CryptoError::UnwrapFailed`].
//!
//! Also provides passphrase-protected storage of the maintainer's secret key.

use crate::cipher::{decrypt, encrypt, Ciphertext};
use crate::error::{CryptoError, CryptoResult};
use crate::key::{derive_key, KdfParams, Salt, SymmetricKey, KEY_SIZE, SALT_SIZE};
use base64::{engine::general_purpose::STANDARD, Engine};
use crypto_box::aead::Aead;
use crypto_box::{PublicKey, SalsaBox, SecretKey};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

/// Size of an X25519 public or secret key in bytes.
pub const PUBLIC_KEY_SIZE: usize = 32;

/// XSalsa20 nonce size in bytes.
pub const ENVELOPE_NONCE_SIZE: usize = 24;

/// X25519 keypair held by a maintainer.
///
/// The secret key implements `ZeroizeOnDrop` (from crypto_box).
pub struct RecipientKeyPair {
    pub secret: SecretKey,
    pub public: PublicKey,
}

impl RecipientKeyPair {
    /// Raw 32-byte public key.
    pub fn public_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        *self.public.as_bytes()
    }

    pub fn secret_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.secret.to_bytes()
    }

    /// Rebuilds the pair from a stored secret key.
    pub fn from_secret_bytes(bytes: [u8; PUBLIC_KEY_SIZE]) -> Self {
        let secret = SecretKey::from(bytes);
        let public = secret.public_key();
        Self { secret, public }
    }

    /// Public key as standard base64, the form published to a key registry.
    pub fn public_base64(&self) -> String {
        public_key_to_base64(&self.public)
    }
}

impl std::fmt::Debug for RecipientKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipientKeyPair")
            .field("public", &self.public_base64())
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// A [`SymmetricKey`] sealed for exactly one recipient public key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrappedKey {
    /// Sender half of the one-off X25519 exchange.
    pub ephemeral_public_key: [u8; PUBLIC_KEY_SIZE],
    pub nonce: [u8; ENVELOPE_NONCE_SIZE],
    /// Sealed key bytes plus Poly1305 tag.
    #[serde(with = "crate::encoding::base64_bytes")]
    pub sealed_key: Vec<u8>,
}

impl WrappedKey {
    /// Fixed-layout bytes: `ephemeral_pk || nonce || sealed_key`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out =
            Vec::with_capacity(PUBLIC_KEY_SIZE + ENVELOPE_NONCE_SIZE + self.sealed_key.len());
        out.extend_from_slice(&self.ephemeral_public_key);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.sealed_key);
        out
    }
}

/// Generates a new X25519 keypair for a maintainer.
pub fn generate_recipient_keypair() -> RecipientKeyPair {
    let secret = SecretKey::generate(&mut rand::rngs::OsRng);
    let public = secret.public_key();
    RecipientKeyPair { secret, public }
}

/// Wraps `key` for the holder of `recipient_pk`.
pub fn wrap_key(key: &SymmetricKey, recipient_pk: &PublicKey) -> CryptoResult<WrappedKey> {
    let ephemeral = SecretKey::generate(&mut rand::rngs::OsRng);
    let ephemeral_pk = ephemeral.public_key();

    let salsa_box = SalsaBox::new(recipient_pk, &ephemeral);

    let mut nonce = [0u8; ENVELOPE_NONCE_SIZE];
    rand::rngs::OsRng
        .try_fill_bytes(&mut nonce)
        .map_err(|e| CryptoError::Randomness(e.to_string()))?;

    let sealed_key = salsa_box
        .encrypt(crypto_box::Nonce::from_slice(&nonce), &key.as_bytes()[..])
        .map_err(|e| CryptoError::Encryption(format!("key wrap failed: {e}")))?;

    Ok(WrappedKey {
        ephemeral_public_key: *ephemeral_pk.as_bytes(),
        nonce,
        sealed_key,
    })
}

/// Opens a wrapped key with the recipient's secret key.
///
/// All failure causes collapse into [`CryptoError::UnwrapFailed`].
pub fn unwrap_key(wrapped: &WrappedKey, recipient_sk: &SecretKey) -> CryptoResult<SymmetricKey> {
    let ephemeral_pk = PublicKey::from(wrapped.ephemeral_public_key);
    let salsa_box = SalsaBox::new(&ephemeral_pk, recipient_sk);

    let opened = salsa_box
        .decrypt(
            crypto_box::Nonce::from_slice(&wrapped.nonce),
            wrapped.sealed_key.as_ref(),
        )
        .map(Zeroizing::new)
        .map_err(|_| CryptoError::UnwrapFailed)?;

    SymmetricKey::from_slice(&opened).map_err(|_| CryptoError::UnwrapFailed)
}

/// Encodes a public key as standard base64.
pub fn public_key_to_base64(pk: &PublicKey) -> String {
    STANDARD.encode(pk.as_bytes())
}

/// Decodes a base64 public key, checking its length.
pub fn public_key_from_base64(encoded: &str) -> CryptoResult<PublicKey> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| CryptoError::InvalidKeyEncoding(e.to_string()))?;
    public_key_from_slice(&bytes)
}

/// Builds a public key from raw bytes, checking its length.
pub fn public_key_from_slice(bytes: &[u8]) -> CryptoResult<PublicKey> {
    let array: [u8; PUBLIC_KEY_SIZE] =
        bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: PUBLIC_KEY_SIZE,
            actual: bytes.len(),
        })?;
    Ok(PublicKey::from(array))
}

/// Secret key encrypted with a passphrase (Argon2id -> ChaCha20-Poly1305).
///
/// Bundles the salt and cost parameters so the passphrase is the only input
/// needed to open it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PassphraseProtectedKey {
    pub salt: [u8; SALT_SIZE],
    pub kdf: KdfParams,
    pub encrypted: Ciphertext,
}

/// Protects a maintainer's secret key with a passphrase using default
/// Argon2id parameters.
pub fn protect_secret_key(sk: &SecretKey, passphrase: &str) -> CryptoResult<PassphraseProtectedKey> {
    protect_secret_key_with_params(sk, passphrase, KdfParams::default())
}

/// Protects a secret key with explicit Argon2id parameters.
pub fn protect_secret_key_with_params(
    sk: &SecretKey,
    passphrase: &str,
    kdf: KdfParams,
) -> CryptoResult<PassphraseProtectedKey> {
    let salt = Salt::random()?;
    let derived = derive_key(passphrase, &salt, &kdf)?;
    let secret_bytes = Zeroizing::new(sk.to_bytes());
    let encrypted = encrypt(&derived, &secret_bytes[..])?;

    Ok(PassphraseProtectedKey {
        salt: *salt.as_bytes(),
        kdf,
        encrypted,
    })
}

/// Recovers a secret key protected by [`protect_secret_key`].
pub fn unprotect_secret_key(
    protected: &PassphraseProtectedKey,
    passphrase: &str,
) -> CryptoResult<SecretKey> {
    let salt = Salt::from_bytes(protected.salt);
    let derived = derive_key(passphrase, &salt, &protected.kdf)?;
    let plaintext = Zeroizing::new(decrypt(&derived, &protected.encrypted).map_err(|_| {
        CryptoError::Decryption("wrong passphrase or tampered key file".to_string())
    })?);

    if plaintext.len() != KEY_SIZE {
        return Err(CryptoError::InvalidKeyLength {
            expected: KEY_SIZE,
            actual: plaintext.len(),
        });
    }

    let mut bytes = [0u8; KEY_SIZE];
    bytes.copy_from_slice(&plaintext);
    let secret = SecretKey::from(bytes);
    bytes.zeroize();
    Ok(secret)
}
