//! Encryption layer for DePower device evidence.
//!
//! Provides the cryptographic building blocks of the evidence pipeline:
//! - ChaCha20-Poly1305 for authenticated encryption of sensitive fields
//! - X25519 + XSalsa20-Poly1305 envelopes for wrapping keys to a maintainer
//! - SHA-256 canonical hashing for ledger anchoring
//! - Argon2id passphrase protection for the maintainer's secret key
//!
//! # Architecture
//!
//! Sensitive fields use envelope encryption:
//!
//! 1. **Data Key**: A random [`SymmetricKey`] generated per registration.
//!    It encrypts the photo and location and is wiped once wrapped.
//!
//! 2. **Wrapped Key**: The data key sealed with the maintainer's public key.
//!    Only the matching secret key can open it, so only the maintainer can
//!    reach the plaintext.

mod cipher;
mod encoding;
pub mod envelope;
mod error;
pub mod integrity;
mod key;

pub use cipher::{
    decrypt, decrypt_string, encrypt, encrypt_string, Ciphertext, NONCE_SIZE, TAG_SIZE,
};
pub use crypto_box::{PublicKey, SecretKey};
pub use envelope::{
    generate_recipient_keypair, protect_secret_key, protect_secret_key_with_params,
    public_key_from_base64, public_key_from_slice, public_key_to_base64, unprotect_secret_key,
    unwrap_key, wrap_key, PassphraseProtectedKey, RecipientKeyPair, WrappedKey,
};
pub use error::{CryptoError, CryptoResult};
pub use integrity::{canonical_hash, CanonicalRecord, IntegrityHash, HASH_SIZE};
pub use key::{derive_key, KdfParams, Salt, SymmetricKey, KEY_SIZE, SALT_SIZE};
