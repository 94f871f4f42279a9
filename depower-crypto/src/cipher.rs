//! ChaCha20-Poly1305 authenticated encryption.
//!
//! Every call draws a fresh 96-bit nonce from the OS random source and
//! embeds it in the returned [`Ciphertext`], so decryption only needs the key.

use crate::error::{CryptoError, CryptoResult};
use crate::key::SymmetricKey;
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Nonce size in bytes (96 bits).
pub const NONCE_SIZE: usize = 12;

/// Poly1305 tag size in bytes (128 bits).
pub const TAG_SIZE: usize = 16;

/// Output of [`encrypt`]: the nonce plus ciphertext with the tag appended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ciphertext {
    pub nonce: [u8; NONCE_SIZE],
    /// Encrypted bytes followed by the 16-byte Poly1305 tag.
    #[serde(with = "crate::encoding::base64_bytes")]
    pub ciphertext: Vec<u8>,
}

impl Ciphertext {
    /// Compact framing: `nonce || ciphertext || tag`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(NONCE_SIZE + self.ciphertext.len());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Parses the compact framing. Input too short to hold a nonce and a tag
    /// is rejected the same way a bad tag is.
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CryptoError::AuthenticationFailed);
        }
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&bytes[..NONCE_SIZE]);
        Ok(Self {
            nonce,
            ciphertext: bytes[NONCE_SIZE..].to_vec(),
        })
    }

    /// Length of the plaintext this ciphertext decrypts to.
    pub fn plaintext_len(&self) -> usize {
        self.ciphertext.len().saturating_sub(TAG_SIZE)
    }
}

/// Encrypts `plaintext` under `key` with a freshly generated nonce.
pub fn encrypt(key: &SymmetricKey, plaintext: &[u8]) -> CryptoResult<Ciphertext> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));

    let mut nonce = [0u8; NONCE_SIZE];
    rand::rngs::OsRng
        .try_fill_bytes(&mut nonce)
        .map_err(|e| CryptoError::Randomness(e.to_string()))?;

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    Ok(Ciphertext { nonce, ciphertext })
}

/// Decrypts and authenticates `data`. Fails closed with
/// [`CryptoError::AuthenticationFailed`]; never returns partial plaintext.
pub fn decrypt(key: &SymmetricKey, data: &Ciphertext) -> CryptoResult<Vec<u8>> {
    if data.ciphertext.len() < TAG_SIZE {
        return Err(CryptoError::AuthenticationFailed);
    }

    let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
    cipher
        .decrypt(Nonce::from_slice(&data.nonce), data.ciphertext.as_ref())
        .map_err(|_| CryptoError::AuthenticationFailed)
}

/// Encrypts a UTF-8 string.
pub fn encrypt_string(key: &SymmetricKey, plaintext: &str) -> CryptoResult<Ciphertext> {
    encrypt(key, plaintext.as_bytes())
}

/// Decrypts a ciphertext produced by [`encrypt_string`].
pub fn decrypt_string(key: &SymmetricKey, data: &Ciphertext) -> CryptoResult<String> {
    let bytes = decrypt(key, data)?;
    String::from_utf8(bytes)
        .map_err(|e| CryptoError::Decryption(format!("plaintext is not UTF-8: {e}")))
}
