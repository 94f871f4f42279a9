//! Canonical hashing of ordered field lists.
//!
//! Records are serialized in insertion order with explicit lengths and type
//! tags, then hashed with SHA-256. The layout is:
//!
//! ```text
//! len(DOMAIN) || DOMAIN || len(kind) || kind || field_count (u32 BE)
//! for each field:
//!     len(name) || name || type_tag (1 byte) || len(value) || value
//! ```
//!
//! All lengths are u32 big-endian. Integers are big-endian, floats are their
//! IEEE-754 bits big-endian with `-0.0` folded into `0.0`. Absent optional
//! values are written with their own tag and an empty value, so `None` never
//! collides with an empty string.

use crate::error::{CryptoError, CryptoResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Size of an integrity hash in bytes (256 bits).
pub const HASH_SIZE: usize = 32;

const DOMAIN: &[u8] = b"depower.integrity.v1";

const TAG_ABSENT: u8 = 0x00;
const TAG_STR: u8 = 0x01;
const TAG_BYTES: u8 = 0x02;
const TAG_U64: u8 = 0x03;
const TAG_I64: u8 = 0x04;
const TAG_F64: u8 = 0x05;

/// SHA-256 digest of a canonical record. Rendered as `0x`-prefixed hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntegrityHash([u8; HASH_SIZE]);

impl IntegrityHash {
    pub fn from_bytes(bytes: [u8; HASH_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for IntegrityHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for IntegrityHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IntegrityHash({})", self.to_hex())
    }
}

impl FromStr for IntegrityHash {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped)
            .map_err(|e| CryptoError::HashFailed(format!("invalid integrity hash hex: {e}")))?;
        let array: [u8; HASH_SIZE] = bytes.try_into().map_err(|b: Vec<u8>| {
            CryptoError::HashFailed(format!(
                "invalid integrity hash length: expected {HASH_SIZE}, got {}",
                b.len()
            ))
        })?;
        Ok(Self(array))
    }
}

impl Serialize for IntegrityHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for IntegrityHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Clone, Copy, Debug)]
enum FieldValue<'a> {
    Absent,
    Str(&'a str),
    Bytes(&'a [u8]),
    U64(u64),
    I64(i64),
    F64(f64),
}

/// An ordered list of named fields to be hashed.
///
/// Borrows its values, so large payloads are streamed into the hasher
/// without being copied.
#[derive(Clone, Debug)]
pub struct CanonicalRecord<'a> {
    kind: &'a str,
    fields: Vec<(&'a str, FieldValue<'a>)>,
}

impl<'a> CanonicalRecord<'a> {
    /// Starts a record. `kind` separates record types that share field names.
    pub fn new(kind: &'a str) -> Self {
        Self {
            kind,
            fields: Vec::new(),
        }
    }

    pub fn str(mut self, name: &'a str, value: &'a str) -> Self {
        self.fields.push((name, FieldValue::Str(value)));
        self
    }

    pub fn bytes(mut self, name: &'a str, value: &'a [u8]) -> Self {
        self.fields.push((name, FieldValue::Bytes(value)));
        self
    }

    pub fn u64(mut self, name: &'a str, value: u64) -> Self {
        self.fields.push((name, FieldValue::U64(value)));
        self
    }

    pub fn i64(mut self, name: &'a str, value: i64) -> Self {
        self.fields.push((name, FieldValue::I64(value)));
        self
    }

    pub fn f64(mut self, name: &'a str, value: f64) -> Self {
        self.fields.push((name, FieldValue::F64(value)));
        self
    }

    pub fn opt_f64(mut self, name: &'a str, value: Option<f64>) -> Self {
        let value = value.map_or(FieldValue::Absent, FieldValue::F64);
        self.fields.push((name, value));
        self
    }

    pub fn opt_str(mut self, name: &'a str, value: Option<&'a str>) -> Self {
        let value = value.map_or(FieldValue::Absent, FieldValue::Str);
        self.fields.push((name, value));
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the exact byte string that [`canonical_hash`] digests.
    pub fn encode(&self) -> CryptoResult<Vec<u8>> {
        let mut out = Vec::new();
        self.feed(|chunk| out.extend_from_slice(chunk))?;
        Ok(out)
    }

    fn validate(&self) -> CryptoResult<()> {
        let mut seen = HashSet::with_capacity(self.fields.len());
        for (name, value) in &self.fields {
            if name.is_empty() {
                return Err(CryptoError::HashFailed("empty field name".to_string()));
            }
            if !seen.insert(*name) {
                return Err(CryptoError::HashFailed(format!("duplicate field: {name}")));
            }
            if let FieldValue::F64(v) = value {
                if !v.is_finite() {
                    return Err(CryptoError::HashFailed(format!(
                        "non-finite value for field {name}"
                    )));
                }
            }
        }
        Ok(())
    }

    fn feed<F: FnMut(&[u8])>(&self, mut sink: F) -> CryptoResult<()> {
        self.validate()?;

        write_prefixed(&mut sink, DOMAIN)?;
        write_prefixed(&mut sink, self.kind.as_bytes())?;
        sink(&length_prefix(self.fields.len())?);

        for (name, value) in &self.fields {
            write_prefixed(&mut sink, name.as_bytes())?;
            match value {
                FieldValue::Absent => {
                    sink(&[TAG_ABSENT]);
                    sink(&0u32.to_be_bytes());
                }
                FieldValue::Str(s) => {
                    sink(&[TAG_STR]);
                    write_prefixed(&mut sink, s.as_bytes())?;
                }
                FieldValue::Bytes(b) => {
                    sink(&[TAG_BYTES]);
                    write_prefixed(&mut sink, b)?;
                }
                FieldValue::U64(v) => {
                    sink(&[TAG_U64]);
                    write_prefixed(&mut sink, &v.to_be_bytes())?;
                }
                FieldValue::I64(v) => {
                    sink(&[TAG_I64]);
                    write_prefixed(&mut sink, &v.to_be_bytes())?;
                }
                FieldValue::F64(v) => {
                    let normalized = if *v == 0.0 { 0.0f64 } else { *v };
                    sink(&[TAG_F64]);
                    write_prefixed(&mut sink, &normalized.to_bits().to_be_bytes())?;
                }
            }
        }
        Ok(())
    }
}

fn length_prefix(len: usize) -> CryptoResult<[u8; 4]> {
    u32::try_from(len)
        .map(u32::to_be_bytes)
        .map_err(|_| CryptoError::HashFailed(format!("field too large to encode: {len} bytes")))
}

fn write_prefixed<F: FnMut(&[u8])>(sink: &mut F, bytes: &[u8]) -> CryptoResult<()> {
    sink(&length_prefix(bytes.len())?);
    sink(bytes);
    Ok(())
}

/// Hashes a canonical record with SHA-256.
pub fn canonical_hash(record: &CanonicalRecord<'_>) -> CryptoResult<IntegrityHash> {
    let mut hasher = Sha256::new();
    record.feed(|chunk| hasher.update(chunk))?;
    Ok(IntegrityHash(hasher.finalize().into()))
}
