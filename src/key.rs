//! Application keys and their hashed storage form
//!
//! Callers address memory with integer, float, text, or byte-sequence keys.
//! Before touching the storage engine, a key is rendered to canonical text
//! and hashed down to a signed 64-bit identifier.

use std::fmt;

use bytes::Bytes;
use sha2::{Digest, Sha256};

/// An application-level key
///
/// Only the hash of a key is persisted. Two keys with the same canonical
/// text address the same row; collisions in the 64-bit hash space are
/// possible and not detected.
#[derive(Debug, Clone, PartialEq)]
pub enum Key {
    /// Integer key
    Int(i64),

    /// Floating point key
    Float(f64),

    /// Text key
    Text(String),

    /// Byte sequence key (binary-safe)
    Bytes(Bytes),
}

impl Key {
    /// Render the key to its canonical text form
    pub fn canonical_text(&self) -> String {
        match self {
            Key::Int(i) => i.to_string(),
            // Debug formatting keeps the fractional part: "1.0", not "1"
            Key::Float(f) => format!("{:?}", f),
            Key::Text(s) => s.clone(),
            Key::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
        }
    }

    /// Hash the key to its 64-bit storage identifier
    ///
    /// SHA-256 over the canonical text, first 8 digest bytes read as a
    /// signed big-endian integer. The cryptographic hash is used for
    /// uniform distribution, not for security.
    pub fn hash(&self) -> i64 {
        let digest = Sha256::digest(self.canonical_text().as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        i64::from_be_bytes(prefix)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_text())
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::Int(i)
    }
}

impl From<i32> for Key {
    fn from(i: i32) -> Self {
        Key::Int(i as i64)
    }
}

impl From<f64> for Key {
    fn from(f: f64) -> Self {
        Key::Float(f)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Text(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Text(s)
    }
}

impl From<Bytes> for Key {
    fn from(b: Bytes) -> Self {
        Key::Bytes(b)
    }
}

impl From<Vec<u8>> for Key {
    fn from(b: Vec<u8>) -> Self {
        Key::Bytes(Bytes::from(b))
    }
}
