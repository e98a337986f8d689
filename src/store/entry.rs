//! Entry structure for persisted rows

use super::value::TypeTag;

/// A single row of the `memory` table
///
/// Payload and tag always travel together; an upsert replaces both.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Hashed storage key
    pub key: i64,

    /// JSON payload
    pub payload: String,

    /// Tag recording the value's original type
    pub tag: TypeTag,
}

impl Entry {
    /// Create an entry for a hashed key
    pub fn new(key: i64, payload: impl Into<String>, tag: TypeTag) -> Self {
        Entry {
            key,
            payload: payload.into(),
            tag,
        }
    }
}
