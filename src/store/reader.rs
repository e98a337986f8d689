//! Read-only access and the [`MemoryRead`] trait

use std::path::Path;

use tracing::{debug, warn};

use super::value::Value;
use crate::error::Result;
use crate::key::Key;
use crate::storage::SqliteStorage;

/// Read operations shared by [`MemoryReader`] and
/// [`MemoryStore`](super::MemoryStore)
pub trait MemoryRead {
    /// Value stored under `key`, or `None` when absent or unreadable
    ///
    /// A missing key is not an error: the miss is logged as a diagnostic
    /// and the caller sees `None`. Decode and storage failures degrade the
    /// same way.
    fn get(&self, key: &Key) -> Option<Value>;

    /// Whether a value is stored under `key`. Never fails.
    fn exists(&self, key: &Key) -> bool;

    /// Identity of the flow step currently bound to this handle
    ///
    /// Empty until the hosting runtime stamps it; the store itself never
    /// writes this field.
    fn current_identity(&self) -> &str;
}

/// A read-only handle to a memory store
///
/// Exposes everything in [`MemoryRead`] but none of the write operations,
/// for consumers that must not mutate memory.
pub struct MemoryReader {
    storage: SqliteStorage,
    current_identity: String,
}

impl MemoryReader {
    /// Open a read-only handle to an existing store
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::with_storage(SqliteStorage::open_read_only(path)?))
    }

    pub(crate) fn with_storage(storage: SqliteStorage) -> Self {
        MemoryReader {
            storage,
            current_identity: String::new(),
        }
    }

    pub(crate) fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    pub(crate) fn into_storage(self) -> SqliteStorage {
        self.storage
    }

    /// Stamp the identity of the flow step about to use this handle
    pub fn set_current_identity(&mut self, id: impl Into<String>) {
        self.current_identity = id.into();
    }
}

impl MemoryRead for MemoryReader {
    fn get(&self, key: &Key) -> Option<Value> {
        read_value(&self.storage, key)
    }

    fn exists(&self, key: &Key) -> bool {
        contains_key(&self.storage, key)
    }

    fn current_identity(&self) -> &str {
        &self.current_identity
    }
}

/// Shared lookup path: misses and unreadable rows degrade to `None`
pub(crate) fn read_value(storage: &SqliteStorage, key: &Key) -> Option<Value> {
    match storage.fetch(key.hash()) {
        Ok(Some(entry)) => match Value::decode(&entry.payload, entry.tag) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Failed to decode memory ({}): {}", key, e);
                None
            }
        },
        Ok(None) => {
            debug!("Memory key not found ({})", key);
            None
        }
        Err(e) => {
            warn!("Failed to read memory ({}): {}", key, e);
            None
        }
    }
}

/// Shared existence probe: storage failures degrade to `false`
pub(crate) fn contains_key(storage: &SqliteStorage, key: &Key) -> bool {
    match storage.contains(key.hash()) {
        Ok(found) => found,
        Err(e) => {
            warn!("Failed to probe memory ({}): {}", key, e);
            false
        }
    }
}
