//! Error types for the memory store

use std::path::PathBuf;

use thiserror::Error;

use crate::store::TypeTag;

/// Errors produced by store construction and operations
///
/// Construction-time integrity failures ([`Error::StorageUnavailable`]) are
/// hard errors for the caller to act on. Per-operation failures are mostly
/// absorbed close to where they occur; the variants below are what the
/// absorption points log and what the strict paths return.
#[derive(Debug, Error)]
pub enum Error {
    /// The store file is missing or does not contain the `memory` table
    #[error("memory store '{}' is unavailable: {reason}", .path.display())]
    StorageUnavailable { path: PathBuf, reason: String },

    /// Failure inside the SQLite engine
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// A value could not be serialized to its JSON payload
    #[error("cannot encode value: {0}")]
    Encode(#[from] serde_json::Error),

    /// A stored payload does not parse under its declared tag
    #[error("cannot decode payload as '{tag}': {source}")]
    Decode {
        tag: TypeTag,
        source: serde_json::Error,
    },

    /// A stored row carries a tag outside the five known ones
    #[error("unknown type tag '{0}'")]
    UnknownTag(String),

    /// A key-position argument of a kind that cannot address the store
    #[error("unsupported key type '{0}'")]
    InvalidKeyType(&'static str),

    /// A value-position argument of a kind the codec cannot store
    #[error("unsupported value type '{0}'")]
    UnsupportedValue(&'static str),

    /// `set` takes alternating key/value arguments, so an even count
    #[error("set requires an even number of arguments, got {0}")]
    OddArgumentCount(usize),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;
