//! MemStore - a typed key-value memory store over SQLite
//!
//! MemStore saves and retrieves scalar and structured values addressed by
//! arbitrary application keys, on top of a single `memory` table:
//! - Keys are normalized by hashing to a fixed-width identifier
//! - Values are stored as JSON payloads tagged with their original type
//! - Read-only access ([`MemoryReader`]) is separated from read-write
//!   access ([`MemoryStore`], which extends the reader's capability set)

pub mod error;
pub mod key;
pub mod storage;
pub mod store;

/// Re-export commonly used types
pub use error::{Error, Result};
pub use key::Key;
pub use store::{Arg, Entry, MemoryRead, MemoryReader, MemoryStore, MemoryWrite, TypeTag, Value};
