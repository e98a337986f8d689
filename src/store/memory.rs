//! Read-write store and the [`MemoryWrite`] trait

use std::path::Path;

use bytes::Bytes;
use tracing::warn;

use super::entry::Entry;
use super::reader::{contains_key, read_value, MemoryRead, MemoryReader};
use super::value::Value;
use crate::error::{Error, Result};
use crate::key::Key;
use crate::storage::SqliteStorage;

/// A positional argument to [`MemoryWrite::set`]
///
/// `set` takes a flattened alternating key/value sequence, so each argument
/// must be able to carry either a key kind or a value kind. Key positions
/// accept int, float, text, and bytes; value positions accept everything
/// except bytes.
#[derive(Debug, Clone)]
pub enum Arg {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Bytes(Bytes),
    Json(serde_json::Value),
}

impl Arg {
    fn kind(&self) -> &'static str {
        match self {
            Arg::Int(_) => "int",
            Arg::Float(_) => "float",
            Arg::Bool(_) => "bool",
            Arg::Text(_) => "text",
            Arg::Bytes(_) => "bytes",
            Arg::Json(_) => "json",
        }
    }
}

impl From<i64> for Arg {
    fn from(i: i64) -> Self {
        Arg::Int(i)
    }
}

impl From<i32> for Arg {
    fn from(i: i32) -> Self {
        Arg::Int(i as i64)
    }
}

impl From<f64> for Arg {
    fn from(f: f64) -> Self {
        Arg::Float(f)
    }
}

impl From<bool> for Arg {
    fn from(b: bool) -> Self {
        Arg::Bool(b)
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::Text(s.to_string())
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Arg::Text(s)
    }
}

impl From<Bytes> for Arg {
    fn from(b: Bytes) -> Self {
        Arg::Bytes(b)
    }
}

impl From<serde_json::Value> for Arg {
    fn from(v: serde_json::Value) -> Self {
        Arg::Json(v)
    }
}

impl TryFrom<Arg> for Key {
    type Error = Error;

    fn try_from(arg: Arg) -> Result<Key> {
        match arg {
            Arg::Int(i) => Ok(Key::Int(i)),
            Arg::Float(f) => Ok(Key::Float(f)),
            Arg::Text(s) => Ok(Key::Text(s)),
            Arg::Bytes(b) => Ok(Key::Bytes(b)),
            other => Err(Error::InvalidKeyType(other.kind())),
        }
    }
}

impl TryFrom<Arg> for Value {
    type Error = Error;

    fn try_from(arg: Arg) -> Result<Value> {
        match arg {
            Arg::Int(i) => Ok(Value::Int(i)),
            Arg::Float(f) => Ok(Value::Float(f)),
            Arg::Bool(b) => Ok(Value::Bool(b)),
            Arg::Text(s) => Ok(Value::String(s)),
            Arg::Json(v) => Ok(Value::Json(v)),
            Arg::Bytes(_) => Err(Error::UnsupportedValue("bytes")),
        }
    }
}

/// Write operations, extending [`MemoryRead`]
pub trait MemoryWrite: MemoryRead {
    /// Store each (key, value) pair of a flattened argument list
    ///
    /// Fails up front with [`Error::OddArgumentCount`] before anything is
    /// written, and with [`Error::InvalidKeyType`] when a key position
    /// holds a non-key kind. A pair whose encode or write fails is logged
    /// and skipped; later pairs in the same call are still attempted, and
    /// every successful pair is durably committed on its own.
    fn set(&self, args: Vec<Arg>) -> Result<()>;

    /// Remove the value under `key`; no-op when absent
    fn delete(&self, key: &Key) -> Result<()>;

    /// Remove every value. Irreversible.
    fn clear(&self) -> Result<()>;

    /// Hook invoked by the hosting runtime when a flow step hands control
    /// onward. Does nothing by default; implementations may override it to
    /// publish side effects at the handoff point.
    fn on_continue(&mut self) {}
}

/// A read-write handle to a memory store
///
/// Extends the reader capability with writes: everything in [`MemoryRead`]
/// plus [`MemoryWrite`]. Pass [`MemoryStore::as_read`] where only read
/// access should be granted.
pub struct MemoryStore {
    reader: MemoryReader,
}

impl MemoryStore {
    /// Open an existing store read-write
    ///
    /// The file must already exist and contain the `memory` table; see
    /// [`MemoryStore::create`] for bootstrapping a new store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(MemoryStore {
            reader: MemoryReader::with_storage(SqliteStorage::open(path)?),
        })
    }

    /// Create the store file and schema if missing, then open read-write
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Ok(MemoryStore {
            reader: MemoryReader::with_storage(SqliteStorage::create(path)?),
        })
    }

    /// Read-only view of this handle
    pub fn as_read(&self) -> &dyn MemoryRead {
        self
    }

    /// Stamp the identity of the flow step about to use this handle
    pub fn set_current_identity(&mut self, id: impl Into<String>) {
        self.reader.set_current_identity(id);
    }

    /// Close the underlying connection
    pub fn close(self) -> Result<()> {
        self.reader.into_storage().close()
    }

    fn set_pair(&self, key: &Key, arg: Arg) -> Result<()> {
        let value = Value::try_from(arg)?;
        let (payload, tag) = value.encode()?;
        self.reader
            .storage()
            .upsert(&Entry::new(key.hash(), payload, tag))
    }
}

impl MemoryRead for MemoryStore {
    fn get(&self, key: &Key) -> Option<Value> {
        read_value(self.reader.storage(), key)
    }

    fn exists(&self, key: &Key) -> bool {
        contains_key(self.reader.storage(), key)
    }

    fn current_identity(&self) -> &str {
        self.reader.current_identity()
    }
}

impl MemoryWrite for MemoryStore {
    fn set(&self, args: Vec<Arg>) -> Result<()> {
        if args.len() % 2 != 0 {
            return Err(Error::OddArgumentCount(args.len()));
        }

        let mut args = args.into_iter();
        while let (Some(key_arg), Some(value_arg)) = (args.next(), args.next()) {
            let key = Key::try_from(key_arg)?;
            // A failing pair is reported and skipped; later pairs still run
            if let Err(e) = self.set_pair(&key, value_arg) {
                warn!("Failed to set memory ({}): {}", key, e);
            }
        }
        Ok(())
    }

    fn delete(&self, key: &Key) -> Result<()> {
        self.reader.storage().remove(key.hash())
    }

    fn clear(&self) -> Result<()> {
        self.reader.storage().remove_all()
    }
}

#[cfg(test)]
mod tests {
    use super::super::value::TypeTag;
    use super::*;
    use serde_json::json;
    use tempfile::{tempdir, TempDir};

    fn open_store() -> (TempDir, MemoryStore) {
        let dir = tempdir().unwrap();
        let store = MemoryStore::create(dir.path().join("mem.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_set_then_get() {
        let (_dir, store) = open_store();

        store.set(vec!["greeting".into(), "hello".into()]).unwrap();
        assert_eq!(store.get(&Key::from("greeting")), Some(Value::from("hello")));
    }

    #[test]
    fn test_last_write_wins() {
        let (_dir, store) = open_store();

        store.set(vec!["k".into(), 1.into()]).unwrap();
        store.set(vec!["k".into(), 2.into()]).unwrap();
        assert_eq!(store.get(&Key::from("k")), Some(Value::Int(2)));
    }

    #[test]
    fn test_get_preserves_value_type() {
        let (_dir, store) = open_store();

        store.set(vec!["n".into(), 7.into()]).unwrap();
        store.set(vec!["f".into(), 2.5.into()]).unwrap();
        store.set(vec!["flag".into(), true.into()]).unwrap();
        store.set(vec!["doc".into(), json!({"a": [1, 2]}).into()]).unwrap();

        assert_eq!(store.get(&Key::from("n")), Some(Value::Int(7)));
        assert_eq!(store.get(&Key::from("f")), Some(Value::Float(2.5)));
        assert_eq!(store.get(&Key::from("flag")), Some(Value::Bool(true)));
        assert_eq!(
            store.get(&Key::from("doc")),
            Some(Value::Json(json!({"a": [1, 2]})))
        );
    }

    #[test]
    fn test_get_missing_key_is_none() {
        let (_dir, store) = open_store();
        assert_eq!(store.get(&Key::from("nothing")), None);
    }

    #[test]
    fn test_exists_lifecycle() {
        let (_dir, store) = open_store();
        let key = Key::from("k");

        assert!(!store.exists(&key));
        store.set(vec!["k".into(), 1.into()]).unwrap();
        assert!(store.exists(&key));
        store.delete(&key).unwrap();
        assert!(!store.exists(&key));
    }

    #[test]
    fn test_delete_absent_key_is_ok() {
        let (_dir, store) = open_store();
        store.delete(&Key::from("never-set")).unwrap();
    }

    #[test]
    fn test_clear_removes_everything() {
        let (_dir, store) = open_store();

        store.set(vec!["a".into(), 1.into(), "b".into(), 2.into()]).unwrap();
        store.clear().unwrap();

        assert!(!store.exists(&Key::from("a")));
        assert!(!store.exists(&Key::from("b")));
    }

    #[test]
    fn test_odd_argument_count_commits_nothing() {
        let (_dir, store) = open_store();

        let result = store.set(vec!["a".into(), 1.into(), "b".into()]);
        assert!(matches!(result, Err(Error::OddArgumentCount(3))));
        assert!(!store.exists(&Key::from("a")));
    }

    #[test]
    fn test_non_key_kind_in_key_position() {
        let (_dir, store) = open_store();

        let result = store.set(vec![true.into(), 1.into()]);
        assert!(matches!(result, Err(Error::InvalidKeyType("bool"))));

        let result = store.set(vec![json!({}).into(), 1.into()]);
        assert!(matches!(result, Err(Error::InvalidKeyType("json"))));
    }

    #[test]
    fn test_failing_pair_does_not_halt_batch() {
        let (_dir, store) = open_store();

        // Bytes cannot be stored as a value; the pair is skipped, the rest land
        store
            .set(vec![
                "bad".into(),
                Arg::Bytes(Bytes::from_static(b"\xff")),
                "good".into(),
                2.into(),
            ])
            .unwrap();

        assert!(!store.exists(&Key::from("bad")));
        assert_eq!(store.get(&Key::from("good")), Some(Value::Int(2)));
    }

    #[test]
    fn test_non_text_keys() {
        let (_dir, store) = open_store();

        store.set(vec![7.into(), "seven".into()]).unwrap();
        store.set(vec![2.5.into(), "two and a half".into()]).unwrap();

        assert_eq!(store.get(&Key::from(7)), Some(Value::from("seven")));
        assert_eq!(store.get(&Key::from(2.5)), Some(Value::from("two and a half")));
    }

    #[test]
    fn test_undecodable_row_reads_as_none() {
        let (_dir, store) = open_store();

        // Simulate a corrupt payload written behind the codec's back
        let key = Key::from("broken");
        store
            .reader
            .storage()
            .upsert(&Entry::new(key.hash(), "not-json", TypeTag::Int))
            .unwrap();

        assert_eq!(store.get(&key), None);
        // The row itself is still there
        assert!(store.exists(&key));
    }

    #[test]
    fn test_current_identity_seam() {
        let (_dir, mut store) = open_store();

        assert_eq!(store.current_identity(), "");
        store.set_current_identity("step-42");
        assert_eq!(store.current_identity(), "step-42");
    }

    #[test]
    fn test_reader_sees_writer_data() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mem.db");

        let store = MemoryStore::create(&path).unwrap();
        store.set(vec!["shared".into(), 11.into()]).unwrap();
        store.close().unwrap();

        let reader = MemoryReader::open(&path).unwrap();
        assert_eq!(reader.get(&Key::from("shared")), Some(Value::Int(11)));
        assert!(reader.exists(&Key::from("shared")));
    }

    #[test]
    fn test_default_handoff_hook_is_a_no_op() {
        let (_dir, mut store) = open_store();

        store.set(vec!["k".into(), 1.into()]).unwrap();
        store.on_continue();
        assert_eq!(store.get(&Key::from("k")), Some(Value::Int(1)));
    }

    #[test]
    fn test_open_requires_existing_store() {
        let dir = tempdir().unwrap();
        let result = MemoryStore::open(dir.path().join("absent.db"));
        assert!(matches!(result, Err(Error::StorageUnavailable { .. })));
    }

    #[test]
    fn test_scenario_script() {
        let (_dir, store) = open_store();

        store.set(vec!["a".into(), 1.into(), "b".into(), "x".into()]).unwrap();
        assert_eq!(store.get(&Key::from("a")), Some(Value::Int(1)));
        assert_eq!(store.get(&Key::from("b")), Some(Value::from("x")));
        assert!(!store.exists(&Key::from("c")));

        store.delete(&Key::from("a")).unwrap();
        assert!(!store.exists(&Key::from("a")));
        assert_eq!(store.get(&Key::from("a")), None);
    }
}
