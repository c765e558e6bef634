//! # Storage Layer
//!
//! Persistence is a plain key/value medium ([`KvBackend`]) holding one JSON
//! document per logical collection. [`Store`] sits on top of it and owns the
//! failure policy: the medium is never allowed to crash the catalog.
//!
//! - A read that fails, or a value that does not parse, is logged and treated
//!   as absent. The caller's default is returned.
//! - Collections read through [`Store::load_records`] are decoded one record at
//!   a time. A record that does not parse is logged and skipped; its siblings
//!   survive.
//! - A write that fails is logged and dropped. The in-memory catalog remains
//!   the source of truth; the next persist cycle writes the full snapshot again.
//!
//! ## Implementations
//!
//! - [`fs_backend::FsBackend`]: one `<key>.json` file per collection, atomic writes
//! - [`mem_backend::MemBackend`]: in-memory, with write-failure simulation for tests
//!
//! ## Coalesced writes
//!
//! [`debounce::Debouncer`] tracks which keys have a pending write and when
//! it falls due. It never holds payloads: when a key is flushed, the current
//! in-memory value is serialized, so a delayed write can only ever be newer,
//! never staler, than what readers already see.

use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod backend;
pub mod debounce;
pub mod fs_backend;
pub mod mem_backend;

pub use backend::KvBackend;

pub struct Store<B: KvBackend> {
    backend: B,
}

impl<B: KvBackend> Store<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Persisted value for `key`, or `default` when absent or unreadable.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.backend.get(key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(error) => {
                    tracing::warn!(key, error = %error, "discarding unparseable stored value");
                    default
                }
            },
            Ok(None) => default,
            Err(error) => {
                tracing::warn!(key, error = %error, "failed to read stored value");
                default
            }
        }
    }

    /// Records of the collection at `key`. Records that fail to decode are
    /// dropped individually. A value that is not an array reads as empty.
    pub fn load_records<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let raw: Vec<serde_json::Value> = self.load(key, Vec::new());
        raw.into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value(record) {
                Ok(value) => Some(value),
                Err(error) => {
                    tracing::warn!(key, index, error = %error, "dropping unreadable record");
                    None
                }
            })
            .collect()
    }

    /// Whether `key` holds a value. Read failures count as absent.
    pub fn contains(&self, key: &str) -> bool {
        matches!(self.backend.get(key), Ok(Some(_)))
    }

    /// Serialize and write `value`. Returns false when the write was dropped.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(error) => {
                tracing::warn!(key, error = %error, "failed to serialize value, write dropped");
                return false;
            }
        };
        match self.backend.set(key, &raw) {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(key, error = %error, "write dropped");
                false
            }
        }
    }

    pub fn remove(&self, key: &str) -> bool {
        match self.backend.remove(key) {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(key, error = %error, "failed to remove stored value");
                false
            }
        }
    }

    /// Remove every key. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let keys = match self.backend.keys() {
            Ok(keys) => keys,
            Err(error) => {
                tracing::warn!(error = %error, "failed to list stored keys");
                return 0;
            }
        };
        keys.iter().filter(|key| self.remove(key)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::mem_backend::MemBackend;
    use super::*;

    #[test]
    fn test_load_missing_returns_default() {
        let store = Store::new(MemBackend::new());
        let value: Vec<String> = store.load("apps", vec!["seed".to_string()]);
        assert_eq!(value, vec!["seed".to_string()]);
    }

    #[test]
    fn test_load_corrupt_returns_default() {
        let store = Store::new(MemBackend::new().with_value("apps", "{not json"));
        let value: Vec<String> = store.load("apps", Vec::new());
        assert!(value.is_empty());
    }

    #[test]
    fn test_load_records_skips_only_bad_records() {
        let store = Store::new(
            MemBackend::new().with_value("names", r#"["a", 7, "b", {"x": 1}, "c"]"#),
        );
        let value: Vec<String> = store.load_records("names");
        assert_eq!(value, vec!["a", "b", "c"]);

        let store = Store::new(MemBackend::new().with_value("names", r#"{"a": 1}"#));
        assert!(store.load_records::<String>("names").is_empty());
        assert!(store.load_records::<String>("missing").is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let store = Store::new(MemBackend::new());
        assert!(store.save("names", &vec!["a", "b"]));
        let value: Vec<String> = store.load("names", Vec::new());
        assert_eq!(value, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_save_failure_is_dropped_not_raised() {
        let store = Store::new(MemBackend::new());
        store.backend().set_simulate_write_error(true);
        assert!(!store.save("names", &vec!["a"]));
        assert!(!store.contains("names"));
    }

    #[test]
    fn test_clear_removes_all_keys() {
        let store = Store::new(MemBackend::new().with_value("a", "1").with_value("b", "2"));
        assert_eq!(store.clear(), 2);
        assert!(!store.contains("a"));
        assert!(!store.contains("b"));
    }
}
