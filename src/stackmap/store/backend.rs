use crate::error::Result;

/// Raw key/value medium underneath [`super::Store`].
///
/// Values are whole JSON documents, one per logical collection. Methods take
/// `&self`; implementations handle their own interior mutability.
pub trait KvBackend {
    /// Read the raw value for `key`. `Ok(None)` when the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value for `key`. Must not leave a partial value behind.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Every key currently present, sorted.
    fn keys(&self) -> Result<Vec<String>>;
}
