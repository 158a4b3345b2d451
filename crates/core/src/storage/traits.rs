use crate::errors::CoreError;

/// Abstraction over the device-local persistence medium.
///
/// Values are opaque bytes; callers decide the encoding (JSON for holdings
/// and settings). Implementations: [`MemoryStore`](super::memory::MemoryStore),
/// [`FileStore`](super::file::FileStore) and the
/// [`EncryptedStore`](super::encrypted::EncryptedStore) wrapper.
pub trait KeyValueStore {
    /// Value stored under `key`, or `None` if the key was never written.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CoreError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), CoreError>;

    fn exists(&self, key: &str) -> Result<bool, CoreError> {
        Ok(self.get(key)?.is_some())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), CoreError> {
        (**self).set(key, value)
    }

    fn exists(&self, key: &str) -> Result<bool, CoreError> {
        (**self).exists(key)
    }
}
