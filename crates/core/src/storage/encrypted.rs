use log::debug;

use crate::errors::CoreError;

use super::encryption::{self, KdfParams, KEY_LEN, SALT_LEN};
use super::format;
use super::traits::KeyValueStore;

/// Inner-store key holding the KDF parameters, salt and password verifier.
pub const KEY_ENTRY: &str = "stack_encryption_key";

const VERIFIER_PLAINTEXT: &[u8] = b"stack-tracker-key-check";

/// Wraps a store so that every value is sealed with AES-256-GCM.
///
/// The key is derived once per open from the password (Argon2id). The first
/// open writes a key entry; later opens check the password against it and
/// fail with [`CoreError::Decryption`] instead of handing back a store whose
/// values would all look corrupt.
pub struct EncryptedStore<S> {
    inner: S,
    key: [u8; KEY_LEN],
}

impl<S: KeyValueStore> EncryptedStore<S> {
    pub fn open(inner: S, password: &str) -> Result<Self, CoreError> {
        Self::open_with_params(inner, password, KdfParams::default())
    }

    /// Open with explicit KDF parameters. They only apply when the key entry
    /// is created; an existing entry keeps its own parameters.
    pub fn open_with_params(
        mut inner: S,
        password: &str,
        params: KdfParams,
    ) -> Result<Self, CoreError> {
        if password.is_empty() {
            return Err(CoreError::ValidationError("Password must not be empty".into()));
        }

        let key = match inner.get(KEY_ENTRY)? {
            Some(bytes) => {
                let entry = format::read_key_entry(&bytes)?;
                let key = encryption::derive_key(password, &entry.salt, &entry.kdf_params)?;
                let check = encryption::open(entry.verifier, &key, &entry.nonce)?;
                if check != VERIFIER_PLAINTEXT {
                    return Err(CoreError::Decryption);
                }
                key
            }
            None => {
                params.validate()?;
                let salt = encryption::random_bytes::<SALT_LEN>()?;
                let key = encryption::derive_key(password, &salt, &params)?;
                let (nonce, verifier) = encryption::seal(VERIFIER_PLAINTEXT, &key)?;
                inner.set(
                    KEY_ENTRY,
                    &format::write_key_entry(&params, &salt, &nonce, &verifier),
                )?;
                debug!("created encryption key entry");
                key
            }
        };

        Ok(Self { inner, key })
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: KeyValueStore> KeyValueStore for EncryptedStore<S> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CoreError> {
        let Some(bytes) = self.inner.get(key)? else {
            return Ok(None);
        };
        let sealed = format::read_value(&bytes)?;
        encryption::open(sealed.ciphertext, &self.key, &sealed.nonce).map(Some)
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), CoreError> {
        if key == KEY_ENTRY {
            return Err(CoreError::Storage(format!("'{KEY_ENTRY}' is reserved")));
        }
        let (nonce, ciphertext) = encryption::seal(value, &self.key)?;
        self.inner.set(key, &format::write_value(&nonce, &ciphertext))
    }

    fn exists(&self, key: &str) -> Result<bool, CoreError> {
        self.inner.exists(key)
    }
}
