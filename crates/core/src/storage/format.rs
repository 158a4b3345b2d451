use crate::errors::CoreError;

use super::encryption::{KdfParams, NONCE_LEN, SALT_LEN};

/// Magic bytes of an encrypted value.
pub const VALUE_MAGIC: &[u8; 4] = b"STKV";

/// Magic bytes of the key entry (KDF params, salt and password verifier).
pub const KEY_MAGIC: &[u8; 4] = b"STKK";

pub const CURRENT_VERSION: u16 = 1;

/// magic(4) + version(2) + nonce(12)
pub const VALUE_HEADER_SIZE: usize = 4 + 2 + NONCE_LEN;

/// magic(4) + version(2) + kdf_params(12) + salt(16) + nonce(12)
pub const KEY_HEADER_SIZE: usize = 4 + 2 + 12 + SALT_LEN + NONCE_LEN;

/// Encrypted value as stored in the inner store.
///
/// ```text
/// [STKV: 4B] [version: 2B LE] [nonce: 12B] [ciphertext + tag: variable]
/// ```
#[derive(Debug)]
pub struct SealedValue<'a> {
    pub version: u16,
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: &'a [u8],
}

/// Key entry written once when an encrypted store is first opened.
///
/// ```text
/// [STKK: 4B] [version: 2B LE] [memory_cost: 4B LE] [time_cost: 4B LE]
/// [parallelism: 4B LE] [salt: 16B] [nonce: 12B] [verifier ciphertext: variable]
/// ```
#[derive(Debug)]
pub struct KeyEntry<'a> {
    pub version: u16,
    pub kdf_params: KdfParams,
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    pub verifier: &'a [u8],
}

pub fn write_value(nonce: &[u8; NONCE_LEN], ciphertext: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(VALUE_HEADER_SIZE + ciphertext.len());
    buf.extend_from_slice(VALUE_MAGIC);
    buf.extend_from_slice(&CURRENT_VERSION.to_le_bytes());
    buf.extend_from_slice(nonce);
    buf.extend_from_slice(ciphertext);
    buf
}

pub fn read_value(data: &[u8]) -> Result<SealedValue<'_>, CoreError> {
    if data.len() < VALUE_HEADER_SIZE {
        return Err(CoreError::InvalidStoredValue(
            "Value too small to be encrypted data".into(),
        ));
    }
    if &data[0..4] != VALUE_MAGIC {
        return Err(CoreError::InvalidStoredValue(
            "Invalid magic bytes: value is not encrypted".into(),
        ));
    }
    let version = read_version(data)?;
    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(&data[6..6 + NONCE_LEN]);

    Ok(SealedValue {
        version,
        nonce,
        ciphertext: &data[VALUE_HEADER_SIZE..],
    })
}

pub fn write_key_entry(
    kdf_params: &KdfParams,
    salt: &[u8; SALT_LEN],
    nonce: &[u8; NONCE_LEN],
    verifier: &[u8],
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(KEY_HEADER_SIZE + verifier.len());
    buf.extend_from_slice(KEY_MAGIC);
    buf.extend_from_slice(&CURRENT_VERSION.to_le_bytes());
    buf.extend_from_slice(&kdf_params.memory_cost.to_le_bytes());
    buf.extend_from_slice(&kdf_params.time_cost.to_le_bytes());
    buf.extend_from_slice(&kdf_params.parallelism.to_le_bytes());
    buf.extend_from_slice(salt);
    buf.extend_from_slice(nonce);
    buf.extend_from_slice(verifier);
    buf
}

pub fn read_key_entry(data: &[u8]) -> Result<KeyEntry<'_>, CoreError> {
    if data.len() < KEY_HEADER_SIZE {
        return Err(CoreError::InvalidStoredValue(
            "Key entry too small".into(),
        ));
    }
    if &data[0..4] != KEY_MAGIC {
        return Err(CoreError::InvalidStoredValue(
            "Invalid magic bytes in key entry".into(),
        ));
    }
    let version = read_version(data)?;

    let kdf_params = KdfParams {
        memory_cost: read_u32(data, 6)?,
        time_cost: read_u32(data, 10)?,
        parallelism: read_u32(data, 14)?,
    };
    // Crafted params could make key derivation exhaust memory.
    kdf_params.validate()?;

    let mut offset = 18;
    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(&data[offset..offset + SALT_LEN]);
    offset += SALT_LEN;

    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(&data[offset..offset + NONCE_LEN]);
    offset += NONCE_LEN;

    Ok(KeyEntry {
        version,
        kdf_params,
        salt,
        nonce,
        verifier: &data[offset..],
    })
}

fn read_version(data: &[u8]) -> Result<u16, CoreError> {
    let version = u16::from_le_bytes([data[4], data[5]]);
    if version == 0 || version > CURRENT_VERSION {
        return Err(CoreError::UnsupportedVersion(version));
    }
    Ok(version)
}

fn read_u32(data: &[u8], offset: usize) -> Result<u32, CoreError> {
    let bytes: [u8; 4] = data[offset..offset + 4]
        .try_into()
        .map_err(|_| CoreError::InvalidStoredValue(format!("Truncated field at byte {offset}")))?;
    Ok(u32::from_le_bytes(bytes))
}
