//! Salted, memory-hard hashing shared by password storage and refresh-token storage.
//!
//! Stored values are encoded as `hex(salt):hex(derived_key)`.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::{rngs::OsRng, RngCore};
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::config::Config;

pub const SALT_LEN: usize = 16;
pub const DERIVED_KEY_LEN: usize = 64;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("stored hash is malformed")]
    Malformed,
    #[error("invalid hashing parameters: {0}")]
    InvalidParams(argon2::Error),
    #[error("key derivation failed: {0}")]
    Derivation(argon2::Error),
}

/// Argon2id key derivation with a fixed 64-byte output.
///
/// The cost parameters are not part of the stored encoding, so every hash must
/// be verified with the same memory and iteration settings it was created with.
#[derive(Debug, Clone)]
pub struct SecretHasher {
    params: Params,
}

impl SecretHasher {
    pub fn new(memory_kib: u32, iterations: u32) -> Result<Self, HashError> {
        let params = Params::new(memory_kib, iterations, 1, Some(DERIVED_KEY_LEN))
            .map_err(HashError::InvalidParams)?;
        Ok(Self { params })
    }

    pub fn from_config(config: &Config) -> Result<Self, HashError> {
        Self::new(config.password_hash_memory_kib, config.password_hash_iterations)
    }

    pub fn hash(&self, secret: &str) -> Result<String, HashError> {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        let key = self.derive(secret.as_bytes(), &salt)?;
        Ok(format!("{}:{}", hex::encode(salt), hex::encode(key)))
    }

    /// Returns `Ok(false)` on mismatch and `Err(HashError::Malformed)` when the
    /// stored value cannot be decoded.
    pub fn verify(&self, candidate: &str, stored: &str) -> Result<bool, HashError> {
        let (salt, expected) = decode_stored(stored)?;
        let actual = self.derive(candidate.as_bytes(), &salt)?;
        Ok(actual.as_slice().ct_eq(expected.as_slice()).into())
    }

    fn derive(&self, secret: &[u8], salt: &[u8]) -> Result<[u8; DERIVED_KEY_LEN], HashError> {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());
        let mut out = [0u8; DERIVED_KEY_LEN];
        argon2
            .hash_password_into(secret, salt, &mut out)
            .map_err(HashError::Derivation)?;
        Ok(out)
    }
}

fn decode_stored(stored: &str) -> Result<(Vec<u8>, Vec<u8>), HashError> {
    let (salt_hex, key_hex) = stored.split_once(':').ok_or(HashError::Malformed)?;
    let salt = hex::decode(salt_hex).map_err(|_| HashError::Malformed)?;
    let key = hex::decode(key_hex).map_err(|_| HashError::Malformed)?;
    if salt.len() < SALT_LEN || key.len() != DERIVED_KEY_LEN {
        return Err(HashError::Malformed);
    }
    Ok((salt, key))
}
