//! Key derivation using Argon2id
//!
//! Derives 256-bit keys from low-entropy secrets using Argon2id,
//! a memory-hard key derivation function resistant to GPU/ASIC attacks.
//! Every caller supplies a fresh random salt, so identical secrets never
//! derive identical keys across calls.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::OsRng;
use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{MailsealError, MailsealResult};

/// Size of the random KDF salt in bytes
pub const SALT_SIZE: usize = 16;

/// Size of a derived key in bytes (AES-256)
pub const KEY_SIZE: usize = 32;

/// Encoded size of [`KdfParams`] inside envelopes and hashes
pub const PARAMS_SIZE: usize = 12;

/// Upper bounds accepted when reading parameters back from an envelope.
/// Anything larger is treated as a malformed envelope.
const MAX_MEMORY_COST: u32 = 1024 * 1024; // 1 GiB
const MAX_TIME_COST: u32 = 64;
const MAX_PARALLELISM: u32 = 16;

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB (default: 65536 = 64 MiB)
    pub memory_cost: u32,
    /// Time cost (iterations, default: 3)
    pub time_cost: u32,
    /// Parallelism degree (default: 4)
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_cost: 65536,
            time_cost: 3,
            parallelism: 4,
        }
    }
}

impl KdfParams {
    /// Create params with specific values, rejecting ones Argon2 or the
    /// envelope format cannot carry
    pub fn new(memory_cost: u32, time_cost: u32, parallelism: u32) -> MailsealResult<Self> {
        let params = Self {
            memory_cost,
            time_cost,
            parallelism,
        };
        params.validate()?;
        Ok(params)
    }

    /// Check the parameters against Argon2's limits and the envelope caps
    pub fn validate(&self) -> MailsealResult<()> {
        if self.memory_cost > MAX_MEMORY_COST
            || self.time_cost > MAX_TIME_COST
            || self.parallelism > MAX_PARALLELISM
        {
            return Err(MailsealError::Validation(format!(
                "KDF parameters exceed limits (memory <= {} KiB, time <= {}, lanes <= {})",
                MAX_MEMORY_COST, MAX_TIME_COST, MAX_PARALLELISM
            )));
        }

        self.argon2_params()
            .map(|_| ())
            .map_err(|e| MailsealError::Validation(format!("Invalid Argon2 parameters: {}", e)))
    }

    /// Serialize as three big-endian u32 values
    pub fn to_bytes(&self) -> [u8; PARAMS_SIZE] {
        let mut out = [0u8; PARAMS_SIZE];
        out[0..4].copy_from_slice(&self.memory_cost.to_be_bytes());
        out[4..8].copy_from_slice(&self.time_cost.to_be_bytes());
        out[8..12].copy_from_slice(&self.parallelism.to_be_bytes());
        out
    }

    /// Parse parameters written by [`KdfParams::to_bytes`].
    ///
    /// Returns `None` for values outside the accepted bounds so a forged
    /// header cannot make the caller allocate unbounded memory.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != PARAMS_SIZE {
            return None;
        }
        let read = |i: usize| u32::from_be_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
        let params = Self {
            memory_cost: read(0),
            time_cost: read(4),
            parallelism: read(8),
        };
        params.validate().ok().map(|_| params)
    }

    /// True if no cost dimension exceeds `ceiling`.
    ///
    /// Readers hold envelope and hash headers to their own configured
    /// cost, so a forged header cannot demand more memory or passes than
    /// the reader would spend on a new envelope.
    pub fn fits_within(&self, ceiling: &KdfParams) -> bool {
        self.memory_cost <= ceiling.memory_cost
            && self.time_cost <= ceiling.time_cost
            && self.parallelism <= ceiling.parallelism
    }

    fn argon2_params(&self) -> Result<Params, argon2::Error> {
        Params::new(
            self.memory_cost,
            self.time_cost,
            self.parallelism,
            Some(KEY_SIZE),
        )
    }
}

/// A derived encryption key, zeroed on drop
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_SIZE],
}

impl DerivedKey {
    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }
}

/// Generate a fresh random salt from the OS RNG
pub fn generate_salt() -> [u8; SALT_SIZE] {
    let mut salt = [0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Derive a 256-bit key from a secret and salt
pub fn derive_key(secret: &[u8], salt: &[u8], params: &KdfParams) -> MailsealResult<DerivedKey> {
    let argon2_params = params
        .argon2_params()
        .map_err(|e| MailsealError::Encryption(format!("Invalid Argon2 parameters: {}", e)))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut key = [0u8; KEY_SIZE];
    argon2
        .hash_password_into(secret, salt, &mut key)
        .map_err(|e| MailsealError::Encryption(format!("Key derivation failed: {}", e)))?;

    Ok(DerivedKey { key })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_params() -> KdfParams {
        KdfParams::new(1024, 1, 1).unwrap()
    }

    #[test]
    fn test_same_secret_and_salt_same_key() {
        let salt = generate_salt();
        let key1 = derive_key(b"shared-secret", &salt, &fast_params()).unwrap();
        let key2 = derive_key(b"shared-secret", &salt, &fast_params()).unwrap();
        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_secret_different_key() {
        let salt = generate_salt();
        let key1 = derive_key(b"secret1", &salt, &fast_params()).unwrap();
        let key2 = derive_key(b"secret2", &salt, &fast_params()).unwrap();
        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_salt_different_key() {
        let key1 = derive_key(b"same", &generate_salt(), &fast_params()).unwrap();
        let key2 = derive_key(b"same", &generate_salt(), &fast_params()).unwrap();
        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_params_byte_layout() {
        let params = KdfParams::new(2048, 2, 1).unwrap();
        let bytes = params.to_bytes();
        assert_eq!(&bytes[0..4], &2048u32.to_be_bytes());
        assert_eq!(KdfParams::from_bytes(&bytes), Some(params));
    }

    #[test]
    fn test_fits_within() {
        let ceiling = KdfParams::default();
        assert!(fast_params().fits_within(&ceiling));
        assert!(ceiling.fits_within(&ceiling));
        assert!(!ceiling.fits_within(&fast_params()));

        let more_lanes = KdfParams::new(1024, 1, 2).unwrap();
        assert!(!more_lanes.fits_within(&fast_params()));
    }

    #[test]
    fn test_from_bytes_rejects_oversized_memory() {
        let mut bytes = fast_params().to_bytes();
        bytes[0..4].copy_from_slice(&u32::MAX.to_be_bytes());
        assert_eq!(KdfParams::from_bytes(&bytes), None);
    }

    #[test]
    fn test_new_rejects_zero_time_cost() {
        let result = KdfParams::new(1024, 0, 1);
        assert!(matches!(result, Err(MailsealError::Validation(_))));
    }

    #[test]
    fn test_default_params_are_valid() {
        assert!(KdfParams::default().validate().is_ok());
    }
}
