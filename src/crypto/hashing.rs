//! Salted one-way hashing and random tokens
//!
//! `hash` uses the same fresh-salt + Argon2id pattern as the envelope
//! cipher but keeps only the digest. The output is hex:
//!
//! ```text
//! version(1) | kdf params(12) | salt(16) | digest(32)
//! ```

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::OsRng;
use subtle::ConstantTimeEq;

use crate::error::{MailsealError, MailsealResult};

use super::key_derivation::{derive_key, generate_salt, KdfParams, KEY_SIZE, PARAMS_SIZE, SALT_SIZE};

/// Current hash format version
pub const HASH_VERSION: u8 = 1;

const SALT_OFFSET: usize = 1 + PARAMS_SIZE;
const DIGEST_OFFSET: usize = SALT_OFFSET + SALT_SIZE;
const HASH_SIZE: usize = DIGEST_OFFSET + KEY_SIZE;

/// Hash `data` with a fresh random salt
pub fn hash(data: &str, params: &KdfParams) -> MailsealResult<String> {
    let salt = generate_salt();
    let digest = derive_key(data.as_bytes(), &salt, params)?;

    let mut out = Vec::with_capacity(HASH_SIZE);
    out.push(HASH_VERSION);
    out.extend_from_slice(&params.to_bytes());
    out.extend_from_slice(&salt);
    out.extend_from_slice(digest.as_bytes());

    Ok(hex::encode(out))
}

/// Check `data` against a hash produced by [`hash`].
///
/// Malformed or foreign hashes return `false`, as do hashes whose stored
/// cost exceeds `ceiling`. The digest comparison is constant-time.
pub fn verify_hash(data: &str, stored_hash: &str, ceiling: &KdfParams) -> bool {
    let Ok(raw) = hex::decode(stored_hash.trim()) else {
        return false;
    };
    if raw.len() != HASH_SIZE || raw[0] != HASH_VERSION {
        return false;
    }
    let params = match KdfParams::from_bytes(&raw[1..SALT_OFFSET]) {
        Some(params) if params.fits_within(ceiling) => params,
        _ => return false,
    };

    let salt = &raw[SALT_OFFSET..DIGEST_OFFSET];
    let Ok(digest) = derive_key(data.as_bytes(), salt, &params) else {
        return false;
    };

    bool::from(digest.as_bytes().as_slice().ct_eq(&raw[DIGEST_OFFSET..]))
}

/// Generate `length` random bytes from the OS RNG, hex-encoded
pub fn generate_token(length: usize) -> MailsealResult<String> {
    if length == 0 {
        return Err(MailsealError::Validation(
            "Token length must be at least 1 byte".to_string(),
        ));
    }

    let mut bytes = vec![0u8; length];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| MailsealError::Encryption(format!("Random source unavailable: {}", e)))?;

    Ok(hex::encode(bytes))
}
