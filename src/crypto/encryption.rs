//! AES-256-GCM envelope encryption
//!
//! Protects strings and structured data at rest with a secret-derived key.
//! Every call draws a fresh salt and IV, derives its own key with Argon2id,
//! and packs everything decryption needs into one self-contained string:
//!
//! ```text
//! version(1) | kdf params(12) | salt(16) | iv(12) | tag(16) | ciphertext
//! ```
//!
//! The version byte and KDF parameters are authenticated as associated data.
//! The whole envelope is base64 encoded.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{AeadInPlace, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce, Tag};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{MailsealError, MailsealResult};

use super::key_derivation::{derive_key, generate_salt, KdfParams, PARAMS_SIZE, SALT_SIZE};

/// Current envelope format version
pub const ENVELOPE_VERSION: u8 = 1;

/// Size of the AES-GCM nonce in bytes (96 bits)
pub const IV_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes
pub const TAG_SIZE: usize = 16;

const HEADER_SIZE: usize = 1 + PARAMS_SIZE;
const SALT_OFFSET: usize = HEADER_SIZE;
const IV_OFFSET: usize = SALT_OFFSET + SALT_SIZE;
const TAG_OFFSET: usize = IV_OFFSET + IV_SIZE;
const CIPHERTEXT_OFFSET: usize = TAG_OFFSET + TAG_SIZE;

/// Smallest possible envelope: all fixed fields and an empty ciphertext
pub const MIN_ENVELOPE_SIZE: usize = CIPHERTEXT_OFFSET;

/// Authenticated symmetric encryption bound to a set of KDF parameters.
///
/// The parameters set the cost of new envelopes and cap what decryption
/// will accept: an envelope header asking for more memory, passes or lanes
/// than the cipher's own parameters is rejected before any key derivation.
/// Envelopes written at a lower cost stay readable after the configured
/// cost is raised.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymmetricCipher {
    params: KdfParams,
}

impl SymmetricCipher {
    /// Create a cipher that writes envelopes with the given KDF cost
    pub fn new(params: KdfParams) -> Self {
        Self { params }
    }

    /// KDF parameters used for new envelopes
    pub fn params(&self) -> &KdfParams {
        &self.params
    }

    /// Encrypt a string into a base64 envelope
    pub fn encrypt(&self, plaintext: &str, secret: &str) -> MailsealResult<String> {
        self.encrypt_bytes(plaintext.as_bytes(), secret)
    }

    /// Decrypt an envelope produced by [`SymmetricCipher::encrypt`]
    pub fn decrypt(&self, envelope: &str, secret: &str) -> MailsealResult<String> {
        let plaintext = self.decrypt_bytes(envelope, secret)?;
        String::from_utf8(plaintext).map_err(|_| MailsealError::Decryption)
    }

    /// Serialize a value to JSON and encrypt it
    pub fn encrypt_json<T: Serialize>(&self, value: &T, secret: &str) -> MailsealResult<String> {
        let json = serde_json::to_vec(value)?;
        self.encrypt_bytes(&json, secret)
    }

    /// Decrypt an envelope and deserialize the JSON inside
    pub fn decrypt_json<T: DeserializeOwned>(&self, envelope: &str, secret: &str) -> MailsealResult<T> {
        let json = self.decrypt_bytes(envelope, secret)?;
        Ok(serde_json::from_slice(&json)?)
    }

    /// Encrypt raw bytes into a base64 envelope
    pub fn encrypt_bytes(&self, plaintext: &[u8], secret: &str) -> MailsealResult<String> {
        let salt = generate_salt();
        let mut iv = [0u8; IV_SIZE];
        OsRng.fill_bytes(&mut iv);

        let key = derive_key(secret.as_bytes(), &salt, &self.params)?;
        let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
            .map_err(|e| MailsealError::Encryption(format!("Failed to create cipher: {}", e)))?;

        let mut header = [0u8; HEADER_SIZE];
        header[0] = ENVELOPE_VERSION;
        header[1..].copy_from_slice(&self.params.to_bytes());

        let mut buffer = plaintext.to_vec();
        let tag = cipher
            .encrypt_in_place_detached(Nonce::from_slice(&iv), &header, &mut buffer)
            .map_err(|e| MailsealError::Encryption(format!("Encryption failed: {}", e)))?;

        let mut envelope = Vec::with_capacity(MIN_ENVELOPE_SIZE + buffer.len());
        envelope.extend_from_slice(&header);
        envelope.extend_from_slice(&salt);
        envelope.extend_from_slice(&iv);
        envelope.extend_from_slice(tag.as_slice());
        envelope.extend_from_slice(&buffer);

        debug!(bytes = plaintext.len(), "sealed symmetric envelope");
        Ok(STANDARD.encode(envelope))
    }

    /// Decrypt a base64 envelope back to raw bytes.
    ///
    /// Every failure, whether malformed input, an unknown version, a wrong
    /// secret or a tampered byte, maps to [`MailsealError::Decryption`].
    pub fn decrypt_bytes(&self, envelope: &str, secret: &str) -> MailsealResult<Vec<u8>> {
        let result = open_envelope(envelope, secret, &self.params);
        if result.is_err() {
            debug!("symmetric envelope rejected");
        }
        result
    }
}

fn open_envelope(envelope: &str, secret: &str, ceiling: &KdfParams) -> MailsealResult<Vec<u8>> {
    let raw = STANDARD
        .decode(envelope.trim())
        .map_err(|_| MailsealError::Decryption)?;

    if raw.len() < MIN_ENVELOPE_SIZE || raw[0] != ENVELOPE_VERSION {
        return Err(MailsealError::Decryption);
    }

    let header = &raw[..HEADER_SIZE];
    let params = KdfParams::from_bytes(&header[1..])
        .filter(|params| params.fits_within(ceiling))
        .ok_or(MailsealError::Decryption)?;
    let salt = &raw[SALT_OFFSET..IV_OFFSET];
    let iv = &raw[IV_OFFSET..TAG_OFFSET];
    let tag = Tag::from_slice(&raw[TAG_OFFSET..CIPHERTEXT_OFFSET]);

    let key = derive_key(secret.as_bytes(), salt, &params).map_err(|_| MailsealError::Decryption)?;
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| MailsealError::Decryption)?;

    let mut buffer = raw[CIPHERTEXT_OFFSET..].to_vec();
    cipher
        .decrypt_in_place_detached(Nonce::from_slice(iv), header, &mut buffer, tag)
        .map_err(|_| MailsealError::Decryption)?;

    Ok(buffer)
}
