//! Custom error types for mailseal
//!
//! This module defines the error hierarchy for the library using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for mailseal operations
#[derive(Error, Debug)]
pub enum MailsealError {
    /// Key pair creation failed in the underlying primitive
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    /// Malformed or unparseable key material
    #[error("Invalid key material: {0}")]
    KeyParse(String),

    /// The passphrase does not unlock the private key
    #[error("Passphrase does not unlock the private key")]
    KeyUnlock,

    /// Cipher or KDF error while encrypting
    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// Tag mismatch, malformed input, wrong secret or cipher error.
    ///
    /// Carries no detail so callers cannot learn which field failed.
    #[error("Decryption failed")]
    Decryption,

    /// Caller-supplied input rejected before any crypto ran
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),
}

impl MailsealError {
    /// True for every failure raised by a cryptographic operation
    pub fn is_crypto_failure(&self) -> bool {
        matches!(
            self,
            Self::KeyGeneration(_)
                | Self::KeyParse(_)
                | Self::KeyUnlock
                | Self::Encryption(_)
                | Self::Decryption
        )
    }

    /// Check if the caller should re-prompt for a passphrase
    pub fn is_key_unlock(&self) -> bool {
        matches!(self, Self::KeyUnlock)
    }

    /// Check if this is a decryption failure
    pub fn is_decryption(&self) -> bool {
        matches!(self, Self::Decryption)
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for MailsealError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for MailsealError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for mailseal operations
pub type MailsealResult<T> = Result<T, MailsealError>;
