//! OpenPGP end-to-end encryption for messages and attachments.
//!
//! This module handles:
//! - Key pair generation (Ed25519/Curve25519 or RSA-3072), passphrase protected
//! - Message and file encryption to one or more recipients, optionally signed
//! - Decryption with opportunistic signature verification
//! - Detached signatures
//! - An injectable identity-keyed cache of generated pairs

pub mod cache;
pub mod keys;
pub mod message;
pub mod service;
pub mod signing;

pub use cache::KeyCache;
pub use keys::{
    generate_key_pair, get_key_email, key_fingerprint, validate_private_key, validate_public_key,
    KeyAlgorithm, KeyPair,
};
pub use message::{
    decrypt_file, decrypt_message, encrypt_file, encrypt_message, encrypt_message_to_many,
    looks_armored_message, DecryptedFile, DecryptedMessage, SigningIntent, Verification,
};
pub use service::PgpService;
pub use signing::{sign_detached, verify_detached};
