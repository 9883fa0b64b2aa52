//! Authenticated symmetric encryption for data at rest
//!
//! Provides AES-256-GCM envelopes with per-call Argon2id key derivation,
//! salted hashing for one-way comparisons, and random token generation.

pub mod encryption;
pub mod hashing;
pub mod key_derivation;
pub mod secure_memory;

pub use encryption::SymmetricCipher;
pub use hashing::{generate_token, hash, verify_hash};
pub use key_derivation::{derive_key, DerivedKey, KdfParams};
pub use secure_memory::{SecureBytes, SecureString};
