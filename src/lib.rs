//! mailseal - end-to-end and at-rest encryption for webmail backends
//!
//! Two independent components:
//!
//! - [`pgp`]: OpenPGP key pairs, message and attachment encryption for
//!   recipients' public keys, optional signing, and opportunistic signature
//!   verification on decryption.
//! - [`crypto`]: AES-256-GCM envelopes keyed from a shared secret through
//!   Argon2id, salted one-way hashes, and random tokens.
//!
//! # Architecture
//!
//! - `config`: Base directory and settings persistence
//! - `error`: Custom error types
//! - `crypto`: Authenticated symmetric encryption
//! - `pgp`: OpenPGP layer with an injectable key cache
//! - `cli`: Command handlers for the `mailseal` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mailseal::pgp::{KeyCache, PgpService, SigningIntent, Verification};
//! use mailseal::config::PgpSettings;
//!
//! let service = PgpService::new(Arc::new(KeyCache::new()), PgpSettings::default());
//! let alice = service.generate_key_pair("alice@example.com", "correct-horse")?;
//! let armored = service.encrypt_message("hello", &alice.public_key, SigningIntent::Unsigned)?;
//! let opened = service.decrypt_message(&armored, &alice.private_key, "correct-horse", Verification::Skip)?;
//! assert_eq!(opened.message, "hello");
//! ```

pub mod cli;
pub mod config;
pub mod crypto;
pub mod error;
pub mod pgp;

pub use error::{MailsealError, MailsealResult};
