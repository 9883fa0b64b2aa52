//! Stateful entry point for the OpenPGP layer
//!
//! `PgpService` binds the stateless key and message functions to an
//! injected [`KeyCache`] and the configured key profile. Services built
//! over separate caches never see each other's keys.

use std::sync::Arc;

use tracing::info;

use crate::config::settings::PgpSettings;
use crate::error::{MailsealError, MailsealResult};

use super::cache::KeyCache;
use super::keys::{self, KeyPair};
use super::message::{self, DecryptedFile, DecryptedMessage, SigningIntent, Verification};
use super::signing;

/// OpenPGP operations over an injected key cache
#[derive(Debug, Clone)]
pub struct PgpService {
    cache: Arc<KeyCache>,
    settings: PgpSettings,
}

impl PgpService {
    /// Create a service over `cache` using `settings`
    pub fn new(cache: Arc<KeyCache>, settings: PgpSettings) -> Self {
        Self { cache, settings }
    }

    /// The cache this service populates
    pub fn cache(&self) -> &Arc<KeyCache> {
        &self.cache
    }

    /// Generate a key pair for `identity` and cache it
    pub fn generate_key_pair(&self, identity: &str, passphrase: &str) -> MailsealResult<KeyPair> {
        if passphrase_too_short(passphrase, self.settings.min_passphrase_len) {
            return Err(MailsealError::Validation(format!(
                "Passphrase must be at least {} characters",
                self.settings.min_passphrase_len
            )));
        }

        let pair = keys::generate_key_pair(identity, passphrase, self.settings.key_algorithm)?;
        self.cache.insert(pair.clone());
        Ok(pair)
    }

    /// Look up a pair generated earlier in this session
    pub fn cached_key_pair(&self, identity: &str) -> Option<KeyPair> {
        self.cache.get(identity)
    }

    /// Forget every cached pair, e.g. on logout
    pub fn clear_key_cache(&self) {
        info!("clearing cached key pairs");
        self.cache.clear();
    }

    /// See [`message::encrypt_message`]
    pub fn encrypt_message(
        &self,
        plaintext: &str,
        recipient_public_key: &str,
        signing: SigningIntent<'_>,
    ) -> MailsealResult<String> {
        message::encrypt_message(plaintext, recipient_public_key, signing)
    }

    /// See [`message::encrypt_message_to_many`]
    pub fn encrypt_message_to_many(
        &self,
        plaintext: &str,
        recipients: &[&str],
        signing: SigningIntent<'_>,
    ) -> MailsealResult<String> {
        message::encrypt_message_to_many(plaintext, recipients, signing)
    }

    /// See [`message::decrypt_message`]
    pub fn decrypt_message(
        &self,
        ciphertext: &str,
        private_key: &str,
        passphrase: &str,
        verification: Verification<'_>,
    ) -> MailsealResult<DecryptedMessage> {
        message::decrypt_message(ciphertext, private_key, passphrase, verification)
    }

    /// See [`message::encrypt_file`]
    pub fn encrypt_file(
        &self,
        data: &[u8],
        file_name: &str,
        recipient_public_key: &str,
        signing: SigningIntent<'_>,
    ) -> MailsealResult<Vec<u8>> {
        message::encrypt_file(data, file_name, recipient_public_key, signing)
    }

    /// See [`message::decrypt_file`]
    pub fn decrypt_file(
        &self,
        ciphertext: &[u8],
        private_key: &str,
        passphrase: &str,
        verification: Verification<'_>,
    ) -> MailsealResult<DecryptedFile> {
        message::decrypt_file(ciphertext, private_key, passphrase, verification)
    }

    /// See [`signing::sign_detached`]
    pub fn sign_detached(&self, private_key: &str, passphrase: &str, data: &[u8]) -> MailsealResult<String> {
        signing::sign_detached(private_key, passphrase, data)
    }

    /// See [`signing::verify_detached`]
    pub fn verify_detached(&self, public_key: &str, data: &[u8], signature: &str) -> bool {
        signing::verify_detached(public_key, data, signature)
    }

    /// See [`keys::validate_public_key`]
    pub fn validate_public_key(&self, public_key: &str) -> bool {
        keys::validate_public_key(public_key)
    }

    /// See [`keys::validate_private_key`]
    pub fn validate_private_key(&self, private_key: &str, passphrase: &str) -> bool {
        keys::validate_private_key(private_key, passphrase)
    }

    /// See [`keys::get_key_email`]
    pub fn get_key_email(&self, public_key: &str) -> Option<String> {
        keys::get_key_email(public_key)
    }
}

/// Passphrase length is counted in characters, not bytes
pub(crate) fn passphrase_too_short(passphrase: &str, min_len: usize) -> bool {
    passphrase.chars().count() < min_len
}
