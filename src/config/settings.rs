//! User settings for mailseal
//!
//! Holds the KDF cost for new envelopes and hashes, where the process-wide
//! symmetric secret comes from, and the OpenPGP key profile.

use serde::{Deserialize, Serialize};

use super::paths::MailsealPaths;
use crate::crypto::{KdfParams, SecureString};
use crate::error::MailsealError;
use crate::pgp::KeyAlgorithm;

/// OpenPGP settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PgpSettings {
    /// Algorithm profile for new key pairs
    #[serde(default)]
    pub key_algorithm: KeyAlgorithm,

    /// Shortest passphrase accepted when generating keys
    #[serde(default = "default_min_passphrase_len")]
    pub min_passphrase_len: usize,
}

impl Default for PgpSettings {
    fn default() -> Self {
        Self {
            key_algorithm: KeyAlgorithm::default(),
            min_passphrase_len: default_min_passphrase_len(),
        }
    }
}

/// User settings for mailseal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Argon2id cost for new envelopes and hashes
    #[serde(default)]
    pub kdf: KdfParams,

    /// Name of the environment variable holding the symmetric secret
    #[serde(default = "default_secret_env")]
    pub secret_env: String,

    /// Default token length in bytes
    #[serde(default = "default_token_bytes")]
    pub token_bytes: usize,

    #[serde(default)]
    pub pgp: PgpSettings,
}

fn default_schema_version() -> u32 {
    1
}

fn default_secret_env() -> String {
    "MAILSEAL_SECRET".to_string()
}

fn default_token_bytes() -> usize {
    32
}

fn default_min_passphrase_len() -> usize {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            kdf: KdfParams::default(),
            secret_env: default_secret_env(),
            token_bytes: default_token_bytes(),
            pgp: PgpSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or fall back to defaults if the file doesn't exist
    pub fn load_or_create(paths: &MailsealPaths) -> Result<Self, MailsealError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            // Don't save yet - let caller decide when to persist
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| MailsealError::Io(format!("Failed to read settings file: {}", e)))?;

        let settings: Settings = serde_json::from_str(&contents)
            .map_err(|e| MailsealError::Config(format!("Failed to parse settings file: {}", e)))?;

        settings.kdf.validate().map_err(|e| {
            MailsealError::Config(format!("Invalid KDF settings in {}: {}", settings_path.display(), e))
        })?;

        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, paths: &MailsealPaths) -> Result<(), MailsealError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| MailsealError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| MailsealError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Read the symmetric secret from the configured environment variable
    pub fn resolve_secret(&self) -> Result<SecureString, MailsealError> {
        match std::env::var(&self.secret_env) {
            Ok(secret) if !secret.is_empty() => Ok(SecureString::new(secret)),
            _ => Err(MailsealError::Config(format!(
                "Secret not configured: set {}",
                self.secret_env
            ))),
        }
    }
}
