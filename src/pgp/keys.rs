//! OpenPGP key pairs: generation, parsing and validation
//!
//! Keys travel as ASCII-armored text so that any OpenPGP implementation
//! can consume them. The default profile is an Ed25519 primary key
//! (certify + sign) with a Curve25519 ECDH encryption subkey; an
//! RSA-3072 profile is available for peers without ECC support.

use std::fmt;

use chrono::{DateTime, Utc};
use pgp::composed::{
    Deserializable, KeyType, SecretKeyParamsBuilder, SignedPublicKey, SignedSecretKey,
    SubkeyParamsBuilder,
};
use pgp::crypto::ecc_curve::ECCCurve;
use pgp::types::{KeyDetails, Password};
use rand::thread_rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::crypto::SecureString;
use crate::error::{MailsealError, MailsealResult};

use super::signing::ensure_unlocks;

/// Key algorithm profile used for new key pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KeyAlgorithm {
    /// Ed25519 signing + Curve25519 encryption (default)
    #[default]
    Curve25519,
    /// RSA-3072 for both primary and encryption subkey
    Rsa3072,
}

/// An armored key pair bound to one identity
#[derive(Clone)]
pub struct KeyPair {
    /// Armored public key
    pub public_key: String,
    /// Armored private key, locked with the passphrase given at generation
    pub private_key: SecureString,
    /// User ID bound into the key
    pub identity: String,
    /// When the pair was generated
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("identity", &self.identity)
            .field("created_at", &self.created_at)
            .field("public_key_len", &self.public_key.len())
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

/// Generate a passphrase-protected key pair for `identity`
pub fn generate_key_pair(
    identity: &str,
    passphrase: &str,
    algorithm: KeyAlgorithm,
) -> MailsealResult<KeyPair> {
    if passphrase.is_empty() {
        return Err(MailsealError::Validation(
            "Passphrase must not be empty".to_string(),
        ));
    }

    info!(?algorithm, "generating OpenPGP key pair");

    let (primary_type, encryption_type) = match algorithm {
        KeyAlgorithm::Curve25519 => (KeyType::Ed25519Legacy, KeyType::ECDH(ECCCurve::Curve25519)),
        KeyAlgorithm::Rsa3072 => (KeyType::Rsa(3072), KeyType::Rsa(3072)),
    };

    let gen_err = |what: &str, e: &dyn fmt::Display| {
        MailsealError::KeyGeneration(format!("{}: {}", what, e))
    };

    let mut encryptkey = SubkeyParamsBuilder::default();
    encryptkey
        .key_type(encryption_type)
        .passphrase(Some(passphrase.to_string()))
        .can_sign(false)
        .can_encrypt(true)
        .can_authenticate(false);

    let mut key_params = SecretKeyParamsBuilder::default();
    key_params
        .key_type(primary_type)
        .passphrase(Some(passphrase.to_string()))
        .can_certify(true)
        .can_sign(true)
        .can_encrypt(false)
        .primary_user_id(identity.into())
        .subkeys(vec![encryptkey
            .build()
            .map_err(|e| gen_err("Failed to build encryption subkey", &e))?]);

    let secret_key_params = key_params
        .build()
        .map_err(|e| gen_err("Failed to build secret key params", &e))?;
    let secret_key = secret_key_params
        .generate(thread_rng())
        .map_err(|e| gen_err("Failed to generate secret key", &e))?;

    let password = Password::from(passphrase);
    let signed_secret_key = secret_key
        .sign(&mut thread_rng(), &password)
        .map_err(|e| gen_err("Failed to self-sign secret key", &e))?;
    let signed_public_key = SignedPublicKey::from(signed_secret_key.clone());

    let private_key = signed_secret_key
        .to_armored_string(Default::default())
        .map_err(|e| gen_err("Failed to armor secret key", &e))?;
    let public_key = signed_public_key
        .to_armored_string(Default::default())
        .map_err(|e| gen_err("Failed to armor public key", &e))?;

    debug!(
        fingerprint = %hex::encode(signed_public_key.fingerprint().as_bytes()),
        "key pair generated"
    );

    Ok(KeyPair {
        public_key,
        private_key: SecureString::new(private_key),
        identity: identity.to_string(),
        created_at: Utc::now(),
    })
}

/// Parse an armored public key
pub fn parse_public_key(armored: &str) -> MailsealResult<SignedPublicKey> {
    let (key, _) = SignedPublicKey::from_string(armored)
        .map_err(|e| MailsealError::KeyParse(format!("Failed to parse public key: {}", e)))?;
    key.verify()
        .map_err(|e| MailsealError::KeyParse(format!("Public key self-signature invalid: {}", e)))?;
    Ok(key)
}

/// Parse an armored private key
pub fn parse_secret_key(armored: &str) -> MailsealResult<SignedSecretKey> {
    let (key, _) = SignedSecretKey::from_string(armored)
        .map_err(|e| MailsealError::KeyParse(format!("Failed to parse private key: {}", e)))?;
    key.verify()
        .map_err(|e| MailsealError::KeyParse(format!("Private key self-signature invalid: {}", e)))?;
    Ok(key)
}

/// True if `armored` parses as a self-consistent public key
pub fn validate_public_key(armored: &str) -> bool {
    parse_public_key(armored).is_ok()
}

/// True if `armored` parses as a private key that `passphrase` unlocks
pub fn validate_private_key(armored: &str, passphrase: &str) -> bool {
    parse_secret_key(armored)
        .and_then(|key| ensure_unlocks(&key, passphrase))
        .is_ok()
}

/// Extract the e-mail address from the key's first user ID.
///
/// `"Alice <alice@example.com>"` yields `alice@example.com`; a bare
/// address is returned as-is. Anything else, including unparseable
/// keys, yields `None`.
pub fn get_key_email(armored: &str) -> Option<String> {
    let (key, _) = SignedPublicKey::from_string(armored).ok()?;
    let user = key.details.users.first()?;
    let user_id = String::from_utf8_lossy(user.id.id()).to_string();
    email_from_user_id(&user_id)
}

/// Hex fingerprint of an armored public key
pub fn key_fingerprint(armored: &str) -> MailsealResult<String> {
    let key = parse_public_key(armored)?;
    Ok(hex::encode(key.fingerprint().as_bytes()))
}

fn email_from_user_id(user_id: &str) -> Option<String> {
    if let (Some(start), Some(end)) = (user_id.rfind('<'), user_id.rfind('>')) {
        if start < end {
            let email = user_id[start + 1..end].trim();
            return (!email.is_empty()).then(|| email.to_string());
        }
    }

    let trimmed = user_id.trim();
    trimmed.contains('@').then(|| trimmed.to_string())
}
