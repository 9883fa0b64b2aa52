//! Detached OpenPGP signatures
//!
//! Also provides the unlock check used before any operation that needs a
//! private key: a throwaway signature proves the passphrase opens the key.

use std::io::Cursor;
use std::time::SystemTime;

use pgp::composed::{Deserializable, SignedSecretKey, StandaloneSignature};
use pgp::packet::{Signature, SignatureConfig, SignatureType, Subpacket, SubpacketData};
use pgp::types::{KeyDetails, Password};
use rand::thread_rng;
use tracing::{debug, warn};

use crate::error::{MailsealError, MailsealResult};

use super::keys::{parse_public_key, parse_secret_key};

const UNLOCK_PROBE: &[u8] = b"mailseal unlock probe";

/// Fail with [`MailsealError::KeyUnlock`] unless `passphrase` opens `secret_key`
pub(crate) fn ensure_unlocks(secret_key: &SignedSecretKey, passphrase: &str) -> MailsealResult<()> {
    create_signature(secret_key, UNLOCK_PROBE, &Password::from(passphrase)).map_err(|e| {
        debug!("private key unlock failed: {}", e);
        MailsealError::KeyUnlock
    })?;
    Ok(())
}

fn create_signature(
    secret_key: &SignedSecretKey,
    data: &[u8],
    password: &Password,
) -> pgp::errors::Result<Signature> {
    let mut config =
        SignatureConfig::from_key(thread_rng(), &secret_key.primary_key, SignatureType::Binary)?;

    config.hashed_subpackets = vec![
        Subpacket::regular(SubpacketData::IssuerFingerprint(secret_key.fingerprint()))?,
        Subpacket::critical(SubpacketData::SignatureCreationTime(SystemTime::now().into()))?,
    ];
    config.unhashed_subpackets = vec![Subpacket::regular(SubpacketData::Issuer(
        secret_key.key_id(),
    ))?];

    config.sign(&secret_key.primary_key, password, data)
}

/// Create an armored detached signature over `data`
pub fn sign_detached(private_key: &str, passphrase: &str, data: &[u8]) -> MailsealResult<String> {
    let secret_key = parse_secret_key(private_key)?;
    ensure_unlocks(&secret_key, passphrase)?;

    let signature = create_signature(&secret_key, data, &Password::from(passphrase))
        .map_err(|e| MailsealError::Encryption(format!("Failed to create signature: {}", e)))?;

    StandaloneSignature::new(signature)
        .to_armored_string(Default::default())
        .map_err(|e| MailsealError::Encryption(format!("Failed to armor signature: {}", e)))
}

/// Check an armored detached signature against `public_key`.
///
/// Returns `false` for bad signatures, unparseable signatures, or keys
/// that cannot be read; never an error.
pub fn verify_detached(public_key: &str, data: &[u8], signature: &str) -> bool {
    let key = match parse_public_key(public_key) {
        Ok(key) => key,
        Err(e) => {
            warn!("verification key rejected: {}", e);
            return false;
        }
    };

    let Ok((standalone, _)) = StandaloneSignature::from_armor_single(Cursor::new(signature)) else {
        debug!("detached signature did not parse");
        return false;
    };

    standalone.verify(&key.primary_key, data).is_ok()
        || key
            .public_subkeys
            .iter()
            .any(|sub| standalone.verify(&sub.key, data).is_ok())
}
