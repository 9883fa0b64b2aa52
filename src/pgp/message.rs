//! OpenPGP message and file encryption
//!
//! Messages are encrypted to each recipient's encryption-capable key,
//! optionally signed with the sender's primary key in the same pass, and
//! emitted as ASCII armor. Files use the same pipeline but stay binary and
//! carry their name in the literal data header.

use pgp::composed::{Message, MessageBuilder, SignedSecretKey};
use pgp::crypto::hash::HashAlgorithm;
use pgp::crypto::public_key::PublicKeyAlgorithm;
use pgp::crypto::sym::SymmetricKeyAlgorithm;
use pgp::types::{KeyDetails, Password};
use rand::thread_rng;
use tracing::{debug, info, warn};

use crate::crypto::SecureBytes;
use crate::error::{MailsealError, MailsealResult};

use super::keys::{parse_public_key, parse_secret_key};
use super::signing::ensure_unlocks;

const ARMORED_MESSAGE_HEADER: &str = "-----BEGIN PGP MESSAGE-----";

/// Whether to sign while encrypting
#[derive(Debug, Clone, Copy)]
pub enum SigningIntent<'a> {
    /// Encrypt only
    Unsigned,
    /// Encrypt and sign; fails outright if the passphrase is wrong
    SignWith {
        private_key: &'a str,
        passphrase: &'a str,
    },
}

/// Whether to check an embedded signature while decrypting
#[derive(Debug, Clone, Copy)]
pub enum Verification<'a> {
    /// Do not check; the result is always unverified
    Skip,
    /// Check against this armored sender public key
    Against(&'a str),
}

/// Plaintext recovered from an armored message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptedMessage {
    pub message: String,
    /// True only if a signature was present and checked out
    pub verified: bool,
}

/// Payload recovered from a binary file message
#[derive(Debug, Clone)]
pub struct DecryptedFile {
    pub data: SecureBytes,
    pub file_name: String,
    /// True only if a signature was present and checked out
    pub verified: bool,
}

/// Encrypt `plaintext` for one recipient
pub fn encrypt_message(
    plaintext: &str,
    recipient_public_key: &str,
    signing: SigningIntent<'_>,
) -> MailsealResult<String> {
    encrypt_message_to_many(plaintext, &[recipient_public_key], signing)
}

/// Encrypt `plaintext` so any one of `recipients` can read it
pub fn encrypt_message_to_many(
    plaintext: &str,
    recipients: &[&str],
    signing: SigningIntent<'_>,
) -> MailsealResult<String> {
    let sealed = seal(
        String::new(),
        plaintext.as_bytes().to_vec(),
        recipients,
        signing,
        Output::Armored,
    )?;
    String::from_utf8(sealed)
        .map_err(|e| MailsealError::Encryption(format!("Armor produced invalid UTF-8: {}", e)))
}

/// Encrypt a file payload for one recipient, binary output
pub fn encrypt_file(
    data: &[u8],
    file_name: &str,
    recipient_public_key: &str,
    signing: SigningIntent<'_>,
) -> MailsealResult<Vec<u8>> {
    seal(
        file_name.to_string(),
        data.to_vec(),
        &[recipient_public_key],
        signing,
        Output::Binary,
    )
}

/// Decrypt an armored message
pub fn decrypt_message(
    ciphertext: &str,
    private_key: &str,
    passphrase: &str,
    verification: Verification<'_>,
) -> MailsealResult<DecryptedMessage> {
    let secret_key = unlocked_secret_key(private_key, passphrase)?;

    let (message, _) = Message::from_armor(ciphertext.as_bytes()).map_err(|e| {
        debug!("armored message did not parse: {}", e);
        MailsealError::Decryption
    })?;

    let opened = open(message, &secret_key, passphrase, verification)?;
    let message = String::from_utf8(opened.data).map_err(|_| MailsealError::Decryption)?;

    Ok(DecryptedMessage {
        message,
        verified: opened.verified,
    })
}

/// Decrypt a binary file message
pub fn decrypt_file(
    ciphertext: &[u8],
    private_key: &str,
    passphrase: &str,
    verification: Verification<'_>,
) -> MailsealResult<DecryptedFile> {
    let secret_key = unlocked_secret_key(private_key, passphrase)?;

    let message = Message::from_bytes(ciphertext).map_err(|e| {
        debug!("binary message did not parse: {}", e);
        MailsealError::Decryption
    })?;

    let opened = open(message, &secret_key, passphrase, verification)?;

    Ok(DecryptedFile {
        data: SecureBytes::new(opened.data),
        file_name: opened.file_name,
        verified: opened.verified,
    })
}

/// True if `text` carries the armored message marker.
///
/// A format check only: it says nothing about whether any key can
/// decrypt the message.
pub fn looks_armored_message(text: &str) -> bool {
    text.trim_start().starts_with(ARMORED_MESSAGE_HEADER)
}

enum Output {
    Armored,
    Binary,
}

struct Opened {
    data: Vec<u8>,
    file_name: String,
    verified: bool,
}

fn seal(
    file_name: String,
    data: Vec<u8>,
    recipients: &[&str],
    signing: SigningIntent<'_>,
    output: Output,
) -> MailsealResult<Vec<u8>> {
    if recipients.is_empty() {
        return Err(MailsealError::Validation(
            "At least one recipient is required".to_string(),
        ));
    }

    let recipient_keys = recipients
        .iter()
        .map(|armored| parse_public_key(armored))
        .collect::<MailsealResult<Vec<_>>>()?;

    let signer = match signing {
        SigningIntent::Unsigned => None,
        SigningIntent::SignWith {
            private_key,
            passphrase,
        } => Some((unlocked_secret_key(private_key, passphrase)?, passphrase)),
    };

    info!(
        recipients = recipient_keys.len(),
        signed = signer.is_some(),
        bytes = data.len(),
        "encrypting OpenPGP message"
    );

    let enc_err = |e: pgp::errors::Error| MailsealError::Encryption(e.to_string());

    let mut rng = thread_rng();
    let mut builder = MessageBuilder::from_bytes(file_name, data)
        .seipd_v1(&mut rng, SymmetricKeyAlgorithm::AES256);

    for key in &recipient_keys {
        if let Some(subkey) = key
            .public_subkeys
            .iter()
            .find(|sub| can_encrypt(sub.key.algorithm()))
        {
            builder.encrypt_to_key(&mut rng, &subkey.key).map_err(enc_err)?;
        } else if can_encrypt(key.primary_key.algorithm()) {
            builder.encrypt_to_key(&mut rng, &key.primary_key).map_err(enc_err)?;
        } else {
            return Err(MailsealError::KeyParse(
                "Public key has no encryption-capable key".to_string(),
            ));
        }
    }

    if let Some((secret_key, passphrase)) = &signer {
        builder.sign(
            &secret_key.primary_key,
            Password::from(*passphrase),
            HashAlgorithm::default(),
        );
    }

    match output {
        Output::Armored => builder
            .to_armored_string(&mut rng, Default::default())
            .map(String::into_bytes)
            .map_err(enc_err),
        Output::Binary => builder.to_vec(&mut rng).map_err(enc_err),
    }
}

fn can_encrypt(algorithm: PublicKeyAlgorithm) -> bool {
    matches!(
        algorithm,
        PublicKeyAlgorithm::RSA
            | PublicKeyAlgorithm::RSAEncrypt
            | PublicKeyAlgorithm::ECDH
            | PublicKeyAlgorithm::X25519
    )
}

fn unlocked_secret_key(private_key: &str, passphrase: &str) -> MailsealResult<SignedSecretKey> {
    let secret_key = parse_secret_key(private_key)?;
    ensure_unlocks(&secret_key, passphrase)?;
    Ok(secret_key)
}

fn open(
    message: Message<'_>,
    secret_key: &SignedSecretKey,
    passphrase: &str,
    verification: Verification<'_>,
) -> MailsealResult<Opened> {
    let decrypt_err = |e: pgp::errors::Error| {
        debug!("message decryption failed: {}", e);
        MailsealError::Decryption
    };

    let mut message = message
        .decrypt(&Password::from(passphrase), secret_key)
        .map_err(decrypt_err)?;
    if message.is_compressed() {
        message = message.decompress().map_err(decrypt_err)?;
    }

    let data = message.as_data_vec().map_err(|e| {
        debug!("decrypted message body unreadable: {}", e);
        MailsealError::Decryption
    })?;
    let file_name = message
        .literal_data_header()
        .map(|header| String::from_utf8_lossy(header.file_name()).into_owned())
        .unwrap_or_default();

    let verified = match verification {
        Verification::Skip => false,
        Verification::Against(sender) => match parse_public_key(sender) {
            Ok(sender_key) => {
                message.verify(&sender_key.primary_key).is_ok()
                    || sender_key
                        .public_subkeys
                        .iter()
                        .any(|sub| message.verify(&sub.key).is_ok())
            }
            Err(e) => {
                warn!("sender key unusable for verification: {}", e);
                false
            }
        },
    };

    debug!(bytes = data.len(), verified, "decrypted OpenPGP message");

    Ok(Opened {
        data,
        file_name,
        verified,
    })
}
