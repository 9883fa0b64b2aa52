use std::sync::Arc;
use std::thread;

use mailseal::config::PgpSettings;
use mailseal::pgp::{
    decrypt_file, decrypt_message, encrypt_file, encrypt_message, encrypt_message_to_many,
    generate_key_pair, looks_armored_message, validate_private_key, KeyAlgorithm, KeyCache,
    KeyPair, PgpService, SigningIntent, Verification,
};
use mailseal::MailsealError;

fn key_pair(identity: &str, passphrase: &str) -> KeyPair {
    generate_key_pair(identity, passphrase, KeyAlgorithm::Curve25519).unwrap()
}

#[test]
fn unsigned_message_round_trip_is_unverified() {
    let service = PgpService::new(Arc::new(KeyCache::new()), PgpSettings::default());
    let alice = service
        .generate_key_pair("alice@example.com", "correct-horse")
        .unwrap();

    let armored = service
        .encrypt_message("hello", &alice.public_key, SigningIntent::Unsigned)
        .unwrap();
    assert!(looks_armored_message(&armored));
    assert!(!armored.contains("hello"));

    let opened = service
        .decrypt_message(&armored, &alice.private_key, "correct-horse", Verification::Skip)
        .unwrap();
    assert_eq!(opened.message, "hello");
    assert!(!opened.verified);
}

#[test]
fn wrong_passphrase_is_key_unlock_failure() {
    let alice = key_pair("alice@example.com", "correct-horse");
    let armored = encrypt_message("hello", &alice.public_key, SigningIntent::Unsigned).unwrap();

    let err = decrypt_message(&armored, &alice.private_key, "battery-staple", Verification::Skip)
        .unwrap_err();
    assert!(matches!(err, MailsealError::KeyUnlock));
}

#[test]
fn unsigned_message_checked_against_sender_is_unverified() {
    let alice = key_pair("alice@example.com", "pw-a");
    let bob = key_pair("bob@example.com", "pw-b");

    let armored = encrypt_message("no signature here", &bob.public_key, SigningIntent::Unsigned)
        .unwrap();
    let opened = decrypt_message(
        &armored,
        &bob.private_key,
        "pw-b",
        Verification::Against(&alice.public_key),
    )
    .unwrap();

    assert_eq!(opened.message, "no signature here");
    assert!(!opened.verified);
}

#[test]
fn signed_message_verifies_only_against_signer() {
    let alice = key_pair("alice@example.com", "pw-a");
    let bob = key_pair("bob@example.com", "pw-b");
    let carol = key_pair("carol@example.com", "pw-c");

    let armored = encrypt_message(
        "meet at noon",
        &bob.public_key,
        SigningIntent::SignWith {
            private_key: &alice.private_key,
            passphrase: "pw-a",
        },
    )
    .unwrap();

    let from_alice = decrypt_message(
        &armored,
        &bob.private_key,
        "pw-b",
        Verification::Against(&alice.public_key),
    )
    .unwrap();
    assert!(from_alice.verified);
    assert_eq!(from_alice.message, "meet at noon");

    let from_carol = decrypt_message(
        &armored,
        &bob.private_key,
        "pw-b",
        Verification::Against(&carol.public_key),
    )
    .unwrap();
    assert!(!from_carol.verified);
    assert_eq!(from_carol.message, "meet at noon");

    let skipped = decrypt_message(&armored, &bob.private_key, "pw-b", Verification::Skip).unwrap();
    assert!(!skipped.verified);
}

#[test]
fn signing_with_wrong_passphrase_aborts() {
    let alice = key_pair("alice@example.com", "pw-a");
    let bob = key_pair("bob@example.com", "pw-b");

    let err = encrypt_message(
        "should never be sent",
        &bob.public_key,
        SigningIntent::SignWith {
            private_key: &alice.private_key,
            passphrase: "not-pw-a",
        },
    )
    .unwrap_err();
    assert!(matches!(err, MailsealError::KeyUnlock));
}

#[test]
fn unreadable_sender_key_is_unverified_not_an_error() {
    let bob = key_pair("bob@example.com", "pw-b");
    let armored = encrypt_message("hi", &bob.public_key, SigningIntent::Unsigned).unwrap();

    let opened = decrypt_message(
        &armored,
        &bob.private_key,
        "pw-b",
        Verification::Against("not a key"),
    )
    .unwrap();
    assert_eq!(opened.message, "hi");
    assert!(!opened.verified);
}

#[test]
fn message_for_someone_else_fails_to_decrypt() {
    let alice = key_pair("alice@example.com", "pw-a");
    let bob = key_pair("bob@example.com", "pw-b");

    let armored = encrypt_message("for alice only", &alice.public_key, SigningIntent::Unsigned)
        .unwrap();
    let err = decrypt_message(&armored, &bob.private_key, "pw-b", Verification::Skip).unwrap_err();
    assert!(err.is_decryption());
}

#[test]
fn corrupted_message_fails_to_decrypt() {
    let alice = key_pair("alice@example.com", "pw-a");
    let err = decrypt_message(
        "-----BEGIN PGP MESSAGE-----\n\nbm90IHJlYWxseQ==\n-----END PGP MESSAGE-----\n",
        &alice.private_key,
        "pw-a",
        Verification::Skip,
    )
    .unwrap_err();
    assert!(err.is_decryption());
}

#[test]
fn same_plaintext_encrypts_differently() {
    let alice = key_pair("alice@example.com", "pw-a");
    let first = encrypt_message("hello", &alice.public_key, SigningIntent::Unsigned).unwrap();
    let second = encrypt_message("hello", &alice.public_key, SigningIntent::Unsigned).unwrap();
    assert_ne!(first, second);

    for armored in [first, second] {
        let opened = decrypt_message(&armored, &alice.private_key, "pw-a", Verification::Skip).unwrap();
        assert_eq!(opened.message, "hello");
    }
}

#[test]
fn every_recipient_can_decrypt() {
    let alice = key_pair("alice@example.com", "pw-a");
    let bob = key_pair("bob@example.com", "pw-b");

    let armored = encrypt_message_to_many(
        "team update",
        &[&alice.public_key, &bob.public_key],
        SigningIntent::Unsigned,
    )
    .unwrap();

    let for_alice = decrypt_message(&armored, &alice.private_key, "pw-a", Verification::Skip).unwrap();
    let for_bob = decrypt_message(&armored, &bob.private_key, "pw-b", Verification::Skip).unwrap();
    assert_eq!(for_alice.message, "team update");
    assert_eq!(for_bob.message, "team update");
}

#[test]
fn file_round_trip_keeps_name_and_signature() {
    let alice = key_pair("alice@example.com", "pw-a");
    let bob = key_pair("bob@example.com", "pw-b");
    let payload: Vec<u8> = (0..4096).map(|i| (i % 251) as u8).collect();

    let sealed = encrypt_file(
        &payload,
        "report.pdf",
        &bob.public_key,
        SigningIntent::SignWith {
            private_key: &alice.private_key,
            passphrase: "pw-a",
        },
    )
    .unwrap();
    assert!(!sealed.starts_with(b"-----BEGIN"));

    let opened = decrypt_file(
        &sealed,
        &bob.private_key,
        "pw-b",
        Verification::Against(&alice.public_key),
    )
    .unwrap();
    assert_eq!(opened.data.as_bytes(), payload.as_slice());
    assert_eq!(opened.file_name, "report.pdf");
    assert!(opened.verified);
}

#[test]
fn concurrent_encryption_with_shared_cache() {
    let cache = Arc::new(KeyCache::new());
    let service = PgpService::new(Arc::clone(&cache), PgpSettings::default());
    let alice = service.generate_key_pair("alice@example.com", "pw-a").unwrap();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let service = service.clone();
            thread::spawn(move || {
                let pair = service.cached_key_pair("alice@example.com").unwrap();
                let text = format!("message {}", i);
                let armored = service
                    .encrypt_message(&text, &pair.public_key, SigningIntent::Unsigned)
                    .unwrap();
                (text, armored)
            })
        })
        .collect();

    for handle in handles {
        let (text, armored) = handle.join().unwrap();
        let opened = decrypt_message(&armored, &alice.private_key, "pw-a", Verification::Skip).unwrap();
        assert_eq!(opened.message, text);
    }
}

// RSA-3072 key generation is slow in debug builds; run with `--ignored`.
#[test]
#[ignore]
fn rsa_profile_signed_round_trip() {
    let alice = generate_key_pair("alice@example.com", "pw-a", KeyAlgorithm::Rsa3072).unwrap();
    let bob = generate_key_pair("bob@example.com", "pw-b", KeyAlgorithm::Rsa3072).unwrap();

    let armored = encrypt_message(
        "hi",
        &bob.public_key,
        SigningIntent::SignWith {
            private_key: &alice.private_key,
            passphrase: "pw-a",
        },
    )
    .unwrap();

    let opened = decrypt_message(
        &armored,
        &bob.private_key,
        "pw-b",
        Verification::Against(&alice.public_key),
    )
    .unwrap();
    assert_eq!(opened.message, "hi");
    assert!(opened.verified);

    let err = decrypt_message(&armored, &bob.private_key, "pw-a", Verification::Skip).unwrap_err();
    assert!(matches!(err, MailsealError::KeyUnlock));
}

#[test]
#[ignore]
fn rsa_profile_wrong_signing_passphrase_aborts() {
    let alice = generate_key_pair("alice@example.com", "pw-a", KeyAlgorithm::Rsa3072).unwrap();

    let err = encrypt_message(
        "hi",
        &alice.public_key,
        SigningIntent::SignWith {
            private_key: &alice.private_key,
            passphrase: "not-pw-a",
        },
    )
    .unwrap_err();
    assert!(matches!(err, MailsealError::KeyUnlock));
    assert!(validate_private_key(&alice.private_key, "pw-a"));
    assert!(!validate_private_key(&alice.private_key, "not-pw-a"));
}
