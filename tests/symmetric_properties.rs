use base64::{engine::general_purpose::STANDARD, Engine};
use proptest::prelude::*;

use mailseal::crypto::{hash, verify_hash, KdfParams, SymmetricCipher};
use mailseal::MailsealError;

fn fast_params() -> KdfParams {
    KdfParams::new(1024, 1, 1).unwrap()
}

fn cipher() -> SymmetricCipher {
    SymmetricCipher::new(fast_params())
}

#[test]
fn secret_token_scenario() {
    let cipher = cipher();
    let envelope = cipher.encrypt("secret-token", "shared-secret").unwrap();

    assert_eq!(cipher.decrypt(&envelope, "shared-secret").unwrap(), "secret-token");
    assert!(matches!(
        cipher.decrypt(&envelope, "wrong-secret"),
        Err(MailsealError::Decryption)
    ));
}

#[test]
fn every_single_byte_flip_is_detected() {
    let cipher = cipher();
    let envelope = cipher.encrypt("short", "k").unwrap();
    let raw = STANDARD.decode(&envelope).unwrap();

    for index in 0..raw.len() {
        let mut tampered = raw.clone();
        tampered[index] ^= 0xFF;
        let result = cipher.decrypt(&STANDARD.encode(&tampered), "k");
        assert!(result.is_err(), "flip at byte {} was accepted", index);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn round_trip(plaintext in ".{0,256}", secret in "[a-zA-Z0-9]{1,32}") {
        let cipher = cipher();
        let envelope = cipher.encrypt(&plaintext, &secret).unwrap();
        prop_assert_eq!(cipher.decrypt(&envelope, &secret).unwrap(), plaintext);
    }

    #[test]
    fn wrong_secret_rejected(
        plaintext in ".{0,64}",
        secret in "[a-z]{8}",
        other in "[A-Z]{8}",
    ) {
        let cipher = cipher();
        let envelope = cipher.encrypt(&plaintext, &secret).unwrap();
        prop_assert!(cipher.decrypt(&envelope, &other).is_err());
    }

    #[test]
    fn hash_matches_only_its_input(data in "[ -~]{0,64}", other in "[ -~]{0,64}") {
        let stored = hash(&data, &fast_params()).unwrap();
        prop_assert!(verify_hash(&data, &stored, &fast_params()));
        if data != other {
            prop_assert!(!verify_hash(&other, &stored, &fast_params()));
        }
    }
}
