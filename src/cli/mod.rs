//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the library layer.

pub mod key;
pub mod pgp;
pub mod secret;

pub use key::{handle_key_command, KeyCommands};
pub use pgp::{handle_pgp_command, PgpCommands};
pub use secret::{handle_secret_command, SecretCommands};

use std::io::{Read, Write};
use std::path::Path;

use crate::crypto::SecureString;
use crate::error::{MailsealError, MailsealResult};
use crate::pgp::service::passphrase_too_short;

/// Environment variable consulted before prompting for a passphrase
pub const PASSPHRASE_ENV: &str = "MAILSEAL_PASSPHRASE";

/// Read all input from `path`, or stdin when absent
pub(crate) fn read_input(path: Option<&Path>) -> MailsealResult<Vec<u8>> {
    match path {
        Some(path) => std::fs::read(path)
            .map_err(|e| MailsealError::Io(format!("Failed to read {}: {}", path.display(), e))),
        None => {
            let mut buffer = Vec::new();
            std::io::stdin().read_to_end(&mut buffer)?;
            Ok(buffer)
        }
    }
}

/// Read input as UTF-8 text
pub(crate) fn read_text(path: Option<&Path>) -> MailsealResult<String> {
    String::from_utf8(read_input(path)?)
        .map_err(|_| MailsealError::Validation("Input is not valid UTF-8".to_string()))
}

/// Write output to `path`, or stdout when absent
pub(crate) fn write_output(path: Option<&Path>, data: &[u8]) -> MailsealResult<()> {
    match path {
        Some(path) => std::fs::write(path, data)
            .map_err(|e| MailsealError::Io(format!("Failed to write {}: {}", path.display(), e))),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(data)?;
            stdout.flush()?;
            Ok(())
        }
    }
}

/// Read an armored key file
pub(crate) fn read_key_file(path: &Path) -> MailsealResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| MailsealError::Io(format!("Failed to read key {}: {}", path.display(), e)))
}

/// Take the passphrase from the environment, or prompt with hidden input
pub(crate) fn passphrase(prompt: &str) -> MailsealResult<SecureString> {
    if let Ok(value) = std::env::var(PASSPHRASE_ENV) {
        return Ok(SecureString::new(value));
    }

    rpassword::prompt_password(prompt)
        .map(SecureString::new)
        .map_err(|e| MailsealError::Io(format!("Failed to read passphrase: {}", e)))
}

/// Prompt for a new passphrase with confirmation
pub(crate) fn new_passphrase(min_len: usize) -> MailsealResult<SecureString> {
    if let Ok(value) = std::env::var(PASSPHRASE_ENV) {
        return Ok(SecureString::new(value));
    }

    loop {
        let first = passphrase("Enter new passphrase: ")?;

        if passphrase_too_short(&first, min_len.max(1)) {
            eprintln!("Passphrase must be at least {} characters. Please try again.", min_len.max(1));
            continue;
        }

        let second = passphrase("Confirm passphrase: ")?;

        if first != second {
            eprintln!("Passphrases do not match. Please try again.");
            continue;
        }

        return Ok(first);
    }
}
