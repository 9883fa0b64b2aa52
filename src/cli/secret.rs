//! Symmetric encryption CLI commands
//!
//! `seal` and `open` use the process-wide secret from the environment
//! variable named in settings (`MAILSEAL_SECRET` by default).

use std::path::PathBuf;

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::crypto::{generate_token, hash, verify_hash, SymmetricCipher};
use crate::error::{MailsealError, MailsealResult};

use super::{read_input, read_text, write_output};

/// Symmetric encryption commands
#[derive(Subcommand)]
pub enum SecretCommands {
    /// Encrypt input into a base64 envelope
    Seal {
        /// Input path (default: stdin)
        input: Option<PathBuf>,
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Decrypt a base64 envelope
    Open {
        /// Input path (default: stdin)
        input: Option<PathBuf>,
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Produce a salted one-way hash of the input
    Hash {
        /// Input path (default: stdin); one trailing newline is ignored
        input: Option<PathBuf>,
    },

    /// Check input against a stored hash
    VerifyHash {
        /// Hash produced by `secret hash`
        hash: String,
        /// Input path (default: stdin); one trailing newline is ignored
        input: Option<PathBuf>,
    },

    /// Print a random hex token
    Token {
        /// Token length in bytes (default from settings)
        #[arg(short, long)]
        length: Option<usize>,
    },
}

/// Handle symmetric encryption commands
pub fn handle_secret_command(settings: &Settings, cmd: SecretCommands) -> MailsealResult<()> {
    let cipher = SymmetricCipher::new(settings.kdf);

    match cmd {
        SecretCommands::Seal { input, output } => {
            let secret = settings.resolve_secret()?;
            let data = read_input(input.as_deref())?;
            let envelope = cipher.encrypt_bytes(&data, &secret)?;
            write_output(output.as_deref(), format!("{}\n", envelope).as_bytes())
        }
        SecretCommands::Open { input, output } => {
            let secret = settings.resolve_secret()?;
            let envelope = read_text(input.as_deref())?;
            let data = cipher.decrypt_bytes(&envelope, &secret)?;
            write_output(output.as_deref(), &data)
        }
        SecretCommands::Hash { input } => {
            let data = read_line_input(input)?;
            println!("{}", hash(&data, &settings.kdf)?);
            Ok(())
        }
        SecretCommands::VerifyHash { hash, input } => {
            let data = read_line_input(input)?;
            if verify_hash(&data, &hash, &settings.kdf) {
                println!("Hash matches.");
                Ok(())
            } else {
                Err(MailsealError::Validation("Hash does not match".to_string()))
            }
        }
        SecretCommands::Token { length } => {
            println!("{}", generate_token(length.unwrap_or(settings.token_bytes))?);
            Ok(())
        }
    }
}

fn read_line_input(input: Option<PathBuf>) -> MailsealResult<String> {
    let mut data = read_text(input.as_deref())?;
    if data.ends_with('\n') {
        data.pop();
        if data.ends_with('\r') {
            data.pop();
        }
    }
    Ok(data)
}
