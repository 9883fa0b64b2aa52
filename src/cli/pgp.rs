//! OpenPGP CLI commands
//!
//! Encrypt, decrypt, sign and verify with armored key files.

use std::path::{Path, PathBuf};

use clap::Subcommand;

use crate::error::{MailsealError, MailsealResult};
use crate::pgp::{
    decrypt_file, decrypt_message, encrypt_file, encrypt_message_to_many, sign_detached,
    verify_detached, SigningIntent, Verification,
};

use super::{passphrase, read_input, read_key_file, read_text, write_output};

/// OpenPGP commands
#[derive(Subcommand)]
pub enum PgpCommands {
    /// Encrypt a message (armored) or a file (binary)
    Encrypt {
        /// Recipient public key file (repeatable)
        #[arg(short = 't', long = "to", required = true)]
        recipients: Vec<PathBuf>,
        /// Also sign with this private key
        #[arg(short, long)]
        sign_with: Option<PathBuf>,
        /// Treat input as a file: binary output, file name preserved
        #[arg(short, long)]
        file: bool,
        /// Input path (default: stdin)
        input: Option<PathBuf>,
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Decrypt a message or file
    Decrypt {
        /// Recipient private key file
        #[arg(short, long)]
        key: PathBuf,
        /// Check the signature against this sender public key
        #[arg(short = 'V', long)]
        verify_with: Option<PathBuf>,
        /// Input is a binary file message
        #[arg(short, long)]
        file: bool,
        /// Input path (default: stdin)
        input: Option<PathBuf>,
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Create a detached signature
    Sign {
        /// Signer private key file
        #[arg(short, long)]
        key: PathBuf,
        /// Input path (default: stdin)
        input: Option<PathBuf>,
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Verify a detached signature
    Verify {
        /// Signer public key file
        #[arg(short, long)]
        key: PathBuf,
        /// Armored signature file
        #[arg(short, long)]
        signature: PathBuf,
        /// Signed data (default: stdin)
        input: Option<PathBuf>,
    },
}

/// Handle OpenPGP commands
pub fn handle_pgp_command(cmd: PgpCommands) -> MailsealResult<()> {
    match cmd {
        PgpCommands::Encrypt {
            recipients,
            sign_with,
            file,
            input,
            output,
        } => encrypt(&recipients, sign_with.as_deref(), file, input.as_deref(), output.as_deref()),
        PgpCommands::Decrypt {
            key,
            verify_with,
            file,
            input,
            output,
        } => decrypt(&key, verify_with.as_deref(), file, input.as_deref(), output.as_deref()),
        PgpCommands::Sign { key, input, output } => {
            let private_key = read_key_file(&key)?;
            let passphrase = passphrase("Enter signing key passphrase: ")?;
            let data = read_input(input.as_deref())?;
            let signature = sign_detached(&private_key, &passphrase, &data)?;
            write_output(output.as_deref(), signature.as_bytes())
        }
        PgpCommands::Verify {
            key,
            signature,
            input,
        } => {
            let public_key = read_key_file(&key)?;
            let signature = read_key_file(&signature)?;
            let data = read_input(input.as_deref())?;
            if verify_detached(&public_key, &data, &signature) {
                println!("Signature is valid.");
                Ok(())
            } else {
                Err(MailsealError::Validation("Signature is not valid".to_string()))
            }
        }
    }
}

fn encrypt(
    recipients: &[PathBuf],
    sign_with: Option<&Path>,
    file: bool,
    input: Option<&Path>,
    output: Option<&Path>,
) -> MailsealResult<()> {
    let recipient_keys = recipients
        .iter()
        .map(|path| read_key_file(path))
        .collect::<MailsealResult<Vec<_>>>()?;
    let recipient_refs: Vec<&str> = recipient_keys.iter().map(String::as_str).collect();

    let signer = match sign_with {
        Some(path) => Some((read_key_file(path)?, passphrase("Enter signing key passphrase: ")?)),
        None => None,
    };
    let signing = match &signer {
        Some((private_key, passphrase)) => SigningIntent::SignWith {
            private_key,
            passphrase,
        },
        None => SigningIntent::Unsigned,
    };

    if file {
        let [recipient] = recipient_refs.as_slice() else {
            return Err(MailsealError::Validation(
                "File encryption takes exactly one recipient".to_string(),
            ));
        };
        let data = read_input(input)?;
        let file_name = input
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let sealed = encrypt_file(&data, &file_name, recipient, signing)?;
        write_output(output, &sealed)
    } else {
        let plaintext = read_text(input)?;
        let armored = encrypt_message_to_many(&plaintext, &recipient_refs, signing)?;
        write_output(output, armored.as_bytes())
    }
}

fn decrypt(
    key: &Path,
    verify_with: Option<&Path>,
    file: bool,
    input: Option<&Path>,
    output: Option<&Path>,
) -> MailsealResult<()> {
    let private_key = read_key_file(key)?;
    let sender_key = verify_with.map(read_key_file).transpose()?;
    let verification = match &sender_key {
        Some(public_key) => Verification::Against(public_key),
        None => Verification::Skip,
    };
    let passphrase = passphrase("Enter passphrase: ")?;

    let verified = if file {
        let ciphertext = read_input(input)?;
        let opened = decrypt_file(&ciphertext, &private_key, &passphrase, verification)?;
        if !opened.file_name.is_empty() {
            eprintln!("File name: {}", opened.file_name);
        }
        write_output(output, &opened.data)?;
        opened.verified
    } else {
        let armored = read_text(input)?;
        let opened = decrypt_message(&armored, &private_key, &passphrase, verification)?;
        write_output(output, opened.message.as_bytes())?;
        opened.verified
    };

    if sender_key.is_some() {
        if verified {
            eprintln!("Signature: verified");
        } else {
            eprintln!("Signature: NOT verified");
        }
    }
    Ok(())
}
