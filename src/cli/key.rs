//! Key management CLI commands

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Subcommand;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use crate::config::{paths::MailsealPaths, settings::Settings};
use crate::error::{MailsealError, MailsealResult};
use crate::pgp::{key_fingerprint, KeyCache, PgpService};

use super::{new_passphrase, passphrase, read_key_file};

/// Key management commands
#[derive(Subcommand)]
pub enum KeyCommands {
    /// Generate a passphrase-protected key pair
    #[command(alias = "gen")]
    Generate {
        /// Identity (e-mail address) bound into the key
        identity: String,
        /// Directory for the .pub.asc / .sec.asc files (default: keys dir)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },

    /// Show the identity and fingerprint of a public key
    Inspect {
        /// Armored public key file
        public_key: PathBuf,
    },

    /// Check that a passphrase unlocks a private key
    Check {
        /// Armored private key file
        private_key: PathBuf,
    },
}

/// Handle key commands
pub fn handle_key_command(
    paths: &MailsealPaths,
    settings: &Settings,
    cmd: KeyCommands,
) -> MailsealResult<()> {
    let service = PgpService::new(Arc::new(KeyCache::new()), settings.pgp.clone());

    match cmd {
        KeyCommands::Generate { identity, out_dir } => {
            let out_dir = out_dir.unwrap_or_else(|| paths.keys_dir());
            generate(&service, &identity, &out_dir, settings.pgp.min_passphrase_len)
        }
        KeyCommands::Inspect { public_key } => inspect(&service, &public_key),
        KeyCommands::Check { private_key } => check(&service, &private_key),
    }
}

fn generate(
    service: &PgpService,
    identity: &str,
    out_dir: &Path,
    min_passphrase_len: usize,
) -> MailsealResult<()> {
    let passphrase = new_passphrase(min_passphrase_len)?;

    eprintln!("Generating key pair for {}...", identity);
    let pair = service.generate_key_pair(identity, &passphrase)?;

    std::fs::create_dir_all(out_dir)
        .map_err(|e| MailsealError::Io(format!("Failed to create {}: {}", out_dir.display(), e)))?;

    let stem = file_stem(identity);
    let public_path = out_dir.join(format!("{}.pub.asc", stem));
    let secret_path = out_dir.join(format!("{}.sec.asc", stem));

    std::fs::write(&public_path, &pair.public_key)?;
    std::fs::write(&secret_path, pair.private_key.as_bytes())?;

    #[cfg(unix)]
    {
        let mut perms = std::fs::metadata(&secret_path)?.permissions();
        perms.set_mode(0o600);
        std::fs::set_permissions(&secret_path, perms)?;
    }

    println!("Public key:  {}", public_path.display());
    println!("Private key: {}", secret_path.display());
    println!("Fingerprint: {}", key_fingerprint(&pair.public_key)?);
    Ok(())
}

fn inspect(service: &PgpService, path: &Path) -> MailsealResult<()> {
    let armored = read_key_file(path)?;

    if !service.validate_public_key(&armored) {
        return Err(MailsealError::KeyParse(format!(
            "{} is not a valid public key",
            path.display()
        )));
    }

    println!("Fingerprint: {}", key_fingerprint(&armored)?);
    match service.get_key_email(&armored) {
        Some(email) => println!("Identity:    {}", email),
        None => println!("Identity:    (none)"),
    }
    Ok(())
}

fn check(service: &PgpService, path: &Path) -> MailsealResult<()> {
    let armored = read_key_file(path)?;
    let passphrase = passphrase("Enter passphrase: ")?;

    if service.validate_private_key(&armored, &passphrase) {
        println!("Passphrase unlocks the private key.");
        Ok(())
    } else {
        Err(MailsealError::KeyUnlock)
    }
}

/// Make an identity safe to use as a file name
fn file_stem(identity: &str) -> String {
    identity
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
