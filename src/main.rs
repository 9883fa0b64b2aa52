use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mailseal::cli::{handle_key_command, handle_pgp_command, handle_secret_command};
use mailseal::config::{paths::MailsealPaths, settings::Settings};

#[derive(Parser)]
#[command(
    name = "mailseal",
    version,
    about = "End-to-end and at-rest encryption for mail",
    long_about = "mailseal generates OpenPGP key pairs, encrypts and signs messages and \
                  attachments for recipients, and seals local secrets with AES-256-GCM \
                  envelopes keyed from a shared secret."
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Key generation and inspection
    #[command(subcommand)]
    Key(mailseal::cli::KeyCommands),

    /// OpenPGP message and file encryption
    #[command(subcommand)]
    Pgp(mailseal::cli::PgpCommands),

    /// Symmetric envelopes, hashes and tokens
    #[command(subcommand)]
    Secret(mailseal::cli::SecretCommands),

    /// Write default settings if none exist
    Init,

    /// Show current configuration and paths
    Config,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let paths = MailsealPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    match cli.command {
        Some(Commands::Key(cmd)) => handle_key_command(&paths, &settings, cmd)?,
        Some(Commands::Pgp(cmd)) => handle_pgp_command(cmd)?,
        Some(Commands::Secret(cmd)) => handle_secret_command(&settings, cmd)?,
        Some(Commands::Init) => {
            if paths.is_initialized() {
                println!("Already initialized at: {}", paths.base_dir().display());
            } else {
                settings.save(&paths)?;
                println!("Initialized mailseal at: {}", paths.base_dir().display());
            }
        }
        Some(Commands::Config) => {
            println!("mailseal Configuration");
            println!("======================");
            println!("Base directory:  {}", paths.base_dir().display());
            println!("Settings file:   {}", paths.settings_file().display());
            println!("Keys directory:  {}", paths.keys_dir().display());
            println!();
            println!("Settings:");
            println!(
                "  KDF (Argon2id): {} KiB, {} passes, {} lanes",
                settings.kdf.memory_cost, settings.kdf.time_cost, settings.kdf.parallelism
            );
            println!("  Secret env var: {}", settings.secret_env);
            println!("  Token bytes:    {}", settings.token_bytes);
            println!("  Key algorithm:  {:?}", settings.pgp.key_algorithm);
        }
        None => {
            println!("mailseal - end-to-end and at-rest encryption for mail");
            println!();
            println!("Run 'mailseal --help' for usage information.");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_decrypt_accepts_verbose_and_verify_with() {
        let cli = Cli::try_parse_from([
            "mailseal", "pgp", "decrypt", "-v", "--key", "bob.sec.asc", "-V", "alice.pub.asc",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        assert!(matches!(cli.command, Some(Commands::Pgp(_))));
    }
}
