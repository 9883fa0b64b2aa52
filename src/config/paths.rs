//! Path management for mailseal
//!
//! ## Path Resolution Order
//!
//! 1. `MAILSEAL_HOME` environment variable (if set)
//! 2. The platform configuration directory: `~/.config/mailseal` on Linux,
//!    `~/Library/Application Support/mailseal` on macOS,
//!    `%APPDATA%\mailseal\config` on Windows

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::MailsealError;

/// Environment variable that overrides the base directory
pub const HOME_ENV: &str = "MAILSEAL_HOME";

/// Manages all paths used by mailseal
#[derive(Debug, Clone)]
pub struct MailsealPaths {
    base_dir: PathBuf,
}

impl MailsealPaths {
    /// Create a new MailsealPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, MailsealError> {
        let base_dir = match std::env::var(HOME_ENV) {
            Ok(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => ProjectDirs::from("", "", "mailseal")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .ok_or_else(|| {
                    MailsealError::Config("Could not determine a home directory".into())
                })?,
        };

        Ok(Self { base_dir })
    }

    /// Create MailsealPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Default output directory for `key generate`
    pub fn keys_dir(&self) -> PathBuf {
        self.base_dir.join("keys")
    }

    /// Ensure the base and keys directories exist
    pub fn ensure_directories(&self) -> Result<(), MailsealError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| MailsealError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.keys_dir())
            .map_err(|e| MailsealError::Io(format!("Failed to create keys directory: {}", e)))?;

        Ok(())
    }

    /// Check if a settings file has been written
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = MailsealPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
        assert_eq!(paths.keys_dir(), temp_dir.path().join("keys"));
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = MailsealPaths::with_base_dir(temp_dir.path().join("nested"));

        paths.ensure_directories().unwrap();

        assert!(paths.base_dir().exists());
        assert!(paths.keys_dir().exists());
        assert!(!paths.is_initialized());
    }
}
