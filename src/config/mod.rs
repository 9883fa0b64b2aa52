//! Configuration module for mailseal
//!
//! This module provides configuration management including:
//! - Base directory resolution
//! - Settings persistence (KDF cost, secret source, key profile)

pub mod paths;
pub mod settings;

pub use paths::MailsealPaths;
pub use settings::{PgpSettings, Settings};
