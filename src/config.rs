//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// Development-only fallback for the privileged login.
const DEV_ADMIN_IDENTIFIER: &str = "admin@bandtest.com";
const DEV_ADMIN_SECRET: &str = "admin123";

/// Which credential verifier seals and checks account secrets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialScheme {
    /// Stored verbatim, compared by exact match
    Plaintext,
    /// Salted SHA-256 digest
    Sha256,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON file backing the key-value store
    pub store_path: PathBuf,

    /// Prefix for every storage namespace
    pub key_prefix: String,

    /// Privileged login identifier
    pub admin_identifier: String,

    /// Privileged login secret
    pub admin_secret: String,

    /// Credential scheme for account secrets
    pub credentials: CredentialScheme,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let production = environment == "production";

        let store_path = env::var("LEDGER_STORE_PATH")
            .unwrap_or_else(|_| "chip_ledger.json".to_string())
            .into();

        let key_prefix = env::var("LEDGER_KEY_PREFIX").unwrap_or_else(|_| "chip_ledger".to_string());
        if key_prefix.trim().is_empty() {
            return Err(ConfigError::InvalidValue("LEDGER_KEY_PREFIX"));
        }

        let admin_identifier = admin_var("LEDGER_ADMIN_IDENTIFIER", DEV_ADMIN_IDENTIFIER, production)?;
        let admin_secret = admin_var("LEDGER_ADMIN_SECRET", DEV_ADMIN_SECRET, production)?;

        let credentials = match env::var("LEDGER_CREDENTIALS")
            .unwrap_or_else(|_| "plaintext".to_string())
            .as_str()
        {
            "plaintext" => CredentialScheme::Plaintext,
            "sha256" => CredentialScheme::Sha256,
            _ => return Err(ConfigError::InvalidValue("LEDGER_CREDENTIALS")),
        };

        Ok(Self {
            store_path,
            key_prefix,
            admin_identifier,
            admin_secret,
            credentials,
            environment,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("chip_ledger.json"),
            key_prefix: "chip_ledger".to_string(),
            admin_identifier: DEV_ADMIN_IDENTIFIER.to_string(),
            admin_secret: DEV_ADMIN_SECRET.to_string(),
            credentials: CredentialScheme::Plaintext,
            environment: "development".to_string(),
        }
    }
}

// Production refuses to fall back to the well-known development pair.
fn admin_var(name: &'static str, fallback: &str, production: bool) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        Ok(_) => Err(ConfigError::InvalidValue(name)),
        Err(_) if production => Err(ConfigError::MissingEnv(name)),
        Err(_) => Ok(fallback.to_string()),
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
