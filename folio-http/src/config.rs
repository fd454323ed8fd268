use std::{env, fmt::Display, fs::read_to_string, path::PathBuf, str::FromStr};

use folio_core::store::Backend;
use folio_core::{FolioError, Result, TokenSettings};
use tracing::{info, warn};

pub const IN_MEMORY_DATABASE: &str = ":memory:";

#[derive(Debug)]
pub struct Config {
    pub port: u16,
    /// File path of the libSQL database, or `:memory:` for the process-local store.
    pub database: String,
    pub storage_root: PathBuf,
    pub tokens: TokenSettings,
    pub cookie_name: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        Ok(Self {
            port: try_load("FOLIO_PORT", "3000")?,
            database: try_load("FOLIO_DATABASE", "./db/folio.db")?,
            storage_root: try_load("FOLIO_STORAGE_ROOT", "./storage")?,
            tokens: TokenSettings::from_hex(&read_secret()?, try_load("FOLIO_TOKEN_HOURS", "24")?)?,
            cookie_name: try_load("FOLIO_COOKIE_NAME", folio_core::token::DEFAULT_COOKIE_NAME)?,
        })
    }

    pub fn backend(&self) -> Backend {
        if self.database == IN_MEMORY_DATABASE {
            Backend::Memory
        } else {
            Backend::Sqlite(PathBuf::from(&self.database))
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
            FolioError::Config(format!("{key}: {e}"))
        })
}

/// Signing key as hex, inline or from a secrets file.
fn read_secret() -> Result<String> {
    if let Ok(secret) = env::var("FOLIO_TOKEN_SECRET") {
        return Ok(secret);
    }
    let path = env::var("FOLIO_TOKEN_SECRET_FILE").map_err(|_| {
        FolioError::Config("FOLIO_TOKEN_SECRET or FOLIO_TOKEN_SECRET_FILE must be set".into())
    })?;
    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|e| {
            warn!("Failed to read token secret from {path}: {e}");
            FolioError::Config(format!("token secret file {path}: {e}"))
        })
}
