//! Process configuration read from the environment

use std::path::PathBuf;

use anyhow::{Context, Result};

/// Runtime configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: String,
    /// Read-only SQLite word corpus
    pub vocab_db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
}

impl Config {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got {raw:?}"))?,
            None => 3000,
        };

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("DB_MAX_CONNECTIONS must be a number, got {raw:?}"))?,
            None => 10,
        };

        Ok(Self {
            database_url,
            vocab_db_path: lookup("VOCAB_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("vocab.db")),
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            db_max_connections,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
