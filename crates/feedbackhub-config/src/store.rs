//! Document store backend selection.
//!
//! `STORE_BACKEND` picks the backend: `postgres` (default, requires
//! `DATABASE_URL`) or `memory` (process-local, for development and demos).

use std::env;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("unknown store backend '{0}' (expected 'postgres' or 'memory')")]
    UnknownBackend(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres { database_url: String },
    Memory,
}

impl StoreBackend {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::parse(
            env::var("STORE_BACKEND").ok().as_deref(),
            env::var("DATABASE_URL").ok(),
        )
    }

    pub fn parse(backend: Option<&str>, database_url: Option<String>) -> Result<Self, ConfigError> {
        match backend.map(|b| b.trim().to_lowercase()).as_deref() {
            None | Some("") | Some("postgres") => database_url
                .filter(|url| !url.trim().is_empty())
                .map(|database_url| Self::Postgres { database_url })
                .ok_or(ConfigError::Missing("DATABASE_URL")),
            Some("memory") => Ok(Self::Memory),
            Some(other) => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}
