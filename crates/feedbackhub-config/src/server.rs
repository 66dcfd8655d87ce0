//! Server listen addresses and edit-session lifetime.
//!
//! - `SERVER_HOST` (default `0.0.0.0`), `SERVER_PORT` (default `3000`)
//! - `METRICS_PORT` (default `9090`)
//! - `EDIT_SESSION_TTL_SECS`: idle edit sessions older than this are evicted
//!   (default `7200`)

use std::env;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub metrics_port: u16,
    pub edit_session_ttl: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            metrics_port: 9090,
            edit_session_ttl: Duration::from_secs(2 * 60 * 60),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: env::var("SERVER_HOST").unwrap_or(defaults.host),
            port: parse_env("SERVER_PORT").unwrap_or(defaults.port),
            metrics_port: parse_env("METRICS_PORT").unwrap_or(defaults.metrics_port),
            edit_session_ttl: parse_env("EDIT_SESSION_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.edit_session_ttl),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn metrics_address(&self) -> String {
        format!("{}:{}", self.host, self.metrics_port)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
