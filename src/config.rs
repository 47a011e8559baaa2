//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 8083)
//! - `CATALOG_PATH` - JSON catalog snapshot loaded at startup (default: data/catalog.json)
//! - `CATALOG_LATENCY_MS` - Artificial delay before catalog reads, for local development (default: 0)
//! - `CATALOG_PAGINATE_SEARCH` - Paginate search results like listings (default: false)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub catalog_path: PathBuf,
    /// Delay applied before each catalog read. Zero disables it.
    pub latency: Duration,
    pub paginate_search: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8083,
            catalog_path: PathBuf::from("data/catalog.json"),
            latency: Duration::ZERO,
            paginate_search: false,
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults for
    /// unset variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let latency_ms: u64 = parse_or(&lookup, "CATALOG_LATENCY_MS", 0)?;
        Ok(Self {
            host: parse_or(&lookup, "HOST", defaults.host)?,
            port: parse_or(&lookup, "PORT", defaults.port)?,
            catalog_path: lookup("CATALOG_PATH").map_or(defaults.catalog_path, PathBuf::from),
            latency: Duration::from_millis(latency_ms),
            paginate_search: parse_or(&lookup, "CATALOG_PAGINATE_SEARCH", defaults.paginate_search)?,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        _ => Ok(default),
    }
}
