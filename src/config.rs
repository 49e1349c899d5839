//! Configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! - `STONE_CART_API_URL` - Wishlist API base URL (default: http://127.0.0.1:8083/api)
//! - `STONE_CART_STORAGE_DIR` - Directory for persisted cart/likes (default: .stone-cart)
//! - `HOST` - Service bind address (default: 0.0.0.0)
//! - `PORT` - Service listen port (default: 8083)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8083/api";
const DEFAULT_STORAGE_DIR: &str = ".stone-cart";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8083;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub storage_dir: PathBuf,
    pub host: IpAddr,
    pub port: u16,
}

impl Config {
    /// Loads from the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads using an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = get("STONE_CART_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidEnvVar("STONE_CART_API_URL".into(), "must be an http(s) URL".into()));
        }
        let storage_dir = get("STONE_CART_STORAGE_DIR").map_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR), PathBuf::from);
        let host = get("HOST")
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::InvalidEnvVar("HOST".into(), e.to_string()))?;
        let port = match get("PORT") {
            Some(p) => p.parse().map_err(|e: std::num::ParseIntError| ConfigError::InvalidEnvVar("PORT".into(), e.to_string()))?,
            None => DEFAULT_PORT,
        };

        Ok(Self { api_url, storage_dir, host, port })
    }

    pub fn socket_addr(&self) -> SocketAddr { SocketAddr::new(self.host, self.port) }
}
