//! Application configuration loaded from environment.

use std::net::SocketAddr;

/// Application configuration loaded from `.env` and environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g. `0.0.0.0:8000`).
    pub server_addr: SocketAddr,
    /// Base URL of the hosted identity provider.
    pub gateway_url: String,
    /// Publishable (client-level) API key for the provider.
    pub gateway_publishable_key: String,
    /// Secret (admin-level) API key for the provider.
    pub gateway_secret_key: String,
    /// Secret for signing access tokens (min 32 chars).
    pub jwt_secret: String,
    /// Signing algorithm identifier (e.g. `HS256`).
    pub jwt_algorithm: String,
    /// Access token lifetime in minutes.
    pub access_token_ttl_minutes: i64,
    /// Log level: `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment. Call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        let server_addr = std::env::var("SERVER_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8000".to_string());
        let server_addr: SocketAddr = server_addr
            .parse()
            .map_err(|_| ConfigLoadError::InvalidServerAddr)?;

        let gateway_url = require("GATEWAY_URL")?;
        let gateway_publishable_key = require("GATEWAY_PUBLISHABLE_KEY")?;
        let gateway_secret_key = require("GATEWAY_SECRET_KEY")?;
        let jwt_secret = require("JWT_SECRET")?;

        let jwt_algorithm =
            std::env::var("JWT_ALGORITHM").unwrap_or_else(|_| "HS256".to_string());
        let access_token_ttl_minutes = std::env::var("ACCESS_TOKEN_TTL_MINUTES")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<i64>()
            .map_err(|_| ConfigLoadError::InvalidTtl)?;
        if access_token_ttl_minutes <= 0 {
            return Err(ConfigLoadError::InvalidTtl);
        }
        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            server_addr,
            gateway_url,
            gateway_publishable_key,
            gateway_secret_key,
            jwt_secret,
            jwt_algorithm,
            access_token_ttl_minutes,
            log_level,
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigLoadError> {
    std::env::var(name).map_err(|_| ConfigLoadError::MissingVar(name))
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Invalid SERVER_ADDR")]
    InvalidServerAddr,
    #[error("Invalid ACCESS_TOKEN_TTL_MINUTES")]
    InvalidTtl,
    #[error("Missing required environment variable {0}")]
    MissingVar(&'static str),
}
