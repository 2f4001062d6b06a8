//! Process configuration read from environment variables
//!
//! A `.env` file is honored for local development; deployed environments set
//! the variables directly.

use anyhow::Result;
use std::env;

const DEFAULT_PORT: u16 = 3000;

#[derive(Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,

    /// HS256 secret used to verify admin bearer tokens
    pub jwt_secret: String,
    pub jwt_issuer: Option<String>,
    pub jwt_audience: Option<String>,

    /// Comma-separated list of origins allowed by CORS; `None` means permissive
    pub cors_allowed_origins: Option<String>,

    pub rust_log: String,
    pub port: u16,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_audience", &self.jwt_audience)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("rust_log", &self.rust_log)
            .field("port", &self.port)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL is required"))?,
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET is required"))?,
            jwt_issuer: non_empty_var("JWT_ISSUER"),
            jwt_audience: non_empty_var("JWT_AUDIENCE"),
            cors_allowed_origins: non_empty_var("CORS_ALLOWED_ORIGINS"),
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "shoppost=debug".to_string()),
            port: parse_port(env::var("PORT").ok().as_deref()),
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_port(raw: Option<&str>) -> u16 {
    raw.and_then(|p| p.trim().parse().ok())
        .unwrap_or(DEFAULT_PORT)
}
