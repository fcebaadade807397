//! Process configuration, loaded once at startup.
//!
//! # Design
//! `AppConfig` is immutable after `from_env` returns. The gate, the CORS layer
//! and the store initializer receive it (or pieces of it) by value; nothing
//! reads the environment at request time.
//!
//! # Environment Variables
//!
//! - `API_KEY`: shared secret expected in `X-API-KEY` (required)
//! - `DATABASE_URL`: SQLite URL (default: `sqlite://todos.db?mode=rwc`)
//! - `CORS_ALLOWED_ORIGINS`: comma-separated origins (default: `http://localhost:5173`)
//! - `APP_HOST`: bind host (default: `127.0.0.1`)
//! - `APP_PORT`: bind port (default: `5000`)

use std::env;
use std::str::FromStr;

use axum::http::HeaderValue;
use thiserror::Error;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://todos.db?mode=rwc";
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:5173";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_key: String,
    pub database_url: String,
    pub allowed_origins: Vec<HeaderValue>,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    /// Read the process environment, after loading `.env` if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. `from_env` is this over `env::var`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup("API_KEY")
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("API_KEY".to_string()))?;
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let origins = lookup("CORS_ALLOWED_ORIGINS").unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string());
        let allowed_origins = parse_origins(&origins)?;
        let host = lookup("APP_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parsed(&lookup, "APP_PORT", 5000)?;

        Ok(Self {
            api_key,
            database_url,
            allowed_origins,
            host,
            port,
        })
    }

    /// Config for tests and embedding: in-memory database, no CORS origins.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            database_url: "sqlite::memory:".to_string(),
            allowed_origins: Vec::new(),
            host: "127.0.0.1".to_string(),
            port: 0,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|err| ConfigError::InvalidValue {
                key: "CORS_ALLOWED_ORIGINS".to_string(),
                message: format!("{origin:?}: {err}"),
            })
        })
        .collect()
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|err: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: err.to_string(),
        }),
    }
}
