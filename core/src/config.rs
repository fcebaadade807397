//! Where the client finds the API.
//!
//! The base URL and key are baked in at build time from `TODO_API_BASE_URL`
//! and `TODO_API_KEY`. A missing value is a configuration error reported at
//! startup, before any request is attempted.

use thiserror::Error;

use crate::client::TodoClient;

pub const BASE_URL_VAR: &str = "TODO_API_BASE_URL";
pub const API_KEY_VAR: &str = "TODO_API_KEY";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} is not defined in the build environment")]
    Missing(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
}

impl ClientConfig {
    pub fn from_build_env() -> Result<Self, ConfigError> {
        Self::with_overrides(None, None)
    }

    /// Explicit values win; anything missing falls back to the build environment.
    pub fn with_overrides(base_url: Option<&str>, api_key: Option<&str>) -> Result<Self, ConfigError> {
        Self::from_values(
            base_url.or(option_env!("TODO_API_BASE_URL")),
            api_key.or(option_env!("TODO_API_KEY")),
        )
    }

    /// Empty strings count as missing.
    pub fn from_values(base_url: Option<&str>, api_key: Option<&str>) -> Result<Self, ConfigError> {
        let base_url = base_url
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing(BASE_URL_VAR))?;
        let api_key = api_key
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing(API_KEY_VAR))?;
        Ok(Self {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn client(&self) -> TodoClient {
        TodoClient::new(&self.base_url, &self.api_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_values_present() {
        let config = ClientConfig::from_values(Some("http://localhost:5000"), Some("k")).unwrap();
        assert_eq!(config.client().base_url(), "http://localhost:5000");
    }

    #[test]
    fn overrides_beat_the_build_environment() {
        let config = ClientConfig::with_overrides(Some("http://override"), Some("key")).unwrap();
        assert_eq!(config.base_url, "http://override");
        assert_eq!(config.api_key, "key");
    }

    #[test]
    fn build_env_is_the_override_free_path() {
        let expected = ClientConfig::from_values(
            option_env!("TODO_API_BASE_URL"),
            option_env!("TODO_API_KEY"),
        );
        assert_eq!(ClientConfig::from_build_env(), expected);
        assert_eq!(ClientConfig::from_build_env(), ClientConfig::with_overrides(None, None));
    }

    #[test]
    fn base_url_is_checked_first() {
        assert_eq!(
            ClientConfig::from_values(None, None),
            Err(ConfigError::Missing(BASE_URL_VAR))
        );
        assert_eq!(
            ClientConfig::from_values(Some("http://x"), Some("")),
            Err(ConfigError::Missing(API_KEY_VAR))
        );
    }
}
