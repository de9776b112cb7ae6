//! Endpoint and credential configuration.
//!
//! Loaded from a TOML file:
//!
//! ```toml
//! base_url = "https://configurator.example.com/api"
//! api_key = "..."
//! timeout_secs = 30
//! ```
//!
//! or from the `PRODCONF_API_URL`, `PRODCONF_API_KEY` and optional
//! `PRODCONF_API_TIMEOUT` environment variables.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

/// Environment variable holding the API base URL.
pub const ENV_URL: &str = "PRODCONF_API_URL";
/// Environment variable holding the API key.
pub const ENV_KEY: &str = "PRODCONF_API_KEY";
/// Environment variable holding the request timeout in seconds.
pub const ENV_TIMEOUT: &str = "PRODCONF_API_TIMEOUT";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Where the API lives and how to authenticate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL, e.g. `https://configurator.example.com/api`.
    #[serde(default)]
    pub base_url: String,
    /// Bearer key sent with every request.
    #[serde(default)]
    pub api_key: String,
    /// Per-request timeout.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Read the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Fails with [`ApiError::MissingConfig`] when the URL or key is unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through a variable lookup function.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup(ENV_URL).ok_or(ApiError::MissingConfig(ENV_URL))?;
        let api_key = lookup(ENV_KEY).ok_or(ApiError::MissingConfig(ENV_KEY))?;
        let timeout_secs = match lookup(ENV_TIMEOUT) {
            Some(v) => v
                .trim()
                .parse()
                .map_err(|_| ApiError::InvalidConfig(format!("{ENV_TIMEOUT}={v:?} is not a number")))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let config = Self {
            base_url,
            api_key,
            timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }

    /// Read the configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ApiError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ApiConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every required setting is usable.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(ApiError::MissingConfig("base_url"));
        }
        if self.api_key.trim().is_empty() {
            return Err(ApiError::MissingConfig("api_key"));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ApiError::InvalidConfig(format!(
                "base_url must start with http:// or https://, got {:?}",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ApiError::InvalidConfig("timeout_secs must be positive".into()));
        }
        Ok(())
    }
}
