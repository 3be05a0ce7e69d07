//! Registry connection settings.
//!
//! Settings are read from an optional TOML file and then overridden field by
//! field from the command line. Every field has a default, so an empty file
//! is a valid configuration:
//!
//! ```toml
//! base_url = "https://cdxapps.epa.gov/oms-substance-registry-services/rest-api"
//! timeout_secs = 5
//! max_retries = 2
//! retry_backoff_ms = 500
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Root of the EPA SRS REST API.
pub const DEFAULT_BASE_URL: &str =
    "https://cdxapps.epa.gov/oms-substance-registry-services/rest-api";

/// Per-request timeout when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// User agent string for registry requests.
pub const DEFAULT_USER_AGENT: &str = concat!("casquery/", env!("CARGO_PKG_VERSION"));

/// Transport configuration for the registry client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Base URL of the REST API, without a trailing slash.
    pub base_url: String,
    /// Upper bound on a single request, in seconds. Must be non-zero.
    pub timeout_secs: u64,
    /// Extra attempts after a transport failure or 5xx response.
    pub max_retries: u32,
    /// Delay before the first retry; later retries wait proportionally longer.
    pub retry_backoff_ms: u64,
    pub user_agent: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: 2,
            retry_backoff_ms: 500,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl RegistryConfig {
    /// Load and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Override the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the request timeout.
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Override the retry count.
    #[must_use]
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Check that the settings describe a usable, bounded transport.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                message: "timeout_secs must be greater than zero".to_string(),
            });
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                message: format!("base_url '{}' must be an http(s) URL", self.base_url),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}
