//! Error types for registry access and CAS RN resolution.

use std::path::PathBuf;

use casquery_model::{Casrn, NormalizationError};
use thiserror::Error;

/// Failures talking to the remote registry.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    ClientBuild(String),

    /// Connection, timeout, or body read failure.
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The registry answered with a non-2xx status.
    #[error("registry returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// The body was not JSON at all.
    #[error("registry response from {url} is not valid JSON: {source}")]
    Malformed {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The body was JSON but not shaped like a substance list.
    #[error("unexpected registry response from {url}: {detail}")]
    UnexpectedShape { url: String, detail: String },
}

impl RegistryError {
    /// Returns whether retrying the same request might succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            Self::ClientBuild(_) | Self::Malformed { .. } | Self::UnexpectedShape { .. } => false,
        }
    }
}

/// Failures resolving a CAS RN to its current number.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// The registry has no record for the number.
    #[error("no registry record for CAS RN {casrn}")]
    NotFound { casrn: Casrn },

    /// The registry reported a current number that is not a CAS RN.
    #[error("registry reports current number '{value}' for {casrn}, which is not a CAS RN")]
    InvalidCurrent {
        casrn: Casrn,
        value: String,
        #[source]
        source: NormalizationError,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Failures loading registry configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid registry config: {message}")]
    Invalid { message: String },
}

pub type Result<T> = std::result::Result<T, RegistryError>;
