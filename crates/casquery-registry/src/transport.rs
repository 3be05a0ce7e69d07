//! HTTP transport for registry requests.
//!
//! The [`Transport`] trait is the seam between the registry client and the
//! network. [`HttpTransport`] is the production implementation; it owns the
//! timeout and retry policy so the client never retries on its own.

use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    #[must_use]
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues blocking GET requests.
pub trait Transport {
    /// Fetch `url`. Non-2xx responses are returned, not turned into errors.
    fn get(&self, url: &str) -> Result<TransportResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &str) -> Result<TransportResponse> {
        (**self).get(url)
    }
}

/// Blocking `reqwest` transport with bounded timeout and linear-backoff retries.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    max_retries: u32,
    backoff: Duration,
}

impl HttpTransport {
    /// Build a transport from validated configuration.
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()
            .map_err(|e| RegistryError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
            backoff: config.retry_backoff(),
        })
    }

    fn send_once(&self, url: &str) -> Result<TransportResponse> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| RegistryError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        let status = response.status().as_u16();
        let body = response.text().map_err(|e| RegistryError::Transport {
            url: url.to_string(),
            message: format!("failed to read response body: {e}"),
        })?;
        Ok(TransportResponse { status, body })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<TransportResponse> {
        with_retries(url, self.max_retries, self.backoff, || self.send_once(url))
    }
}

/// Run `send` until it succeeds with a non-5xx status, fails with a
/// non-retryable error, or `max_retries` extra attempts have been made.
///
/// The wait before retry `n` is `backoff * n`.
pub fn with_retries<F>(
    url: &str,
    max_retries: u32,
    backoff: Duration,
    mut send: F,
) -> Result<TransportResponse>
where
    F: FnMut() -> Result<TransportResponse>,
{
    let mut attempt: u32 = 0;
    loop {
        debug!(url, attempt, "sending registry request");
        let outcome = send();
        let retryable = match &outcome {
            Ok(response) => response.status >= 500,
            Err(error) => error.is_retryable(),
        };
        if !retryable || attempt >= max_retries {
            return outcome;
        }
        attempt += 1;
        match &outcome {
            Ok(response) => {
                warn!(url, status = response.status, attempt, "retrying registry request");
            }
            Err(error) => warn!(url, %error, attempt, "retrying registry request"),
        }
        thread::sleep(backoff * attempt);
    }
}
