//! Access to the EPA Substance Registry Service (SRS).
//!
//! - [`RegistryConfig`]: base URL, timeout, and retry policy
//! - [`HttpTransport`]: blocking HTTP transport built from that config
//! - [`RegistryClient`]: CAS RN lookups with optional synonym expansion
//! - [`Resolver`]: maps superseded numbers to their current replacement
//!
//! # Example
//!
//! ```no_run
//! use casquery_model::normalize;
//! use casquery_registry::{Registry, RegistryClient, RegistryConfig, Resolver};
//!
//! let client = RegistryClient::from_config(&RegistryConfig::default())?;
//! let zinc = normalize("7440666")?;
//! for record in client.lookup(&zinc, true)? {
//!     println!("{} {:?}", record.cas_rn, record.systematic_name);
//! }
//!
//! let resolution = Resolver::new(&client).resolve(&normalize("29420-49-3")?)?;
//! println!("current: {}", resolution.current);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod resolver;
pub mod transport;
pub mod wire;

pub use client::{Registry, RegistryClient};
pub use config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, RegistryConfig};
pub use error::{ConfigError, RegistryError, ResolutionError, Result};
pub use resolver::{Resolution, Resolver, resolve_from_records};
pub use transport::{HttpTransport, Transport, TransportResponse, with_retries};
