//! # olmon-adapter-ollama
//!
//! Read-only client for a local Ollama server.
//!
//! This crate provides:
//! - Reachability probing via `GET /api/tags`
//! - Resident model listing via `GET /api/ps`
//! - Installed model catalog listing
//! - A narrow key-based field scanner for the response bodies
//!
//! Transport failures never escape the client. They are logged at `debug` and
//! surface as the unreachable signal defined by [`olmon_core::ModelService`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use olmon_adapter_ollama::{OllamaClient, ServiceConfig};
//! use olmon_core::ModelService;
//!
//! # async fn example() -> olmon_adapter_ollama::Result<()> {
//! let client = OllamaClient::new(ServiceConfig::default())?;
//! let poll = client.poll().await;
//! println!("service is {}, {} model(s) installed", poll.status, poll.catalog.len());
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

pub mod client;
pub mod config;
pub mod records;
pub mod scanner;

// Mock implementation for testing
#[cfg(any(feature = "mock", test))]
pub mod mock;

pub use client::OllamaClient;
pub use config::ServiceConfig;

#[cfg(any(feature = "mock", test))]
pub use mock::MockModelService;

/// Result type for service operations
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Errors that can occur while talking to the model service
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl From<ServiceError> for olmon_core::Error {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Configuration(msg) => olmon_core::Error::config(msg),
            ServiceError::Url(e) => olmon_core::Error::config(e.to_string()),
            ServiceError::Timeout(msg) => olmon_core::Error::timeout(msg),
            other => olmon_core::Error::network(other.to_string()),
        }
    }
}
