//! Model service configuration

use crate::{Result, ServiceError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Address the Ollama server listens on by default
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Model service client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL, `scheme://host[:port]`
    pub endpoint: Url,

    /// Time allowed to establish a connection
    pub connect_timeout: Duration,

    /// Time allowed for the whole request, including the body
    pub request_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL"),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(5),
        }
    }
}

impl ServiceConfig {
    /// Create a configuration for the given base URL with default timeouts
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            ..Default::default()
        }
    }

    /// Set the base URL from a string
    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self> {
        self.endpoint = Url::parse(endpoint)?;
        Ok(self)
    }

    /// Set the overall request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Absolute URL of an API path such as `/api/tags`
    ///
    /// Any path on the base URL is replaced, matching how the server mounts its API.
    pub fn endpoint_url(&self, path: &str) -> Result<Url> {
        Ok(self.endpoint.join(path)?)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.scheme() != "http" && self.endpoint.scheme() != "https" {
            return Err(ServiceError::Configuration(
                "Endpoint must use HTTP or HTTPS scheme".to_string(),
            ));
        }

        if self.endpoint.host_str().map_or(true, str::is_empty) {
            return Err(ServiceError::Configuration(
                "Endpoint must include a host".to_string(),
            ));
        }

        if self.connect_timeout.is_zero() || self.request_timeout.is_zero() {
            return Err(ServiceError::Configuration(
                "Timeouts must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
