//! Error handling for olmon
//!
//! Provides a unified error type and result type shared by the adapters and the CLI.
//! Adapter crates keep their own narrower error enums and convert into this one at
//! crate boundaries.

/// Result type alias for olmon operations
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for olmon
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    InvalidConfiguration(String),

    /// Network-related errors
    #[error("Network error: {0}")]
    Network(String),

    /// Operation timeout
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// GPU telemetry errors
    #[error("GPU telemetry error: {0}")]
    GpuTelemetry(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a GPU telemetry error
    pub fn gpu_telemetry(msg: impl Into<String>) -> Self {
        Self::GpuTelemetry(msg.into())
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Error::InvalidConfiguration(_) => "configuration",
            Error::Network(_) => "network",
            Error::Timeout(_) => "timeout",
            Error::GpuTelemetry(_) => "gpu_telemetry",
            Error::Io(_) => "io",
        }
    }

    /// Check if this error is a closed output pipe (e.g. `olmon | head`)
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::BrokenPipe)
    }
}
