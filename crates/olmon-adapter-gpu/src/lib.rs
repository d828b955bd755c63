//! # olmon-adapter-gpu
//!
//! GPU telemetry backends for olmon.
//!
//! This crate provides:
//! - Per-device utilization, VRAM, temperature and power readings
//! - Dynamic loading of the NVIDIA management library
//! - A sysfs DRM fallback that reports adapter names and total VRAM
//! - A uniform [`TelemetrySource`] that degrades to an empty, unavailable state
//!
//! ## Supported Backends
//!
//! - **NVML**: NVIDIA Management Library, loaded at runtime
//! - **DRM**: Linux `/sys/class/drm` enumeration, names and total memory only
//! - **Mock**: deterministic devices for tests
//!
//! ## Example
//!
//! ```rust,no_run
//! use olmon_adapter_gpu::{BackendKind, TelemetryConfig, TelemetrySource};
//!
//! let config = TelemetryConfig::new(BackendKind::Nvml).with_fallback(true);
//! let mut source = TelemetrySource::open(&config);
//!
//! for device in source.snapshot() {
//!     println!("GPU {}: {} ({:.1}% VRAM)", device.index, device.name, device.vram_usage_percent());
//! }
//!
//! source.close();
//! ```

use thiserror::Error;

pub mod config;
pub mod drm;
pub mod source;

// Backend-specific modules
#[cfg(feature = "nvml")]
pub mod nvml;

// Mock implementation for testing
#[cfg(any(feature = "mock", test))]
pub mod mock;

// Re-export main types
pub use config::{BackendKind, TelemetryConfig};
pub use drm::DrmBackend;
pub use source::TelemetrySource;

#[cfg(feature = "nvml")]
pub use nvml::NvmlBackend;

#[cfg(any(feature = "mock", test))]
pub use mock::MockBackend;

/// Result type for GPU operations
pub type Result<T> = std::result::Result<T, GpuError>;

/// Errors that can occur while opening or querying a telemetry backend
#[derive(Error, Debug)]
pub enum GpuError {
    #[error("GPU backend not supported: {0}")]
    UnsupportedBackend(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Driver library not found: {0}")]
    LibraryNotFound(String),

    #[error("No GPU devices found: {0}")]
    NoDevices(String),

    #[error("NVML error: {0}")]
    NvmlError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<GpuError> for olmon_core::Error {
    fn from(err: GpuError) -> Self {
        match err {
            GpuError::Configuration(msg) => olmon_core::Error::config(msg),
            GpuError::Io(e) => olmon_core::Error::Io(e),
            other => olmon_core::Error::gpu_telemetry(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = GpuError::UnsupportedBackend("test-backend".to_string());
        assert_eq!(error.to_string(), "GPU backend not supported: test-backend");

        let error = GpuError::NoDevices("NVML reported zero devices".to_string());
        assert_eq!(error.to_string(), "No GPU devices found: NVML reported zero devices");
    }

    #[test]
    fn test_conversion_to_core_error() {
        let err: olmon_core::Error = GpuError::Configuration("bad".to_string()).into();
        assert_eq!(err.category(), "configuration");

        let err: olmon_core::Error = GpuError::NvmlError("init".to_string()).into();
        assert_eq!(err.category(), "gpu_telemetry");
        assert!(err.to_string().contains("NVML error: init"));
    }
}
