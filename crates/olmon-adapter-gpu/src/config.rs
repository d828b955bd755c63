//! Telemetry source configuration

use crate::{GpuError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Telemetry backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendKind {
    /// NVIDIA Management Library
    Nvml,
    /// Linux DRM sysfs enumeration
    Drm,
    /// Mock backend for testing
    Mock,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Nvml => write!(f, "nvml"),
            BackendKind::Drm => write!(f, "drm"),
            BackendKind::Mock => write!(f, "mock"),
        }
    }
}

/// Telemetry source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Backend tried first
    pub preferred: BackendKind,

    /// Fall back to DRM enumeration when NVML cannot be opened
    pub fallback_enabled: bool,

    /// Number of devices the mock backend reports
    pub mock_devices: u32,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            preferred: BackendKind::Nvml,
            fallback_enabled: true,
            mock_devices: 0,
        }
    }
}

impl TelemetryConfig {
    /// Create a new configuration preferring the given backend
    pub fn new(preferred: BackendKind) -> Self {
        Self {
            preferred,
            ..Default::default()
        }
    }

    /// Enable or disable the DRM fallback
    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.fallback_enabled = enabled;
        self
    }

    /// Set the number of mock devices
    pub fn with_mock_devices(mut self, count: u32) -> Self {
        self.mock_devices = count;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.preferred == BackendKind::Mock && self.mock_devices == 0 {
            return Err(GpuError::Configuration(
                "Mock backend requires at least one device".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_display() {
        assert_eq!(BackendKind::Nvml.to_string(), "nvml");
        assert_eq!(BackendKind::Drm.to_string(), "drm");
        assert_eq!(BackendKind::Mock.to_string(), "mock");
    }

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.preferred, BackendKind::Nvml);
        assert!(config.fallback_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_and_validation() {
        let config = TelemetryConfig::new(BackendKind::Drm).with_fallback(false);
        assert!(!config.fallback_enabled);
        assert!(config.validate().is_ok());

        let mock = TelemetryConfig::new(BackendKind::Mock);
        assert!(matches!(mock.validate(), Err(GpuError::Configuration(_))));
        assert!(mock.with_mock_devices(2).validate().is_ok());
    }
}
