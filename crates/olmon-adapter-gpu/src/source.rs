//! Uniform telemetry source over the available backends

use crate::config::{BackendKind, TelemetryConfig};
use crate::{DrmBackend, Result};
use olmon_core::{DeviceSnapshot, TelemetryBackend};
use tracing::{debug, info, warn};

/// GPU telemetry source used by the refresh loop
///
/// Opening never fails: when no backend can be opened the source stays
/// unavailable for the rest of the process and every snapshot is empty.
pub struct TelemetrySource {
    backend: Option<Box<dyn TelemetryBackend>>,
}

impl TelemetrySource {
    /// Open the preferred backend, falling back to DRM when allowed
    pub fn open(config: &TelemetryConfig) -> Self {
        if let Err(e) = config.validate() {
            warn!("Invalid telemetry configuration: {}", e);
            return Self::unavailable();
        }

        match open_backend(config) {
            Ok(backend) => {
                info!("GPU telemetry backend opened: {}", backend.name());
                Self::from_backend(backend)
            }
            Err(e) => {
                info!("GPU telemetry unavailable: {}", e);
                Self::unavailable()
            }
        }
    }

    /// Wrap an already opened backend
    pub fn from_backend(backend: Box<dyn TelemetryBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// A source with no backend
    pub fn unavailable() -> Self {
        Self { backend: None }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Name of the active backend, `"none"` when unavailable
    pub fn backend_name(&self) -> &'static str {
        self.backend.as_ref().map_or("none", |b| b.name())
    }

    /// Read every device once; empty when unavailable
    pub fn snapshot(&mut self) -> Vec<DeviceSnapshot> {
        match self.backend.as_mut() {
            Some(backend) => backend.snapshot(),
            None => Vec::new(),
        }
    }

    /// Release the backend. Later calls do nothing.
    pub fn close(&mut self) {
        if let Some(mut backend) = self.backend.take() {
            debug!("Closing GPU telemetry backend: {}", backend.name());
            backend.close();
        }
    }
}

impl Drop for TelemetrySource {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for TelemetrySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetrySource")
            .field("backend", &self.backend_name())
            .finish()
    }
}

fn open_backend(config: &TelemetryConfig) -> Result<Box<dyn TelemetryBackend>> {
    match config.preferred {
        BackendKind::Nvml => match open_nvml() {
            Ok(backend) => Ok(backend),
            Err(e) if config.fallback_enabled => {
                debug!("NVML unavailable ({}), trying DRM fallback", e);
                Ok(Box::new(DrmBackend::open()?))
            }
            Err(e) => Err(e),
        },

        BackendKind::Drm => Ok(Box::new(DrmBackend::open()?)),

        #[cfg(any(feature = "mock", test))]
        BackendKind::Mock => Ok(Box::new(crate::mock::MockBackend::from_config(config)?)),

        #[cfg(not(any(feature = "mock", test)))]
        BackendKind::Mock => Err(crate::GpuError::UnsupportedBackend(BackendKind::Mock.to_string())),
    }
}

#[cfg(feature = "nvml")]
fn open_nvml() -> Result<Box<dyn TelemetryBackend>> {
    let backend = crate::nvml::NvmlBackend::open()?;
    Ok(Box::new(backend))
}

#[cfg(not(feature = "nvml"))]
fn open_nvml() -> Result<Box<dyn TelemetryBackend>> {
    Err(crate::GpuError::UnsupportedBackend(format!(
        "{} (feature not enabled)",
        BackendKind::Nvml
    )))
}
