//! Mock GPU backend for testing

use crate::config::TelemetryConfig;
use crate::{GpuError, Result};
use olmon_core::{DeviceSnapshot, TelemetryBackend};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::info;

/// Mock telemetry backend reporting a fixed set of devices
#[derive(Debug, Clone)]
pub struct MockBackend {
    devices: Vec<DeviceSnapshot>,
    open: bool,
    releases: Arc<AtomicUsize>,
}

impl MockBackend {
    /// Create a mock backend with `count` realistic devices
    pub fn new(count: u32) -> Self {
        Self::with_devices((0..count).map(create_mock_device).collect())
    }

    /// Create a mock backend reporting exactly the given snapshots
    pub fn with_devices(devices: Vec<DeviceSnapshot>) -> Self {
        Self {
            devices,
            open: true,
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a mock backend from configuration
    pub fn from_config(config: &TelemetryConfig) -> Result<Self> {
        if config.mock_devices == 0 {
            return Err(GpuError::NoDevices("mock backend configured with zero devices".to_string()));
        }
        info!("Creating mock GPU backend with {} device(s)", config.mock_devices);
        Ok(Self::new(config.mock_devices))
    }

    /// Counter incremented each time the handle is actually released
    pub fn release_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.releases)
    }
}

impl TelemetryBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn snapshot(&mut self) -> Vec<DeviceSnapshot> {
        if !self.open {
            return Vec::new();
        }
        self.devices.clone()
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Deterministic device values that vary by index
fn create_mock_device(index: u32) -> DeviceSnapshot {
    let mut device = DeviceSnapshot::new(index, format!("Mock GPU {}", index));
    device.total_vram_gb = 24.0;
    device.used_vram_gb = 6.0 + f64::from(index) * 4.0;
    device.free_vram_gb = device.total_vram_gb - device.used_vram_gb;
    device.utilization_percent = 35.0 + f64::from(index) * 20.0;
    device.temperature_c = 55 + index as i32 * 10;
    device.power_watts = 120 + index as i32 * 60;
    device
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_devices() {
        let mut backend = MockBackend::new(2);
        let devices = backend.snapshot();

        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].name, "Mock GPU 0");
        assert_eq!(devices[1].index, 1);
        assert!((devices[0].vram_usage_percent() - 25.0).abs() < 1e-9);
        assert_eq!(devices[1].temperature_c, 65);
    }

    #[test]
    fn test_from_config() {
        assert!(MockBackend::from_config(&TelemetryConfig::default()).is_err());

        let config = TelemetryConfig::default().with_mock_devices(3);
        let mut backend = MockBackend::from_config(&config).unwrap();
        assert_eq!(backend.snapshot().len(), 3);
    }

    #[test]
    fn test_close_releases_once() {
        let mut backend = MockBackend::new(1);
        let releases = backend.release_counter();

        backend.close();
        backend.close();

        assert_eq!(releases.load(Ordering::SeqCst), 1);
        assert!(backend.snapshot().is_empty());
    }
}
