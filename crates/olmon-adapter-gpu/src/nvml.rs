//! NVML (NVIDIA Management Library) backend

use crate::{GpuError, Result};
use nvml_wrapper::enum_wrappers::device::TemperatureSensor;
use nvml_wrapper::Nvml;
use olmon_core::{DeviceSnapshot, TelemetryBackend};
use std::path::Path;
use tracing::{debug, info, warn};

/// Locations the driver installs the library to, tried after the system search path
const WELL_KNOWN_PATHS: &[&str] = &[
    "/usr/lib/x86_64-linux-gnu/libnvidia-ml.so.1",
    "/usr/lib64/libnvidia-ml.so.1",
    "/usr/lib/wsl/lib/libnvidia-ml.so.1",
    r"C:\Program Files\NVIDIA Corporation\NVSMI\nvml.dll",
];

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// NVML telemetry backend
///
/// Owns the library handle for the lifetime of the process. The handle is
/// released by [`TelemetryBackend::close`] or on drop, whichever comes first.
pub struct NvmlBackend {
    nvml: Option<Nvml>,
    device_count: u32,
}

impl NvmlBackend {
    /// Load the library, initialize it and count devices
    ///
    /// The system search path is tried first, then [`WELL_KNOWN_PATHS`].
    /// Zero devices is reported as an error.
    pub fn open() -> Result<Self> {
        let nvml = Self::load()?;

        let device_count = nvml
            .device_count()
            .map_err(|e| GpuError::NvmlError(format!("device count: {}", e)))?;

        if device_count == 0 {
            if let Err(e) = nvml.shutdown() {
                debug!("NVML shutdown after empty enumeration failed: {}", e);
            }
            return Err(GpuError::NoDevices("NVML reported zero devices".to_string()));
        }

        info!("NVML initialized with {} device(s)", device_count);

        Ok(Self {
            nvml: Some(nvml),
            device_count,
        })
    }

    fn load() -> Result<Nvml> {
        let mut last_error = match Nvml::init() {
            Ok(nvml) => return Ok(nvml),
            Err(e) => {
                debug!("NVML not found on the system search path: {}", e);
                e.to_string()
            }
        };

        for candidate in WELL_KNOWN_PATHS {
            let path = Path::new(candidate);
            if !path.exists() {
                continue;
            }
            match Nvml::builder().lib_path(path.as_os_str()).init() {
                Ok(nvml) => {
                    debug!("Loaded NVML from {}", candidate);
                    return Ok(nvml);
                }
                Err(e) => {
                    debug!("Failed to load NVML from {}: {}", candidate, e);
                    last_error = e.to_string();
                }
            }
        }

        Err(GpuError::LibraryNotFound(last_error))
    }

    fn read_device(nvml: &Nvml, index: u32) -> DeviceSnapshot {
        let device = match nvml.device_by_index(index) {
            Ok(device) => device,
            Err(e) => {
                debug!("GPU {}: handle unavailable: {}", index, e);
                return DeviceSnapshot::unavailable(index);
            }
        };

        let mut snapshot = DeviceSnapshot::new(index, String::new());

        match device.name() {
            Ok(name) => snapshot.name = name,
            Err(e) => debug!("GPU {}: name query failed: {}", index, e),
        }

        match device.memory_info() {
            Ok(memory) => {
                snapshot.total_vram_gb = memory.total as f64 / BYTES_PER_GIB;
                snapshot.used_vram_gb = memory.used as f64 / BYTES_PER_GIB;
                snapshot.free_vram_gb = memory.free as f64 / BYTES_PER_GIB;
            }
            Err(e) => debug!("GPU {}: memory query failed: {}", index, e),
        }

        match device.utilization_rates() {
            Ok(utilization) => snapshot.utilization_percent = f64::from(utilization.gpu),
            Err(e) => debug!("GPU {}: utilization query failed: {}", index, e),
        }

        match device.temperature(TemperatureSensor::Gpu) {
            Ok(celsius) => snapshot.temperature_c = i32::try_from(celsius).unwrap_or(i32::MAX),
            Err(e) => debug!("GPU {}: temperature query failed: {}", index, e),
        }

        match device.power_usage() {
            Ok(milliwatts) => snapshot.power_watts = milliwatts_to_watts(milliwatts),
            Err(e) => debug!("GPU {}: power query failed: {}", index, e),
        }

        snapshot
    }
}

impl TelemetryBackend for NvmlBackend {
    fn name(&self) -> &'static str {
        "nvml"
    }

    fn snapshot(&mut self) -> Vec<DeviceSnapshot> {
        let Some(nvml) = &self.nvml else {
            return Vec::new();
        };
        (0..self.device_count)
            .map(|index| Self::read_device(nvml, index))
            .collect()
    }

    fn close(&mut self) {
        if let Some(nvml) = self.nvml.take() {
            match nvml.shutdown() {
                Ok(()) => info!("NVML shut down"),
                Err(e) => warn!("NVML shutdown failed: {}", e),
            }
        }
    }
}

impl Drop for NvmlBackend {
    fn drop(&mut self) {
        self.close();
    }
}

/// Truncating milliwatt to watt conversion
fn milliwatts_to_watts(milliwatts: u32) -> i32 {
    i32::try_from(milliwatts / 1000).unwrap_or(i32::MAX)
}
