//! Core type definitions for olmon

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Point-in-time reading of one GPU device
///
/// Created fresh on every poll and never mutated afterwards. An entry with
/// `available == false` carries only its `index`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub available: bool,
    /// Position in enumeration order
    pub index: u32,
    pub name: String,
    pub total_vram_gb: f64,
    pub used_vram_gb: f64,
    pub free_vram_gb: f64,
    /// GPU utilization in percent, 0 to 100
    pub utilization_percent: f64,
    pub temperature_c: i32,
    pub power_watts: i32,
}

impl DeviceSnapshot {
    /// Create an available device with the given name and no metrics yet
    pub fn new(index: u32, name: impl Into<String>) -> Self {
        Self {
            available: true,
            index,
            name: name.into(),
            ..Self::default()
        }
    }

    /// Create an entry for a device whose handle could not be obtained
    pub fn unavailable(index: u32) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    /// Percentage of VRAM in use, 0 when the total is unknown
    pub fn vram_usage_percent(&self) -> f64 {
        if self.total_vram_gb > 0.0 {
            self.used_vram_gb / self.total_vram_gb * 100.0
        } else {
            0.0
        }
    }
}

/// A model the service reports as resident in memory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadedModelRecord {
    pub name: String,
    pub model_id: String,
    pub digest: String,
    pub size_bytes: i64,
    /// ISO-8601 expiry timestamp as sent by the service
    pub expires_at: String,
    pub parent_model: String,
    pub format: String,
    pub family: String,
    pub families: Vec<String>,
    pub parameter_size: String,
    pub quantization_level: String,
}

/// A model present in the service's catalog, loaded or not
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstalledModelRecord {
    pub name: String,
    pub model_id: String,
    pub digest: String,
    pub modified_at: String,
    pub size_bytes: i64,
}

/// Reachability and residency state of the model service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum ServiceSnapshot {
    /// The service did not answer, or answered with something unusable
    #[default]
    Unreachable,
    /// The service answered; `loaded` may be empty
    Reachable { loaded: Vec<LoadedModelRecord> },
}

impl ServiceSnapshot {
    pub fn is_reachable(&self) -> bool {
        matches!(self, ServiceSnapshot::Reachable { .. })
    }

    /// Loaded models, empty when unreachable
    pub fn loaded(&self) -> &[LoadedModelRecord] {
        match self {
            ServiceSnapshot::Reachable { loaded } => loaded,
            ServiceSnapshot::Unreachable => &[],
        }
    }
}

impl fmt::Display for ServiceSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceSnapshot::Unreachable => write!(f, "unreachable"),
            ServiceSnapshot::Reachable { loaded } => {
                write!(f, "reachable ({} loaded)", loaded.len())
            }
        }
    }
}

/// Full input to one render pass
///
/// Every tick builds a new frame; nothing is cached between ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub devices: Vec<DeviceSnapshot>,
    pub service: ServiceSnapshot,
    pub catalog: Vec<InstalledModelRecord>,
    pub captured_at: DateTime<Local>,
}

impl Frame {
    /// Assemble a frame stamped with the current local time
    pub fn capture(
        devices: Vec<DeviceSnapshot>,
        service: ServiceSnapshot,
        catalog: Vec<InstalledModelRecord>,
    ) -> Self {
        Self {
            devices,
            service,
            catalog,
            captured_at: Local::now(),
        }
    }

    /// Devices that reported successfully
    pub fn available_devices(&self) -> impl Iterator<Item = &DeviceSnapshot> {
        self.devices.iter().filter(|d| d.available)
    }
}
