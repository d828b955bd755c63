//! Linux DRM fallback backend
//!
//! Enumerates `/sys/class/drm/card*` when the vendor library is unavailable.
//! Only the adapter name and total VRAM are known here; usage, utilization,
//! temperature and power are reported as zero.

use crate::{GpuError, Result};
use olmon_core::{DeviceSnapshot, TelemetryBackend};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default sysfs root for DRM devices
pub const SYSFS_DRM_ROOT: &str = "/sys/class/drm";

/// `(vendor, device)` pairs of software or virtual adapters that are never reported
const SOFTWARE_ADAPTERS: &[(u32, u32)] = &[
    // Microsoft Basic Render Driver
    (0x1414, 0x008c),
    (0x1414, 0x0000),
];

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// A display adapter found under the DRM root
#[derive(Debug, Clone, PartialEq)]
struct Adapter {
    name: String,
    total_vram_bytes: u64,
}

/// DRM sysfs telemetry backend
#[derive(Debug)]
pub struct DrmBackend {
    adapters: Vec<Adapter>,
    closed: bool,
}

impl DrmBackend {
    /// Enumerate adapters under [`SYSFS_DRM_ROOT`]
    #[cfg(target_os = "linux")]
    pub fn open() -> Result<Self> {
        Self::open_at(Path::new(SYSFS_DRM_ROOT))
    }

    /// The DRM fallback only exists on Linux
    #[cfg(not(target_os = "linux"))]
    pub fn open() -> Result<Self> {
        Err(GpuError::UnsupportedBackend(
            "DRM enumeration is only available on Linux".to_string(),
        ))
    }

    /// Enumerate adapters under an arbitrary DRM root
    pub fn open_at(root: &Path) -> Result<Self> {
        let mut cards: Vec<(u32, PathBuf)> = fs::read_dir(root)?
            .flatten()
            .filter_map(|entry| {
                let name = entry.file_name();
                card_number(&name.to_string_lossy()).map(|n| (n, entry.path()))
            })
            .collect();
        cards.sort_by_key(|(n, _)| *n);

        let adapters: Vec<Adapter> = cards
            .iter()
            .filter_map(|(_, card)| read_adapter(&card.join("device")))
            .collect();

        if adapters.is_empty() {
            return Err(GpuError::NoDevices(format!(
                "no hardware display adapters under {}",
                root.display()
            )));
        }

        info!("DRM fallback found {} adapter(s)", adapters.len());

        Ok(Self {
            adapters,
            closed: false,
        })
    }
}

impl TelemetryBackend for DrmBackend {
    fn name(&self) -> &'static str {
        "drm"
    }

    fn snapshot(&mut self) -> Vec<DeviceSnapshot> {
        if self.closed {
            return Vec::new();
        }
        self.adapters
            .iter()
            .enumerate()
            .map(|(index, adapter)| {
                let mut snapshot = DeviceSnapshot::new(index as u32, adapter.name.clone());
                snapshot.total_vram_gb = adapter.total_vram_bytes as f64 / BYTES_PER_GIB;
                snapshot
            })
            .collect()
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

/// `card0` -> `Some(0)`; connectors such as `card0-DP-1` are skipped
fn card_number(name: &str) -> Option<u32> {
    if name.contains('-') {
        return None;
    }
    name.strip_prefix("card")?.parse().ok()
}

fn read_adapter(device: &Path) -> Option<Adapter> {
    if !device.exists() {
        return None;
    }

    let vendor = read_hex(&device.join("vendor")).unwrap_or(0);
    let device_id = read_hex(&device.join("device")).unwrap_or(0);
    if SOFTWARE_ADAPTERS.contains(&(vendor, device_id)) {
        debug!(
            "Skipping software adapter {:04x}:{:04x} at {}",
            vendor,
            device_id,
            device.display()
        );
        return None;
    }

    let total_vram_bytes = read_trimmed(&device.join("mem_info_vram_total"))
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);

    Some(Adapter {
        name: adapter_name(device, vendor, device_id),
        total_vram_bytes,
    })
}

fn adapter_name(device: &Path, vendor: u32, device_id: u32) -> String {
    if let Some(label) = read_trimmed(&device.join("label")).filter(|l| !l.is_empty()) {
        return label;
    }

    let vendor_name = match vendor {
        0x10de => "NVIDIA",
        0x1002 => "AMD",
        0x8086 => "Intel",
        _ => "GPU",
    };

    let driver = read_trimmed(&device.join("uevent")).and_then(|uevent| {
        uevent
            .lines()
            .find_map(|line| line.strip_prefix("DRIVER=").map(str::to_string))
    });

    match driver {
        Some(driver) => format!("{} ({})", vendor_name, driver),
        None => format!("{} [{:04x}:{:04x}]", vendor_name, vendor, device_id),
    }
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}

fn read_hex(path: &Path) -> Option<u32> {
    let raw = read_trimmed(path)?;
    let digits = raw.strip_prefix("0x").unwrap_or(&raw);
    u32::from_str_radix(digits, 16).ok()
}
