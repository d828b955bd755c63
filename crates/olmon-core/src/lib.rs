//! # olmon-core
//!
//! Core types and traits for olmon, a terminal monitor for a local model-serving
//! daemon and the GPUs it runs on.
//!
//! This crate provides the foundational data structures shared by the adapters and
//! the CLI:
//!
//! - Immutable snapshot types for GPU devices and model records
//! - The [`Frame`] aggregate handed whole to the renderer
//! - Traits for telemetry backends and model services
//! - Error handling types and utilities

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types at the crate root
pub use error::{Error, Result};
pub use traits::{ModelService, ServicePoll, TelemetryBackend};
pub use types::{
    DeviceSnapshot, Frame, InstalledModelRecord, LoadedModelRecord, ServiceSnapshot,
};
