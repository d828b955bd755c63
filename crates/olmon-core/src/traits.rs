//! Core traits for olmon components
//!
//! These traits define the two data sources polled on every refresh: GPU
//! telemetry and the model service. Adapters implement them; the CLI only sees
//! the traits.

use crate::{DeviceSnapshot, InstalledModelRecord, LoadedModelRecord, ServiceSnapshot};
use async_trait::async_trait;

/// A GPU telemetry backend opened at startup and closed at shutdown
///
/// Snapshots never fail. A backend that loses a device reports the entry with
/// `available = false` instead of erroring.
pub trait TelemetryBackend: Send {
    /// Short backend name used in logs
    fn name(&self) -> &'static str;

    /// Query every device once
    fn snapshot(&mut self) -> Vec<DeviceSnapshot>;

    /// Release the underlying driver handle. Calling it twice is a no-op.
    fn close(&mut self);
}

/// Result of one combined service poll
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServicePoll {
    pub status: ServiceSnapshot,
    pub catalog: Vec<InstalledModelRecord>,
}

impl ServicePoll {
    /// Poll result for a service that could not be reached
    pub fn unreachable() -> Self {
        Self::default()
    }
}

/// Read-only view of a model-serving daemon
///
/// None of these methods return errors: transport failures degrade to the
/// unreachable signal at the implementation boundary.
#[async_trait]
pub trait ModelService: Send + Sync {
    /// Lightweight reachability check
    async fn probe(&self) -> bool;

    /// Models currently resident, `None` when the service could not be queried
    async fn fetch_running(&self) -> Option<Vec<LoadedModelRecord>>;

    /// All installed models, empty on failure
    async fn fetch_catalog(&self) -> Vec<InstalledModelRecord>;

    /// Probe, then fetch the catalog and the running list
    ///
    /// A failed probe yields an empty catalog. A failed running-list fetch
    /// marks the service unreachable but keeps the catalog.
    async fn poll(&self) -> ServicePoll {
        if !self.probe().await {
            return ServicePoll::unreachable();
        }
        let catalog = self.fetch_catalog().await;
        match self.fetch_running().await {
            Some(loaded) => ServicePoll {
                status: ServiceSnapshot::Reachable { loaded },
                catalog,
            },
            None => ServicePoll {
                status: ServiceSnapshot::Unreachable,
                catalog,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedService {
        reachable: bool,
        running: Option<Vec<LoadedModelRecord>>,
    }

    #[async_trait]
    impl ModelService for FixedService {
        async fn probe(&self) -> bool {
            self.reachable
        }

        async fn fetch_running(&self) -> Option<Vec<LoadedModelRecord>> {
            self.running.clone()
        }

        async fn fetch_catalog(&self) -> Vec<InstalledModelRecord> {
            vec![InstalledModelRecord {
                name: "gemma:2b".to_string(),
                ..Default::default()
            }]
        }
    }

    #[tokio::test]
    async fn test_poll_probe_failure() {
        let service = FixedService {
            reachable: false,
            running: Some(Vec::new()),
        };
        assert_eq!(service.poll().await, ServicePoll::unreachable());
    }

    #[tokio::test]
    async fn test_poll_reachable() {
        let service = FixedService {
            reachable: true,
            running: Some(Vec::new()),
        };
        let poll = service.poll().await;
        assert_eq!(poll.status, ServiceSnapshot::Reachable { loaded: Vec::new() });
        assert_eq!(poll.catalog.len(), 1);
    }

    #[tokio::test]
    async fn test_poll_running_failure() {
        let service = FixedService {
            reachable: true,
            running: None,
        };
        let poll = service.poll().await;
        assert_eq!(poll.status, ServiceSnapshot::Unreachable);
        assert_eq!(poll.catalog.len(), 1);
    }
}
