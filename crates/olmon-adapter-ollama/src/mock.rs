//! Mock model service for testing

use async_trait::async_trait;
use olmon_core::{InstalledModelRecord, LoadedModelRecord, ModelService};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// In-memory model service with fixed answers
#[derive(Debug, Clone, Default)]
pub struct MockModelService {
    reachable: bool,
    running: Option<Vec<LoadedModelRecord>>,
    catalog: Vec<InstalledModelRecord>,
    probes: Arc<AtomicUsize>,
}

impl MockModelService {
    /// A service that never answers
    pub fn unreachable() -> Self {
        Self::default()
    }

    /// A reachable service with the given resident and installed models
    pub fn reachable(loaded: Vec<LoadedModelRecord>, catalog: Vec<InstalledModelRecord>) -> Self {
        Self {
            reachable: true,
            running: Some(loaded),
            catalog,
            probes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Override the running-list answer, `None` simulating a failed `/api/ps`
    pub fn with_running(mut self, running: Option<Vec<LoadedModelRecord>>) -> Self {
        self.running = running;
        self
    }

    /// Number of probes issued so far, shared across clones
    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelService for MockModelService {
    async fn probe(&self) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.reachable
    }

    async fn fetch_running(&self) -> Option<Vec<LoadedModelRecord>> {
        if !self.reachable {
            return None;
        }
        self.running.clone()
    }

    async fn fetch_catalog(&self) -> Vec<InstalledModelRecord> {
        if !self.reachable {
            return Vec::new();
        }
        self.catalog.clone()
    }
}
