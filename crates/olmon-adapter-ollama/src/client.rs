//! HTTP client for the Ollama API

use crate::config::ServiceConfig;
use crate::records::{parse_catalog_response, parse_running_response};
use crate::{Result, ServiceError};
use async_trait::async_trait;
use olmon_core::{InstalledModelRecord, LoadedModelRecord, ModelService, ServicePoll, ServiceSnapshot};
use reqwest::Client;
use tracing::debug;
use url::Url;

/// Catalog listing, also used as the reachability probe
pub const TAGS_PATH: &str = "/api/tags";

/// Resident model listing
pub const PS_PATH: &str = "/api/ps";

/// Read-only Ollama client
///
/// Each request opens its own connection; idle connections are not pooled.
/// Transport errors are logged and folded into the [`ModelService`] return
/// values. A response body is used whatever its status code.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    config: ServiceConfig,
    client: Client,
    tags_url: Url,
    ps_url: Url,
}

impl OllamaClient {
    /// Create a new client
    pub fn new(config: ServiceConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .pool_max_idle_per_host(0)
            .no_proxy()
            .user_agent(concat!("olmon/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ServiceError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        let tags_url = config.endpoint_url(TAGS_PATH)?;
        let ps_url = config.endpoint_url(PS_PATH)?;

        Ok(Self {
            config,
            client,
            tags_url,
            ps_url,
        })
    }

    async fn get_body(&self, url: &Url) -> Result<String> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify(e, url))?;

        // The body is used whatever the status; callers check its content
        let status = response.status();
        if !status.is_success() {
            debug!("{} answered {}", url, status);
        }

        response.text().await.map_err(|e| classify(e, url))
    }

    /// Non-empty response body, whatever the status
    async fn fetch(&self, url: &Url) -> Option<String> {
        match self.get_body(url).await {
            Ok(body) if !body.is_empty() => Some(body),
            Ok(_) => {
                debug!("Empty response body from {}", url);
                None
            }
            Err(e) => {
                debug!("Request to {} failed: {}", url, e);
                None
            }
        }
    }

    /// Tags body if it looks like a model listing
    async fn fetch_probe_body(&self) -> Option<String> {
        self.fetch(&self.tags_url).await.filter(|body| is_model_listing(body))
    }
}

#[async_trait]
impl ModelService for OllamaClient {
    async fn probe(&self) -> bool {
        self.fetch_probe_body().await.is_some()
    }

    async fn fetch_running(&self) -> Option<Vec<LoadedModelRecord>> {
        self.fetch(&self.ps_url)
            .await
            .map(|body| parse_running_response(&body))
    }

    async fn fetch_catalog(&self) -> Vec<InstalledModelRecord> {
        self.fetch(&self.tags_url)
            .await
            .map(|body| parse_catalog_response(&body))
            .unwrap_or_default()
    }

    /// Reuses the probe body as the catalog, so a cycle costs two requests
    async fn poll(&self) -> ServicePoll {
        let Some(tags) = self.fetch_probe_body().await else {
            return ServicePoll::unreachable();
        };
        let catalog = parse_catalog_response(&tags);

        let status = match self.fetch_running().await {
            Some(loaded) => ServiceSnapshot::Reachable { loaded },
            None => ServiceSnapshot::Unreachable,
        };
        debug!("Polled {}: {}, {} installed", self.config.endpoint, status, catalog.len());

        ServicePoll { status, catalog }
    }
}

fn is_model_listing(body: &str) -> bool {
    body.contains("\"models\"")
}

fn classify(err: reqwest::Error, url: &Url) -> ServiceError {
    if err.is_timeout() {
        ServiceError::Timeout(format!("{}: {}", url, err))
    } else if err.is_connect() {
        ServiceError::Connection(format!("{}: {}", url, err))
    } else {
        ServiceError::Http(err)
    }
}
