//! Plain HTTP transport backed by `reqwest`.

use crate::error::{BrowserError, Result};
use crate::fingerprint::FingerprintConfig;
use crate::transport::{ensure_success, Connector, PageKind, RequestTimeouts, Transport};
use async_trait::async_trait;
use sifter_core::TransportConfig;
use std::sync::Arc;

/// HTTP transport that sends browser-like headers.
pub struct HttpTransport {
    client: reqwest::Client,
    fingerprint: FingerprintConfig,
    timeouts: RequestTimeouts,
    referer: Option<String>,
}

impl HttpTransport {
    /// Build a transport for the given site.
    ///
    /// `site_root` becomes the `Referer` for detail pages.
    pub fn new(config: &TransportConfig, site_root: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| BrowserError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            fingerprint: FingerprintConfig::randomized().with_user_agent(config.user_agent.clone()),
            timeouts: RequestTimeouts::from_config(config),
            referer: referer_for(site_root),
        })
    }
}

/// Normalize a site root to `scheme://host/`.
fn referer_for(site_root: &str) -> Option<String> {
    let url = url::Url::parse(site_root).ok()?;
    let host = url.host_str()?;
    Some(format!("{}://{}/", url.scheme(), host))
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str, kind: PageKind) -> Result<String> {
        tracing::debug!(url = %url, ?kind, "HTTP fetch starting");

        let response = self
            .client
            .get(url)
            .headers(self.fingerprint.headers(kind, self.referer.as_deref()))
            .timeout(self.timeouts.for_kind(kind))
            .send()
            .await?;

        ensure_success(url, response.status().as_u16())?;
        Ok(response.text().await?)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Opens an [`HttpTransport`] per run.
pub struct HttpConnector {
    config: TransportConfig,
    site_root: String,
}

impl HttpConnector {
    pub fn new(config: TransportConfig, site_root: impl Into<String>) -> Self {
        Self {
            config,
            site_root: site_root.into(),
        }
    }
}

#[async_trait]
impl Connector for HttpConnector {
    async fn connect(&self) -> Result<Arc<dyn Transport>> {
        Ok(Arc::new(HttpTransport::new(&self.config, &self.site_root)?))
    }
}
