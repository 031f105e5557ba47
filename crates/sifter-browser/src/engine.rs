use crate::error::{BrowserError, Result};
use crate::fingerprint::FingerprintConfig;
use crate::transport::{ensure_open, ensure_success, Connector, PageKind, RequestTimeouts, Transport};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::EventResponseReceived;
use chromiumoxide::Page;
use futures_util::stream::StreamExt;
use futures_util::FutureExt;
use sifter_core::TransportConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Browser automation engine
///
/// One headless Chromium process per engine. Pages are opened one at a time
/// and closed after their markup has been read.
pub struct BrowserEngine {
    browser: Mutex<Browser>,
    handler: JoinHandle<()>,
    timeouts: RequestTimeouts,
    closed: AtomicBool,
}

impl BrowserEngine {
    /// Launch a browser with default transport settings
    pub async fn new() -> Result<Self> {
        Self::with_config(&TransportConfig::default()).await
    }

    /// Launch a browser using the given transport settings
    pub async fn with_config(config: &TransportConfig) -> Result<Self> {
        let fingerprint =
            FingerprintConfig::randomized().with_user_agent(config.user_agent.clone());

        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(fingerprint.viewport_width, fingerprint.viewport_height)
            .arg(format!("--user-agent={}", fingerprint.user_agent));
        if !config.headless {
            builder = builder.with_head();
        }
        let browser_config = builder.build().map_err(BrowserError::ChromiumError)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        // Spawn browser handler
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                // Handle events if needed
                let _ = event;
            }
        });

        tracing::info!(
            headless = config.headless,
            "Browser session launched ({}x{})",
            fingerprint.viewport_width,
            fingerprint.viewport_height
        );

        Ok(Self {
            browser: Mutex::new(browser),
            handler,
            timeouts: RequestTimeouts::from_config(config),
            closed: AtomicBool::new(false),
        })
    }
}

#[async_trait]
impl Transport for BrowserEngine {
    async fn fetch(&self, url: &str, kind: PageKind) -> Result<String> {
        ensure_open(&self.closed)?;
        tracing::debug!(url = %url, ?kind, "Browser fetch starting");

        let browser = self.browser.lock().await;
        let limit = self.timeouts.for_kind(kind);
        let page = tokio::time::timeout(limit, browser.new_page("about:blank"))
            .await
            .map_err(|_| BrowserError::Timeout(url.to_string()))?
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        let page = OpenPage::new(page, url);

        let result = tokio::time::timeout(limit, page.load(url))
            .await
            .map_err(|_| BrowserError::Timeout(url.to_string()))
            .and_then(|loaded| loaded);
        page.close().await;
        result
    }

    async fn shutdown(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let mut browser = self.browser.lock().await;
        let result = browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| BrowserError::ChromiumError(e.to_string()));
        if let Err(e) = browser.wait().await {
            tracing::debug!("Waiting for browser exit failed: {}", e);
        }
        self.handler.abort();
        tracing::info!("Browser session closed");
        result
    }

    fn name(&self) -> &'static str {
        "browser"
    }
}

/// A tab that is closed when the fetch ends, on every path.
struct OpenPage {
    page: Option<Page>,
    url: String,
}

impl OpenPage {
    fn new(page: Page, url: &str) -> Self {
        Self {
            page: Some(page),
            url: url.to_string(),
        }
    }

    /// Navigate, reject non-2xx documents, then read the rendered markup.
    async fn load(&self, url: &str) -> Result<String> {
        let page = self.page.as_ref().ok_or(BrowserError::SessionClosed)?;
        let navigation = |e: chromiumoxide::error::CdpError| {
            BrowserError::NavigationError(format!("{url}: {e}"))
        };

        let mut responses = page
            .event_listener::<EventResponseReceived>()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        page.goto(url).await.map_err(navigation)?;
        page.wait_for_navigation().await.map_err(navigation)?;

        let mut seen = Vec::new();
        while let Some(Some(event)) = responses.next().now_or_never() {
            seen.push((event.response.mime_type.clone(), event.response.status));
        }
        match document_status(seen.iter().map(|(mime, status)| (mime.as_str(), *status))) {
            Some(status) => ensure_success(url, status)?,
            None => tracing::debug!(url = %url, "No document response observed"),
        }

        page.content().await.map_err(navigation)
    }

    async fn close(mut self) {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                tracing::debug!("Failed to close page for {}: {}", self.url, e);
            }
        }
    }
}

impl Drop for OpenPage {
    fn drop(&mut self) {
        let Some(page) = self.page.take() else {
            return;
        };
        tracing::debug!(url = %self.url, "Page dropped mid-fetch, closing in background");
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                let _ = page.close().await;
            });
        }
    }
}

fn is_document_mime(mime: &str) -> bool {
    let mime = mime.trim().to_ascii_lowercase();
    mime.starts_with("text/html") || mime.starts_with("application/xhtml+xml")
}

/// Status of the first HTML response seen during a navigation.
fn document_status<'a>(responses: impl IntoIterator<Item = (&'a str, i64)>) -> Option<u16> {
    responses
        .into_iter()
        .find(|(mime, _)| is_document_mime(mime))
        .and_then(|(_, status)| u16::try_from(status).ok())
}

/// Launches a [`BrowserEngine`] per run.
pub struct BrowserConnector {
    config: TransportConfig,
}

impl BrowserConnector {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Connector for BrowserConnector {
    async fn connect(&self) -> Result<Arc<dyn Transport>> {
        Ok(Arc::new(BrowserEngine::with_config(&self.config).await?))
    }
}
