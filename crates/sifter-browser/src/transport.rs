//! Transport abstraction shared by the HTTP client and the browser engine.
//!
//! A [`Connector`] opens one [`Transport`] per scrape run; the run holds it in a
//! [`TransportSession`], which shuts the transport down on every exit path.

use crate::error::{BrowserError, Result};
use async_trait::async_trait;
use sifter_core::TransportConfig;
use std::sync::Arc;
use std::time::Duration;

/// The kind of page being fetched. Selects timeout and header set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// Search-result page with many items
    Listing,
    /// A single item's page
    Detail,
}

/// Per-kind request timeouts.
#[derive(Debug, Clone, Copy)]
pub struct RequestTimeouts {
    pub listing: Duration,
    pub detail: Duration,
}

impl RequestTimeouts {
    pub fn from_config(config: &TransportConfig) -> Self {
        Self {
            listing: Duration::from_secs(config.listing_timeout_secs),
            detail: Duration::from_secs(config.detail_timeout_secs),
        }
    }

    pub fn for_kind(&self, kind: PageKind) -> Duration {
        match kind {
            PageKind::Listing => self.listing,
            PageKind::Detail => self.detail,
        }
    }
}

impl Default for RequestTimeouts {
    fn default() -> Self {
        Self::from_config(&TransportConfig::default())
    }
}

/// Fetches raw page markup.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch `url` and return its HTML. Non-success statuses are errors.
    async fn fetch(&self, url: &str, kind: PageKind) -> Result<String>;

    /// Release whatever the transport holds (browser process, connections).
    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Opens a fresh transport for one run.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn Transport>>;
}

/// A transport owned by exactly one run.
///
/// Call [`TransportSession::release`] when the run ends. If the session is
/// dropped without being released (the run future was cancelled), shutdown is
/// spawned onto the current runtime instead.
pub struct TransportSession {
    transport: Arc<dyn Transport>,
    released: bool,
}

impl TransportSession {
    /// Acquire a transport from the connector.
    pub async fn open(connector: &dyn Connector) -> Result<Self> {
        let transport = connector.connect().await?;
        tracing::debug!(transport = transport.name(), "Transport session opened");
        Ok(Self {
            transport,
            released: false,
        })
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// Shut the transport down. Shutdown failures are logged, not returned.
    pub async fn release(mut self) {
        self.released = true;
        match self.transport.shutdown().await {
            Ok(()) => tracing::debug!(transport = self.transport.name(), "Transport session released"),
            Err(e) => tracing::warn!(
                transport = self.transport.name(),
                "Transport shutdown failed: {}",
                e
            ),
        }
    }
}

impl Drop for TransportSession {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        let transport = Arc::clone(&self.transport);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = transport.shutdown().await {
                        tracing::warn!("Deferred transport shutdown failed: {}", e);
                    }
                });
            }
            Err(_) => tracing::warn!(
                transport = self.transport.name(),
                "Transport session dropped outside a runtime; not shut down"
            ),
        }
    }
}

/// Reject requests against a session that has already been shut down.
pub(crate) fn ensure_open(closed: &std::sync::atomic::AtomicBool) -> Result<()> {
    if closed.load(std::sync::atomic::Ordering::Acquire) {
        Err(BrowserError::SessionClosed)
    } else {
        Ok(())
    }
}

/// Map a non-2xx document status to [`BrowserError::HttpStatus`].
pub(crate) fn ensure_success(url: &str, status: u16) -> Result<()> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(BrowserError::HttpStatus {
            url: url.to_string(),
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingTransport {
        shutdowns: AtomicUsize,
    }

    #[async_trait]
    impl Transport for CountingTransport {
        async fn fetch(&self, _url: &str, _kind: PageKind) -> Result<String> {
            Ok("<html></html>".to_string())
        }

        async fn shutdown(&self) -> Result<()> {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    struct FixedConnector(Arc<CountingTransport>);

    #[async_trait]
    impl Connector for FixedConnector {
        async fn connect(&self) -> Result<Arc<dyn Transport>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_timeouts_from_config() {
        let timeouts = RequestTimeouts::default();
        assert_eq!(timeouts.for_kind(PageKind::Listing), Duration::from_secs(10));
        assert_eq!(timeouts.for_kind(PageKind::Detail), Duration::from_secs(15));
    }

    #[tokio::test]
    async fn test_release_shuts_down_once() {
        let transport = Arc::new(CountingTransport::default());
        let session = TransportSession::open(&FixedConnector(transport.clone()))
            .await
            .expect("open session");

        session.release().await;
        assert_eq!(transport.shutdowns.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_drop_without_release_spawns_shutdown() {
        let transport = Arc::new(CountingTransport::default());
        let session = TransportSession::open(&FixedConnector(transport.clone()))
            .await
            .expect("open session");

        drop(session);
        tokio::task::yield_now().await;
        assert_eq!(transport.shutdowns.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_ensure_open() {
        let closed = AtomicBool::new(false);
        assert!(ensure_open(&closed).is_ok());
        closed.store(true, Ordering::Release);
        assert!(matches!(ensure_open(&closed), Err(BrowserError::SessionClosed)));
    }

    #[test]
    fn test_ensure_success() {
        assert!(ensure_success("https://www.ebay.com/itm/1", 200).is_ok());
        assert!(ensure_success("https://www.ebay.com/itm/1", 204).is_ok());
        assert!(matches!(
            ensure_success("https://www.ebay.com/itm/1", 503),
            Err(BrowserError::HttpStatus { status: 503, .. })
        ));
        assert!(matches!(
            ensure_success("https://www.ebay.com/itm/1", 404),
            Err(BrowserError::HttpStatus { status: 404, .. })
        ));
    }
}
