//! Page transports for the Sifter scraper.
//!
//! Provides a plain HTTP transport and a headless browser transport behind
//! one [`Transport`] trait, plus per-run session handling.

pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod http;
pub mod transport;

pub use engine::{BrowserConnector, BrowserEngine};
pub use error::{BrowserError, Result};
pub use fingerprint::FingerprintConfig;
pub use http::{HttpConnector, HttpTransport};
pub use transport::{Connector, PageKind, RequestTimeouts, Transport, TransportSession};

use sifter_core::{TransportConfig, TransportMode};
use std::sync::Arc;

/// Pick the connector matching the configured transport mode.
pub fn connector_for(config: &TransportConfig, site_root: &str) -> Arc<dyn Connector> {
    match config.mode {
        TransportMode::Http => Arc::new(HttpConnector::new(config.clone(), site_root)),
        TransportMode::Browser => Arc::new(BrowserConnector::new(config.clone())),
    }
}
