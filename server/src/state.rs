//! Shared handler state.

use sifter_browser::{connector_for, Connector};
use sifter_core::AppConfig;
use sifter_scanner::{PipelineConfig, ScrapeOrchestrator};
use std::sync::Arc;

/// State cloned into every request handler.
///
/// The orchestrator only holds immutable configuration; each request opens
/// its own transport session, so concurrent scrapes do not share a browser.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ScrapeOrchestrator>,
}

impl AppState {
    /// Build state from the loaded application config.
    pub fn from_config(config: &AppConfig) -> sifter_scanner::Result<Self> {
        let connector = connector_for(&config.transport, &config.scraping.base_url);
        Self::with_connector(PipelineConfig::from_app_config(config), connector)
    }

    pub fn with_connector(
        config: PipelineConfig,
        connector: Arc<dyn Connector>,
    ) -> sifter_scanner::Result<Self> {
        Ok(Self {
            orchestrator: Arc::new(ScrapeOrchestrator::new(config, connector)?),
        })
    }
}
