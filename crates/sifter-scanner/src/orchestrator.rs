//! Scrape pipeline orchestration.
//!
//! This module provides the [`ScrapeOrchestrator`], which owns one transport
//! session per run and drives pagination followed by detail enhancement.

use crate::enhancer::DetailEnhancer;
use crate::error::{Result, ScanError};
use crate::pacing::{Deadline, DelayPolicy};
use crate::pagination::Paginator;
use crate::parser::ListingExtractor;
use serde::Serialize;
use sifter_browser::{Connector, Transport, TransportSession};
use sifter_core::{AppConfig, Product, SelectorConfig};
use std::sync::Arc;
use std::time::Duration;

/// Immutable settings for building a pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Site root, e.g. `https://www.ebay.com`
    pub base_url: String,
    /// Keyword used when the caller supplies none
    pub default_keyword: String,
    /// Upper bound on pages per run
    pub max_pages: u32,
    /// Records enriched from their detail page
    pub enhance_budget: usize,
    /// Drop repeated canonical links across pages
    pub dedupe_links: bool,
    /// Overall deadline for a run; `None` disables it
    pub run_timeout: Option<Duration>,
    /// Delay between listing pages
    pub listing_delay: DelayPolicy,
    /// Delay between detail pages
    pub detail_delay: DelayPolicy,
    /// Selector lists for listing and detail pages
    pub selectors: SelectorConfig,
}

impl PipelineConfig {
    /// Derive pipeline settings from the application config.
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        let scraping = &config.scraping;
        Self {
            base_url: scraping.base_url.clone(),
            default_keyword: scraping.default_keyword.clone(),
            max_pages: scraping.max_pages,
            enhance_budget: scraping.enhance_budget,
            dedupe_links: scraping.dedupe_links,
            run_timeout: (scraping.run_timeout_secs > 0)
                .then(|| Duration::from_secs(scraping.run_timeout_secs)),
            listing_delay: DelayPolicy::listing(&config.pacing),
            detail_delay: DelayPolicy::detail(&config.pacing),
            selectors: config.selectors.clone(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_app_config(&AppConfig::default())
    }
}

/// Outcome of one scrape run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeReport {
    /// Keyword actually searched
    pub keyword: String,
    /// Page count after clamping
    pub pages_requested: u32,
    /// Pages that yielded records
    pub pages_scraped: u32,
    /// Records in page order
    pub products: Vec<Product>,
    /// The run deadline cut pagination or enhancement short
    pub timed_out: bool,
}

/// Clamp a requested page count to `[1, max_pages]`.
///
/// Zero and negative requests become 1. Requests above the cap are reduced
/// with a logged notice.
#[must_use]
pub fn validate_page_count(requested: i64, max_pages: u32) -> u32 {
    let max_pages = max_pages.max(1);
    if requested < 1 {
        return 1;
    }
    match u32::try_from(requested) {
        Ok(pages) if pages <= max_pages => pages,
        _ => {
            tracing::info!(requested, max_pages, "Page count capped");
            max_pages
        }
    }
}

/// Runs the full scrape pipeline.
pub struct ScrapeOrchestrator {
    config: PipelineConfig,
    connector: Arc<dyn Connector>,
    extractor: ListingExtractor,
    enhancer: DetailEnhancer,
}

impl ScrapeOrchestrator {
    /// Build the pipeline. Selectors and the base URL are validated here.
    pub fn new(config: PipelineConfig, connector: Arc<dyn Connector>) -> Result<Self> {
        let extractor = ListingExtractor::new(&config.selectors, &config.base_url)?;
        let enhancer = DetailEnhancer::new(&config.selectors, config.detail_delay)?;
        Ok(Self {
            config,
            connector,
            extractor,
            enhancer,
        })
    }

    /// Scrape up to `requested` pages for `keyword` and enrich the first records.
    ///
    /// The transport session is released on every path out of the run. When
    /// the run deadline passes, the records collected so far are returned with
    /// `timed_out` set; only a run that timed out with nothing collected is an
    /// error.
    pub async fn run(&self, keyword: &str, requested: i64) -> Result<ScrapeReport> {
        let keyword = match keyword.trim() {
            "" => self.config.default_keyword.as_str(),
            trimmed => trimmed,
        };
        let pages = validate_page_count(requested, self.config.max_pages);
        tracing::info!(keyword, pages, "Starting scrape run");

        let deadline = Deadline::after(self.config.run_timeout);
        let session = TransportSession::open(self.connector.as_ref()).await?;
        let report = self.scrape(session.transport(), keyword, pages, deadline).await;
        session.release().await;

        match (report.timed_out, self.config.run_timeout) {
            (true, Some(limit)) if report.products.is_empty() => {
                let err = ScanError::RunTimeout(limit);
                tracing::error!(keyword, "Scrape run failed: {}", err);
                Err(err)
            }
            (true, _) => {
                tracing::warn!(
                    keyword,
                    pages_scraped = report.pages_scraped,
                    count = report.products.len(),
                    "Run deadline reached, returning partial results"
                );
                Ok(report)
            }
            (false, _) => {
                tracing::info!(
                    keyword,
                    pages_scraped = report.pages_scraped,
                    count = report.products.len(),
                    "Scrape run complete"
                );
                Ok(report)
            }
        }
    }

    async fn scrape(
        &self,
        transport: &dyn Transport,
        keyword: &str,
        pages: u32,
        deadline: Deadline,
    ) -> ScrapeReport {
        let scan = Paginator::new(
            transport,
            &self.extractor,
            &self.config.base_url,
            self.config.listing_delay,
        )
        .with_dedupe(self.config.dedupe_links)
        .with_deadline(deadline)
        .paginate(keyword, pages)
        .await;

        tracing::debug!(
            pages_scraped = scan.pages_scraped,
            stopped_early = scan.stopped_early,
            deadline_reached = scan.deadline_reached,
            count = scan.products.len(),
            "Pagination finished"
        );

        let products = self
            .enhancer
            .enhance(transport, scan.products, self.config.enhance_budget, deadline)
            .await;

        ScrapeReport {
            keyword: keyword.to_string(),
            pages_requested: pages,
            pages_scraped: scan.pages_scraped,
            products,
            timed_out: scan.deadline_reached || deadline.expired(),
        }
    }
}
