//! Sifter Scanner - listing scrape pipeline.
//!
//! Walks paginated search results, extracts product records through ordered
//! fallback selector chains, and enriches the first records with descriptions
//! from their detail pages.
//!
//! # Features
//!
//! - Sequential pagination that stops on the first empty page
//! - Randomized, progressive pacing between requests
//! - Fail-soft fetching: transport errors degrade to empty results
//! - One transport session per run, released on every exit path
//!
//! # Example
//!
//! ```rust,ignore
//! use sifter_browser::connector_for;
//! use sifter_core::AppConfig;
//! use sifter_scanner::{PipelineConfig, ScrapeOrchestrator};
//!
//! let config = AppConfig::load()?;
//! let connector = connector_for(&config.transport, &config.scraping.base_url);
//! let orchestrator =
//!     ScrapeOrchestrator::new(PipelineConfig::from_app_config(&config), connector)?;
//!
//! let report = orchestrator.run("nike", 2).await?;
//! println!("{} products", report.products.len());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[allow(missing_docs)]
pub mod enhancer;
pub mod error;
pub mod fetcher;
#[allow(missing_docs)]
pub mod filter;
#[allow(missing_docs)]
pub mod links;
#[allow(missing_docs)]
pub mod normalize;
pub mod orchestrator;
#[allow(missing_docs)]
pub mod pacing;
#[allow(missing_docs)]
pub mod pagination;
#[allow(missing_docs)]
pub mod parser;
#[allow(missing_docs)]
pub mod selectors;

// Re-export commonly used types
pub use enhancer::DetailEnhancer;
pub use error::{Result, ScanError};
pub use fetcher::fetch_page;
pub use filter::{screen_title, Rejection};
pub use links::{build_search_url, canonicalize_link, item_id};
pub use orchestrator::{validate_page_count, PipelineConfig, ScrapeOrchestrator, ScrapeReport};
pub use pacing::DelayPolicy;
pub use pagination::{PageScan, Paginator};
pub use parser::ListingExtractor;
pub use selectors::{SelectorChain, Strategy};
