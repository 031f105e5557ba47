use sifter_browser::BrowserError;
use sifter_core::ConfigError;
use std::time::Duration;
use thiserror::Error;

/// Errors that abort building or running a scrape pipeline.
///
/// Per-page and per-record failures never surface here; they are logged and
/// absorbed where they happen.
#[derive(Debug, Error)]
pub enum ScanError {
    /// A configured CSS selector failed to parse
    #[error("Invalid {field} selector {selector:?}: {reason}")]
    InvalidSelector {
        /// Logical field the selector belongs to
        field: &'static str,
        /// The offending selector text
        selector: String,
        /// Parser message
        reason: String,
    },

    /// The configured site root is not an absolute URL
    #[error("Invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl {
        /// The configured value
        url: String,
        /// Parser message
        reason: String,
    },

    /// The run did not finish within its overall time limit
    #[error("Scrape run exceeded {0:?}")]
    RunTimeout(Duration),

    /// Opening the transport session failed
    #[error("Transport error: {0}")]
    Transport(#[from] BrowserError),

    /// Configuration could not be loaded or was invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ScanError>;
