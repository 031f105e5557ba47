//! Sifter Core - Foundation crate for the Sifter listing scraper.
//!
//! This crate provides the shared record types, error handling and
//! configuration management that the other Sifter crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - The scraped [`Product`] record, [`ItemId`] and field sentinels
//!
//! # Example
//!
//! ```rust
//! use sifter_core::{AppConfig, TransportMode};
//!
//! let config = AppConfig::default();
//! assert_eq!(config.transport.mode, TransportMode::Http);
//! assert_eq!(config.scraping.max_pages, 10);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[allow(missing_docs)]
pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{
    AppConfig, PacingConfig, ScrapingConfig, SelectorConfig, ServerConfig, TransportConfig,
    TransportMode,
};
pub use error::{ConfigError, ConfigResult, Result, SifterError};
pub use types::{ItemId, Product, NO_DESCRIPTION, UNKNOWN};
