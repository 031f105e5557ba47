//! Configuration management for Sifter.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration.
///
/// This is loaded from `~/.config/sifter/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Search and enhancement limits
    pub scraping: ScrapingConfig,
    /// Politeness delays between requests
    pub pacing: PacingConfig,
    /// Transport selection and request settings
    pub transport: TransportConfig,
    /// Ordered CSS selector chains per field
    pub selectors: SelectorConfig,
    /// HTTP service settings
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path, falling back to defaults if missing.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            tracing::debug!("Loading config from {}", path.display());
            let contents = fs::read_to_string(path)?;
            let config: Self = toml::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `SIFTER_PORT`: Override the HTTP listen port
    /// - `SIFTER_TRANSPORT`: Override transport mode (`http`/`browser`)
    /// - `SIFTER_MAX_PAGES`: Override the page cap
    /// - `SIFTER_ENHANCE_BUDGET`: Override the detail enhancement budget
    /// - `SIFTER_HEADLESS`: Override browser headless mode (true/false)
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup. Unparseable values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("SIFTER_PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
            tracing::debug!("Override server.port from env: {}", port);
        }

        if let Some(mode) = lookup("SIFTER_TRANSPORT").and_then(|v| TransportMode::parse(&v)) {
            self.transport.mode = mode;
            tracing::debug!("Override transport.mode from env: {:?}", mode);
        }

        if let Some(max) = lookup("SIFTER_MAX_PAGES").and_then(|v| v.parse().ok()) {
            self.scraping.max_pages = max;
            tracing::debug!("Override scraping.max_pages from env: {}", max);
        }

        if let Some(budget) = lookup("SIFTER_ENHANCE_BUDGET").and_then(|v| v.parse().ok()) {
            self.scraping.enhance_budget = budget;
            tracing::debug!("Override scraping.enhance_budget from env: {}", budget);
        }

        if let Some(headless) = lookup("SIFTER_HEADLESS").and_then(|v| v.parse().ok()) {
            self.transport.headless = headless;
            tracing::debug!("Override transport.headless from env: {}", headless);
        }
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.scraping.max_pages == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scraping.max_pages".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        if self.selectors.items.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "selectors.items".to_string(),
                reason: "at least one item container selector is required".to_string(),
            });
        }

        if !self.scraping.base_url.starts_with("http://")
            && !self.scraping.base_url.starts_with("https://")
        {
            return Err(ConfigError::InvalidValue {
                field: "scraping.base_url".to_string(),
                reason: format!("must be an http(s) URL, got '{}'", self.scraping.base_url),
            });
        }

        Ok(())
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to an explicit path.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let config_dir = path.parent().ok_or_else(|| ConfigError::InvalidValue {
            field: "config_path".to_string(),
            reason: "no parent directory".to_string(),
        })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/sifter/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "sifter", "sifter").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Search and enhancement limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    /// Site root used for search URLs and relative links
    pub base_url: String,
    /// Keyword used when a request does not carry one
    pub default_keyword: String,
    /// Hard cap on listing pages per run
    pub max_pages: u32,
    /// Number of leading records whose detail page is visited
    pub enhance_budget: usize,
    /// Drop records whose canonical link was already collected on an earlier page
    pub dedupe_links: bool,
    /// Upper bound on a whole run in seconds (0 = no bound)
    pub run_timeout_secs: u64,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.ebay.com".to_string(),
            default_keyword: "nike".to_string(),
            max_pages: 10,
            enhance_budget: 10,
            dedupe_links: false,
            run_timeout_secs: 300,
        }
    }
}

/// Politeness delays between requests, in milliseconds.
///
/// The delay after listing page `n` is
/// `page_base_ms + random(0..=page_jitter_ms) + page_progressive_ms * n`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub page_base_ms: u64,
    pub page_jitter_ms: u64,
    pub page_progressive_ms: u64,
    pub detail_base_ms: u64,
    pub detail_jitter_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            page_base_ms: 2000,
            page_jitter_ms: 3000,
            page_progressive_ms: 500,
            detail_base_ms: 2000,
            detail_jitter_ms: 1000,
        }
    }
}

/// How pages are fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    /// Plain HTTP requests
    #[default]
    Http,
    /// Headless Chromium session
    Browser,
}

impl TransportMode {
    /// Parse a mode name, case-insensitively.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "http" => Some(Self::Http),
            "browser" => Some(Self::Browser),
            _ => None,
        }
    }
}

/// Transport selection and request settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Which transport to open per run
    pub mode: TransportMode,
    /// Timeout for listing pages in seconds
    pub listing_timeout_secs: u64,
    /// Timeout for detail pages in seconds
    pub detail_timeout_secs: u64,
    /// Fixed user agent; a randomized desktop UA is used when unset
    pub user_agent: Option<String>,
    /// Run the browser without a window
    pub headless: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            mode: TransportMode::Http,
            listing_timeout_secs: 10,
            detail_timeout_secs: 15,
            user_agent: None,
            headless: true,
        }
    }
}

/// Ordered CSS selector chains. Earlier entries win.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Item containers on a listing page
    pub items: Vec<String>,
    pub title: Vec<String>,
    pub price: Vec<String>,
    /// Elements carrying the item link in `href`
    pub link: Vec<String>,
    /// Elements carrying the image in `src` or `data-src`
    pub image: Vec<String>,
    /// Description containers on a detail page
    pub description: Vec<String>,
    /// Broad content areas used when no description container matches
    pub main_content: Vec<String>,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            items: strings(&[".s-item__wrapper", "li.s-item", ".srp-results > li"]),
            title: strings(&[".s-item__title", "h3", "[role=heading]"]),
            price: strings(&[".s-item__price", "[class*=price]"]),
            link: strings(&["a.s-item__link", "a[href*='/itm/']"]),
            image: strings(&[".s-item__image-img", ".s-item__image img", "img"]),
            description: strings(&[
                ".ux-layout-section-evo__row .ux-textspans",
                ".d-item-description",
                ".item-description",
                "[data-testid=\"x-item-description\"]",
                ".desc",
            ]),
            main_content: strings(&["main", ".main", "#main", ".item-detail", ".product-detail"]),
        }
    }
}

/// HTTP service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}
