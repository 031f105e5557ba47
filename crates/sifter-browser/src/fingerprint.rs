use crate::transport::PageKind;
use rand::Rng;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, DNT, REFERER, UPGRADE_INSECURE_REQUESTS,
    USER_AGENT,
};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const ACCEPT_LANGUAGE_EN: &str = "en-US,en;q=0.5";

/// Fingerprint configuration for anti-detection
#[derive(Debug, Clone)]
pub struct FingerprintConfig {
    pub user_agent: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl FingerprintConfig {
    /// Generate a randomized fingerprint configuration
    pub fn randomized() -> Self {
        let mut rng = rand::thread_rng();

        // Common desktop user agents
        let user_agents = [
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
        ];

        // Common viewport sizes
        let viewports = [(1920, 1080), (1366, 768), (1536, 864), (1440, 900)];

        let ua_idx = rng.gen_range(0..user_agents.len());
        let vp_idx = rng.gen_range(0..viewports.len());
        let (width, height) = viewports[vp_idx];

        Self {
            user_agent: user_agents[ua_idx].to_string(),
            viewport_width: width,
            viewport_height: height,
        }
    }

    /// Pin the user agent when one is configured.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: Option<String>) -> Self {
        if let Some(ua) = user_agent.filter(|ua| !ua.trim().is_empty()) {
            self.user_agent = ua;
        }
        self
    }

    /// Browser-like request headers for the given page kind.
    ///
    /// Detail pages carry a `Referer` of the site root, listing pages do not.
    pub fn headers(&self, kind: PageKind, referer: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();

        match HeaderValue::from_str(&self.user_agent) {
            Ok(value) => {
                headers.insert(USER_AGENT, value);
            }
            Err(_) => tracing::warn!("Configured user agent is not a valid header value"),
        }
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_EN));

        match kind {
            PageKind::Listing => {
                headers.insert(DNT, HeaderValue::from_static("1"));
                headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
            }
            PageKind::Detail => {
                if let Some(value) = referer.and_then(|r| HeaderValue::from_str(r).ok()) {
                    headers.insert(REFERER, value);
                }
            }
        }

        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_randomized_fingerprint() {
        let config = FingerprintConfig::randomized();
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
        assert!(config.viewport_width > 0);
        assert!(config.viewport_height > 0);
    }

    #[test]
    fn test_fingerprint_variation() {
        // Probabilistic, but 20 draws from four agents all matching is vanishingly unlikely
        let configs: Vec<_> = (0..20).map(|_| FingerprintConfig::randomized()).collect();

        let first_ua = &configs[0].user_agent;
        let all_same = configs.iter().all(|c| &c.user_agent == first_ua);
        assert!(!all_same, "Expected variation in user agents");
    }

    #[test]
    fn test_pinned_user_agent() {
        let config = FingerprintConfig::randomized().with_user_agent(Some("TestAgent/1.0".into()));
        assert_eq!(config.user_agent, "TestAgent/1.0");

        let config = FingerprintConfig::randomized().with_user_agent(Some("  ".into()));
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
    }

    #[test]
    fn test_listing_headers() {
        let config = FingerprintConfig::randomized();
        let headers = config.headers(PageKind::Listing, Some("https://www.ebay.com/"));

        assert_eq!(headers[USER_AGENT], config.user_agent.as_str());
        assert_eq!(headers[ACCEPT_LANGUAGE], ACCEPT_LANGUAGE_EN);
        assert_eq!(headers[DNT], "1");
        assert!(headers.get(REFERER).is_none());
    }

    #[test]
    fn test_detail_headers_carry_referer() {
        let config = FingerprintConfig::randomized();
        let headers = config.headers(PageKind::Detail, Some("https://www.ebay.com/"));

        assert_eq!(headers[REFERER], "https://www.ebay.com/");
        assert!(headers.get(DNT).is_none());
    }
}
