use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrowserError>;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("chromium error: {0}")]
    ChromiumError(String),

    #[error("navigation failed: {0}")]
    NavigationError(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("request failed: {0}")]
    Request(String),

    #[error("transport session already closed")]
    SessionClosed,
}

impl From<reqwest::Error> for BrowserError {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().map(ToString::to_string).unwrap_or_default();
        if err.is_timeout() {
            Self::Timeout(url)
        } else if let Some(status) = err.status() {
            Self::HttpStatus {
                url,
                status: status.as_u16(),
            }
        } else {
            Self::Request(err.to_string())
        }
    }
}
