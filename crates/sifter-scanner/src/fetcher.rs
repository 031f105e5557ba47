//! Fail-soft page fetching.

use sifter_browser::{PageKind, Transport};

/// Fetch `url`, mapping every failure to `None`.
///
/// Callers treat `None` exactly like a page without content, so a transport
/// error never aborts a scan.
pub async fn fetch_page(transport: &dyn Transport, url: &str, kind: PageKind) -> Option<String> {
    match transport.fetch(url, kind).await {
        Ok(html) => Some(html),
        Err(e) => {
            tracing::warn!(url = %url, ?kind, error = %e, "Fetch failed, treating page as empty");
            None
        }
    }
}
