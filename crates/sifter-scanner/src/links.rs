//! Search URL construction and item link canonicalization.

use once_cell::sync::Lazy;
use regex::Regex;
use sifter_core::ItemId;
use url::Url;

/// `/itm/<id>` or `/itm/<slug>/<id>`, optionally with a trailing slash.
static ITEM_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/itm/(?:[^/]+/)?(\d+)/?$").expect("valid item path regex"));

/// Listing page URL for `keyword` and 1-based `page`.
pub fn build_search_url(base_url: &str, keyword: &str, page: u32) -> String {
    format!(
        "{}/sch/i.html?_nkw={}&_sacat=0&_pgn={}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(keyword),
        page
    )
}

/// Resolve a possibly relative `href` against the site root.
pub fn absolutize(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    base.join(href).ok().map(String::from)
}

/// Rewrite item links to `https://<host>/itm/<id>`, dropping slugs and
/// tracking parameters. Links without the item pattern are returned as-is.
pub fn canonicalize_link(link: &str) -> String {
    let Ok(url) = Url::parse(link) else {
        return link.to_string();
    };
    let Some(host) = url.host_str() else {
        return link.to_string();
    };

    match ITEM_PATH.captures(url.path()) {
        Some(caps) => format!("https://{host}/itm/{}", &caps[1]),
        None => link.to_string(),
    }
}

/// The trailing numeric path segment of `link`, if any.
pub fn item_id(link: &str) -> Option<ItemId> {
    let url = Url::parse(link).ok()?;
    let last = url.path_segments()?.filter(|s| !s.is_empty()).last()?;
    ItemId::new(last).ok()
}

/// Search-result URLs are not worth visiting for a description.
pub fn is_detail_link(link: &str) -> bool {
    !link.contains("/sch/")
}
