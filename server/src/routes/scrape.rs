use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use sifter_core::Product;

#[derive(Debug, Default, Deserialize)]
pub struct ScrapeQuery {
    pub keyword: Option<String>,
    pub pages: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResponse {
    pub success: bool,
    pub keyword: String,
    pub pages_scraped: u32,
    pub total_products: usize,
    pub products: Vec<Product>,
    /// Present only when the run deadline cut the scrape short.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub timed_out: bool,
}

/// Lenient page-count parsing: leading integer prefix, otherwise 1.
///
/// `"3"` and `"3abc"` give 3, `"abc"`, `""` and `"0"` give 1. Negative values
/// are passed through and clamped later.
pub fn parse_pages(raw: Option<&str>) -> i64 {
    let Some(raw) = raw.map(str::trim_start) else {
        return 1;
    };

    let (negative, digits) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = &digits[..end];
    if digits.is_empty() {
        return 1;
    }

    let value = digits.parse::<i64>().unwrap_or(i64::MAX);
    match (value, negative) {
        (0, _) => 1,
        (v, true) => -v,
        (v, false) => v,
    }
}

/// `GET /api/scrape?keyword=<str>&pages=<int>`
pub async fn scrape_handler(
    State(state): State<AppState>,
    Query(query): Query<ScrapeQuery>,
) -> Result<Json<ScrapeResponse>, ApiError> {
    let keyword = query.keyword.unwrap_or_default();
    let pages = parse_pages(query.pages.as_deref());
    tracing::info!(keyword = %keyword, pages, "Scrape requested");

    let report = state.orchestrator.run(&keyword, pages).await?;

    Ok(Json(ScrapeResponse {
        success: true,
        keyword: report.keyword,
        pages_scraped: report.pages_scraped,
        total_products: report.products.len(),
        products: report.products,
        timed_out: report.timed_out,
    }))
}
