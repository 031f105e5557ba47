use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use sifter_browser::{BrowserError, Connector, PageKind, Result as BrowserResult, Transport};
use sifter_scanner::{DelayPolicy, PipelineConfig};
use sifter_server::{app, AppState};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

const LISTING: &str = r#"
<ul class="srp-results">
    <li class="s-item"><div class="s-item__wrapper">
        <div class="s-item__title">Shop on eBay</div>
        <a class="s-item__link" href="https://www.ebay.com/itm/1"></a>
    </div></li>
    <li class="s-item"><div class="s-item__wrapper">
        <div class="s-item__title">Nike Air Jordan 1 Retro High OG</div>
        <span class="s-item__price">$180.00</span>
        <a class="s-item__link" href="https://www.ebay.com/itm/Jordan-1/123456789?hash=x"></a>
    </div></li>
</ul>"#;

const DETAIL: &str =
    r#"<div class="d-item-description">Deadstock pair, never tried on, with receipt.</div>"#;

#[derive(Default)]
struct FakeSite {
    requested: Mutex<Vec<String>>,
}

#[async_trait]
impl Transport for FakeSite {
    async fn fetch(&self, url: &str, kind: PageKind) -> BrowserResult<String> {
        self.requested.lock().unwrap().push(url.to_string());
        match kind {
            PageKind::Listing if url.ends_with("_pgn=1") => Ok(LISTING.to_string()),
            PageKind::Listing => Ok(String::new()),
            PageKind::Detail => Ok(DETAIL.to_string()),
        }
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

struct FakeConnector(Arc<FakeSite>);

#[async_trait]
impl Connector for FakeConnector {
    async fn connect(&self) -> BrowserResult<Arc<dyn Transport>> {
        Ok(self.0.clone())
    }
}

struct FailingConnector;

#[async_trait]
impl Connector for FailingConnector {
    async fn connect(&self) -> BrowserResult<Arc<dyn Transport>> {
        Err(BrowserError::ChromiumError("failed to launch".to_string()))
    }
}

fn quiet_config() -> PipelineConfig {
    PipelineConfig {
        listing_delay: DelayPolicy::none(),
        detail_delay: DelayPolicy::none(),
        ..PipelineConfig::default()
    }
}

fn router(connector: Arc<dyn Connector>) -> Router {
    app(AppState::with_connector(quiet_config(), connector).expect("valid pipeline"))
}

async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_scrape_success_envelope() {
    let site = Arc::new(FakeSite::default());
    let (status, body) = get_json(
        router(Arc::new(FakeConnector(site.clone()))),
        "/api/scrape?keyword=jordan&pages=2",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["keyword"], "jordan");
    assert_eq!(body["pagesScraped"], 1);
    assert_eq!(body["totalProducts"], 1);
    assert!(body.get("timedOut").is_none());

    let product = &body["products"][0];
    assert_eq!(product["name"], "Nike Air Jordan 1 Retro High OG");
    assert_eq!(product["price"], "$180.00");
    assert_eq!(product["link"], "https://www.ebay.com/itm/123456789");
    assert_eq!(product["image"], "unknown");
    assert_eq!(
        product["description"],
        "Deadstock pair, never tried on, with receipt."
    );

    let requested = site.requested.lock().unwrap().clone();
    assert_eq!(requested.len(), 3);
}

#[tokio::test]
async fn test_scrape_defaults() {
    let site = Arc::new(FakeSite::default());
    let (status, body) = get_json(
        router(Arc::new(FakeConnector(site.clone()))),
        "/api/scrape?keyword=&pages=abc",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["keyword"], "nike");
    assert_eq!(
        site.requested.lock().unwrap()[0],
        "https://www.ebay.com/sch/i.html?_nkw=nike&_sacat=0&_pgn=1"
    );
}

#[tokio::test]
async fn test_scrape_failure_envelope() {
    let (status, body) = get_json(router(Arc::new(FailingConnector)), "/api/scrape").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("failed to launch"));
    assert_eq!(body["message"], "Scraping failed. Please try again later.");
}

#[tokio::test]
async fn test_health_and_index() {
    let (status, body) = get_json(router(Arc::new(FailingConnector)), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = get_json(router(Arc::new(FailingConnector)), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "sifter");
    assert!(body["endpoints"]["scrape"]
        .as_str()
        .unwrap()
        .contains("/api/scrape"));
}
