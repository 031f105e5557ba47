use crate::fetcher::fetch_page;
use crate::links::build_search_url;
use crate::pacing::{Deadline, DelayPolicy};
use crate::parser::ListingExtractor;
use sifter_browser::{PageKind, Transport};
use sifter_core::Product;
use std::collections::HashSet;

/// Records collected across listing pages.
#[derive(Debug, Default)]
pub struct PageScan {
    pub products: Vec<Product>,
    /// Pages that yielded at least one record.
    pub pages_scraped: u32,
    /// True when an empty page ended the scan before `page_count`.
    pub stopped_early: bool,
    /// True when the run deadline ended the scan.
    pub deadline_reached: bool,
}

/// Walks listing pages in order until the requested count or the first empty page.
pub struct Paginator<'a> {
    transport: &'a dyn Transport,
    extractor: &'a ListingExtractor,
    base_url: &'a str,
    delay: DelayPolicy,
    dedupe: bool,
    deadline: Deadline,
}

impl<'a> Paginator<'a> {
    pub fn new(
        transport: &'a dyn Transport,
        extractor: &'a ListingExtractor,
        base_url: &'a str,
        delay: DelayPolicy,
    ) -> Self {
        Self {
            transport,
            extractor,
            base_url,
            delay,
            dedupe: false,
            deadline: Deadline::none(),
        }
    }

    /// Drop records whose canonical link was seen on an earlier page.
    #[must_use]
    pub fn with_dedupe(mut self, dedupe: bool) -> Self {
        self.dedupe = dedupe;
        self
    }

    /// Start no page fetch or pause once `deadline` has passed.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = deadline;
        self
    }

    pub async fn paginate(&self, keyword: &str, page_count: u32) -> PageScan {
        let mut scan = PageScan::default();
        let mut seen: HashSet<String> = HashSet::new();

        for page in 1..=page_count {
            let url = build_search_url(self.base_url, keyword, page);
            tracing::debug!(page, url = %url, "Fetching listing page");

            let Some(fetched) = self
                .deadline
                .run(fetch_page(self.transport, &url, PageKind::Listing))
                .await
            else {
                tracing::warn!(page, "Run deadline reached during listing fetch");
                scan.deadline_reached = true;
                break;
            };
            let products = match fetched {
                Some(html) => self.extractor.extract(&html),
                None => Vec::new(),
            };

            if products.is_empty() {
                tracing::info!(page, "No items found, stopping pagination");
                scan.stopped_early = page < page_count;
                break;
            }

            let found = products.len();
            let before = scan.products.len();
            if self.dedupe {
                scan.products
                    .extend(products.into_iter().filter(|p| seen.insert(p.link.clone())));
            } else {
                scan.products.extend(products);
            }
            scan.pages_scraped += 1;

            tracing::info!(
                page,
                count = found,
                added = scan.products.len() - before,
                total = scan.products.len(),
                "Listing page scraped"
            );

            if page < page_count && self.deadline.run(self.delay.pause(page)).await.is_none() {
                tracing::warn!(page, "Run deadline reached, stopping pagination");
                scan.deadline_reached = true;
                break;
            }
        }

        scan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sifter_browser::{BrowserError, Result as BrowserResult};
    use sifter_core::SelectorConfig;
    use std::sync::Mutex;

    struct ScriptedTransport {
        pages: Vec<Option<String>>,
        requested: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn new(pages: Vec<Option<String>>) -> Self {
            Self {
                pages,
                requested: Mutex::new(Vec::new()),
            }
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn fetch(&self, url: &str, _kind: PageKind) -> BrowserResult<String> {
            let mut requested = self.requested.lock().unwrap();
            let index = requested.len();
            requested.push(url.to_string());
            match self.pages.get(index).cloned().flatten() {
                Some(html) => Ok(html),
                None => Err(BrowserError::Timeout(url.to_string())),
            }
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    fn page(ids: &[u64]) -> Option<String> {
        let items: String = ids
            .iter()
            .map(|id| {
                format!(
                    r#"<li class="s-item"><div class="s-item__wrapper">
                        <div class="s-item__title">Sneaker listing number {id}</div>
                        <a class="s-item__link" href="https://www.ebay.com/itm/{id}"></a>
                    </div></li>"#
                )
            })
            .collect();
        Some(format!("<ul class=\"srp-results\">{items}</ul>"))
    }

    fn extractor() -> ListingExtractor {
        ListingExtractor::new(&SelectorConfig::default(), "https://www.ebay.com").unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_on_first_empty_page() {
        let transport = ScriptedTransport::new(vec![page(&[1, 2]), page(&[]), page(&[3])]);
        let extractor = extractor();
        let paginator = Paginator::new(
            &transport,
            &extractor,
            "https://www.ebay.com",
            DelayPolicy::none(),
        );

        let scan = paginator.paginate("nike", 3).await;

        assert_eq!(scan.products.len(), 2);
        assert_eq!(scan.pages_scraped, 1);
        assert!(scan.stopped_early);
        assert_eq!(transport.requested().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_counts_as_empty() {
        let transport = ScriptedTransport::new(vec![None, page(&[1])]);
        let extractor = extractor();
        let paginator = Paginator::new(
            &transport,
            &extractor,
            "https://www.ebay.com",
            DelayPolicy::none(),
        );

        let scan = paginator.paginate("nike", 2).await;

        assert!(scan.products.is_empty());
        assert_eq!(scan.pages_scraped, 0);
        assert_eq!(transport.requested().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_page_urls_and_pacing() {
        let transport = ScriptedTransport::new(vec![page(&[1]), page(&[2])]);
        let extractor = extractor();
        let delay = DelayPolicy {
            base: std::time::Duration::from_secs(2),
            jitter: std::time::Duration::ZERO,
            progressive: std::time::Duration::from_millis(500),
        };
        let paginator = Paginator::new(&transport, &extractor, "https://www.ebay.com", delay);

        let start = tokio::time::Instant::now();
        let scan = paginator.paginate("air max", 2).await;

        assert_eq!(scan.pages_scraped, 2);
        assert!(!scan.stopped_early);
        // One pause after page 1, none after the last page.
        assert_eq!(start.elapsed(), std::time::Duration::from_millis(2500));
        assert_eq!(
            transport.requested(),
            vec![
                "https://www.ebay.com/sch/i.html?_nkw=air%20max&_sacat=0&_pgn=1",
                "https://www.ebay.com/sch/i.html?_nkw=air%20max&_sacat=0&_pgn=2",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_dedupe_by_link() {
        let transport = ScriptedTransport::new(vec![page(&[1, 2]), page(&[2, 3])]);
        let extractor = extractor();

        let kept = Paginator::new(&transport, &extractor, "https://www.ebay.com", DelayPolicy::none())
            .with_dedupe(true)
            .paginate("nike", 2)
            .await;
        assert_eq!(kept.products.len(), 3);
        assert_eq!(kept.pages_scraped, 2);

        let transport = ScriptedTransport::new(vec![page(&[1, 2]), page(&[2, 3])]);
        let all = Paginator::new(&transport, &extractor, "https://www.ebay.com", DelayPolicy::none())
            .paginate("nike", 2)
            .await;
        assert_eq!(all.products.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_keeps_collected_pages() {
        let transport = ScriptedTransport::new(vec![page(&[1, 2]), page(&[3]), page(&[4])]);
        let extractor = extractor();
        let delay = DelayPolicy {
            base: std::time::Duration::from_secs(10),
            jitter: std::time::Duration::ZERO,
            progressive: std::time::Duration::ZERO,
        };
        let deadline = Deadline::after(Some(std::time::Duration::from_secs(15)));

        let scan = Paginator::new(&transport, &extractor, "https://www.ebay.com", delay)
            .with_deadline(deadline)
            .paginate("nike", 3)
            .await;

        // Page 2 is fetched at 10s; the pause after it is cut at 15s.
        assert_eq!(scan.products.len(), 3);
        assert_eq!(scan.pages_scraped, 2);
        assert!(scan.deadline_reached);
        assert!(!scan.stopped_early);
        assert_eq!(transport.requested().len(), 2);
    }
}
