//! Detail-page description enrichment.

use crate::error::Result;
use crate::fetcher::fetch_page;
use crate::links::is_detail_link;
use crate::normalize::{normalize, normalize_description, truncate_chars};
use crate::pacing::{Deadline, DelayPolicy};
use crate::selectors::SelectorChain;
use futures::FutureExt;
use scraper::Html;
use sifter_browser::{PageKind, Transport};
use sifter_core::{Product, SelectorConfig, NO_DESCRIPTION};
use std::panic::AssertUnwindSafe;

/// Characters of main-content text considered as a fallback description.
pub const MAIN_CONTENT_EXCERPT_CHARS: usize = 500;

const MIN_DESCRIPTION_CHARS: usize = 10;
const MIN_EXCERPT_CHARS: usize = 20;

fn main_content_excerpt(raw: &str) -> String {
    let collapsed = normalize(raw);
    normalize_description(truncate_chars(&collapsed, MAIN_CONTENT_EXCERPT_CHARS))
}

pub struct DetailEnhancer {
    description: SelectorChain,
    main_content: SelectorChain,
    delay: DelayPolicy,
}

impl DetailEnhancer {
    pub fn new(selectors: &SelectorConfig, delay: DelayPolicy) -> Result<Self> {
        Ok(Self {
            description: SelectorChain::text("description", &selectors.description)?
                .with_cleaner(normalize_description)
                .with_min_len(MIN_DESCRIPTION_CHARS),
            main_content: SelectorChain::combined("main_content", &selectors.main_content)?
                .with_cleaner(main_content_excerpt)
                .with_min_len(MIN_EXCERPT_CHARS),
            delay,
        })
    }

    /// Description for one detail page, or [`NO_DESCRIPTION`].
    pub fn describe(&self, html: &str) -> String {
        let document = Html::parse_document(html);
        let root = document.root_element();

        if let Some(description) = self.description.resolve(root) {
            return description;
        }
        if let Some(excerpt) = self.main_content.resolve(root) {
            tracing::debug!("Using main content excerpt as description");
            return excerpt;
        }
        NO_DESCRIPTION.to_string()
    }

    /// Enhance the first `budget` records and pass the rest through.
    ///
    /// Once `deadline` passes no further detail page is fetched; records not
    /// reached keep their prior description. A panic anywhere in the stage
    /// returns `records` untouched.
    pub async fn enhance(
        &self,
        transport: &dyn Transport,
        records: Vec<Product>,
        budget: usize,
        deadline: Deadline,
    ) -> Vec<Product> {
        let originals = records.clone();
        match AssertUnwindSafe(self.enhance_all(transport, records, budget, deadline))
            .catch_unwind()
            .await
        {
            Ok(enhanced) => enhanced,
            Err(_) => {
                tracing::error!("Detail enhancement panicked, returning unenhanced records");
                originals
            }
        }
    }

    async fn enhance_all(
        &self,
        transport: &dyn Transport,
        mut records: Vec<Product>,
        budget: usize,
        deadline: Deadline,
    ) -> Vec<Product> {
        let head_len = budget.min(records.len());
        let tail = records.split_off(head_len);
        let mut attempted = 0usize;
        let mut enhanced = 0usize;

        for (index, record) in records.iter_mut().enumerate() {
            match deadline.run(self.enhance_one(transport, record)).await {
                Some(done) => {
                    attempted += 1;
                    enhanced += usize::from(done);
                }
                None => {
                    tracing::warn!(index, "Run deadline reached during detail fetch");
                    break;
                }
            }
            if index + 1 < head_len && deadline.run(self.delay.pause(0)).await.is_none() {
                tracing::warn!(index, "Run deadline reached, stopping enhancement");
                break;
            }
        }

        tracing::info!(
            attempted,
            enhanced,
            unresolved = records.iter().filter(|p| p.description_pending()).count(),
            passed_through = tail.len(),
            "Detail enhancement finished"
        );

        records.extend(tail);
        records
    }

    /// Returns true when a detail page was fetched and parsed.
    async fn enhance_one(&self, transport: &dyn Transport, record: &mut Product) -> bool {
        if !is_detail_link(&record.link) {
            tracing::debug!(url = %record.link, "Skipping non-detail link");
            return false;
        }

        let Some(html) = fetch_page(transport, &record.link, PageKind::Detail).await else {
            return false;
        };

        record.description = self.describe(&html);
        tracing::debug!(url = %record.link, chars = record.description.len(), "Description extracted");
        true
    }
}
