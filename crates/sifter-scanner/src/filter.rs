//! Candidate screening for listing items.

use crate::normalize::strip_phrases;
use std::collections::BTreeMap;
use std::fmt;

/// Title text of the promotional placeholder card.
pub const AD_MARKER: &str = "Shop on eBay";

/// Screen-reader and badge text that leaks into item titles.
pub const TITLE_BOILERPLATE: [&str; 2] = ["Opens in a new window or tab", "New Listing"];

/// Titles shorter than this are treated as junk.
pub const MIN_TITLE_CHARS: usize = 10;

/// Why a candidate container was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rejection {
    MissingTitle,
    ShortTitle,
    Advertisement,
    MissingLink,
    MissingItemId,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::MissingTitle => "missing title",
            Self::ShortTitle => "short title",
            Self::Advertisement => "advertisement",
            Self::MissingLink => "missing link",
            Self::MissingItemId => "missing item id",
        };
        f.write_str(reason)
    }
}

/// Clean a raw title and decide whether it belongs to a real item.
pub fn screen_title(raw: Option<&str>) -> Result<String, Rejection> {
    let raw = raw.ok_or(Rejection::MissingTitle)?;
    if raw.contains(AD_MARKER) {
        return Err(Rejection::Advertisement);
    }

    let title = strip_phrases(raw, &TITLE_BOILERPLATE);
    if title.is_empty() {
        return Err(Rejection::MissingTitle);
    }
    if title.chars().count() < MIN_TITLE_CHARS {
        return Err(Rejection::ShortTitle);
    }
    Ok(title)
}

/// Per-reason rejection counts for one page.
#[derive(Debug, Default)]
pub struct RejectionTally {
    counts: BTreeMap<Rejection, usize>,
}

impl RejectionTally {
    pub fn record(&mut self, rejection: Rejection) {
        *self.counts.entry(rejection).or_insert(0) += 1;
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

impl fmt::Display for RejectionTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .counts
            .iter()
            .map(|(reason, count)| format!("{reason}: {count}"))
            .collect();
        f.write_str(&parts.join(", "))
    }
}
