//! Ordered fallback selector chains.
//!
//! A [`SelectorChain`] holds the extraction strategies for one logical field,
//! most specific first. Resolution returns the first strategy whose cleaned
//! result is long enough; a strategy that finds nothing just hands over to the
//! next one. Selectors are parsed once, when the chain is built.

use crate::error::{Result, ScanError};
use crate::normalize::normalize;
use scraper::{ElementRef, Html, Selector};

type ExtractFn = dyn Fn(ElementRef<'_>) -> Option<String> + Send + Sync;

/// One named extraction attempt over an element scope.
pub struct Strategy {
    name: String,
    run: Box<ExtractFn>,
}

impl Strategy {
    /// Text content of the first element matching `css`.
    pub fn text(field: &'static str, css: &str) -> Result<Self> {
        let selector = parse_selector(field, css)?;
        Ok(Self {
            name: css.to_string(),
            run: Box::new(move |scope| {
                scope
                    .select(&selector)
                    .next()
                    .map(|el| el.text().collect::<String>())
            }),
        })
    }

    /// First of `attrs` present on an element matching `css`. Inline `data:`
    /// URIs (lazy-load placeholders) count as absent.
    pub fn attr(field: &'static str, css: &str, attrs: &'static [&'static str]) -> Result<Self> {
        let selector = parse_selector(field, css)?;
        Ok(Self {
            name: css.to_string(),
            run: Box::new(move |scope| {
                scope.select(&selector).find_map(|el| {
                    attrs
                        .iter()
                        .filter_map(|attr| el.value().attr(attr))
                        .find(|value| !value.trim_start().starts_with("data:"))
                        .map(str::to_string)
                })
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, scope: ElementRef<'_>) -> Option<String> {
        (self.run)(scope)
    }
}

/// The ordered strategies for one field plus its acceptance rule.
pub struct SelectorChain {
    field: &'static str,
    strategies: Vec<Strategy>,
    min_len: usize,
    clean: fn(&str) -> String,
}

impl SelectorChain {
    pub fn new(field: &'static str, strategies: Vec<Strategy>) -> Self {
        Self {
            field,
            strategies,
            min_len: 0,
            clean: normalize,
        }
    }

    /// Text chain over the given CSS selectors.
    pub fn text(field: &'static str, selectors: &[String]) -> Result<Self> {
        let strategies = selectors
            .iter()
            .map(|css| Strategy::text(field, css))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(field, strategies))
    }

    /// Single text strategy over the union of `selectors`.
    ///
    /// The first element matching any of them, in document order, is the only
    /// candidate; a short value does not fall through to later selectors.
    pub fn combined(field: &'static str, selectors: &[String]) -> Result<Self> {
        let css = selectors.join(", ");
        Ok(Self::new(field, vec![Strategy::text(field, &css)?]))
    }

    /// Attribute chain over the given CSS selectors.
    pub fn attr(
        field: &'static str,
        selectors: &[String],
        attrs: &'static [&'static str],
    ) -> Result<Self> {
        let strategies = selectors
            .iter()
            .map(|css| Strategy::attr(field, css, attrs))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(field, strategies))
    }

    /// Accept a value only when its cleaned length exceeds `min_len` characters.
    #[must_use]
    pub fn with_min_len(mut self, min_len: usize) -> Self {
        self.min_len = min_len;
        self
    }

    /// Cleanup applied to raw strategy output before the length check.
    #[must_use]
    pub fn with_cleaner(mut self, clean: fn(&str) -> String) -> Self {
        self.clean = clean;
        self
    }

    /// First accepted value, cleaned.
    pub fn resolve(&self, scope: ElementRef<'_>) -> Option<String> {
        for strategy in &self.strategies {
            let Some(raw) = strategy.apply(scope) else {
                continue;
            };
            let cleaned = (self.clean)(&raw);
            if cleaned.chars().count() > self.min_len {
                tracing::trace!(field = self.field, strategy = strategy.name(), "Selector matched");
                return Some(cleaned);
            }
        }
        None
    }

    /// [`SelectorChain::resolve`], falling back to `sentinel`.
    pub fn resolve_or(&self, scope: ElementRef<'_>, sentinel: &str) -> String {
        self.resolve(scope).unwrap_or_else(|| sentinel.to_string())
    }
}

/// Alternative selectors for the repeated item container.
///
/// The first selector with any match supplies the whole container set;
/// results of different selectors are never merged.
pub struct ContainerChain {
    selectors: Vec<(String, Selector)>,
}

impl ContainerChain {
    pub fn new(selectors: &[String]) -> Result<Self> {
        let selectors = selectors
            .iter()
            .map(|css| Ok((css.clone(), parse_selector("items", css)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { selectors })
    }

    pub fn locate<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        for (css, selector) in &self.selectors {
            let found: Vec<_> = document.select(selector).collect();
            if !found.is_empty() {
                tracing::debug!(selector = %css, count = found.len(), "Item containers located");
                return found;
            }
        }
        Vec::new()
    }
}

fn parse_selector(field: &'static str, css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScanError::InvalidSelector {
        field,
        selector: css.to_string(),
        reason: e.to_string(),
    })
}
