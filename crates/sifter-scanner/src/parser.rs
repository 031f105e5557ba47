use crate::error::{Result, ScanError};
use crate::filter::{screen_title, Rejection, RejectionTally};
use crate::links::{absolutize, canonicalize_link, item_id};
use crate::selectors::{ContainerChain, SelectorChain};
use scraper::{ElementRef, Html};
use sifter_core::{Product, SelectorConfig, UNKNOWN};
use url::Url;

/// Turns a listing page into product records.
pub struct ListingExtractor {
    base_url: Url,
    items: ContainerChain,
    title: SelectorChain,
    price: SelectorChain,
    link: SelectorChain,
    image: SelectorChain,
}

impl ListingExtractor {
    pub fn new(selectors: &SelectorConfig, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| ScanError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            base_url,
            items: ContainerChain::new(&selectors.items)?,
            title: SelectorChain::text("title", &selectors.title)?,
            price: SelectorChain::text("price", &selectors.price)?,
            link: SelectorChain::attr("link", &selectors.link, &["href"])?,
            image: SelectorChain::attr("image", &selectors.image, &["src", "data-src"])?,
        })
    }

    /// Extract every valid product from `html`, in page order.
    ///
    /// An empty result means the page had no usable items.
    pub fn extract(&self, html: &str) -> Vec<Product> {
        let document = Html::parse_document(html);
        let containers = self.items.locate(&document);
        if containers.is_empty() {
            tracing::debug!("No item containers matched");
            return Vec::new();
        }

        let mut tally = RejectionTally::default();
        let mut products = Vec::with_capacity(containers.len());

        for element in containers {
            match self.parse_item(element) {
                Ok(product) => products.push(product),
                Err(rejection) => tally.record(rejection),
            }
        }

        tracing::debug!(
            kept = products.len(),
            rejected = tally.total(),
            "Listing extracted ({})",
            tally
        );
        products
    }

    fn parse_item(&self, element: ElementRef<'_>) -> std::result::Result<Product, Rejection> {
        let name = screen_title(self.title.resolve(element).as_deref())?;

        let link = self
            .link
            .resolve(element)
            .and_then(|href| absolutize(&self.base_url, &href))
            .map(|href| canonicalize_link(&href))
            .ok_or(Rejection::MissingLink)?;

        let id = item_id(&link).ok_or(Rejection::MissingItemId)?;

        let price = self.price.resolve_or(element, UNKNOWN);

        let image = self
            .image
            .resolve(element)
            .and_then(|src| absolutize(&self.base_url, &src))
            .unwrap_or_else(|| UNKNOWN.to_string());

        Ok(Product {
            id: Some(id),
            name,
            price,
            link,
            image,
            description: UNKNOWN.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> ListingExtractor {
        ListingExtractor::new(&SelectorConfig::default(), "https://www.ebay.com")
            .expect("default selectors are valid")
    }

    #[test]
    fn test_parse_search_results() {
        let html = r#"
            <ul class="srp-results">
                <li class="s-item"><div class="s-item__wrapper">
                    <div class="s-item__title"><span>Shop on eBay</span></div>
                    <span class="s-item__price">$20.00</span>
                    <a class="s-item__link" href="https://ebay.com/itm/123456"></a>
                </div></li>
                <li class="s-item"><div class="s-item__wrapper">
                    <div class="s-item__image"><img class="s-item__image-img" src="https://i.ebayimg.com/images/g/a/s-l225.jpg"></div>
                    <div class="s-item__title"><span>New Listing</span>Nike Air Max 90 Mens Size 10</div>
                    <span class="s-item__price">$89.99</span>
                    <a class="s-item__link" href="https://www.ebay.com/itm/Nike-Air-Max/256123456789?hash=item3b&amp;_trksid=p1"></a>
                </div></li>
                <li class="s-item"><div class="s-item__wrapper">
                    <div class="s-item__title">Nike Dunk Low Panda</div>
                    <a class="s-item__link" href="/itm/334455667788"></a>
                </div></li>
            </ul>
        "#;

        let products = extractor().extract(html);

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].name, "Nike Air Max 90 Mens Size 10");
        assert_eq!(products[0].price, "$89.99");
        assert_eq!(products[0].link, "https://www.ebay.com/itm/256123456789");
        assert_eq!(products[0].id.as_ref().unwrap().as_str(), "256123456789");
        assert_eq!(products[0].image, "https://i.ebayimg.com/images/g/a/s-l225.jpg");
        assert_eq!(products[0].description, UNKNOWN);

        assert_eq!(products[1].link, "https://www.ebay.com/itm/334455667788");
        assert_eq!(products[1].price, UNKNOWN);
        assert_eq!(products[1].image, UNKNOWN);
    }

    #[test]
    fn test_items_without_numeric_id_are_dropped() {
        let html = r#"
            <div class="s-item__wrapper">
                <div class="s-item__title">Adidas Ultraboost 22 Running</div>
                <a class="s-item__link" href="https://www.ebay.com/b/Adidas-Shoes/bn_123"></a>
            </div>
            <div class="s-item__wrapper">
                <div class="s-item__title">Adidas Ultraboost 23 Running</div>
            </div>
        "#;

        assert!(extractor().extract(html).is_empty());
    }

    #[test]
    fn test_fallback_container_selector() {
        let html = r#"
            <ul class="srp-results">
                <li class="s-item">
                    <h3>Vintage Nike Windbreaker Jacket</h3>
                    <a href="https://www.ebay.com/itm/99887766">view</a>
                    <img data-src="https://i.ebayimg.com/x.jpg" src="data:image/gif;base64,R0lGOD">
                </li>
            </ul>
        "#;

        let products = extractor().extract(html);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Vintage Nike Windbreaker Jacket");
        assert_eq!(products[0].image, "https://i.ebayimg.com/x.jpg");
    }

    #[test]
    fn test_empty_page() {
        assert!(extractor().extract("<html><body>No results</body></html>").is_empty());
        assert!(extractor().extract("").is_empty());
    }

    #[test]
    fn test_invalid_base_url() {
        let err = ListingExtractor::new(&SelectorConfig::default(), "not a url").err();
        assert!(matches!(err, Some(ScanError::InvalidBaseUrl { .. })));
    }
}
