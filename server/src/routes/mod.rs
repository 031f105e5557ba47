mod health;
mod scrape;

pub use health::{health_handler, index_handler};
pub use scrape::{parse_pages, scrape_handler, ScrapeQuery, ScrapeResponse};
