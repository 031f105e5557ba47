//! Sifter HTTP service.
//!
//! Exposes the scrape pipeline as a small JSON API. Business logic lives in
//! the `crates/` directory; this crate only wires routes, state and logging.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::index_handler))
        .route("/health", get(routes::health_handler))
        .route("/api/scrape", get(routes::scrape_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initialize tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sifter=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}
