use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Liveness check. Does not touch the remote site.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
pub struct IndexResponse {
    name: &'static str,
    version: &'static str,
    endpoints: Endpoints,
}

#[derive(Serialize)]
pub struct Endpoints {
    scrape: &'static str,
    health: &'static str,
}

/// Describes the available endpoints.
pub async fn index_handler() -> Json<IndexResponse> {
    Json(IndexResponse {
        name: "sifter",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: Endpoints {
            scrape: "GET /api/scrape?keyword=<keyword>&pages=<count>",
            health: "GET /health",
        },
    })
}
