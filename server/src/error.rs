//! Error envelope for HTTP handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use sifter_scanner::ScanError;

/// Retry hint returned with every failed scrape.
pub const RETRY_MESSAGE: &str = "Scraping failed. Please try again later.";

/// Serializable failure body: `{success: false, error, message}`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    /// Always false; lets clients branch on one field
    pub success: bool,
    /// What went wrong
    pub error: String,
    /// User-facing hint
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            success: false,
            error: error.into(),
            message: message.into(),
        }
    }

    pub fn internal(error: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error, RETRY_MESSAGE)
    }
}

impl From<ScanError> for ApiError {
    fn from(err: ScanError) -> Self {
        Self::internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
