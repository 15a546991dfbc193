//! Error types for the HTTP integration.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sitemapper::SitemapError;

/// All errors that can occur while building or serving a site.
#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    #[error("Sitemap error: {0}")]
    Sitemap(#[from] SitemapError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}
