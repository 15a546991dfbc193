//! Sitemap responses for axum handlers.

use axum::body::Body;
use axum::http::HeaderMap;
use axum::response::Response;
use sitemapper::Sitemapper;

use crate::error::ServerResult;

/// Render `sitemap` into an axum response.
///
/// With `gzip` set the body is compressed when the request's
/// `Accept-Encoding` allows it.
pub fn xml_response(
    sitemap: &Sitemapper,
    gzip: bool,
    headers: &HeaderMap,
) -> ServerResult<Response> {
    let response = sitemap.generate(gzip, headers)?;
    Ok(response.map(Body::from))
}
