//! Gzip compression of rendered responses.

use std::io::Write;

use bytes::Bytes;
use flate2::write::GzEncoder;
use flate2::Compression;
use http::header::{ACCEPT_ENCODING, CONTENT_ENCODING, CONTENT_LENGTH};
use http::{HeaderMap, HeaderValue, Response};

use crate::types::SitemapResult;

/// Compression level used for every response.
pub const GZIP_LEVEL: u32 = 6;

/// Gzip `response` if the request accepts it.
///
/// Left untouched when the request's `Accept-Encoding` does not mention gzip,
/// when the status is outside 2xx, or when the response already carries a
/// `Content-Encoding`.
pub fn gzip_response(
    response: Response<Bytes>,
    request_headers: &HeaderMap,
) -> SitemapResult<Response<Bytes>> {
    let accepts_gzip = request_headers
        .get_all(ACCEPT_ENCODING)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.to_ascii_lowercase().contains("gzip"));

    if !accepts_gzip
        || !response.status().is_success()
        || response.headers().contains_key(CONTENT_ENCODING)
    {
        return Ok(response);
    }

    let (mut parts, body) = response.into_parts();

    let mut encoder = GzEncoder::new(
        Vec::with_capacity(body.len() / 4),
        Compression::new(GZIP_LEVEL),
    );
    encoder.write_all(&body)?;
    let compressed = encoder.finish()?;

    tracing::trace!(
        original = body.len(),
        compressed = compressed.len(),
        "gzip applied"
    );

    parts
        .headers
        .insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
    parts
        .headers
        .insert(CONTENT_LENGTH, HeaderValue::from(compressed.len()));

    Ok(Response::from_parts(parts, Bytes::from(compressed)))
}
