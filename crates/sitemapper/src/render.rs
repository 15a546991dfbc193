//! XML rendering of a registry into a sitemap or sitemap index response.

use std::fmt;

use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Response, StatusCode};
use quick_xml::escape::escape;

use crate::entry::ResolvedEntry;
use crate::gzip::gzip_response;
use crate::registry::Sitemapper;
use crate::types::{SitemapKind, SitemapResult};

/// Sitemap protocol namespace.
pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Content type of every rendered document.
pub const XML_CONTENT_TYPE: &str = "application/xml";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

/// Render resolved entries into a complete document.
///
/// Layout is fixed: declaration, root element, one two-space indented element
/// per entry, no trailing newline.
pub fn render_document(kind: SitemapKind, entries: &[ResolvedEntry]) -> String {
    Document { kind, entries }.to_string()
}

struct Document<'a> {
    kind: SitemapKind,
    entries: &'a [ResolvedEntry],
}

impl fmt::Display for Document<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let root = self.kind.root_tag();
        let tag = self.kind.entry_tag();

        f.write_str(XML_DECLARATION)?;
        write!(f, "\n<{root} xmlns=\"{SITEMAP_NAMESPACE}\">")?;
        for entry in self.entries {
            write!(f, "\n  <{tag}>")?;
            write_element(f, "loc", &entry.loc)?;
            let optional = [
                ("lastmod", &entry.lastmod),
                ("changefreq", &entry.changefreq),
                ("priority", &entry.priority),
            ];
            for (name, value) in optional {
                if let Some(text) = value {
                    write_element(f, name, text)?;
                }
            }
            write!(f, "\n  </{tag}>")?;
        }
        write!(f, "\n</{root}>")
    }
}

fn write_element(f: &mut fmt::Formatter<'_>, name: &str, text: &str) -> fmt::Result {
    write!(f, "\n    <{name}>{}</{name}>", escape(text))
}

impl Sitemapper {
    /// Render the document, or reuse the cached copy when caching applies.
    pub fn render(&self) -> SitemapResult<Bytes> {
        if self.is_cacheable() {
            if let Some(xml) = self.xml.get() {
                tracing::trace!("serving cached sitemap");
                return Ok(xml.clone());
            }
        }

        let entries = self.resolved_entries()?;
        let xml = Bytes::from(render_document(self.kind(), &entries));
        tracing::debug!(
            kind = ?self.kind(),
            entries = entries.len(),
            bytes = xml.len(),
            "sitemap rendered"
        );

        if self.is_cacheable() {
            // A concurrent first render may have won; both documents are equal.
            let _ = self.xml.set(xml.clone());
        }
        Ok(xml)
    }

    /// Build the HTTP response for the sitemap.
    ///
    /// With `gzip` set the body is compressed when `request_headers` allow
    /// it; see [`gzip_response`].
    pub fn generate(
        &self,
        gzip: bool,
        request_headers: &HeaderMap,
    ) -> SitemapResult<Response<Bytes>> {
        let xml = self.render()?;
        let length = xml.len();

        let mut response = Response::new(xml);
        *response.status_mut() = StatusCode::OK;
        let headers = response.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(XML_CONTENT_TYPE));
        headers.insert(CONTENT_LENGTH, HeaderValue::from(length));

        if gzip {
            return gzip_response(response, request_headers);
        }
        Ok(response)
    }
}
