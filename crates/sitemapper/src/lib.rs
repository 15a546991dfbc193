//! Sitemapper: sitemap and sitemap index generation for web applications.
//!
//! Routes are registered on a [`Sitemapper`] (optionally before the host
//! application exists), resolved to absolute URLs through a [`Host`], and
//! rendered on demand into a sitemap document, optionally cached and gzipped.

pub mod entry;
pub mod expander;
pub mod gzip;
pub mod host;
pub mod registry;
pub mod render;
pub mod types;

pub use entry::{Entry, ResolvedEntry};
pub use expander::{DynamicEndpoint, UrlGenerator, UrlSource, UrlVariables};
pub use gzip::{gzip_response, GZIP_LEVEL};
pub use host::{Blueprint, EndpointRef, Host, RouteHandle, RouteTable};
pub use registry::{Include, Registration, Sitemapper};
pub use render::{render_document, SITEMAP_NAMESPACE, XML_CONTENT_TYPE};
pub use types::*;
