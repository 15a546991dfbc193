//! A single sitemap entry and its resolved form.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::host::Host;
use crate::types::{Lastmod, Priority, Scheme, SitemapResult};

/// One sitemap-able URL plus optional metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub endpoint: String,
    pub scheme: Scheme,
    pub lastmod: Option<String>,
    pub changefreq: Option<String>,
    pub priority: Option<Priority>,
    pub url_variables: BTreeMap<String, String>,
}

impl Entry {
    /// Build an entry, normalizing `lastmod` to text.
    pub fn new(
        endpoint: impl Into<String>,
        scheme: Scheme,
        lastmod: Option<Lastmod>,
        changefreq: Option<String>,
        priority: Option<Priority>,
        url_variables: BTreeMap<String, String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            scheme,
            lastmod: lastmod.map(Lastmod::into_text),
            changefreq,
            priority,
            url_variables,
        }
    }

    /// Resolve the absolute URL through the host.
    pub fn loc(&self, host: &dyn Host) -> SitemapResult<String> {
        host.url_for(&self.endpoint, self.scheme, &self.url_variables)
    }

    /// Resolve into the form the renderer writes out.
    pub fn resolve(&self, host: &dyn Host) -> SitemapResult<ResolvedEntry> {
        Ok(ResolvedEntry {
            loc: self.loc(host)?,
            lastmod: self.lastmod.clone().filter(|v| !v.is_empty()),
            changefreq: self.changefreq.clone().filter(|v| !v.is_empty()),
            priority: self
                .priority
                .as_ref()
                .filter(|p| p.is_set())
                .map(|p| p.to_string()),
        })
    }
}

/// An entry with its URL resolved and unset metadata dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedEntry {
    pub loc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastmod: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changefreq: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}
