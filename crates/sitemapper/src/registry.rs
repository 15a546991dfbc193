//! The sitemap registry: what goes into one sitemap document.

use std::fmt;
use std::sync::{Arc, OnceLock};

use bytes::Bytes;

use crate::entry::{Entry, ResolvedEntry};
use crate::expander::{DynamicEndpoint, UrlSource, UrlVariables};
use crate::host::{EndpointRef, Host};
use crate::types::{
    Lastmod, MetaValue, Priority, Scheme, SitemapError, SitemapKind, SitemapResult,
};

/// Sitemap metadata and URL variables for one registration.
#[derive(Debug, Clone, Default)]
pub struct Include {
    pub lastmod: Option<MetaValue<Lastmod>>,
    pub changefreq: Option<MetaValue<String>>,
    pub priority: Option<MetaValue<Priority>>,
    pub url_variables: Option<UrlSource>,
}

impl Include {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lastmod(mut self, lastmod: impl Into<Lastmod>) -> Self {
        self.lastmod = Some(MetaValue::One(lastmod.into()));
        self
    }

    /// One `lastmod` per parameter combination of a dynamic route.
    pub fn lastmods<I, L>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Lastmod>,
    {
        self.lastmod = Some(MetaValue::PerIndex(
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn changefreq(mut self, changefreq: impl Into<String>) -> Self {
        self.changefreq = Some(MetaValue::One(changefreq.into()));
        self
    }

    pub fn changefreqs<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.changefreq = Some(MetaValue::PerIndex(
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn priority(mut self, priority: impl Into<Priority>) -> Self {
        self.priority = Some(MetaValue::One(priority.into()));
        self
    }

    pub fn priorities<I, P>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Priority>,
    {
        self.priority = Some(MetaValue::PerIndex(
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Fixed parameter values for a dynamic route.
    pub fn url_variables(mut self, variables: UrlVariables) -> Self {
        self.url_variables = Some(UrlSource::Literal(variables));
        self
    }

    /// Parameter values computed on every render. Disables the render cache.
    pub fn url_generator<F>(mut self, generate: F) -> Self
    where
        F: Fn() -> UrlVariables + Send + Sync + 'static,
    {
        self.url_variables = Some(UrlSource::Generator(Arc::new(generate)));
        self
    }
}

/// A registration recorded before the registry was attached to a host.
#[derive(Debug, Clone)]
pub struct Registration {
    pub endpoint: EndpointRef,
    pub include: Include,
}

/// Registry and renderer for one sitemap (or sitemap index) document.
///
/// Construction and attachment are separate steps: registrations made before
/// [`Sitemapper::attach`] are queued and replayed, in order, once a host is
/// available.
pub struct Sitemapper {
    scheme: Scheme,
    kind: SitemapKind,
    urls: Vec<Entry>,
    dynamic: Vec<DynamicEndpoint>,
    deferred: Vec<Registration>,
    host: Option<Arc<dyn Host>>,
    cache_xml: bool,
    cacheable: bool,
    pub(crate) xml: OnceLock<Bytes>,
}

impl Default for Sitemapper {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl Sitemapper {
    /// Create an unattached registry.
    ///
    /// `https` picks the URL scheme; `master` renders a sitemap index instead
    /// of a urlset.
    pub fn new(https: bool, master: bool) -> Self {
        Self {
            scheme: Scheme::from_https(https),
            kind: SitemapKind::from_master(master),
            urls: Vec::new(),
            dynamic: Vec::new(),
            deferred: Vec::new(),
            host: None,
            cache_xml: false,
            cacheable: true,
            xml: OnceLock::new(),
        }
    }

    /// Keep the first rendered document and serve it for every later call.
    pub fn with_cache(mut self, cache_xml: bool) -> Self {
        self.cache_xml = cache_xml;
        self
    }

    /// Construct already attached to `host`.
    pub fn with_host(mut self, host: Arc<dyn Host>) -> Self {
        self.host = Some(host);
        self
    }

    /// Bind to a host and replay every queued registration in order.
    ///
    /// Stops at the first failing registration; the rest of the queue is
    /// dropped.
    pub fn attach(&mut self, host: Arc<dyn Host>) -> SitemapResult<()> {
        self.host = Some(host);

        let deferred = std::mem::take(&mut self.deferred);
        if !deferred.is_empty() {
            tracing::debug!(count = deferred.len(), "replaying deferred registrations");
        }
        for registration in deferred {
            self.register(registration.endpoint, registration.include)?;
        }
        Ok(())
    }

    /// Add a route to the sitemap.
    ///
    /// Before attachment the call is queued. A [`RouteHandle`] that the host
    /// does not know fails with [`SitemapError::HandleNotRegistered`]; a plain
    /// route name is only checked when the URL is resolved.
    ///
    /// [`RouteHandle`]: crate::host::RouteHandle
    pub fn register(
        &mut self,
        endpoint: impl Into<EndpointRef>,
        include: Include,
    ) -> SitemapResult<()> {
        let endpoint = endpoint.into();

        let Some(host) = self.host.clone() else {
            tracing::debug!(endpoint = ?endpoint, "host not attached, deferring registration");
            self.deferred.push(Registration { endpoint, include });
            return Ok(());
        };

        let endpoint = match endpoint {
            EndpointRef::Name(name) => name,
            EndpointRef::Handle(handle) => host
                .endpoint_for(&handle)
                .ok_or(SitemapError::HandleNotRegistered(handle))?,
        };

        let Include {
            lastmod,
            changefreq,
            priority,
            url_variables,
        } = include;

        // An empty literal mapping counts as no variables at all.
        let source =
            url_variables.filter(|s| !matches!(s, UrlSource::Literal(vars) if vars.is_empty()));

        match source {
            Some(source) => {
                if !source.is_cacheable() {
                    self.cacheable = false;
                    self.xml = OnceLock::new();
                }
                tracing::debug!(endpoint = %endpoint, source = ?source, "dynamic endpoint added");
                self.dynamic.push(DynamicEndpoint {
                    endpoint,
                    scheme: self.scheme,
                    lastmod,
                    changefreq,
                    priority,
                    source,
                });
            }
            None => {
                tracing::debug!(endpoint = %endpoint, "endpoint added");
                self.urls.push(Entry::new(
                    endpoint,
                    self.scheme,
                    lastmod.and_then(|m| m.at(0)),
                    changefreq.and_then(|m| m.at(0)),
                    priority.and_then(|m| m.at(0)),
                    Default::default(),
                ));
            }
        }
        Ok(())
    }

    /// Register `route` and hand it back unchanged.
    ///
    /// Composes with a route declaration:
    /// `sitemap.include(table.route("home", "/"), Include::new())?`.
    pub fn include<R>(&mut self, route: R, include: Include) -> SitemapResult<R>
    where
        R: Clone + Into<EndpointRef>,
    {
        self.register(route.clone(), include)?;
        Ok(route)
    }

    /// Every entry in render order; dynamic routes are expanded here.
    pub fn entries(&self) -> Vec<Entry> {
        let mut entries = self.urls.clone();
        for dynamic in &self.dynamic {
            entries.extend(dynamic.entries());
        }
        entries
    }

    /// Every entry with its URL resolved through the attached host.
    pub fn resolved_entries(&self) -> SitemapResult<Vec<ResolvedEntry>> {
        let host = self.host.as_deref().ok_or(SitemapError::NotAttached)?;
        self.entries()
            .iter()
            .map(|entry| entry.resolve(host))
            .collect()
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn kind(&self) -> SitemapKind {
        self.kind
    }

    pub fn is_attached(&self) -> bool {
        self.host.is_some()
    }

    /// Registrations waiting for [`Sitemapper::attach`].
    pub fn pending(&self) -> &[Registration] {
        &self.deferred
    }

    /// Whether rendered output may be reused: caching requested and no
    /// generator-backed routes registered.
    pub fn is_cacheable(&self) -> bool {
        self.cache_xml && self.cacheable
    }
}

impl fmt::Debug for Sitemapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sitemapper")
            .field("scheme", &self.scheme)
            .field("kind", &self.kind)
            .field("urls", &self.urls.len())
            .field("dynamic", &self.dynamic.len())
            .field("deferred", &self.deferred.len())
            .field("attached", &self.host.is_some())
            .field("cache_xml", &self.cache_xml)
            .field("cacheable", &self.cacheable)
            .finish()
    }
}
