//! Host capability contract and an in-memory route table implementing it.
//!
//! The registry never talks to a web framework directly. It needs two things
//! from its host: building an absolute URL for a route name plus bound
//! parameters, and mapping a [`RouteHandle`] back to the route name it was
//! declared under. [`RouteTable`] provides both and is what the axum
//! integration hands to the registry.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use url::Url;

use crate::types::{Scheme, SitemapError, SitemapResult};

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

/// Capabilities the registry needs from the hosting application.
pub trait Host: Send + Sync {
    /// Build the absolute URL of `endpoint` with the given bound parameters.
    fn url_for(
        &self,
        endpoint: &str,
        scheme: Scheme,
        variables: &BTreeMap<String, String>,
    ) -> SitemapResult<String>;

    /// Route name a handle was declared under, if the host knows it.
    fn endpoint_for(&self, handle: &RouteHandle) -> Option<String>;
}

/// Token returned when a route is declared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteHandle {
    id: u64,
    name: Arc<str>,
}

impl RouteHandle {
    fn next(name: &str) -> Self {
        Self {
            id: NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed),
            name: Arc::from(name),
        }
    }

    /// Name given at declaration (without any blueprint prefix).
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for RouteHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' (#{})", self.name, self.id)
    }
}

/// What a registration points at: a route name or a declared handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointRef {
    Name(String),
    Handle(RouteHandle),
}

impl From<&str> for EndpointRef {
    fn from(value: &str) -> Self {
        EndpointRef::Name(value.to_string())
    }
}

impl From<String> for EndpointRef {
    fn from(value: String) -> Self {
        EndpointRef::Name(value)
    }
}

impl From<RouteHandle> for EndpointRef {
    fn from(value: RouteHandle) -> Self {
        EndpointRef::Handle(value)
    }
}

impl From<&RouteHandle> for EndpointRef {
    fn from(value: &RouteHandle) -> Self {
        EndpointRef::Handle(value.clone())
    }
}

/// One piece of a parsed path template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    Wildcard(String),
}

#[derive(Debug, Clone)]
struct RouteTemplate {
    path: String,
    segments: Vec<Segment>,
}

impl RouteTemplate {
    fn parse(path: &str) -> Self {
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        let segments = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed.split('/').map(parse_segment).collect()
        };
        Self {
            path: path.to_string(),
            segments,
        }
    }

    fn params(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) | Segment::Wildcard(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }
}

fn parse_segment(raw: &str) -> Segment {
    if let Some(name) = raw.strip_prefix(':') {
        return Segment::Param(name.to_string());
    }
    if let Some(name) = raw.strip_prefix('*') {
        return Segment::Wildcard(name.to_string());
    }
    if let Some(inner) = raw.strip_prefix('{').and_then(|r| r.strip_suffix('}')) {
        return match inner.strip_prefix('*') {
            Some(name) => Segment::Wildcard(name.to_string()),
            None => Segment::Param(inner.to_string()),
        };
    }
    Segment::Literal(raw.to_string())
}

#[derive(Debug, Default)]
struct RouteMap {
    routes: HashMap<String, RouteTemplate>,
    handles: HashMap<RouteHandle, String>,
}

/// In-memory route table: route names, their path templates and handles.
///
/// Shared between the router under construction and the registry, so all
/// mutation goes through `&self`.
#[derive(Debug)]
pub struct RouteTable {
    server_name: String,
    inner: RwLock<RouteMap>,
}

impl RouteTable {
    /// Create an empty table for the given `host[:port]`.
    pub fn new(server_name: impl Into<String>) -> Self {
        Self {
            server_name: server_name.into(),
            inner: RwLock::new(RouteMap::default()),
        }
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Declare a route and return its handle.
    ///
    /// Declaring an existing name again replaces its path.
    pub fn route(&self, name: &str, path: &str) -> RouteHandle {
        let handle = RouteHandle::next(name);
        self.insert(name, path, handle.clone());
        handle
    }

    /// Make every route of a blueprint known, under `"<blueprint>.<name>"`.
    pub fn register_blueprint(&self, blueprint: &Blueprint) {
        for (handle, path) in &blueprint.routes {
            let endpoint = blueprint.endpoint_name(handle.name());
            let full_path = blueprint.full_path(path);
            self.insert(&endpoint, &full_path, handle.clone());
        }
        tracing::debug!(
            blueprint = %blueprint.name,
            routes = blueprint.routes.len(),
            "blueprint registered"
        );
    }

    /// Whether a route with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.read().routes.contains_key(name)
    }

    /// Path template of a route.
    pub fn path_of(&self, name: &str) -> Option<String> {
        self.read().routes.get(name).map(|t| t.path.clone())
    }

    /// Number of named routes.
    pub fn len(&self) -> usize {
        self.read().routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&self, name: &str, path: &str, handle: RouteHandle) {
        let mut map = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        map.routes
            .insert(name.to_string(), RouteTemplate::parse(path));
        map.handles.insert(handle, name.to_string());
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, RouteMap> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Host for RouteTable {
    fn url_for(
        &self,
        endpoint: &str,
        scheme: Scheme,
        variables: &BTreeMap<String, String>,
    ) -> SitemapResult<String> {
        let template = self
            .read()
            .routes
            .get(endpoint)
            .cloned()
            .ok_or_else(|| SitemapError::EndpointNotRegistered(endpoint.to_string()))?;

        let mut url = Url::parse(&format!("{scheme}://{}", self.server_name))?;
        if url.path() != "/" || url.query().is_some() {
            return Err(SitemapError::UrlBuild {
                endpoint: endpoint.to_string(),
                message: format!("server name '{}' cannot carry a path", self.server_name),
            });
        }

        if !template.segments.is_empty() {
            let mut parts: Vec<&str> = Vec::with_capacity(template.segments.len());
            for segment in &template.segments {
                match segment {
                    Segment::Literal(text) => parts.push(text),
                    Segment::Param(name) => parts.push(lookup(endpoint, name, variables)?),
                    Segment::Wildcard(name) => {
                        parts.extend(lookup(endpoint, name, variables)?.split('/'))
                    }
                }
            }
            url.path_segments_mut()
                .map_err(|_| SitemapError::UrlBuild {
                    endpoint: endpoint.to_string(),
                    message: format!("server name '{}' cannot be a base URL", self.server_name),
                })?
                .clear()
                .extend(parts);
        }

        let bound: Vec<&str> = template.params().collect();
        let extra: Vec<(&String, &String)> = variables
            .iter()
            .filter(|(name, _)| !bound.contains(&name.as_str()))
            .collect();
        if !extra.is_empty() {
            url.query_pairs_mut().extend_pairs(extra);
        }

        Ok(url.to_string())
    }

    fn endpoint_for(&self, handle: &RouteHandle) -> Option<String> {
        self.read().handles.get(handle).cloned()
    }
}

fn lookup<'a>(
    endpoint: &str,
    name: &str,
    variables: &'a BTreeMap<String, String>,
) -> SitemapResult<&'a str> {
    variables
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| SitemapError::UrlBuild {
            endpoint: endpoint.to_string(),
            message: format!("missing value for parameter '{name}'"),
        })
}

/// A named group of routes with an optional URL prefix.
///
/// Handles are issued when a route is declared on the blueprint, but a table
/// only learns about them once the blueprint is registered on it.
#[derive(Debug, Clone)]
pub struct Blueprint {
    name: String,
    url_prefix: String,
    routes: Vec<(RouteHandle, String)>,
}

impl Blueprint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url_prefix: String::new(),
            routes: Vec::new(),
        }
    }

    /// Prefix prepended to every route path, e.g. `/docs`.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.url_prefix = prefix.trim_end_matches('/').to_string();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare a route on this blueprint.
    pub fn route(&mut self, name: &str, path: &str) -> RouteHandle {
        let handle = RouteHandle::next(name);
        self.routes.push((handle.clone(), path.to_string()));
        handle
    }

    /// Endpoint name a route gets once registered.
    pub fn endpoint_name(&self, route: &str) -> String {
        format!("{}.{route}", self.name)
    }

    /// Path a route gets once registered.
    pub fn full_path(&self, path: &str) -> String {
        format!("{}{path}", self.url_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_root_and_literal_paths() {
        let table = RouteTable::new("localhost");
        table.route("home", "/");
        table.route("about", "/about");
        table.route("slash", "/docs/");

        let none = BTreeMap::new();
        assert_eq!(
            table.url_for("home", Scheme::Https, &none).unwrap(),
            "https://localhost/"
        );
        assert_eq!(
            table.url_for("about", Scheme::Http, &none).unwrap(),
            "http://localhost/about"
        );
        assert_eq!(
            table.url_for("slash", Scheme::Https, &none).unwrap(),
            "https://localhost/docs/"
        );
    }

    #[test]
    fn test_param_syntaxes() {
        let table = RouteTable::new("example.com:8080");
        table.route("colon", "/user/:user_id");
        table.route("brace", "/post/{user_id}/{post_id}");
        table.route("wild", "/files/*rest");

        let v = vars(&[("user_id", "1"), ("post_id", "4"), ("rest", "a/b.txt")]);
        assert_eq!(
            table
                .url_for("colon", Scheme::Https, &vars(&[("user_id", "1")]))
                .unwrap(),
            "https://example.com:8080/user/1"
        );
        assert_eq!(
            table
                .url_for("brace", Scheme::Https, &vars(&[("user_id", "1"), ("post_id", "4")]))
                .unwrap(),
            "https://example.com:8080/post/1/4"
        );
        assert_eq!(
            table
                .url_for("wild", Scheme::Https, &vars(&[("rest", "a/b.txt")]))
                .unwrap(),
            "https://example.com:8080/files/a/b.txt"
        );
        // Variables not in the template end up in the query string.
        assert_eq!(
            table.url_for("colon", Scheme::Https, &v).unwrap(),
            "https://example.com:8080/user/1?post_id=4&rest=a%2Fb.txt"
        );
    }

    #[test]
    fn test_server_name_with_path_rejected() {
        let table = RouteTable::new("example.com/app");
        table.route("home", "/");
        table.route("about", "/about");

        let none = BTreeMap::new();
        for endpoint in ["home", "about"] {
            let err = table.url_for(endpoint, Scheme::Https, &none).unwrap_err();
            assert!(
                matches!(&err, SitemapError::UrlBuild { message, .. } if message.contains("example.com/app")),
                "{endpoint}: {err}"
            );
        }
    }

    #[test]
    fn test_values_are_percent_encoded() {
        let table = RouteTable::new("localhost");
        table.route("tag", "/tag/:name");
        let url = table
            .url_for("tag", Scheme::Https, &vars(&[("name", "a b")]))
            .unwrap();
        assert_eq!(url, "https://localhost/tag/a%20b");
    }

    #[test]
    fn test_missing_param_is_build_error() {
        let table = RouteTable::new("localhost");
        table.route("user", "/user/:user_id");
        let err = table
            .url_for("user", Scheme::Https, &BTreeMap::new())
            .unwrap_err();
        assert!(matches!(err, SitemapError::UrlBuild { .. }));
    }

    #[test]
    fn test_unknown_endpoint() {
        let table = RouteTable::new("localhost");
        let err = table
            .url_for("nope", Scheme::Https, &BTreeMap::new())
            .unwrap_err();
        assert!(matches!(err, SitemapError::EndpointNotRegistered(name) if name == "nope"));
    }

    #[test]
    fn test_handles_are_distinct_per_declaration() {
        let table = RouteTable::new("localhost");
        let shop = table.route("store", "/shop");
        let store = table.route("store", "/store");
        assert_ne!(shop, store);
        assert_eq!(table.endpoint_for(&store).as_deref(), Some("store"));
        assert_eq!(table.path_of("store").as_deref(), Some("/store"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_foreign_handle_is_unknown() {
        let a = RouteTable::new("localhost");
        let b = RouteTable::new("localhost");
        let handle = a.route("home", "/");
        assert!(b.endpoint_for(&handle).is_none());
    }

    #[test]
    fn test_blueprint_routes_known_after_registration() {
        let table = RouteTable::new("localhost");
        let mut contact = Blueprint::new("contact").with_prefix("/contact/");
        let email = contact.route("email", "/email");

        assert!(table.endpoint_for(&email).is_none());
        table.register_blueprint(&contact);

        assert_eq!(table.endpoint_for(&email).as_deref(), Some("contact.email"));
        assert_eq!(
            table
                .url_for("contact.email", Scheme::Https, &BTreeMap::new())
                .unwrap(),
            "https://localhost/contact/email"
        );
    }
}
