//! Route groups mounted under a shared prefix.

use axum::routing::MethodRouter;
use sitemapper::{Blueprint, RouteHandle};

/// A named, optionally prefixed group of axum routes.
///
/// Handles are issued immediately; the routes become resolvable once the
/// blueprint is passed to [`SiteRouter::register_blueprint`].
///
/// [`SiteRouter::register_blueprint`]: super::SiteRouter::register_blueprint
pub struct SiteBlueprint<S = ()> {
    pub(super) blueprint: Blueprint,
    pub(super) routes: Vec<(String, MethodRouter<S>)>,
}

impl<S> SiteBlueprint<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            blueprint: Blueprint::new(name),
            routes: Vec::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.blueprint = self.blueprint.with_prefix(prefix);
        self
    }

    pub fn name(&self) -> &str {
        self.blueprint.name()
    }

    /// Declare a route; `path` is relative to the prefix.
    pub fn route(
        &mut self,
        name: &str,
        path: &str,
        method_router: MethodRouter<S>,
    ) -> RouteHandle {
        let handle = self.blueprint.route(name, path);
        self.routes.push((path.to_string(), method_router));
        handle
    }
}
