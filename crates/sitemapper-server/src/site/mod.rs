//! axum integration: routers that record every route in a [`RouteTable`].
//!
//! Each declaration goes to the axum router and to the shared table, so the
//! sitemap can later resolve the route by name or by the returned
//! [`RouteHandle`].

mod blueprint;

pub use blueprint::SiteBlueprint;

use std::sync::Arc;

use axum::routing::MethodRouter;
use axum::Router;
use sitemapper::{RouteHandle, RouteTable};

/// An axum router paired with the route table the sitemap resolves against.
pub struct SiteRouter<S = ()> {
    router: Router<S>,
    table: Arc<RouteTable>,
}

impl<S> SiteRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Create an empty site served as `server_name` (`host[:port]`).
    pub fn new(server_name: impl Into<String>) -> Self {
        Self {
            router: Router::new(),
            table: Arc::new(RouteTable::new(server_name)),
        }
    }

    /// Table to attach sitemaps to.
    pub fn table(&self) -> Arc<RouteTable> {
        self.table.clone()
    }

    /// Declare a route under `name` and mount `method_router` at `path`.
    pub fn route(
        &mut self,
        name: &str,
        path: &str,
        method_router: MethodRouter<S>,
    ) -> RouteHandle {
        let handle = self.table.route(name, path);
        self.mount(path, method_router);
        tracing::debug!(route = name, path, "route declared");
        handle
    }

    /// Mount every route of a blueprint at its prefixed path.
    pub fn register_blueprint(&mut self, blueprint: SiteBlueprint<S>) {
        self.table.register_blueprint(&blueprint.blueprint);
        for (path, method_router) in blueprint.routes {
            let full_path = blueprint.blueprint.full_path(&path);
            self.mount(&full_path, method_router);
        }
    }

    /// The finished axum router.
    pub fn into_router(self) -> Router<S> {
        self.router
    }

    fn mount(&mut self, path: &str, method_router: MethodRouter<S>) {
        let router = std::mem::replace(&mut self.router, Router::new());
        self.router = router.route(path, method_router);
    }
}
