//! Demo site: a small shop with static pages, dynamic user and post pages,
//! a docs section, a sitemap and a sitemap index.

use std::sync::{Arc, RwLock};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, Json, Response};
use axum::routing::get;
use axum::Router;
use chrono::NaiveDate;
use serde::Serialize;
use sitemapper::{Include, Sitemapper, UrlVariables};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::response::xml_response;
use crate::site::{SiteBlueprint, SiteRouter};

/// Published posts as `(user_id, post_id)`, read by the sitemap on every
/// render.
#[derive(Debug, Clone, Default)]
pub struct PostStore {
    posts: Arc<RwLock<Vec<(u32, u32)>>>,
}

impl PostStore {
    /// Store with the posts the demo starts with.
    pub fn seeded() -> Self {
        let store = Self::default();
        for (user_id, post_id) in [(1, 1), (1, 2), (2, 3)] {
            store.publish(user_id, post_id);
        }
        store
    }

    pub fn publish(&self, user_id: u32, post_id: u32) {
        let mut posts = self
            .posts
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !posts.contains(&(user_id, post_id)) {
            posts.push((user_id, post_id));
        }
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One URL variable combination per post.
    pub fn variables(&self) -> UrlVariables {
        let posts = self.read();
        UrlVariables::new()
            .var("user_id", posts.iter().map(|(user_id, _)| user_id))
            .var("post_id", posts.iter().map(|(_, post_id)| post_id))
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<(u32, u32)>> {
        self.posts
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// State shared by the demo's handlers.
#[derive(Clone)]
pub struct DemoState {
    pub sitemap: Arc<Sitemapper>,
    pub index: Arc<Sitemapper>,
    pub posts: PostStore,
    pub gzip: bool,
}

/// The assembled demo: its router plus the sitemaps behind it.
pub struct DemoSite {
    pub router: Router,
    pub state: DemoState,
}

impl DemoSite {
    /// The sitemap index when `index` is set, the page sitemap otherwise.
    pub fn sitemap(&self, index: bool) -> &Sitemapper {
        if index {
            &self.state.index
        } else {
            &self.state.sitemap
        }
    }
}

/// Build the demo site for `config`.
pub fn build(config: &ServerConfig) -> ServerResult<DemoSite> {
    let posts = PostStore::seeded();

    let mut sitemap = Sitemapper::new(config.https, false).with_cache(config.cache);
    let mut index = Sitemapper::new(config.https, true).with_cache(config.cache);
    let mut site: SiteRouter<DemoState> = SiteRouter::new(config.server_name.as_str());

    // Registered before the sitemap has a host; replayed on attach.
    let mut docs = SiteBlueprint::new("docs").with_prefix("/docs");
    sitemap.include(
        docs.route("index", "/", get(docs_index)),
        Include::new().changefreq("weekly").priority(0.6),
    )?;
    sitemap.include(
        docs.route("getting_started", "/getting-started", get(docs_getting_started)),
        Include::new().changefreq("monthly"),
    )?;
    site.register_blueprint(docs);

    sitemap.attach(site.table())?;

    sitemap.include(
        site.route("home", "/", get(home)),
        Include::new()
            .lastmod("2022-02-08")
            .changefreq("monthly")
            .priority(1.0),
    )?;
    sitemap.include(site.route("about", "/about", get(about)), Include::new())?;

    // One handler on three paths; only the canonical one is listed.
    let store_page = get(store);
    site.route("shop", "/shop", store_page.clone());
    site.route("buy", "/buy", store_page.clone());
    sitemap.include(site.route("store", "/store", store_page), Include::new())?;

    site.route("admin", "/admin", get(admin));

    site.route("contact", "/contact", get(contact));
    let contact_updated = NaiveDate::from_ymd_opt(2022, 2, 9)
        .and_then(|date| date.and_hms_opt(10, 30, 0))
        .ok_or_else(|| ServerError::Config("invalid contact page date".to_string()))?;
    sitemap.register("contact", Include::new().lastmod(contact_updated))?;

    sitemap.include(
        site.route("user", "/user/:user_id", get(user)),
        Include::new()
            .url_variables(UrlVariables::new().var("user_id", [1, 2, 3]))
            .lastmods(["2022-01-01", "2022-02-01", "2022-03-01"])
            .changefreq("monthly")
            .priorities([0.9, 0.8, 0.7]),
    )?;

    let published = posts.clone();
    sitemap.include(
        site.route(
            "post",
            "/post/:user_id/:post_id",
            get(show_post).post(publish_post),
        ),
        Include::new()
            .changefreq("daily")
            .url_generator(move || published.variables()),
    )?;

    index.attach(site.table())?;
    index.include(
        site.route("sitemap", "/sitemap.xml", get(sitemap_xml)),
        Include::new(),
    )?;
    site.route("sitemap_index", "/sitemap_index.xml", get(sitemap_index_xml));
    site.route("health", "/health", get(health));

    tracing::debug!(
        routes = site.table().len(),
        sitemap = ?sitemap,
        index = ?index,
        "demo site built"
    );

    let state = DemoState {
        sitemap: Arc::new(sitemap),
        index: Arc::new(index),
        posts,
        gzip: config.gzip,
    };
    let router = site.into_router().with_state(state.clone());

    Ok(DemoSite { router, state })
}

async fn home() -> Html<&'static str> {
    Html("<h1>Home</h1>")
}

async fn about() -> Html<&'static str> {
    Html("<h1>About</h1>")
}

async fn store() -> Html<&'static str> {
    Html("<h1>Store</h1>")
}

async fn admin() -> Html<&'static str> {
    Html("<h1>Admin</h1>")
}

async fn contact() -> Html<&'static str> {
    Html("<h1>Contact</h1>")
}

async fn user(Path(user_id): Path<u32>) -> Html<String> {
    Html(format!("<h1>User {user_id}</h1>"))
}

async fn show_post(
    State(state): State<DemoState>,
    Path((user_id, post_id)): Path<(u32, u32)>,
) -> Result<Html<String>, StatusCode> {
    if state.posts.read().contains(&(user_id, post_id)) {
        Ok(Html(format!("<h1>Post {post_id} by user {user_id}</h1>")))
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

async fn publish_post(
    State(state): State<DemoState>,
    Path((user_id, post_id)): Path<(u32, u32)>,
) -> StatusCode {
    state.posts.publish(user_id, post_id);
    tracing::info!(user_id, post_id, "post published");
    StatusCode::CREATED
}

async fn docs_index() -> Html<&'static str> {
    Html("<h1>Docs</h1>")
}

async fn docs_getting_started() -> Html<&'static str> {
    Html("<h1>Getting started</h1>")
}

async fn sitemap_xml(
    State(state): State<DemoState>,
    headers: HeaderMap,
) -> ServerResult<Response> {
    xml_response(&state.sitemap, state.gzip, &headers)
}

async fn sitemap_index_xml(
    State(state): State<DemoState>,
    headers: HeaderMap,
) -> ServerResult<Response> {
    xml_response(&state.index, state.gzip, &headers)
}

/// Body of `/health`.
#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
    pub posts: usize,
    pub sitemap_cacheable: bool,
}

async fn health(State(state): State<DemoState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        posts: state.posts.len(),
        sitemap_cacheable: state.sitemap.is_cacheable(),
    })
}
