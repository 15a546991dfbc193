//! End-to-end tests for the demo site over axum.

use std::io::Read;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::header::{ACCEPT_ENCODING, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use flate2::read::GzDecoder;
use tower::ServiceExt;

use sitemapper::{Include, SitemapError, Sitemapper};
use sitemapper_server::demo;
use sitemapper_server::{xml_response, ServerConfig, ServerResult, SiteBlueprint, SiteRouter};

const DEMO_SITEMAP: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url>
    <loc>https://localhost/docs/</loc>
    <changefreq>weekly</changefreq>
    <priority>0.6</priority>
  </url>
  <url>
    <loc>https://localhost/docs/getting-started</loc>
    <changefreq>monthly</changefreq>
  </url>
  <url>
    <loc>https://localhost/</loc>
    <lastmod>2022-02-08</lastmod>
    <changefreq>monthly</changefreq>
    <priority>1.0</priority>
  </url>
  <url>
    <loc>https://localhost/about</loc>
  </url>
  <url>
    <loc>https://localhost/store</loc>
  </url>
  <url>
    <loc>https://localhost/contact</loc>
    <lastmod>2022-02-09T10:30:00</lastmod>
  </url>
  <url>
    <loc>https://localhost/user/1</loc>
    <lastmod>2022-01-01</lastmod>
    <changefreq>monthly</changefreq>
    <priority>0.9</priority>
  </url>
  <url>
    <loc>https://localhost/user/2</loc>
    <lastmod>2022-02-01</lastmod>
    <changefreq>monthly</changefreq>
    <priority>0.8</priority>
  </url>
  <url>
    <loc>https://localhost/user/3</loc>
    <lastmod>2022-03-01</lastmod>
    <changefreq>monthly</changefreq>
    <priority>0.7</priority>
  </url>
  <url>
    <loc>https://localhost/post/1/1</loc>
    <changefreq>daily</changefreq>
  </url>
  <url>
    <loc>https://localhost/post/1/2</loc>
    <changefreq>daily</changefreq>
  </url>
  <url>
    <loc>https://localhost/post/2/3</loc>
    <changefreq>daily</changefreq>
  </url>
</urlset>"#;

fn router(config: &ServerConfig) -> Router {
    demo::build(config).unwrap().router
}

fn gzip_config() -> ServerConfig {
    ServerConfig {
        gzip: true,
        ..ServerConfig::default()
    }
}

async fn get_path(app: &Router, path: &str, accept_encoding: Option<&str>) -> Response {
    let mut request = Request::builder().uri(path);
    if let Some(encoding) = accept_encoding {
        request = request.header(ACCEPT_ENCODING, encoding);
    }
    app.clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn test_sitemap_document() {
    let app = router(&ServerConfig::default());
    let response = get_path(&app, "/sitemap.xml", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "application/xml");
    let length: usize = response.headers()[CONTENT_LENGTH]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();

    let body = body_text(response).await;
    assert_eq!(body, DEMO_SITEMAP);
    assert_eq!(length, body.len());
}

#[tokio::test]
async fn test_sitemap_index_document() {
    let app = router(&ServerConfig::default());
    let response = get_path(&app, "/sitemap_index.xml", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_text(response).await,
        r#"<?xml version="1.0" encoding="utf-8"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap>
    <loc>https://localhost/sitemap.xml</loc>
  </sitemap>
</sitemapindex>"#
    );
}

#[tokio::test]
async fn test_gzip_when_enabled_and_accepted() {
    let app = router(&gzip_config());
    let response = get_path(&app, "/sitemap.xml", Some("gzip, deflate")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_ENCODING], "gzip");
    let length: usize = response.headers()[CONTENT_LENGTH]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();

    let compressed = body_bytes(response).await;
    assert_eq!(length, compressed.len());

    let mut xml = String::new();
    GzDecoder::new(compressed.as_slice())
        .read_to_string(&mut xml)
        .unwrap();
    assert_eq!(xml, DEMO_SITEMAP);
}

#[tokio::test]
async fn test_gzip_enabled_but_not_accepted() {
    let app = router(&gzip_config());
    let response = get_path(&app, "/sitemap.xml", None).await;

    assert!(!response.headers().contains_key(CONTENT_ENCODING));
    assert_eq!(body_text(response).await, DEMO_SITEMAP);
}

#[tokio::test]
async fn test_gzip_disabled_ignores_accept_encoding() {
    let app = router(&ServerConfig::default());
    let response = get_path(&app, "/sitemap.xml", Some("gzip")).await;

    assert!(!response.headers().contains_key(CONTENT_ENCODING));
    assert_eq!(body_text(response).await, DEMO_SITEMAP);
}

#[tokio::test]
async fn test_pages_are_served() {
    let app = router(&ServerConfig::default());
    for path in [
        "/",
        "/about",
        "/shop",
        "/buy",
        "/store",
        "/admin",
        "/contact",
        "/user/2",
        "/post/1/2",
        "/docs/",
        "/docs/getting-started",
    ] {
        let response = get_path(&app, path, None).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {path}");
    }

    let response = get_path(&app, "/post/9/9", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unlisted_routes_stay_out_of_sitemap() {
    let app = router(&ServerConfig::default());
    let body = body_text(get_path(&app, "/sitemap.xml", None).await).await;
    for path in ["/admin", "/shop", "/buy", "/health", "/sitemap.xml"] {
        assert!(!body.contains(&format!("localhost{path}<")), "{path} listed");
    }
}

#[tokio::test]
async fn test_published_post_appears_despite_cache() {
    let config = ServerConfig {
        cache: true,
        ..ServerConfig::default()
    };
    let app = router(&config);

    let before = body_text(get_path(&app, "/sitemap.xml", None).await).await;
    assert!(!before.contains("/post/3/7"));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/post/3/7")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let after = body_text(get_path(&app, "/sitemap.xml", None).await).await;
    assert!(after.contains("<loc>https://localhost/post/3/7</loc>"));
}

#[tokio::test]
async fn test_cached_index_is_stable() {
    let config = ServerConfig {
        cache: true,
        ..ServerConfig::default()
    };
    let app = router(&config);
    let first = body_text(get_path(&app, "/sitemap_index.xml", None).await).await;
    let second = body_text(get_path(&app, "/sitemap_index.xml", None).await).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_health() {
    let app = router(&ServerConfig::default());
    let response = get_path(&app, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let health: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["posts"], 3);
    assert_eq!(health["sitemap_cacheable"], false);
}

async fn broken_sitemap(
    State(sitemap): State<Arc<Sitemapper>>,
    headers: HeaderMap,
) -> ServerResult<Response> {
    xml_response(&sitemap, false, &headers)
}

#[tokio::test]
async fn test_unknown_endpoint_is_server_error() {
    let mut site: SiteRouter<Arc<Sitemapper>> = SiteRouter::new("localhost");
    site.route("sitemap", "/sitemap.xml", get(broken_sitemap));

    let mut sitemap = Sitemapper::default();
    sitemap.attach(site.table()).unwrap();
    sitemap.register("nowhere", Include::new()).unwrap();

    let app = site.into_router().with_state(Arc::new(sitemap));
    let response = get_path(&app, "/sitemap.xml", None).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_text(response).await.contains("nowhere"));
}

#[tokio::test]
async fn test_handle_from_unregistered_blueprint_fails_on_attach() {
    let mut site: SiteRouter = SiteRouter::new("localhost");
    let mut orphan: SiteBlueprint = SiteBlueprint::new("orphan");
    let page = orphan.route("page", "/page", get(|| async { "page" }));

    let mut sitemap = Sitemapper::default();
    sitemap.include(page.clone(), Include::new()).unwrap();
    assert_eq!(sitemap.pending().len(), 1);

    site.route("home", "/", get(|| async { "home" }));
    let err = sitemap.attach(site.table()).unwrap_err();
    assert!(matches!(err, SitemapError::HandleNotRegistered(ref h) if *h == page));
    assert!(sitemap.pending().is_empty());
}
