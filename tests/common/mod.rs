//! Shared utilities for integration tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use edge_gate::config::GateConfig;
use edge_gate::http::HttpServer;
use tempfile::TempDir;
use tower::ServiceExt;

pub const INDEX_HTML: &str = "<!doctype html><html><body><div id=\"app\"></div></body></html>";
pub const APP_JS: &str = "console.log('app');";
pub const VALID_REFERER: &str = "https://greencrafter.space/home";
pub const BROWSER_UA: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_0) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15";

/// A public root with an index document, a script and a nested asset.
pub fn public_root() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), INDEX_HTML).unwrap();
    std::fs::write(dir.path().join("app.js"), APP_JS).unwrap();
    std::fs::create_dir(dir.path().join("data")).unwrap();
    std::fs::write(dir.path().join("data").join("levels.json"), "{\"levels\":3}").unwrap();
    dir
}

/// Default config pointed at `root`.
pub fn config_for(root: &TempDir) -> GateConfig {
    let mut config = GateConfig::default();
    config.assets.public_root = root.path().to_string_lossy().into_owned();
    config
}

pub fn router(config: GateConfig) -> Router {
    HttpServer::new(config).unwrap().router()
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// GET with a browser user agent and optional referer.
pub fn get(uri: &str, referer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri).header("User-Agent", BROWSER_UA);
    if let Some(referer) = referer {
        builder = builder.header("Referer", referer);
    }
    builder.body(Body::empty()).unwrap()
}
