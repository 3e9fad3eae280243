//! Static asset lookup, the first stage of the pipeline.
//!
//! # Responsibilities
//! - Serve GET/HEAD requests that name a file under the public root
//! - Attach long-lived `Cache-Control`, a weak ETag and `Last-Modified`
//! - Answer a matching `If-None-Match` with 304
//! - Pass everything else (misses, other methods) down the pipeline
//!
//! # Design Decisions
//! - File I/O, ranges and content types are left to `ServeDir`
//! - Hits skip every filter; only misses reach the gate

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::config::AssetsConfig;
use crate::observability::metrics;

#[derive(Debug, Clone)]
pub struct StaticAssets {
    serve_dir: ServeDir,
    cache_control: HeaderValue,
    etag: bool,
    last_modified: bool,
}

impl StaticAssets {
    pub fn from_config(config: &AssetsConfig) -> Result<Self, header::InvalidHeaderValue> {
        Ok(Self {
            serve_dir: ServeDir::new(&config.public_root),
            cache_control: HeaderValue::from_str(&config.cache_control())?,
            etag: config.etag,
            last_modified: config.last_modified,
        })
    }

    /// Serve `request` from disk if it names an existing file.
    /// Owned, since `Body` is not `Sync` and the future must stay `Send`.
    pub async fn lookup(&self, request: Request<Body>) -> Option<Response> {
        if !matches!(*request.method(), Method::GET | Method::HEAD) {
            return None;
        }

        let request_headers = request.headers().clone();
        let response = match self.serve_dir.clone().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        };
        if response.status() == StatusCode::NOT_FOUND {
            return None;
        }

        Some(self.decorate(&request_headers, response.map(Body::new)))
    }

    fn decorate(&self, request_headers: &HeaderMap, mut response: Response) -> Response {
        let status = response.status();
        if !matches!(
            status,
            StatusCode::OK | StatusCode::PARTIAL_CONTENT | StatusCode::NOT_MODIFIED
        ) {
            return response;
        }

        let etag = if self.etag && status == StatusCode::OK {
            weak_etag(&response)
        } else {
            None
        };

        if let Some(etag) = &etag {
            if if_none_match(request_headers, etag) {
                let last_modified = response.headers().get(header::LAST_MODIFIED).cloned();
                response = Response::new(Body::empty());
                *response.status_mut() = StatusCode::NOT_MODIFIED;
                if let Some(lm) = last_modified {
                    response.headers_mut().insert(header::LAST_MODIFIED, lm);
                }
            }
        }

        let headers = response.headers_mut();
        headers.insert(header::CACHE_CONTROL, self.cache_control.clone());
        if let Some(etag) = etag {
            headers.insert(header::ETAG, etag);
        }
        if !self.last_modified {
            headers.remove(header::LAST_MODIFIED);
        }
        response
    }
}

/// `W/"<len>-<mtime digest>"`, both hex. Needs `Content-Length` and `Last-Modified`.
fn weak_etag(response: &Response) -> Option<HeaderValue> {
    let last_modified = response.headers().get(header::LAST_MODIFIED)?;
    let len = response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())?;

    let mut hasher = DefaultHasher::new();
    last_modified.as_bytes().hash(&mut hasher);
    HeaderValue::from_str(&format!("W/\"{:x}-{:x}\"", len, hasher.finish())).ok()
}

/// Weak comparison against every candidate in `If-None-Match`.
fn if_none_match(request_headers: &HeaderMap, etag: &HeaderValue) -> bool {
    let Ok(etag) = etag.to_str() else {
        return false;
    };
    let opaque = |tag: &str| tag.trim().trim_start_matches("W/").to_string();
    let wanted = opaque(etag);

    request_headers
        .get_all(header::IF_NONE_MATCH)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|candidate| candidate.trim() == "*" || opaque(candidate) == wanted)
}

/// Bodiless copy of a GET/HEAD request, used to probe the public root.
fn asset_probe(request: &Request<Body>) -> Option<Request<Body>> {
    if !matches!(*request.method(), Method::GET | Method::HEAD) {
        return None;
    }
    let mut probe = Request::new(Body::empty());
    *probe.method_mut() = request.method().clone();
    *probe.uri_mut() = request.uri().clone();
    *probe.version_mut() = request.version();
    *probe.headers_mut() = request.headers().clone();
    Some(probe)
}

pub async fn static_assets_middleware(
    State(assets): State<Arc<StaticAssets>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(probe) = asset_probe(&request) else {
        return next.run(request).await;
    };

    if let Some(response) = assets.lookup(probe).await {
        tracing::debug!(
            path = %request.uri().path(),
            status = %response.status(),
            "Served static asset"
        );
        metrics::record_asset_hit();
        return response;
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn public_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.js"), "console.log('hi');").unwrap();
        std::fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        dir
    }

    fn assets(dir: &tempfile::TempDir, config: AssetsConfig) -> StaticAssets {
        StaticAssets::from_config(&AssetsConfig {
            public_root: dir.path().to_string_lossy().into_owned(),
            ..config
        })
        .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_hit_carries_cache_headers() {
        let dir = public_dir();
        let assets = assets(&dir, AssetsConfig::default());

        let res = assets.lookup(get("/app.js")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers()[header::CACHE_CONTROL],
            "public, max-age=31536000, immutable"
        );
        assert!(res.headers()[header::ETAG].to_str().unwrap().starts_with("W/\""));
        assert!(res.headers().contains_key(header::LAST_MODIFIED));

        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"console.log('hi');");
    }

    #[tokio::test]
    async fn test_miss_and_other_methods_pass_through() {
        let dir = public_dir();
        let assets = assets(&dir, AssetsConfig::default());

        assert!(assets.lookup(get("/missing.js")).await.is_none());
        assert!(assets.lookup(get("/../secret")).await.is_none());

        let post = Request::builder()
            .method(Method::POST)
            .uri("/app.js")
            .body(Body::empty())
            .unwrap();
        assert!(assets.lookup(post).await.is_none());
    }

    #[tokio::test]
    async fn test_if_none_match_yields_304() {
        let dir = public_dir();
        let assets = assets(&dir, AssetsConfig::default());

        let first = assets.lookup(get("/app.js")).await.unwrap();
        let etag = first.headers()[header::ETAG].clone();

        let conditional = Request::builder()
            .uri("/app.js")
            .header(header::IF_NONE_MATCH, etag.clone())
            .body(Body::empty())
            .unwrap();
        let res = assets.lookup(conditional).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(res.headers()[header::ETAG], etag);
    }

    #[tokio::test]
    async fn test_toggles_strip_validators() {
        let dir = public_dir();
        let assets = assets(
            &dir,
            AssetsConfig {
                etag: false,
                last_modified: false,
                immutable: false,
                ..AssetsConfig::default()
            },
        );

        let res = assets.lookup(get("/app.js")).await.unwrap();
        assert_eq!(res.headers()[header::CACHE_CONTROL], "public, max-age=31536000");
        assert!(!res.headers().contains_key(header::ETAG));
        assert!(!res.headers().contains_key(header::LAST_MODIFIED));
    }

    #[test]
    fn test_lookup_future_is_send() {
        fn require_send<T: Send>(_: &T) {}

        let dir = public_dir();
        let assets = assets(&dir, AssetsConfig::default());
        let future = assets.lookup(get("/app.js"));
        require_send(&future);
    }

    #[test]
    fn test_probe_copies_get_and_head_only() {
        let req = Request::builder()
            .method(Method::HEAD)
            .uri("/app.js?v=2")
            .header(header::IF_NONE_MATCH, "\"x\"")
            .body(Body::from("ignored"))
            .unwrap();
        let probe = asset_probe(&req).unwrap();
        assert_eq!(probe.method(), Method::HEAD);
        assert_eq!(probe.uri(), "/app.js?v=2");
        assert_eq!(probe.headers()[header::IF_NONE_MATCH], "\"x\"");

        let post = Request::builder()
            .method(Method::POST)
            .uri("/app.js")
            .body(Body::empty())
            .unwrap();
        assert!(asset_probe(&post).is_none());
    }

    #[test]
    fn test_if_none_match_parsing() {
        let etag = HeaderValue::from_static("W/\"12-abc\"");
        let mut headers = HeaderMap::new();
        headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static("\"other\", \"12-abc\""));
        assert!(if_none_match(&headers, &etag));

        headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static("\"other\""));
        assert!(!if_none_match(&headers, &etag));

        headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static("*"));
        assert!(if_none_match(&headers, &etag));
    }
}
