//! Terminal handlers: the loader probe and the SPA fallback.

use axum::{
    body::Body,
    extract::State,
    http::{header, Method, Request, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tower::ServiceExt;

use crate::http::server::AppState;
use crate::observability::metrics;

/// Body of the loader probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderStatus {
    pub allowed: bool,
}

/// `GET /frontend-loader`. Reaching it means the gate let the client through.
pub async fn frontend_loader(State(state): State<AppState>) -> Response {
    metrics::record_response("loader");
    let body = Json(LoaderStatus { allowed: true });
    if state.loader_no_store {
        ([(header::CACHE_CONTROL, "no-store")], body).into_response()
    } else {
        body.into_response()
    }
}

/// Non-GET methods on a known route are not found, not "method not allowed".
pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Any other path gets the application document.
pub async fn spa_fallback(State(state): State<AppState>, request: Request<Body>) -> Response {
    if !matches!(*request.method(), Method::GET | Method::HEAD) {
        return StatusCode::NOT_FOUND.into_response();
    }

    let response = match state.index.clone().oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    let mut response = response.map(Body::new);

    if response.status() == StatusCode::NOT_FOUND {
        tracing::error!("SPA document missing from the public root");
        return response;
    }

    if let Some(cache_control) = &state.index_cache_control {
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, cache_control.clone());
    }
    metrics::record_response("fallback");
    response
}
