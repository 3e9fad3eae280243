//! Framing headers added to every gated response.
//!
//! Installed inside the static asset lookup, so asset hits never carry them,
//! while rejections, the loader probe and the SPA fallback always do.
//! The default values permit embedding from any origin.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

use crate::config::HeadersConfig;

#[derive(Debug, Clone, Default)]
pub struct SecurityHeaders {
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl SecurityHeaders {
    pub fn from_config(config: &HeadersConfig) -> Result<Self, header::InvalidHeaderValue> {
        if !config.enabled {
            return Ok(Self::default());
        }
        Ok(Self {
            headers: vec![
                (
                    header::X_FRAME_OPTIONS,
                    HeaderValue::from_str(&config.frame_options)?,
                ),
                (
                    header::CONTENT_SECURITY_POLICY,
                    HeaderValue::from_str(&config.content_security_policy)?,
                ),
            ],
        })
    }

    pub fn apply(&self, response: &mut Response) {
        let headers = response.headers_mut();
        for (name, value) in &self.headers {
            headers.insert(name.clone(), value.clone());
        }
    }
}

pub async fn security_headers_middleware(
    State(headers): State<Arc<SecurityHeaders>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    headers.apply(&mut response);
    response
}
