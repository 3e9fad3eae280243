//! Referer-based origin check.
//!
//! # Responsibilities
//! - Let asset-looking paths, exempt paths and the loader endpoint through
//! - Require a `Referer` that starts with the allowed origin everywhere else
//! - Optionally only enforce on a given deployment host
//!
//! # Design Decisions
//! - Extension exemption is a case-sensitive suffix test on the raw path
//! - Referer comparison is an ASCII case-insensitive prefix test

use axum::body::Body;
use axum::http::{header, Request};

use crate::config::OriginConfig;
use crate::security::{header_str, Rejection, RequestFilter};

#[derive(Debug, Clone)]
pub struct OriginFilter {
    allowed_origin: String,
    exempt_extensions: Vec<String>,
    exempt_paths: Vec<String>,
    loader_path: String,
    message: String,
    loader_query_message: Option<String>,
    host_guard: Option<String>,
}

impl OriginFilter {
    pub fn from_config(config: &OriginConfig, loader_path: &str) -> Self {
        Self {
            allowed_origin: config.allowed_origin.clone(),
            exempt_extensions: config.exempt_extensions.clone(),
            exempt_paths: config.exempt_paths.clone(),
            loader_path: loader_path.to_string(),
            message: config.message.clone(),
            loader_query_message: config.loader_query_message.clone(),
            host_guard: config
                .host_guard
                .as_ref()
                .map(|h| h.to_ascii_lowercase()),
        }
    }

    /// Paths served without a referer.
    pub fn is_exempt(&self, path: &str) -> bool {
        path == self.loader_path
            || self.exempt_paths.iter().any(|p| p == path)
            || self.exempt_extensions.iter().any(|ext| path.ends_with(ext.as_str()))
    }

    pub fn is_allowed_referer(&self, referer: &str) -> bool {
        referer
            .get(..self.allowed_origin.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(&self.allowed_origin))
    }

    fn host_is_guarded(&self, req: &Request<Body>) -> bool {
        let Some(guard) = &self.host_guard else {
            return true;
        };
        header_str(req, header::HOST.as_str())
            .or_else(|| req.uri().host())
            .is_some_and(|host| host.to_ascii_lowercase().contains(guard.as_str()))
    }
}

fn wants_loader(req: &Request<Body>) -> bool {
    req.uri().query().is_some_and(|q| {
        url::form_urlencoded::parse(q.as_bytes()).any(|(k, v)| k == "loader" && v == "true")
    })
}

impl RequestFilter for OriginFilter {
    fn name(&self) -> &'static str {
        "origin"
    }

    fn check(&self, req: &Request<Body>) -> Result<(), Rejection> {
        if self.is_exempt(req.uri().path()) {
            return Ok(());
        }

        let referer = header_str(req, header::REFERER.as_str()).unwrap_or_default();
        if self.is_allowed_referer(referer) || !self.host_is_guarded(req) {
            return Ok(());
        }

        let message = match &self.loader_query_message {
            Some(msg) if wants_loader(req) => msg.clone(),
            _ => self.message.clone(),
        };
        Err(Rejection::new(self.name(), message))
    }
}
