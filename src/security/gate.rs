//! The ordered filter chain and its middleware.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::{GateConfig, RejectionFormat};
use crate::observability::metrics;
use crate::security::{BotFilter, GeoFilter, OriginFilter, Rejection, RequestFilter};

/// Filters in evaluation order: bots, geo, origin. Disabled filters are
/// simply not installed.
#[derive(Debug)]
pub struct Gate {
    filters: Vec<Box<dyn RequestFilter>>,
    format: RejectionFormat,
}

impl Gate {
    pub fn new(filters: Vec<Box<dyn RequestFilter>>, format: RejectionFormat) -> Self {
        Self { filters, format }
    }

    pub fn from_config(config: &GateConfig) -> Result<Self, regex::Error> {
        let mut filters: Vec<Box<dyn RequestFilter>> = Vec::new();
        if config.bots.enabled {
            filters.push(Box::new(BotFilter::from_config(&config.bots)?));
        }
        if config.geo.enabled {
            filters.push(Box::new(GeoFilter::from_config(&config.geo)));
        }
        if config.origin.enabled {
            filters.push(Box::new(OriginFilter::from_config(
                &config.origin,
                &config.loader.path,
            )));
        }
        Ok(Self::new(filters, config.rejection.format))
    }

    /// Names of the installed filters, in order.
    pub fn filter_names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// First rejection wins.
    pub fn evaluate(&self, req: &Request<Body>) -> Result<(), Rejection> {
        self.filters
            .iter()
            .try_for_each(|f| f.check(req))
            .map_err(|r| r.with_format(self.format))
    }
}

pub async fn gate_middleware(
    State(gate): State<Arc<Gate>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match gate.evaluate(&request) {
        Ok(()) => next.run(request).await,
        Err(rejection) => {
            tracing::warn!(
                filter = rejection.filter(),
                method = %request.method(),
                path = %request.uri().path(),
                reason = rejection.message(),
                "Request rejected"
            );
            metrics::record_rejection(rejection.filter());
            rejection.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_chain_order() {
        let gate = Gate::from_config(&GateConfig::default()).unwrap();
        assert_eq!(gate.filter_names(), vec!["bots", "origin"]);

        let mut config = GateConfig::default();
        config.geo.enabled = true;
        let gate = Gate::from_config(&config).unwrap();
        assert_eq!(gate.filter_names(), vec!["bots", "geo", "origin"]);
    }

    #[test]
    fn test_first_rejection_wins() {
        let mut config = GateConfig::default();
        config.geo.enabled = true;
        let gate = Gate::from_config(&config).unwrap();

        // bot, wrong country and no referer all at once
        let req = Request::builder()
            .uri("/api/data")
            .header("User-Agent", "curl/7.68.0")
            .header("CF-IPCountry", "US")
            .body(Body::default())
            .unwrap();
        assert_eq!(gate.evaluate(&req).unwrap_err().filter(), "bots");

        let req = Request::builder()
            .uri("/api/data")
            .header("CF-IPCountry", "US")
            .body(Body::default())
            .unwrap();
        assert_eq!(gate.evaluate(&req).unwrap_err().filter(), "geo");

        let req = Request::builder()
            .uri("/api/data")
            .header("CF-IPCountry", "JP")
            .body(Body::default())
            .unwrap();
        assert_eq!(gate.evaluate(&req).unwrap_err().filter(), "origin");
    }

    #[test]
    fn test_empty_gate_allows_everything() {
        let gate = Gate::new(Vec::new(), RejectionFormat::Text);
        let req = Request::builder()
            .uri("/api/data")
            .header("User-Agent", "Googlebot")
            .body(Body::default())
            .unwrap();
        assert!(gate.evaluate(&req).is_ok());
    }
}
