//! Country allow-list driven by a header from the fronting proxy.
//!
//! The header is trusted as-is; the gate does no IP geolocation of its own.

use std::collections::HashSet;

use axum::body::Body;
use axum::http::Request;

use crate::config::GeoConfig;
use crate::security::{Rejection, RequestFilter};

#[derive(Debug, Clone)]
pub struct GeoFilter {
    header: String,
    allowed: HashSet<String>,
    unknown_sentinel: String,
    allow_missing: bool,
    message: String,
}

impl GeoFilter {
    pub fn from_config(config: &GeoConfig) -> Self {
        Self {
            header: config.header.to_ascii_lowercase(),
            allowed: config
                .allowed_countries
                .iter()
                .map(|c| c.to_ascii_uppercase())
                .collect(),
            unknown_sentinel: config.unknown_sentinel.to_ascii_uppercase(),
            allow_missing: config.allow_missing,
            message: config.message.clone(),
        }
    }

    fn reject(&self) -> Rejection {
        Rejection::new(self.name(), self.message.clone())
    }
}

impl RequestFilter for GeoFilter {
    fn name(&self) -> &'static str {
        "geo"
    }

    fn check(&self, req: &Request<Body>) -> Result<(), Rejection> {
        let country = match req.headers().get(self.header.as_str()) {
            // present but unreadable: fail closed
            Some(raw) => raw.to_str().map_err(|_| self.reject())?.trim(),
            None => "",
        };

        // an empty value counts as missing
        if country.is_empty() {
            return if self.allow_missing {
                Ok(())
            } else {
                Err(self.reject())
            };
        }

        let country = country.to_ascii_uppercase();
        if country == self.unknown_sentinel || self.allowed.contains(&country) {
            Ok(())
        } else {
            Err(self.reject())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn filter(allow_missing: bool) -> GeoFilter {
        GeoFilter::from_config(&GeoConfig {
            enabled: true,
            allow_missing,
            ..GeoConfig::default()
        })
    }

    fn from_country(code: &str) -> Request<Body> {
        Request::builder()
            .uri("/")
            .header("CF-IPCountry", code)
            .body(Body::default())
            .unwrap()
    }

    #[test]
    fn test_allowed_country_passes() {
        assert!(filter(true).check(&from_country("JP")).is_ok());
        assert!(filter(true).check(&from_country("jp")).is_ok());
    }

    #[test]
    fn test_other_country_rejected() {
        let err = filter(true).check(&from_country("US")).unwrap_err();
        assert_eq!(err.filter(), "geo");
        assert_eq!(err.message(), "Access blocked by country");
    }

    #[test]
    fn test_unknown_sentinel_passes() {
        assert!(filter(false).check(&from_country("unknown")).is_ok());
        assert!(filter(false).check(&from_country("UNKNOWN")).is_ok());
    }

    #[test]
    fn test_missing_header_follows_toggle() {
        let req = Request::builder().uri("/").body(Body::default()).unwrap();
        assert!(filter(true).check(&req).is_ok());
        assert!(filter(false).check(&req).is_err());
    }

    #[test]
    fn test_empty_header_treated_as_missing() {
        assert!(filter(true).check(&from_country("")).is_ok());
        assert!(filter(true).check(&from_country("   ")).is_ok());
        assert!(filter(false).check(&from_country("")).is_err());
    }

    #[test]
    fn test_malformed_header_rejected() {
        let mut req = Request::builder().uri("/").body(Body::default()).unwrap();
        req.headers_mut().insert(
            "cf-ipcountry",
            HeaderValue::from_bytes(&[0xff, 0xfe]).unwrap(),
        );
        assert!(filter(true).check(&req).is_err());
    }
}
