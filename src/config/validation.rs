//! Configuration validation.
//!
//! Semantic checks on top of what serde already enforces. Validation is a
//! pure function over `GateConfig` and reports every problem it finds, not
//! just the first one.

use std::net::SocketAddr;

use axum::http::HeaderValue;
use regex::RegexBuilder;
use thiserror::Error;
use url::Url;

use crate::config::schema::GateConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("origin.allowed_origin `{0}` is not an absolute http(s) URL")]
    InvalidOrigin(String),

    #[error("bots.pattern does not compile: {0}")]
    InvalidBotPattern(String),

    #[error("geo.allowed_countries entry `{0}` is not a two-letter code")]
    InvalidCountry(String),

    #[error("geo.header `{0}` is not a valid header name")]
    InvalidGeoHeader(String),

    #[error("origin.exempt_extensions entry `{0}` must start with '.'")]
    InvalidExtension(String),

    #[error("{field} `{value}` must start with '/'")]
    InvalidPath { field: &'static str, value: String },

    #[error("{field} is not a valid header value")]
    InvalidHeaderValue { field: &'static str },

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("observability.metrics_address `{0}` is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.assets.public_root.is_empty() {
        errors.push(ValidationError::Empty("assets.public_root"));
    }
    if config.assets.index_file.is_empty() {
        errors.push(ValidationError::Empty("assets.index_file"));
    }
    if let Some(value) = &config.assets.index_cache_control {
        check_header_value(&mut errors, "assets.index_cache_control", value);
    }

    if config.headers.enabled {
        check_header_value(&mut errors, "headers.frame_options", &config.headers.frame_options);
        check_header_value(
            &mut errors,
            "headers.content_security_policy",
            &config.headers.content_security_policy,
        );
    }

    if config.bots.enabled {
        if let Err(e) = RegexBuilder::new(&config.bots.pattern)
            .case_insensitive(true)
            .build()
        {
            errors.push(ValidationError::InvalidBotPattern(e.to_string()));
        }
    }

    if config.geo.enabled {
        if axum::http::HeaderName::from_bytes(config.geo.header.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidGeoHeader(config.geo.header.clone()));
        }
        for code in &config.geo.allowed_countries {
            if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                errors.push(ValidationError::InvalidCountry(code.clone()));
            }
        }
    }

    if config.origin.enabled {
        let origin_ok = Url::parse(&config.origin.allowed_origin)
            .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
            .unwrap_or(false);
        if !origin_ok {
            errors.push(ValidationError::InvalidOrigin(config.origin.allowed_origin.clone()));
        }
        for ext in &config.origin.exempt_extensions {
            if !ext.starts_with('.') || ext.len() < 2 {
                errors.push(ValidationError::InvalidExtension(ext.clone()));
            }
        }
        for path in &config.origin.exempt_paths {
            check_path(&mut errors, "origin.exempt_paths", path);
        }
    }

    check_path(&mut errors, "loader.path", &config.loader.path);

    if config.http.max_body_bytes == 0 {
        errors.push(ValidationError::Zero("http.max_body_bytes"));
    }
    if config.http.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero("http.request_timeout_secs"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_path(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if !value.starts_with('/') {
        errors.push(ValidationError::InvalidPath {
            field,
            value: value.to_string(),
        });
    }
}

fn check_header_value(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if HeaderValue::from_str(value).is_err() {
        errors.push(ValidationError::InvalidHeaderValue { field });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&GateConfig::default()), Ok(()));
    }

    #[test]
    fn test_reports_all_errors() {
        let mut config = GateConfig::default();
        config.origin.allowed_origin = "greencrafter.space".into();
        config.bots.pattern = "(unclosed".into();
        config.geo.enabled = true;
        config.geo.allowed_countries = vec!["JPN".into()];
        config.origin.exempt_extensions.push("js".into());
        config.loader.path = "frontend-loader".into();
        config.http.max_body_bytes = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 6);
        assert!(errors.contains(&ValidationError::InvalidCountry("JPN".into())));
        assert!(errors.contains(&ValidationError::InvalidExtension("js".into())));
        assert!(errors.contains(&ValidationError::Zero("http.max_body_bytes")));
    }

    #[test]
    fn test_disabled_sections_are_not_checked() {
        let mut config = GateConfig::default();
        config.bots.enabled = false;
        config.bots.pattern = "(".into();
        config.origin.enabled = false;
        config.origin.allowed_origin = String::new();
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_rejects_non_http_origin() {
        let mut config = GateConfig::default();
        config.origin.allowed_origin = "ftp://greencrafter.space".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::InvalidOrigin("ftp://greencrafter.space".into())]
        );
    }

    #[test]
    fn test_metrics_address_checked_when_enabled() {
        let mut config = GateConfig::default();
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_err());
    }
}
